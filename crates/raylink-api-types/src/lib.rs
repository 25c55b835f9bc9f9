pub extern crate rapier3d as rapier;

pub mod codec;
pub mod connection;
pub mod error;
pub mod protocol;
pub mod queries;

pub use connection::{Connection, ConnectionReader, ConnectionWriter};
pub use error::WireError;
pub use protocol::RoundTripPolicy;
pub use queries::{RaycastQuery, ACK_BYTE, DEFAULT_PORT};
