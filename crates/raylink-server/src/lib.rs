extern crate rapier3d as rapier;

pub mod acceptor;
pub mod config;
pub mod error;
pub mod request_loop;
pub mod scene;
pub mod service;
pub mod world;

pub use acceptor::{spawn_server, start_server, Acceptor};
pub use config::ServerConfig;
pub use error::ServerError;
pub use service::{BackendError, RaycastService};
pub use world::{SceneState, SharedScene};
