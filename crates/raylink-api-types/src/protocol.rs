//! Request/response exchanges on top of a [`Connection`].
//!
//! The protocol is strictly synchronous: the client writes one 24-byte query
//! and waits for the 1-byte result before sending anything else.

use crate::codec::{self, QUERY_LEN, RESULT_LEN, VECTOR3_LEN};
use crate::connection::Connection;
use crate::error::WireError;
use crate::queries::{RaycastQuery, ACK_BYTE};
use std::net::ToSocketAddrs;
use std::time::Duration;

/// How long a client is willing to wait for a response.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundTripPolicy {
    /// `None` waits for as long as the connection stays open.
    pub timeout: Option<Duration>,
}

impl RoundTripPolicy {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

pub fn connect(address: impl ToSocketAddrs, need_ack: bool) -> Result<Connection, WireError> {
    let mut connection = Connection::connect(address)?;
    if need_ack {
        await_ack(&mut connection)?;
    }
    Ok(connection)
}

pub fn send_ack(connection: &mut Connection) -> Result<(), WireError> {
    connection.write(&[ACK_BYTE])?;
    connection.flush()
}

pub fn await_ack(connection: &mut Connection) -> Result<(), WireError> {
    match connection.read_array::<1>()? {
        [ACK_BYTE] => Ok(()),
        [other] => Err(WireError::Handshake(other)),
    }
}

/// Sends `query` and blocks until its result comes back. Nothing is written
/// if the timeout cannot be applied.
pub fn round_trip(
    connection: &mut Connection,
    query: &RaycastQuery,
    policy: RoundTripPolicy,
) -> Result<bool, WireError> {
    connection.set_read_timeout(policy.timeout)?;

    connection.write(&codec::encode_vector3(&query.start)?)?;
    connection.write(&codec::encode_vector3(&query.end)?)?;
    connection.flush()?;

    let [byte] = connection.read_array::<RESULT_LEN>()?;
    Ok(codec::decode_result(byte))
}

/// Reads the next query. A clean closure before the first byte is reported as
/// [`WireError::ConnectionClosed`]; a closure anywhere inside the 24 bytes is
/// [`WireError::MalformedInput`].
pub fn read_query(connection: &mut Connection) -> Result<RaycastQuery, WireError> {
    let start = codec::decode_vector3(&connection.read_array::<VECTOR3_LEN>()?)?;
    let end = match connection.read_array::<VECTOR3_LEN>() {
        Ok(bytes) => codec::decode_vector3(&bytes)?,
        Err(WireError::ConnectionClosed) => {
            return Err(WireError::MalformedInput {
                expected: QUERY_LEN,
                received: VECTOR3_LEN,
            })
        }
        Err(WireError::MalformedInput { received, .. }) => {
            return Err(WireError::MalformedInput {
                expected: QUERY_LEN,
                received: VECTOR3_LEN + received,
            })
        }
        Err(e) => return Err(e),
    };

    Ok(RaycastQuery::new(start, end))
}

pub fn write_result(connection: &mut Connection, hit: bool) -> Result<(), WireError> {
    connection.write(&[codec::encode_result(hit)])?;
    connection.flush()
}
