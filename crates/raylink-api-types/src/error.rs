use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failures of the raycast protocol and of the stream carrying it.
#[derive(Debug, Error)]
pub enum WireError {
    /// The peer disconnected, or the transport broke underneath the stream.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The stream ended in the middle of a fixed-size frame.
    #[error("malformed input: expected {expected} bytes, received {received} before the stream closed")]
    MalformedInput { expected: usize, received: usize },

    /// No response arrived before the configured read timeout.
    #[error("no response received within {0:?}")]
    Timeout(Duration),

    /// The server answered the handshake with an unexpected byte.
    #[error("unexpected handshake acknowledgement {0:#04x}")]
    Handshake(u8),

    #[error("transport failure: {0}")]
    Transport(#[source] io::Error),

    #[error("codec failure: {0}")]
    Codec(#[from] bincode::Error),
}

impl WireError {
    /// Whether this error means the peer is gone, as opposed to a local or
    /// protocol-level problem.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            WireError::ConnectionClosed
                | WireError::MalformedInput { .. }
                | WireError::Transport(_)
        )
    }
}

impl From<io::Error> for WireError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::UnexpectedEof => WireError::ConnectionClosed,
            _ => WireError::Transport(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(io::ErrorKind::BrokenPipe)]
    #[case(io::ErrorKind::ConnectionReset)]
    #[case(io::ErrorKind::ConnectionAborted)]
    #[case(io::ErrorKind::UnexpectedEof)]
    fn peer_failures_map_to_connection_closed(#[case] kind: io::ErrorKind) {
        let err = WireError::from(io::Error::from(kind));
        assert!(matches!(err, WireError::ConnectionClosed));
        assert!(err.is_disconnect());
    }

    #[test]
    fn other_io_failures_stay_transport_errors() {
        let err = WireError::from(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, WireError::Transport(_)));
    }

    #[test]
    fn timeouts_are_not_disconnects() {
        assert!(!WireError::Timeout(Duration::from_millis(10)).is_disconnect());
        assert!(!WireError::Handshake(0xff).is_disconnect());
    }
}
