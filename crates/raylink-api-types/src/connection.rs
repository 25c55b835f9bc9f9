//! Blocking duplex byte stream over TCP.
//!
//! A [`Connection`] owns its socket exclusively. The read and write sides are
//! independent buffered handles on the same socket and can be split apart with
//! [`Connection::into_split`]. Every side shuts its direction down when closed
//! or dropped, so the transport is released on all exit paths of the owner.

use crate::error::WireError;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

pub struct ConnectionReader {
    stream: BufReader<TcpStream>,
    timeout: Option<Duration>,
    closed: bool,
}

pub struct ConnectionWriter {
    stream: BufWriter<TcpStream>,
    closed: bool,
}

pub struct Connection {
    reader: ConnectionReader,
    writer: ConnectionWriter,
    peer: SocketAddr,
}

impl Connection {
    pub fn new(stream: TcpStream) -> Result<Self, WireError> {
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        let read_side = stream.try_clone()?;

        Ok(Self {
            reader: ConnectionReader {
                stream: BufReader::new(read_side),
                timeout: None,
                closed: false,
            },
            writer: ConnectionWriter {
                stream: BufWriter::new(stream),
                closed: false,
            },
            peer,
        })
    }

    pub fn connect(address: impl ToSocketAddrs) -> Result<Self, WireError> {
        let stream = TcpStream::connect(address)?;
        Self::new(stream)
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn read(&mut self, n: usize) -> Result<Vec<u8>, WireError> {
        self.reader.read(n)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        self.reader.read_array()
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        self.writer.write(bytes)
    }

    pub fn flush(&mut self) -> Result<(), WireError> {
        self.writer.flush()
    }

    /// `None` blocks reads until data arrives or the stream closes.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), WireError> {
        self.reader.set_timeout(timeout)
    }

    pub fn close(&mut self) {
        self.writer.close();
        self.reader.close();
    }

    pub fn into_split(self) -> (ConnectionReader, ConnectionWriter) {
        (self.reader, self.writer)
    }
}

impl ConnectionReader {
    pub fn read(&mut self, n: usize) -> Result<Vec<u8>, WireError> {
        let mut bytes = vec![0; n];
        self.fill(&mut bytes)?;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut bytes = [0; N];
        self.fill(&mut bytes)?;
        Ok(bytes)
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<(), WireError> {
        self.stream.get_ref().set_read_timeout(timeout)?;
        self.timeout = timeout;
        Ok(())
    }

    fn fill(&mut self, bytes: &mut [u8]) -> Result<(), WireError> {
        if self.closed {
            return Err(WireError::ConnectionClosed);
        }

        let mut received = 0;
        while received < bytes.len() {
            match self.stream.read(&mut bytes[received..]) {
                Ok(0) if received == 0 => return Err(WireError::ConnectionClosed),
                Ok(0) => {
                    return Err(WireError::MalformedInput {
                        expected: bytes.len(),
                        received,
                    })
                }
                Ok(n) => received += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                // Read timeouts surface as either kind depending on the platform.
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Err(WireError::Timeout(self.timeout.unwrap_or_default()));
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    pub fn close(&mut self) {
        if std::mem::replace(&mut self.closed, true) {
            return;
        }

        shutdown(self.stream.get_ref(), Shutdown::Read);
    }
}

impl ConnectionWriter {
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        if self.closed {
            return Err(WireError::ConnectionClosed);
        }

        self.stream.write_all(bytes)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), WireError> {
        if self.closed {
            return Err(WireError::ConnectionClosed);
        }

        self.stream.flush()?;
        Ok(())
    }

    pub fn close(&mut self) {
        if std::mem::replace(&mut self.closed, true) {
            return;
        }

        if let Err(e) = self.stream.flush() {
            log::debug!("dropping unsent bytes on close: {e}");
        }
        shutdown(self.stream.get_ref(), Shutdown::Write);
    }
}

impl Drop for ConnectionReader {
    fn drop(&mut self) {
        self.close();
    }
}

impl Drop for ConnectionWriter {
    fn drop(&mut self) {
        self.close();
    }
}

fn shutdown(stream: &TcpStream, how: Shutdown) {
    match stream.shutdown(how) {
        Ok(()) => {}
        // The peer already tore the socket down.
        Err(e) if e.kind() == io::ErrorKind::NotConnected => {}
        Err(e) => log::debug!("socket shutdown ({how:?}) failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::net::TcpListener;

    fn pair() -> (Connection, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let connection = Connection::connect(listener.local_addr().unwrap()).unwrap();
        let (peer, _) = listener.accept().unwrap();
        (connection, peer)
    }

    #[test]
    fn reads_exactly_the_requested_bytes() {
        let (mut connection, mut peer) = pair();
        peer.write_all(&[1, 2, 3, 4, 5]).unwrap();

        assert_eq!(connection.read(2).unwrap(), vec![1, 2]);
        assert_eq!(connection.read_array::<3>().unwrap(), [3, 4, 5]);
    }

    #[test]
    fn closure_before_any_byte_is_connection_closed() {
        let (mut connection, peer) = pair();
        drop(peer);

        assert!(matches!(
            connection.read_array::<12>(),
            Err(WireError::ConnectionClosed)
        ));
    }

    #[test]
    fn closure_mid_frame_is_malformed_input() {
        let (mut connection, mut peer) = pair();
        peer.write_all(&[0; 8]).unwrap();
        drop(peer);

        assert!(matches!(
            connection.read_array::<12>(),
            Err(WireError::MalformedInput {
                expected: 12,
                received: 8
            })
        ));
    }

    #[test]
    fn writes_reach_the_peer_after_flush() {
        let (mut connection, mut peer) = pair();
        connection.write(&[7, 8]).unwrap();
        connection.write(&[9]).unwrap();
        connection.flush().unwrap();

        let mut received = [0; 3];
        peer.read_exact(&mut received).unwrap();
        assert_eq!(received, [7, 8, 9]);
    }

    #[test]
    fn read_timeout_is_reported() {
        let (mut connection, _peer) = pair();
        let timeout = Duration::from_millis(50);
        connection.set_read_timeout(Some(timeout)).unwrap();

        match connection.read_array::<1>() {
            Err(WireError::Timeout(t)) => assert_eq!(t, timeout),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }

    #[test]
    fn close_is_idempotent_and_signals_the_peer() {
        let (mut connection, mut peer) = pair();
        connection.close();
        connection.close();

        let mut buf = [0; 1];
        assert_eq!(peer.read(&mut buf).unwrap(), 0);
        assert!(matches!(
            connection.write(&[1]),
            Err(WireError::ConnectionClosed)
        ));
        assert!(matches!(
            connection.read_array::<1>(),
            Err(WireError::ConnectionClosed)
        ));
    }

    #[test]
    fn split_halves_work_independently() {
        let (connection, mut peer) = pair();
        let (mut reader, mut writer) = connection.into_split();

        writer.write(&[42]).unwrap();
        writer.flush().unwrap();
        let mut echoed = [0; 1];
        peer.read_exact(&mut echoed).unwrap();
        peer.write_all(&echoed).unwrap();

        assert_eq!(reader.read_array::<1>().unwrap(), [42]);
    }
}
