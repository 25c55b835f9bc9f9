use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::request_loop;
use crate::service::RaycastService;
use raylink_api_types::{protocol, Connection};
use std::convert::Infallible;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

pub struct Acceptor {
    listener: TcpListener,
    config: ServerConfig,
    active: Arc<AtomicUsize>,
}

/// Marks a connection as active for as long as it is alive.
struct ConnectionPermit(Arc<AtomicUsize>);

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Acceptor {
    pub fn bind(config: &ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((config.address.as_str(), config.port)).map_err(
            |source| ServerError::Bind {
                address: config.bind_address(),
                source,
            },
        )?;

        Ok(Self {
            listener,
            config: config.clone(),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(|source| ServerError::Bind {
                address: self.config.bind_address(),
                source,
            })
    }

    /// Accepts clients forever, calling `on_connected` exactly once per
    /// admitted connection on a dedicated thread. Only returns on a fatal
    /// accept error.
    pub fn run<F>(self, on_connected: F) -> Result<Infallible, ServerError>
    where
        F: Fn(Connection) + Send + Sync + 'static,
    {
        let on_connected = Arc::new(on_connected);
        log::info!("server listening on {}", self.local_addr()?);

        loop {
            let (stream, peer) = match self.listener.accept() {
                Ok(accepted) => accepted,
                Err(e) if is_transient(&e) => {
                    log::warn!("ignoring failed connection attempt: {e}");
                    continue;
                }
                Err(e) => return Err(ServerError::Accept(e)),
            };

            let Some(permit) = self.admit() else {
                log::warn!("rejecting {peer}: a client is already connected");
                reject(stream);
                continue;
            };

            let on_connected = on_connected.clone();
            let send_ack = self.config.send_ack;
            let spawned = std::thread::Builder::new()
                .name(format!("raylink-{peer}"))
                .spawn(move || {
                    let _permit = permit;
                    match open(stream, send_ack) {
                        Ok(connection) => on_connected(connection),
                        Err(e) => log::warn!("dropping {peer} during handshake: {e}"),
                    }
                });

            if let Err(e) = spawned {
                log::error!("unable to spawn a handler for {peer}: {e}");
            }
        }
    }

    fn admit(&self) -> Option<ConnectionPermit> {
        if self.config.allow_multiple_connections {
            self.active.fetch_add(1, Ordering::AcqRel);
        } else if self
            .active
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }

        Some(ConnectionPermit(self.active.clone()))
    }
}

fn open(stream: TcpStream, send_ack: bool) -> Result<Connection, ServerError> {
    let mut connection = Connection::new(stream)?;
    if send_ack {
        protocol::send_ack(&mut connection)?;
    }
    Ok(connection)
}

fn reject(stream: TcpStream) {
    if let Err(e) = stream.shutdown(std::net::Shutdown::Both) {
        log::debug!("rejected socket was already closed: {e}");
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}

/// Binds and serves `service` on the calling thread. Never returns unless
/// binding or accepting fails.
pub fn start_server(
    config: &ServerConfig,
    service: Arc<dyn RaycastService>,
) -> Result<Infallible, ServerError> {
    Acceptor::bind(config)?.run(move |connection| {
        request_loop::serve(connection, service.as_ref());
    })
}

/// Binds on the calling thread, then serves from a background thread.
pub fn spawn_server(
    config: &ServerConfig,
    service: Arc<dyn RaycastService>,
) -> Result<(SocketAddr, JoinHandle<Result<Infallible, ServerError>>), ServerError> {
    let acceptor = Acceptor::bind(config)?;
    let address = acceptor.local_addr()?;
    let handle = std::thread::spawn(move || {
        acceptor.run(move |connection| {
            request_loop::serve(connection, service.as_ref());
        })
    });

    Ok((address, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn bind_failure_is_reported_with_the_address() {
        let first = Acceptor::bind(&ServerConfig::ephemeral()).unwrap();
        let taken = ServerConfig {
            port: first.local_addr().unwrap().port(),
            ..ServerConfig::ephemeral()
        };

        match Acceptor::bind(&taken) {
            Err(ServerError::Bind { address, .. }) => assert_eq!(address, taken.bind_address()),
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("binding the same port twice succeeded"),
        }
    }

    #[test]
    fn every_connection_reaches_the_callback_once() {
        let acceptor = Acceptor::bind(&ServerConfig::ephemeral()).unwrap();
        let address = acceptor.local_addr().unwrap();
        let (snd, rcv) = flume::unbounded();
        std::thread::spawn(move || {
            acceptor.run(move |connection| {
                let _ = snd.send(connection.peer_addr());
            })
        });

        let a = TcpStream::connect(address).unwrap();
        let b = TcpStream::connect(address).unwrap();
        let mut seen = vec![
            rcv.recv_timeout(Duration::from_secs(5)).unwrap(),
            rcv.recv_timeout(Duration::from_secs(5)).unwrap(),
        ];
        seen.sort();
        let mut expected = vec![a.local_addr().unwrap(), b.local_addr().unwrap()];
        expected.sort();

        assert_eq!(seen, expected);
        assert!(rcv.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn single_connection_mode_admits_one_client_at_a_time() {
        let config = ServerConfig {
            allow_multiple_connections: false,
            ..ServerConfig::ephemeral()
        };
        let acceptor = Acceptor::bind(&config).unwrap();

        let first = acceptor.admit();
        assert!(first.is_some());
        assert!(acceptor.admit().is_none());

        drop(first);
        assert!(acceptor.admit().is_some());
    }
}
