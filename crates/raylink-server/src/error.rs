use crate::scene::SceneError;
use crate::service::BackendError;
use raylink_api_types::WireError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Fatal: the listening socket could not be created.
    #[error("unable to bind {address}: {source}")]
    Bind { address: String, source: io::Error },

    /// Fatal: the listener stopped accepting connections.
    #[error("unable to accept connections: {0}")]
    Accept(#[source] io::Error),

    #[error("raycast backend failure: {0}")]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}
