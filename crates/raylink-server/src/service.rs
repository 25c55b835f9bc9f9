use raylink_api_types::RaycastQuery;
use thiserror::Error;

/// The spatial backend could not answer. Never reported to clients as a miss.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("the scene has not been loaded yet")]
    SceneNotLoaded,
    #[error("the scene lock was poisoned by a panicking writer")]
    Poisoned,
}

/// Answers raycast queries against the authoritative world.
///
/// Implementations are shared by every connection, so `raycast` may be called
/// concurrently from several request loops.
pub trait RaycastService: Send + Sync {
    fn raycast(&self, query: &RaycastQuery) -> Result<bool, BackendError>;
}
