//! Per-connection request processing.
//!
//! A connection alternates between waiting for a 24-byte query and answering
//! it with a single byte. The first failure, or the client hanging up, closes
//! the connection and ends the loop. Sibling connections are unaffected.

use crate::error::ServerError;
use crate::service::RaycastService;
use raylink_api_types::protocol;
use raylink_api_types::{Connection, RaycastQuery, WireError};
use std::net::SocketAddr;

#[derive(Debug)]
pub enum LoopOutcome {
    /// The client closed the stream between two queries.
    PeerClosed,
    Failed(ServerError),
}

#[derive(Debug)]
pub struct ConnectionSummary {
    pub peer: SocketAddr,
    pub queries_served: u64,
    pub outcome: LoopOutcome,
}

enum LoopState {
    AwaitingQuery,
    Processing(RaycastQuery),
    Closed(LoopOutcome),
}

/// Serves `connection` until it closes. The connection is shut down before
/// this returns, whatever the outcome.
pub fn serve(mut connection: Connection, service: &dyn RaycastService) -> ConnectionSummary {
    let peer = connection.peer_addr();
    let mut queries_served = 0;
    let mut state = LoopState::AwaitingQuery;

    log::info!("client connected: {peer}");

    let outcome = loop {
        state = match state {
            LoopState::AwaitingQuery => match protocol::read_query(&mut connection) {
                Ok(query) => LoopState::Processing(query),
                Err(WireError::ConnectionClosed) => LoopState::Closed(LoopOutcome::PeerClosed),
                Err(e) => LoopState::Closed(LoopOutcome::Failed(e.into())),
            },
            LoopState::Processing(query) => match answer(&mut connection, service, &query) {
                Ok(hit) => {
                    queries_served += 1;
                    log::debug!(
                        "performing raycast for {peer}: {}",
                        if hit { "hit" } else { "miss" }
                    );
                    LoopState::AwaitingQuery
                }
                Err(e) => LoopState::Closed(LoopOutcome::Failed(e)),
            },
            LoopState::Closed(outcome) => break outcome,
        };
    };

    connection.close();

    match &outcome {
        LoopOutcome::PeerClosed => {
            log::info!("client disconnected: {peer} ({queries_served} queries served)")
        }
        LoopOutcome::Failed(ServerError::Wire(e)) if e.is_disconnect() => {
            log::warn!("client {peer} dropped after {queries_served} queries: {e}")
        }
        LoopOutcome::Failed(e) => {
            log::error!("closing connection to {peer} after {queries_served} queries: {e}")
        }
    }

    ConnectionSummary {
        peer,
        queries_served,
        outcome,
    }
}

fn answer(
    connection: &mut Connection,
    service: &dyn RaycastService,
    query: &RaycastQuery,
) -> Result<bool, ServerError> {
    let hit = service.raycast(query)?;
    protocol::write_result(connection, hit)?;
    Ok(hit)
}
