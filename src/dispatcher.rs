//! Non-blocking front end to the synchronous raycast protocol.
//!
//! The connection is owned by whoever currently uses it: the dispatcher while
//! idle, a worker thread while a round trip is in flight. The worker hands it
//! back together with the result, so at most one query is ever outstanding.

use crate::frame::FrameClock;
use crate::presenter::ResultPresenter;
use flume::{Receiver, TryRecvError};
use raylink_api_types::protocol::{self, RoundTripPolicy};
use raylink_api_types::{Connection, RaycastQuery, WireError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("the connection to the server is no longer usable")]
    Disconnected,
    #[error("the round-trip worker exited without reporting a result")]
    WorkerLost,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TriggerOutcome {
    Dispatched,
    /// A round trip was already in flight; the trigger was dropped.
    Ignored,
}

struct RoundTrip {
    connection: Connection,
    result: Result<bool, WireError>,
}

enum DispatchState {
    Idle(Connection),
    InFlight(Receiver<RoundTrip>),
    Broken,
}

pub struct QueryDispatcher {
    state: DispatchState,
    policy: RoundTripPolicy,
    ignored_triggers: u64,
}

impl QueryDispatcher {
    pub fn new(connection: Connection, policy: RoundTripPolicy) -> Self {
        Self {
            state: DispatchState::Idle(connection),
            policy,
            ignored_triggers: 0,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, DispatchState::InFlight(_))
    }

    pub fn is_broken(&self) -> bool {
        matches!(self.state, DispatchState::Broken)
    }

    pub fn ignored_triggers(&self) -> u64 {
        self.ignored_triggers
    }

    pub fn trigger(&mut self, query: RaycastQuery) -> Result<TriggerOutcome, DispatchError> {
        match std::mem::replace(&mut self.state, DispatchState::Broken) {
            DispatchState::Idle(mut connection) => {
                let (snd, rcv) = flume::bounded(1);
                let policy = self.policy;

                std::thread::Builder::new()
                    .name("raylink-round-trip".to_string())
                    .spawn(move || {
                        let result = protocol::round_trip(&mut connection, &query, policy);
                        // The dispatcher may have been dropped meanwhile.
                        let _ = snd.send(RoundTrip { connection, result });
                    })
                    .map_err(|e| {
                        log::error!("unable to spawn the round-trip worker: {e}");
                        DispatchError::WorkerLost
                    })?;

                self.state = DispatchState::InFlight(rcv);
                Ok(TriggerOutcome::Dispatched)
            }
            DispatchState::InFlight(rcv) => {
                self.state = DispatchState::InFlight(rcv);
                self.ignored_triggers += 1;
                log::debug!("query already in flight, ignoring trigger");
                Ok(TriggerOutcome::Ignored)
            }
            DispatchState::Broken => Err(DispatchError::Disconnected),
        }
    }

    /// Collects the in-flight result if it is ready. Returns `Ok(None)` when
    /// nothing completed during this tick.
    pub fn tick(
        &mut self,
        now: Duration,
        presenter: &mut ResultPresenter,
    ) -> Result<Option<bool>, DispatchError> {
        let DispatchState::InFlight(rcv) = &self.state else {
            return Ok(None);
        };

        match rcv.try_recv() {
            Ok(round_trip) => self.complete(round_trip, now, presenter).map(Some),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.state = DispatchState::Broken;
                Err(DispatchError::WorkerLost)
            }
        }
    }

    /// Blocks until the in-flight round trip completes, then records its
    /// result at the time it arrived.
    pub fn wait(
        &mut self,
        clock: &impl FrameClock,
        presenter: &mut ResultPresenter,
    ) -> Result<Option<bool>, DispatchError> {
        let DispatchState::InFlight(rcv) = &self.state else {
            return Ok(None);
        };

        match rcv.recv() {
            Ok(round_trip) => self
                .complete(round_trip, clock.elapsed(), presenter)
                .map(Some),
            Err(_) => {
                self.state = DispatchState::Broken;
                Err(DispatchError::WorkerLost)
            }
        }
    }

    fn complete(
        &mut self,
        round_trip: RoundTrip,
        now: Duration,
        presenter: &mut ResultPresenter,
    ) -> Result<bool, DispatchError> {
        let RoundTrip {
            mut connection,
            result,
        } = round_trip;

        match result {
            Ok(hit) => {
                presenter.record(hit, now);
                self.state = DispatchState::Idle(connection);
                Ok(hit)
            }
            Err(e) => {
                log::error!("raycast round trip to {} failed: {e}", connection.peer_addr());
                connection.close();
                self.state = DispatchState::Broken;
                Err(e.into())
            }
        }
    }
}
