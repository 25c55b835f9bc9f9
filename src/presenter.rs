use std::time::Duration;

pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(2);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LastResult {
    pub hit: bool,
    pub recorded_at: Duration,
}

/// Holds the latest raycast result until it expires.
///
/// Written by the dispatcher when a round trip completes and read on every
/// frame, both from the frame thread.
#[derive(Clone, Debug)]
pub struct ResultPresenter {
    last: Option<LastResult>,
    expiry: Duration,
}

impl Default for ResultPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRY)
    }
}

impl ResultPresenter {
    pub fn new(expiry: Duration) -> Self {
        Self { last: None, expiry }
    }

    pub fn record(&mut self, hit: bool, now: Duration) {
        self.last = Some(LastResult {
            hit,
            recorded_at: now,
        });
    }

    /// Drops the result once strictly more than the expiry window has passed,
    /// then returns what should be displayed.
    pub fn update(&mut self, now: Duration) -> Option<bool> {
        if let Some(last) = self.last {
            if now.saturating_sub(last.recorded_at) > self.expiry {
                self.last = None;
            }
        }

        self.last.map(|last| last.hit)
    }

    pub fn current(&self) -> Option<LastResult> {
        self.last
    }

    pub fn label(hit: bool) -> &'static str {
        if hit {
            "Hit!"
        } else {
            "Miss..."
        }
    }
}
