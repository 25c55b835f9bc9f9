use crate::aim::Aim;
use crate::dispatcher::{DispatchError, QueryDispatcher, TriggerOutcome};
use crate::input::{Trigger, TriggerSource};
use crate::presenter::{LastResult, ResultPresenter};
use std::time::{Duration, Instant};

pub trait FrameClock {
    /// Monotonic time since the clock started.
    fn elapsed(&self) -> Duration;
}

pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for MonotonicClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Where the per-frame result ends up.
pub trait TextSink {
    fn show(&mut self, result: Option<LastResult>);
}

/// Prints every newly recorded result once, even when its label matches the
/// one already on screen.
#[derive(Default)]
pub struct ConsoleSink {
    shown: Option<LastResult>,
}

impl TextSink for ConsoleSink {
    fn show(&mut self, result: Option<LastResult>) {
        if result == self.shown {
            return;
        }

        match result {
            Some(result) => println!("{}", ResultPresenter::label(result.hit)),
            None => log::debug!("result expired"),
        }
        self.shown = result;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Finished,
}

pub struct FrameLoop<T, C, S> {
    pub aim: Aim,
    dispatcher: QueryDispatcher,
    presenter: ResultPresenter,
    trigger: T,
    clock: C,
    sink: S,
    /// Block on each round trip instead of polling it across frames.
    blocking: bool,
    trigger_exhausted: bool,
    frames: u64,
}

impl<T: TriggerSource, C: FrameClock, S: TextSink> FrameLoop<T, C, S> {
    pub fn new(
        aim: Aim,
        dispatcher: QueryDispatcher,
        presenter: ResultPresenter,
        trigger: T,
        clock: C,
        sink: S,
    ) -> Self {
        Self {
            aim,
            dispatcher,
            presenter,
            trigger,
            clock,
            sink,
            blocking: false,
            trigger_exhausted: false,
            frames: 0,
        }
    }

    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn dispatcher(&self) -> &QueryDispatcher {
        &self.dispatcher
    }

    pub fn presenter(&self) -> &ResultPresenter {
        &self.presenter
    }

    /// Runs a single frame. Finishes once the trigger source is exhausted and
    /// no round trip is pending anymore.
    pub fn frame(&mut self) -> Result<FrameStatus, DispatchError> {
        let now = self.clock.elapsed();

        if !self.trigger_exhausted {
            match self.trigger.poll(now) {
                Trigger::Pressed => {
                    let outcome = self.dispatcher.trigger(self.aim.query())?;
                    if outcome == TriggerOutcome::Dispatched && self.blocking {
                        self.dispatcher.wait(&self.clock, &mut self.presenter)?;
                    }
                }
                Trigger::Idle => {}
                Trigger::Exhausted => self.trigger_exhausted = true,
            }
        }

        self.dispatcher.tick(now, &mut self.presenter)?;

        self.presenter.update(self.clock.elapsed());
        self.sink.show(self.presenter.current());
        self.frames += 1;

        if self.trigger_exhausted && !self.dispatcher.is_in_flight() {
            Ok(FrameStatus::Finished)
        } else {
            Ok(FrameStatus::Continue)
        }
    }

    /// Runs frames at a fixed period until the loop finishes, `max_frames`
    /// is reached, or a dispatch fails. Returns the number of frames run.
    pub fn run(&mut self, period: Duration, max_frames: Option<u64>) -> Result<u64, DispatchError> {
        loop {
            let started = Instant::now();

            if self.frame()? == FrameStatus::Finished {
                break;
            }
            if max_frames.is_some_and(|max| self.frames >= max) {
                break;
            }

            if let Some(rest) = period.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }

        Ok(self.frames)
    }
}
