use flume::{Receiver, TryRecvError};
use std::io::BufRead;
use std::time::Duration;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    Idle,
    Pressed,
    /// No trigger will ever fire again.
    Exhausted,
}

/// Sampled once per frame.
pub trait TriggerSource {
    fn poll(&mut self, now: Duration) -> Trigger;
}

impl<T: TriggerSource + ?Sized> TriggerSource for Box<T> {
    fn poll(&mut self, now: Duration) -> Trigger {
        (**self).poll(now)
    }
}

/// Every line typed on stdin counts as one press. Several lines arriving
/// within the same frame collapse into a single press.
pub struct StdinTrigger {
    lines: Receiver<()>,
}

impl StdinTrigger {
    pub fn spawn() -> Self {
        let (snd, rcv) = flume::unbounded();

        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if let Err(e) = line {
                    log::warn!("stopped reading stdin: {e}");
                    break;
                }
                if snd.send(()).is_err() {
                    break;
                }
            }
        });

        Self::from_receiver(rcv)
    }

    pub fn from_receiver(lines: Receiver<()>) -> Self {
        Self { lines }
    }
}

impl TriggerSource for StdinTrigger {
    fn poll(&mut self, _now: Duration) -> Trigger {
        let mut pressed = false;

        loop {
            match self.lines.try_recv() {
                Ok(()) => pressed = true,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) if pressed => break,
                Err(TryRecvError::Disconnected) => return Trigger::Exhausted,
            }
        }

        if pressed {
            Trigger::Pressed
        } else {
            Trigger::Idle
        }
    }
}

/// Fires on the first poll, then every `every` afterwards.
pub struct IntervalTrigger {
    every: Duration,
    next_due: Duration,
}

impl IntervalTrigger {
    pub fn new(every: Duration) -> Self {
        Self {
            every,
            next_due: Duration::ZERO,
        }
    }
}

impl TriggerSource for IntervalTrigger {
    fn poll(&mut self, now: Duration) -> Trigger {
        if now < self.next_due {
            return Trigger::Idle;
        }

        self.next_due = now + self.every;
        Trigger::Pressed
    }
}
