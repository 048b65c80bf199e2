use gloo_timers::callback::Interval;
use yew::Callback;

use crate::config::TICK_MILLIS;

/// Whether the one-second tick should be running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Countdown {
    Idle,
    Active,
}

impl Countdown {
    pub fn evaluate(is_playing: bool, seconds_remaining: u32) -> Self {
        if is_playing && seconds_remaining > 0 {
            Countdown::Active
        } else {
            Countdown::Idle
        }
    }
}

/// Holds at most one live tick source. Any previous source is dropped
/// (and therefore cancelled) before a new one is started.
pub struct TickSlot<H> {
    active: Option<H>,
}

impl<H> TickSlot<H> {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Brings the slot in line with `countdown`, starting a fresh source
    /// through `start` only when the driver is active.
    pub fn sync<F>(&mut self, countdown: Countdown, start: F)
    where
        F: FnOnce() -> H,
    {
        self.cancel();
        if countdown == Countdown::Active {
            self.active = Some(start());
        }
    }

    /// Returns true if a running source was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }
}

impl<H> Default for TickSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn start_ticking(on_tick: Callback<()>) -> Interval {
    Interval::new(TICK_MILLIS, move || on_tick.emit(()))
}
