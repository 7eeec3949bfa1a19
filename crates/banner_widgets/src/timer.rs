//! Auto-advance timer - a re-armed one-shot tick on the looper
//!
//! The timer never repeats on its own. Each [`AutoAdvanceTimer::start`]
//! posts exactly one delayed message; the tick handler is expected to
//! advance the carousel and call `start` again.
//!
//! ```text
//!          start()                 interval elapses
//!   Idle ──────────► Armed ───────────────────────► (tick) ──► Idle
//!    ▲                 │                                │
//!    └──── stop() ─────┘            handler re-arms ────┘
//! ```
//!
//! The tick handler holds its target weakly. Once the target is gone a
//! delivered tick does nothing and nothing is rescheduled.

use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use banner_platform::{Looper, MessageId};

/// Interval used when none is configured
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Whether a tick is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No tick is scheduled
    Idle,
    /// Exactly one tick is scheduled
    Armed,
}

type TickHandler = Rc<dyn Fn()>;

/// Single-shot delayed tick that its handler re-arms
pub struct AutoAdvanceTimer {
    looper: Looper,
    interval: Duration,
    pending: Option<MessageId>,
    on_tick: Option<TickHandler>,
}

impl AutoAdvanceTimer {
    /// Create an idle timer on `looper`
    pub fn new(looper: Looper, interval: Duration) -> Self {
        Self {
            looper,
            interval,
            pending: None,
            on_tick: None,
        }
    }

    /// Run `handler` with `target` on each tick, as long as `target` lives
    pub fn bind<T, F>(&mut self, target: Weak<T>, handler: F)
    where
        T: 'static,
        F: Fn(&Rc<T>) + 'static,
    {
        self.on_tick = Some(Rc::new(move || match target.upgrade() {
            Some(target) => handler(&target),
            None => tracing::trace!("auto-advance: tick target dropped, ignoring"),
        }));
    }

    /// Current state
    ///
    /// A delivered tick no longer counts as pending, so the timer reads as
    /// idle from the moment its tick runs.
    pub fn state(&self) -> TimerState {
        match self.pending {
            Some(id) if self.looper.is_pending(id) => TimerState::Armed,
            _ => TimerState::Idle,
        }
    }

    /// Whether a tick is pending
    pub fn is_armed(&self) -> bool {
        self.state() == TimerState::Armed
    }

    /// Schedule one tick after the interval unless one is already pending
    ///
    /// Returns true if a tick was scheduled.
    pub fn start(&mut self) -> bool {
        if self.is_armed() {
            return false;
        }

        let on_tick = self.on_tick.clone();
        let posted = self.looper.post_delayed(self.interval, move || {
            if let Some(on_tick) = on_tick {
                on_tick();
            }
        });

        match posted {
            Ok(id) => {
                self.pending = Some(id);
                tracing::debug!("auto-advance: armed, tick in {:?}", self.interval);
                true
            }
            Err(err) => {
                self.pending = None;
                tracing::debug!("auto-advance: not armed: {}", err);
                false
            }
        }
    }

    /// Cancel the pending tick
    ///
    /// Returns true if a tick was actually cancelled.
    pub fn stop(&mut self) -> bool {
        let cancelled = self
            .pending
            .take()
            .is_some_and(|id| self.looper.remove(id));
        if cancelled {
            tracing::debug!("auto-advance: cancelled");
        }
        cancelled
    }

    /// Delay between ticks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the delay; takes effect from the next `start`
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Looper the ticks run on
    pub fn looper(&self) -> &Looper {
        &self.looper
    }
}

impl Drop for AutoAdvanceTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for AutoAdvanceTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoAdvanceTimer")
            .field("interval", &self.interval)
            .field("state", &self.state())
            .finish()
    }
}
