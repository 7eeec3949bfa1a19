//! Lifecycle owner and observer registry
//!
//! A [`Lifecycle`] tracks the state of the screen hosting some widgets and
//! fans state changes out to registered observers. Observers are held
//! weakly: a widget that goes away simply stops receiving events.
//!
//! Observers registered late are brought up to the current state by
//! replaying the missed "up" events, so every observer sees the same event
//! sequence regardless of when it subscribed.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

use crate::error::{PlatformError, Result};
use crate::event::{LifecycleEvent, LifecycleState};

new_key_type! {
    /// Handle to a registered lifecycle observer
    pub struct ObserverId;
}

/// Receives lifecycle events from a [`Lifecycle`]
pub trait LifecycleObserver {
    /// Called after the lifecycle moved because of `event`
    ///
    /// `lifecycle.current_state()` already reflects the new state. Observers
    /// may add or remove observers (including themselves) from here.
    fn on_state_changed(&self, lifecycle: &Lifecycle, event: LifecycleEvent);
}

struct LifecycleInner {
    state: LifecycleState,
    observers: SlotMap<ObserverId, Weak<dyn LifecycleObserver>>,
}

/// Shared handle to a host lifecycle
#[derive(Clone)]
pub struct Lifecycle {
    inner: Rc<RefCell<LifecycleInner>>,
}

impl Lifecycle {
    /// Create a lifecycle in the `Initialized` state
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(LifecycleInner {
                state: LifecycleState::Initialized,
                observers: SlotMap::with_key(),
            })),
        }
    }

    /// Current state
    pub fn current_state(&self) -> LifecycleState {
        self.inner.borrow().state
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.inner
            .borrow()
            .observers
            .values()
            .filter(|observer| observer.strong_count() > 0)
            .count()
    }

    /// Register an observer and replay the events it missed
    ///
    /// Nothing is replayed to observers added after `Destroyed`.
    pub fn add_observer(&self, observer: Weak<dyn LifecycleObserver>) -> ObserverId {
        let (id, current) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.observers.insert(observer.clone());
            (id, inner.state)
        };

        let mut replay = LifecycleState::Initialized;
        while replay < current {
            let Some(event) = LifecycleEvent::up_from(replay) else {
                break;
            };
            // Stop replaying if the observer removed itself along the way
            if !self.inner.borrow().observers.contains_key(id) {
                break;
            }
            let Some(observer) = observer.upgrade() else {
                break;
            };
            observer.on_state_changed(self, event);
            replay = event.target_state().unwrap_or(current);
        }

        tracing::debug!("lifecycle: observer {:?} added in {}", id, current.name());
        id
    }

    /// Unregister an observer; returns false if it was not registered
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        let removed = self.inner.borrow_mut().observers.remove(id).is_some();
        if removed {
            tracing::debug!("lifecycle: observer {:?} removed", id);
        }
        removed
    }

    /// Apply one lifecycle event and notify observers
    ///
    /// State events must start from their source state; `LowMemory` is
    /// accepted in any state except `Destroyed` and does not move the state.
    pub fn handle_event(&self, event: LifecycleEvent) -> Result<()> {
        {
            let mut inner = self.inner.borrow_mut();
            let from = inner.state;
            if from == LifecycleState::Destroyed {
                return Err(PlatformError::InvalidTransition {
                    from: from.name(),
                    to: event
                        .target_state()
                        .map_or("low-memory", LifecycleState::name),
                });
            }
            if let (Some(source), Some(target)) = (event.source_state(), event.target_state()) {
                if source != from {
                    return Err(PlatformError::InvalidTransition {
                        from: from.name(),
                        to: target.name(),
                    });
                }
                inner.state = target;
            }
        }

        tracing::debug!("lifecycle: {:?} -> {}", event, self.current_state().name());
        self.dispatch(event);
        Ok(())
    }

    /// Walk the lifecycle to `target`, emitting each intermediate event
    pub fn move_to_state(&self, target: LifecycleState) -> Result<()> {
        loop {
            let current = self.current_state();
            let step = if current < target {
                LifecycleEvent::up_from(current)
            } else if current > target {
                LifecycleEvent::down_from(current)
            } else {
                return Ok(());
            };
            match step {
                Some(event) => self.handle_event(event)?,
                None => {
                    return Err(PlatformError::InvalidTransition {
                        from: current.name(),
                        to: target.name(),
                    })
                }
            }
        }
    }

    fn dispatch(&self, event: LifecycleEvent) {
        // Snapshot first: observers may (un)register while being notified
        let snapshot: Vec<(ObserverId, Weak<dyn LifecycleObserver>)> = {
            let mut inner = self.inner.borrow_mut();
            inner.observers.retain(|_, observer| observer.strong_count() > 0);
            inner
                .observers
                .iter()
                .map(|(id, observer)| (id, observer.clone()))
                .collect()
        };

        for (id, observer) in snapshot {
            if !self.inner.borrow().observers.contains_key(id) {
                continue;
            }
            if let Some(observer) = observer.upgrade() {
                observer.on_state_changed(self, event);
            }
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Lifecycle")
            .field("state", &inner.state)
            .field("observers", &inner.observers.len())
            .finish()
    }
}
