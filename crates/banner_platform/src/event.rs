//! Host lifecycle events and states

/// Lifecycle states of the screen hosting a widget
///
/// Ordered: a state compares greater than every state it has to pass
/// through on the way up (`Destroyed < Initialized < ... < Resumed`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    /// Torn down, no further events are delivered
    Destroyed,
    /// Constructed but not yet created
    Initialized,
    /// Created, or stopped after having been started
    Created,
    /// Visible, or paused after having been resumed
    Started,
    /// In the foreground and interactive
    Resumed,
}

impl LifecycleState {
    /// Stable name used in logs and errors
    pub fn name(self) -> &'static str {
        match self {
            LifecycleState::Destroyed => "destroyed",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Created => "created",
            LifecycleState::Started => "started",
            LifecycleState::Resumed => "resumed",
        }
    }

    /// Whether the host is at least in `state`
    pub fn is_at_least(self, state: LifecycleState) -> bool {
        self >= state
    }
}

/// Application lifecycle events
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Host was created
    Created,
    /// Host became visible
    Started,
    /// Host came to the foreground
    Resumed,
    /// Host left the foreground
    Paused,
    /// Host is no longer visible
    Stopped,
    /// Host was destroyed
    Destroyed,
    /// System is low on memory - release caches if possible
    LowMemory,
}

impl LifecycleEvent {
    /// The state an event moves the lifecycle into (None for `LowMemory`)
    pub fn target_state(self) -> Option<LifecycleState> {
        match self {
            LifecycleEvent::Created | LifecycleEvent::Stopped => Some(LifecycleState::Created),
            LifecycleEvent::Started | LifecycleEvent::Paused => Some(LifecycleState::Started),
            LifecycleEvent::Resumed => Some(LifecycleState::Resumed),
            LifecycleEvent::Destroyed => Some(LifecycleState::Destroyed),
            LifecycleEvent::LowMemory => None,
        }
    }

    /// The state the lifecycle must be in for this event to apply
    pub fn source_state(self) -> Option<LifecycleState> {
        match self {
            LifecycleEvent::Created => Some(LifecycleState::Initialized),
            LifecycleEvent::Started | LifecycleEvent::Destroyed => Some(LifecycleState::Created),
            LifecycleEvent::Resumed | LifecycleEvent::Stopped => Some(LifecycleState::Started),
            LifecycleEvent::Paused => Some(LifecycleState::Resumed),
            LifecycleEvent::LowMemory => None,
        }
    }

    /// Event that moves one step up from `state`
    pub fn up_from(state: LifecycleState) -> Option<LifecycleEvent> {
        match state {
            LifecycleState::Initialized => Some(LifecycleEvent::Created),
            LifecycleState::Created => Some(LifecycleEvent::Started),
            LifecycleState::Started => Some(LifecycleEvent::Resumed),
            LifecycleState::Resumed | LifecycleState::Destroyed => None,
        }
    }

    /// Event that moves one step down from `state`
    pub fn down_from(state: LifecycleState) -> Option<LifecycleEvent> {
        match state {
            LifecycleState::Resumed => Some(LifecycleEvent::Paused),
            LifecycleState::Started => Some(LifecycleEvent::Stopped),
            LifecycleState::Created => Some(LifecycleEvent::Destroyed),
            LifecycleState::Initialized | LifecycleState::Destroyed => None,
        }
    }
}
