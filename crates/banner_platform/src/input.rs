//! Touch input events

// ============================================================================
// Touch Events
// ============================================================================

/// Coarse phase of a touch event, the way a host view sees its action mask
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    /// First finger went down
    Down,
    /// Finger moved while down
    Move,
    /// Finger lifted
    Up,
    /// The system took the gesture away
    Cancel,
}

/// One step of a touch stream delivered to a view
#[derive(Clone, Debug, PartialEq)]
pub enum TouchEvent {
    /// Finger down at a position
    Started {
        /// Pointer id, stable for the whole stream
        id: u64,
        /// X position in view coordinates
        x: f32,
        /// Y position in view coordinates
        y: f32,
    },
    /// Finger moved while down
    Moved {
        /// Pointer id, stable for the whole stream
        id: u64,
        /// X position in view coordinates
        x: f32,
        /// Y position in view coordinates
        y: f32,
    },
    /// Finger lifted
    Ended {
        /// Pointer id, stable for the whole stream
        id: u64,
        /// X position where the finger lifted
        x: f32,
        /// Y position where the finger lifted
        y: f32,
    },
    /// A touch was cancelled (e.g., by a parent intercepting the gesture)
    Cancelled {
        /// Pointer id, stable for the whole stream
        id: u64,
    },
}

impl TouchEvent {
    /// Pointer id of the stream
    pub fn id(&self) -> u64 {
        match *self {
            TouchEvent::Started { id, .. }
            | TouchEvent::Moved { id, .. }
            | TouchEvent::Ended { id, .. }
            | TouchEvent::Cancelled { id } => id,
        }
    }

    /// Position carried by the event; cancellations carry none
    pub fn position(&self) -> Option<(f32, f32)> {
        match *self {
            TouchEvent::Started { x, y, .. }
            | TouchEvent::Moved { x, y, .. }
            | TouchEvent::Ended { x, y, .. } => Some((x, y)),
            TouchEvent::Cancelled { .. } => None,
        }
    }

    /// Get the coarse phase of this event
    pub fn phase(&self) -> TouchPhase {
        match self {
            TouchEvent::Started { .. } => TouchPhase::Down,
            TouchEvent::Moved { .. } => TouchPhase::Move,
            TouchEvent::Ended { .. } => TouchPhase::Up,
            TouchEvent::Cancelled { .. } => TouchPhase::Cancel,
        }
    }

    /// Whether this event ends the gesture (lift or cancel)
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase(), TouchPhase::Up | TouchPhase::Cancel)
    }
}
