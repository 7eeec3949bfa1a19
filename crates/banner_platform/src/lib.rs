//! Banner Platform Primitives
//!
//! This crate provides the host-side building blocks the banner widgets run
//! on: a single-threaded message [`Looper`], touch input events, and the
//! screen [`Lifecycle`] that widgets observe.
//!
//! # Architecture
//!
//! Everything here is confined to one UI thread. Types use `Rc`/`RefCell`
//! rather than locks and are deliberately `!Send`.
//!
//! - [`Looper`] - delayed message queue with a host-driven clock
//! - [`TouchEvent`] - touch stream fed to widgets
//! - [`Lifecycle`] - host states and weakly-held observers
//!
//! # Example
//!
//! ```rust
//! use banner_platform::prelude::*;
//!
//! let lifecycle = Lifecycle::new();
//! lifecycle.move_to_state(LifecycleState::Resumed).unwrap();
//! assert_eq!(lifecycle.current_state(), LifecycleState::Resumed);
//! ```

mod error;
mod event;
mod input;
mod lifecycle;
mod looper;

// Re-export all public types
pub use error::{PlatformError, Result};
pub use event::{LifecycleEvent, LifecycleState};
pub use input::{TouchEvent, TouchPhase};
pub use lifecycle::{Lifecycle, LifecycleObserver, ObserverId};
pub use looper::{Looper, MessageId};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{PlatformError, Result};
    pub use crate::event::{LifecycleEvent, LifecycleState};
    pub use crate::input::{TouchEvent, TouchPhase};
    pub use crate::lifecycle::{Lifecycle, LifecycleObserver, ObserverId};
    pub use crate::looper::{Looper, MessageId};
}
