//! Banner Widget Library
//!
//! An auto-advancing, infinitely looping image carousel with a page dot
//! indicator.
//!
//! # Architecture
//!
//! The carousel is layered leaf first:
//!
//! 1. **Dot Indicator**: a row of dots, one of them selected.
//!
//! 2. **Pager + Provider**: the [`Pager`] keeps a window of page surfaces
//!    alive in its [`PageContainer`]; the [`CarouselPageProvider`] maps the
//!    unbounded virtual position space onto the image list by modulo and
//!    caches surfaces by position through generational [`PageId`] handles.
//!
//! 3. **Auto-Advance Timer**: a one-shot tick on the platform looper that the
//!    page re-arms after every advance.
//!
//! 4. **Scroll Page**: the composition root. It owns the pager, timer and
//!    image list, gates polling on attach state, lifecycle and touch, and
//!    reports every selection change to the indicator and listeners.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use banner_platform::Looper;
//! use banner_widgets::prelude::*;
//!
//! let looper = Looper::new();
//! let page = ScrollPage::new(looper.clone(), ScrollPageConfig::default()).unwrap();
//! page.set_image_loader(Some(|surface: &mut PageSurface, url: &str| {
//!     surface.set_image_url(url)
//! }));
//! page.attach_indicator(DotIndicator::new(DotIndicatorConfig::default()));
//! page.set_images(["a.png", "b.png", "c.png"]);
//!
//! looper.advance_by(Duration::from_secs(10));
//! assert_eq!(page.real_position(), Some(2));
//! assert_eq!(page.with_indicator(|dots| dots.selected_index()), Some(Some(2)));
//! ```

mod config;
mod container;
mod dot_indicator;
mod error;
mod listener;
mod pager;
mod provider;
mod scroll_page;
mod surface;
mod timer;

#[cfg(test)]
mod tests;

pub use config::{DotIndicatorConfig, ScrollPageConfig, MAX_OFFSCREEN_PAGE_LIMIT};
pub use container::{PageContainer, PageId, PendingLoad};
pub use dot_indicator::{DotIndicator, DotView};
pub use error::{Result, WidgetError};
pub use listener::{ImageLoader, Listeners, OnItemClickedListener, OnItemSelectedListener};
pub use pager::{PageChange, Pager, PagerAdapter, PagerGesture};
pub use provider::{CarouselPageProvider, INFINITE_PAGE_COUNT};
pub use scroll_page::{ScrollPage, SelectionEvent};
pub use surface::{ClickHandler, PageSurface, ScaleType, SurfaceContent};
pub use timer::{AutoAdvanceTimer, TimerState, DEFAULT_INTERVAL};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::{DotIndicatorConfig, ScrollPageConfig};
    pub use crate::dot_indicator::DotIndicator;
    pub use crate::listener::{ImageLoader, OnItemClickedListener, OnItemSelectedListener};
    pub use crate::scroll_page::{ScrollPage, SelectionEvent};
    pub use crate::surface::PageSurface;
    pub use crate::timer::TimerState;
}
