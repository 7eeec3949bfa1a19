//! Scroll page - auto-advancing, infinitely looping image carousel
//!
//! [`ScrollPage`] composes a [`Pager`] fed by a [`CarouselPageProvider`], an
//! [`AutoAdvanceTimer`] and an optional [`DotIndicator`]. Every committed page
//! change (swipe, timer tick or programmatic) produces a
//! [`SelectionEvent`] with both positions already wrapped to real indices.
//!
//! # Polling
//!
//! The timer only runs while all of these hold:
//!
//! - the page is attached to a window
//! - the registered lifecycle (if any) is `Resumed`
//! - there is more than one page to show
//!
//! Touch-down pauses polling; touch-up or cancel resumes it.
//!
//! # Re-entrancy
//!
//! Listeners are invoked after all internal state has been updated and
//! released, so a listener may call back into the page (replace the image
//! list, register another listener, ...). The same holds for the image
//! loader: pages queue their loads while rendering and the loader runs after
//! the state is released, before any listener. While it runs, the surface it
//! fills is moved out of the container, so the page shows that slot as an
//! empty placeholder.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use banner_platform::Looper;
//! use banner_widgets::{ScrollPage, ScrollPageConfig};
//!
//! let looper = Looper::new();
//! let page = ScrollPage::new(looper.clone(), ScrollPageConfig::default()).unwrap();
//! page.set_item_selected_listener(Some(|prev: usize, cur: usize, count: usize| {
//!     println!("{prev} -> {cur} of {count}");
//! }));
//! page.set_images(["a.png", "b.png"]);
//!
//! looper.advance_by(Duration::from_secs(5));
//! assert_eq!(page.real_position(), Some(1));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use banner_platform::{
    Lifecycle, LifecycleEvent, LifecycleObserver, LifecycleState, Looper, ObserverId, TouchEvent,
    TouchPhase,
};

use crate::config::ScrollPageConfig;
use crate::dot_indicator::DotIndicator;
use crate::error::Result;
use crate::listener::{ImageLoader, Listeners, OnItemClickedListener, OnItemSelectedListener};
use crate::pager::{PageChange, Pager, PagerGesture};
use crate::provider::CarouselPageProvider;
use crate::surface::ClickHandler;
use crate::timer::{AutoAdvanceTimer, TimerState};

/// A committed selection change, in real (wrapped) indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEvent {
    /// Previously selected image
    pub previous: usize,
    /// Newly selected image
    pub current: usize,
    /// Number of images
    pub count: usize,
}

/// Auto-advancing carousel over a list of image URLs
///
/// Cloning is not supported; the page is a single UI object. Dropping it
/// cancels any pending tick and unregisters from its lifecycle.
pub struct ScrollPage {
    shared: Rc<Shared>,
}

struct Shared {
    state: RefCell<ScrollPageState>,
    listeners: Rc<Listeners>,
}

struct ScrollPageState {
    config: ScrollPageConfig,
    images: Rc<[String]>,
    /// Virtual position of the last committed selection
    pre_position: usize,
    pager: Pager,
    timer: AutoAdvanceTimer,
    indicator: Option<DotIndicator>,
    attached: bool,
    /// Lifecycle allows polling; true while no lifecycle is registered
    can_poll: bool,
    lifecycle: Option<LifecycleBinding>,
}

/// Registration with a host lifecycle; unregisters on drop
struct LifecycleBinding {
    lifecycle: Lifecycle,
    observer: ObserverId,
    _bridge: Rc<LifecycleBridge>,
}

impl Drop for LifecycleBinding {
    fn drop(&mut self) {
        self.lifecycle.remove_observer(self.observer);
    }
}

struct LifecycleBridge {
    page: Weak<Shared>,
}

impl LifecycleObserver for LifecycleBridge {
    fn on_state_changed(&self, _lifecycle: &Lifecycle, event: LifecycleEvent) {
        if let Some(shared) = self.page.upgrade() {
            Shared::on_lifecycle_event(&shared, event);
        }
    }
}

/// Work left to do once the state borrow is released
enum Deferred {
    Select(SelectionEvent),
    Click(ClickHandler),
}

// =============================================================================
// State
// =============================================================================

impl ScrollPageState {
    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn polling_allowed(&self) -> bool {
        self.attached && self.can_poll && self.pager.count() > 1
    }

    fn start_polling(&mut self) {
        if self.polling_allowed() {
            self.timer.start();
        }
    }

    /// Record a page change and sync the indicator
    fn commit_change(&mut self, change: PageChange) -> Option<SelectionEvent> {
        let count = self.image_count();
        if count == 0 {
            return None;
        }
        let event = SelectionEvent {
            previous: self.pre_position % count,
            current: change.current % count,
            count,
        };
        self.pre_position = change.current;
        if let Some(indicator) = self.indicator.as_mut() {
            indicator.set_selected(event.previous, event.current, event.count);
        }
        Some(event)
    }

    fn current_click_handler(&self) -> Option<ClickHandler> {
        let page = self.pager.current_page()?;
        self.pager.container().surface(page)?.click_handler()
    }
}

impl Shared {
    fn on_tick(shared: &Rc<Shared>) {
        let event = {
            let mut state = shared.state.borrow_mut();
            if !state.polling_allowed() {
                tracing::trace!("scroll page: tick while not polling, dropped");
                return;
            }
            let next = state.pager.current_item().saturating_add(1);
            tracing::trace!("scroll page: tick, advancing to {}", next);
            let change = state.pager.set_current_item(next);
            state.timer.start();
            change.and_then(|change| state.commit_change(change))
        };
        shared.run_loads();
        if let Some(event) = event {
            shared.dispatch(Deferred::Select(event));
        }
    }

    /// Feed queued image loads to the loader with the state released
    fn run_loads(&self) {
        loop {
            let loads = self
                .state
                .borrow_mut()
                .pager
                .container_mut()
                .take_pending_loads();
            if loads.is_empty() {
                return;
            }
            let Some(loader) = self.listeners.image_loader() else {
                tracing::trace!("scroll page: no loader, dropped {} loads", loads.len());
                return;
            };

            for load in loads {
                let surface = self
                    .state
                    .borrow_mut()
                    .pager
                    .container_mut()
                    .take_surface(load.page);
                let Some(mut surface) = surface else {
                    continue;
                };
                loader.update_image(&mut surface, &load.url);
                let restored = self
                    .state
                    .borrow_mut()
                    .pager
                    .container_mut()
                    .restore_surface(load.page, surface);
                if !restored {
                    tracing::trace!("scroll page: page dropped while loading {}", load.url);
                }
            }
        }
    }

    fn on_lifecycle_event(shared: &Rc<Shared>, event: LifecycleEvent) {
        tracing::debug!("scroll page: lifecycle {:?}", event);
        match event {
            LifecycleEvent::LowMemory => {
                shared.reclaim();
            }
            LifecycleEvent::Resumed => {
                let mut state = shared.state.borrow_mut();
                state.can_poll = true;
                state.start_polling();
            }
            LifecycleEvent::Destroyed => {
                let binding = {
                    let mut state = shared.state.borrow_mut();
                    state.can_poll = false;
                    state.attached = false;
                    state.timer.stop();
                    state.lifecycle.take()
                };
                // Unregisters; must run with the state released
                drop(binding);
            }
            LifecycleEvent::Created
            | LifecycleEvent::Started
            | LifecycleEvent::Paused
            | LifecycleEvent::Stopped => {
                let mut state = shared.state.borrow_mut();
                state.can_poll = false;
                state.timer.stop();
            }
        }
    }

    fn reclaim(&self) -> usize {
        let reclaimed = self.state.borrow_mut().pager.reclaim_detached();
        tracing::debug!("scroll page: low memory, reclaimed {} pages", reclaimed);
        reclaimed
    }

    fn dispatch(&self, deferred: Deferred) {
        match deferred {
            Deferred::Select(event) => {
                if let Some(listener) = self.listeners.item_selected_listener() {
                    listener.on_item_select(event.previous, event.current, event.count);
                }
            }
            Deferred::Click(handler) => handler(),
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

impl ScrollPage {
    /// Create an empty, attached page ticking on `looper`
    pub fn new(looper: Looper, config: ScrollPageConfig) -> Result<Self> {
        config.validate()?;

        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let mut timer = AutoAdvanceTimer::new(looper, config.rolling_frequency());
            timer.bind(weak.clone(), Shared::on_tick);

            let pager = Pager::new(config.offscreen_page_limit, config.touch_slop);
            Shared {
                state: RefCell::new(ScrollPageState {
                    config,
                    images: Rc::from(Vec::new()),
                    pre_position: 0,
                    pager,
                    timer,
                    indicator: None,
                    attached: true,
                    can_poll: true,
                    lifecycle: None,
                }),
                listeners: Rc::new(Listeners::new()),
            }
        });

        Ok(Self { shared })
    }

    /// Replace the image list and restart from the first image
    ///
    /// Emits `(0, 0, len)` to the selection listener, also for an empty list.
    pub fn set_images<I>(&self, images: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let images: Rc<[String]> = images.into_iter().map(Into::<String>::into).collect();
        let event = {
            let mut state = self.shared.state.borrow_mut();
            let count = images.len();
            tracing::debug!("scroll page: {} images", count);

            let provider = CarouselPageProvider::new(Rc::clone(&images), Rc::clone(&self.shared.listeners))
                .with_lock_single_page(state.config.lock_single_page);
            state.images = images;
            state.pager.set_adapter(Some(Box::new(provider)));
            state.pre_position = 0;
            if let Some(indicator) = state.indicator.as_mut() {
                indicator.set_selected(0, 0, count);
            }

            if state.polling_allowed() {
                state.start_polling();
            } else {
                state.timer.stop();
            }
            SelectionEvent {
                previous: 0,
                current: 0,
                count,
            }
        };
        self.shared.run_loads();
        self.shared.dispatch(Deferred::Select(event));
    }

    /// Replace the image loader; `None` leaves pages as placeholders
    ///
    /// Pages already on screen keep what they show until re-rendered.
    pub fn set_image_loader<L>(&self, loader: Option<L>)
    where
        L: ImageLoader + 'static,
    {
        self.shared.listeners.set_image_loader(loader);
    }

    /// Replace the click listener
    pub fn set_item_clicked_listener<L>(&self, listener: Option<L>)
    where
        L: OnItemClickedListener + 'static,
    {
        self.shared.listeners.set_item_clicked_listener(listener);
    }

    /// Replace the selection listener
    pub fn set_item_selected_listener<L>(&self, listener: Option<L>)
    where
        L: OnItemSelectedListener + 'static,
    {
        self.shared.listeners.set_item_selected_listener(listener);
    }

    /// Gate polling on a host lifecycle
    ///
    /// Polling is only allowed while the lifecycle is `Resumed`. Once it is
    /// destroyed the page detaches for good. A previously registered
    /// lifecycle is released first.
    pub fn register_lifecycle_observer(&self, lifecycle: &Lifecycle) {
        let previous = {
            let mut state = self.shared.state.borrow_mut();
            state.can_poll = false;
            state.timer.stop();
            state.lifecycle.take()
        };
        drop(previous);

        let bridge = Rc::new(LifecycleBridge {
            page: Rc::downgrade(&self.shared),
        });
        let observer = Rc::downgrade(&bridge) as Weak<dyn LifecycleObserver>;
        // Replays Created/Started/Resumed as needed
        let id = lifecycle.add_observer(observer);

        let binding = LifecycleBinding {
            lifecycle: lifecycle.clone(),
            observer: id,
            _bridge: bridge,
        };
        if lifecycle.current_state() == LifecycleState::Destroyed {
            self.shared.state.borrow_mut().attached = false;
            drop(binding);
            return;
        }
        self.shared.state.borrow_mut().lifecycle = Some(binding);
    }

    /// Whether a lifecycle is registered
    pub fn has_lifecycle(&self) -> bool {
        self.shared.state.borrow().lifecycle.is_some()
    }

    /// Feed a touch event
    ///
    /// Down pauses auto-advance and Up/Cancel resumes it before the pager
    /// sees the event. Returns whether the pager consumed it.
    pub fn dispatch_touch_event(&self, event: &TouchEvent) -> bool {
        let (consumed, deferred) = {
            let mut state = self.shared.state.borrow_mut();
            match event.phase() {
                TouchPhase::Down => {
                    state.timer.stop();
                }
                TouchPhase::Up | TouchPhase::Cancel => state.start_polling(),
                TouchPhase::Move => {}
            }

            let gesture = state.pager.on_touch_event(event);
            let deferred = match gesture {
                PagerGesture::Flipped(change) => state.commit_change(change).map(Deferred::Select),
                PagerGesture::Tapped(page) => state
                    .pager
                    .container()
                    .surface(page)
                    .and_then(|surface| surface.click_handler())
                    .map(Deferred::Click),
                PagerGesture::Ignored | PagerGesture::Dragging | PagerGesture::Settled => None,
            };
            (gesture.is_consumed(), deferred)
        };

        self.shared.run_loads();
        if let Some(deferred) = deferred {
            self.shared.dispatch(deferred);
        }
        consumed
    }

    /// Click the current page, as a tap would
    ///
    /// Returns false if there is no clickable page.
    pub fn perform_click(&self) -> bool {
        let handler = self.shared.state.borrow().current_click_handler();
        match handler {
            Some(handler) => {
                self.shared.dispatch(Deferred::Click(handler));
                true
            }
            None => false,
        }
    }

    /// Jump to a virtual position
    pub fn set_current_item(&self, item: usize) {
        let event = {
            let mut state = self.shared.state.borrow_mut();
            state
                .pager
                .set_current_item(item)
                .and_then(|change| state.commit_change(change))
        };
        self.shared.run_loads();
        if let Some(event) = event {
            self.shared.dispatch(Deferred::Select(event));
        }
    }

    /// The page entered a window; resume polling if allowed
    pub fn on_attached_to_window(&self) {
        let mut state = self.shared.state.borrow_mut();
        state.attached = true;
        state.start_polling();
    }

    /// The page left its window; stop polling
    pub fn on_detached_from_window(&self) {
        let mut state = self.shared.state.borrow_mut();
        state.attached = false;
        state.timer.stop();
    }

    /// Drop detached page surfaces; returns how many were dropped
    pub fn on_low_memory(&self) -> usize {
        self.shared.reclaim()
    }

    /// Layout pass reporting the page size in pixels
    pub fn on_size_changed(&self, width: f32, _height: f32) {
        self.shared.state.borrow_mut().pager.set_page_width(width);
    }

    /// Drive `indicator` from this page's selection
    ///
    /// The indicator is synced to the current selection right away.
    pub fn attach_indicator(&self, mut indicator: DotIndicator) {
        let mut state = self.shared.state.borrow_mut();
        let count = state.image_count();
        let current = if count == 0 { 0 } else { state.pre_position % count };
        indicator.set_selected(current, current, count);
        state.indicator = Some(indicator);
    }

    /// Stop driving the indicator and hand it back
    pub fn detach_indicator(&self) -> Option<DotIndicator> {
        self.shared.state.borrow_mut().indicator.take()
    }

    /// Inspect the attached indicator
    pub fn with_indicator<R>(&self, f: impl FnOnce(&DotIndicator) -> R) -> Option<R> {
        self.shared.state.borrow().indicator.as_ref().map(f)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Current virtual position
    pub fn current_item(&self) -> usize {
        self.shared.state.borrow().pager.current_item()
    }

    /// Current real index, `None` while the list is empty
    pub fn real_position(&self) -> Option<usize> {
        let state = self.shared.state.borrow();
        match state.image_count() {
            0 => None,
            count => Some(state.pager.current_item() % count),
        }
    }

    /// Page count reported to the pager
    pub fn page_count(&self) -> usize {
        self.shared.state.borrow().pager.count()
    }

    /// Number of images
    pub fn image_count(&self) -> usize {
        self.shared.state.borrow().image_count()
    }

    /// Auto-advance timer state
    pub fn timer_state(&self) -> TimerState {
        self.shared.state.borrow().timer.state()
    }

    /// Whether a tick is pending
    pub fn is_polling(&self) -> bool {
        self.timer_state() == TimerState::Armed
    }

    /// Whether the page is attached to a window
    pub fn is_attached(&self) -> bool {
        self.shared.state.borrow().attached
    }

    /// URL loaded into the surface at a virtual position, if instantiated
    pub fn rendered_image(&self, position: usize) -> Option<String> {
        let state = self.shared.state.borrow();
        let page = state.pager.page_at(position)?;
        state
            .pager
            .container()
            .surface(page)?
            .image_url()
            .map(str::to_string)
    }

    /// Virtual positions that currently have a page
    pub fn instantiated_positions(&self) -> Vec<usize> {
        self.shared.state.borrow().pager.instantiated_positions()
    }

    /// Number of page surfaces alive, on screen or recycled
    pub fn live_page_count(&self) -> usize {
        self.shared.state.borrow().pager.container().live_count()
    }

    /// Configuration in use
    pub fn config(&self) -> ScrollPageConfig {
        self.shared.state.borrow().config.clone()
    }
}

impl fmt::Debug for ScrollPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("ScrollPage")
            .field("images", &state.images.len())
            .field("current_item", &state.pager.current_item())
            .field("timer", &state.timer.state())
            .field("attached", &state.attached)
            .field("can_poll", &state.can_poll)
            .field("listeners", &self.shared.listeners)
            .finish()
    }
}
