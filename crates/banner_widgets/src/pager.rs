//! Horizontal pager - swipeable container driving a paging adapter
//!
//! The pager keeps a window of `current ± offscreen_limit` pages
//! instantiated through its [`PagerAdapter`], releases pages that fall out of
//! the window, and turns touch streams into page flips or taps.
//!
//! # Gestures
//!
//! ```text
//! Started ──► Moved* ──► Ended
//!                          ├─ |dx| <= touch slop         → Tapped(current page)
//!                          ├─ dx <= -flip distance       → Flipped(next)
//!                          ├─ dx >= +flip distance       → Flipped(previous)
//!                          └─ otherwise                  → Settled (snap back)
//!         └──────────────► Cancelled                     → Settled
//! ```
//!
//! Detached surfaces are recycled up to one window's worth
//! (`2 * offscreen_limit + 1`); older ones are dropped after every
//! population pass.
//!
//! The flip distance is half the page width, never less than the touch slop.
//! Page changes are returned to the caller rather than dispatched through
//! callbacks, so the owner decides when listeners run.

use std::collections::BTreeMap;

use banner_platform::TouchEvent;

use crate::config::MAX_OFFSCREEN_PAGE_LIMIT;
use crate::container::{PageContainer, PageId};

/// Fraction of the page width a drag must cover to flip pages
const FLIP_FRACTION: f32 = 0.5;

/// Adapter supplying pages to a [`Pager`]
pub trait PagerAdapter {
    /// Number of pages; 0 means the pager is empty
    fn count(&self) -> usize;

    /// Build (or reuse) the page for `position` and attach it to `container`
    fn instantiate_item(&mut self, container: &mut PageContainer, position: usize) -> PageId;

    /// Detach the page that represents `position`
    fn destroy_item(&mut self, container: &mut PageContainer, position: usize, page: PageId);

    /// Whether `view` is the object returned for a page
    fn is_view_from_object(&self, view: PageId, object: PageId) -> bool {
        view == object
    }
}

/// A committed change of the current page (virtual positions)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChange {
    /// Page that was current before
    pub previous: usize,
    /// Page that is current now
    pub current: usize,
}

/// What the pager made of a touch event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerGesture {
    /// Event did not belong to a gesture the pager is tracking
    Ignored,
    /// A drag is in progress
    Dragging,
    /// The gesture ended without changing pages
    Settled,
    /// The gesture flipped to another page
    Flipped(PageChange),
    /// The gesture was a tap on this page
    Tapped(PageId),
}

impl PagerGesture {
    /// Whether the pager consumed the event
    pub fn is_consumed(&self) -> bool {
        !matches!(self, PagerGesture::Ignored)
    }
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    touch_id: u64,
    start_x: f32,
    last_x: f32,
}

/// Swipeable container that pages through an adapter
pub struct Pager {
    container: PageContainer,
    adapter: Option<Box<dyn PagerAdapter>>,
    /// Instantiated pages by virtual position
    items: BTreeMap<usize, PageId>,
    current: usize,
    offscreen_limit: usize,
    page_width: f32,
    touch_slop: f32,
    drag: Option<DragState>,
}

impl Pager {
    /// Create an empty pager
    ///
    /// `offscreen_limit` is clamped to `1..=MAX_OFFSCREEN_PAGE_LIMIT`.
    pub fn new(offscreen_limit: usize, touch_slop: f32) -> Self {
        let clamped = offscreen_limit.clamp(1, MAX_OFFSCREEN_PAGE_LIMIT);
        if clamped != offscreen_limit {
            tracing::warn!(
                "pager: offscreen limit {} out of range, using {}",
                offscreen_limit,
                clamped
            );
        }
        Self {
            container: PageContainer::new(),
            adapter: None,
            items: BTreeMap::new(),
            current: 0,
            offscreen_limit: clamped,
            page_width: 0.0,
            touch_slop,
            drag: None,
        }
    }

    /// Replace the adapter, releasing every page of the old one
    ///
    /// The current item resets to 0. No page change is reported. Surfaces
    /// built by the old adapter are dropped.
    pub fn set_adapter(&mut self, adapter: Option<Box<dyn PagerAdapter>>) {
        self.destroy_all_items();
        self.container.reclaim_detached();
        self.adapter = adapter;
        self.current = 0;
        self.drag = None;
        self.populate();
    }

    /// Whether an adapter is set
    pub fn has_adapter(&self) -> bool {
        self.adapter.is_some()
    }

    /// Page count reported by the adapter
    pub fn count(&self) -> usize {
        self.adapter.as_ref().map_or(0, |adapter| adapter.count())
    }

    /// Current virtual position
    pub fn current_item(&self) -> usize {
        self.current
    }

    /// Move to `item`, clamped to the adapter range
    ///
    /// Returns the change if the current page actually moved.
    pub fn set_current_item(&mut self, item: usize) -> Option<PageChange> {
        let count = self.count();
        if count == 0 {
            return None;
        }
        let item = item.min(count - 1);
        if item == self.current {
            self.populate();
            return None;
        }

        let change = PageChange {
            previous: self.current,
            current: item,
        };
        self.current = item;
        self.populate();
        tracing::trace!("pager: {} -> {}", change.previous, change.current);
        Some(change)
    }

    /// Set the laid-out page width in pixels
    pub fn set_page_width(&mut self, width: f32) {
        self.page_width = width.max(0.0);
    }

    /// Laid-out page width in pixels
    pub fn page_width(&self) -> f32 {
        self.page_width
    }

    /// Page instantiated for a virtual position
    pub fn page_at(&self, position: usize) -> Option<PageId> {
        self.items
            .get(&position)
            .copied()
            .filter(|page| self.container.contains(*page))
    }

    /// Page that is currently shown
    pub fn current_page(&self) -> Option<PageId> {
        self.page_at(self.current)
    }

    /// Virtual positions that are currently instantiated
    pub fn instantiated_positions(&self) -> Vec<usize> {
        self.items.keys().copied().collect()
    }

    /// The surfaces' owner
    pub fn container(&self) -> &PageContainer {
        &self.container
    }

    /// Pages kept on each side of the current one
    pub fn offscreen_limit(&self) -> usize {
        self.offscreen_limit
    }

    /// The surfaces' owner, mutably
    pub fn container_mut(&mut self) -> &mut PageContainer {
        &mut self.container
    }

    /// Drop detached surfaces held only by caches
    pub fn reclaim_detached(&mut self) -> usize {
        self.container.reclaim_detached()
    }

    /// Feed one touch event
    pub fn on_touch_event(&mut self, event: &TouchEvent) -> PagerGesture {
        match *event {
            TouchEvent::Started { id, x, .. } => {
                self.drag = Some(DragState {
                    touch_id: id,
                    start_x: x,
                    last_x: x,
                });
                PagerGesture::Dragging
            }
            TouchEvent::Moved { id, x, .. } => match self.drag.as_mut() {
                Some(drag) if drag.touch_id == id => {
                    drag.last_x = x;
                    PagerGesture::Dragging
                }
                _ => PagerGesture::Ignored,
            },
            TouchEvent::Ended { id, x, .. } => match self.drag {
                Some(drag) if drag.touch_id == id => {
                    self.drag = None;
                    self.finish_drag(x - drag.start_x)
                }
                _ => PagerGesture::Ignored,
            },
            TouchEvent::Cancelled { id } => match self.drag {
                Some(drag) if drag.touch_id == id => {
                    self.drag = None;
                    PagerGesture::Settled
                }
                _ => PagerGesture::Ignored,
            },
        }
    }

    fn finish_drag(&mut self, dx: f32) -> PagerGesture {
        if dx.abs() <= self.touch_slop {
            return match self.current_page() {
                Some(page) => PagerGesture::Tapped(page),
                None => PagerGesture::Settled,
            };
        }

        let flip_distance = (self.page_width * FLIP_FRACTION).max(self.touch_slop);
        let target = if dx <= -flip_distance {
            self.current.saturating_add(1)
        } else if dx >= flip_distance {
            self.current.saturating_sub(1)
        } else {
            self.current
        };

        match self.set_current_item(target) {
            Some(change) => PagerGesture::Flipped(change),
            None => PagerGesture::Settled,
        }
    }

    /// Instantiate the window around the current page, release the rest
    fn populate(&mut self) {
        self.populate_window();
        self.container.trim_detached(2 * self.offscreen_limit + 1);
    }

    fn populate_window(&mut self) {
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };
        let count = adapter.count();
        if count == 0 {
            Self::destroy_items(adapter.as_mut(), &mut self.container, &mut self.items);
            return;
        }

        let first = self.current.saturating_sub(self.offscreen_limit);
        let last = self
            .current
            .saturating_add(self.offscreen_limit)
            .min(count - 1);

        let stale: Vec<usize> = self
            .items
            .keys()
            .copied()
            .filter(|position| *position < first || *position > last)
            .collect();
        for position in stale {
            if let Some(page) = self.items.remove(&position) {
                adapter.destroy_item(&mut self.container, position, page);
            }
        }

        // Current page first, then outwards
        let mut wanted = vec![self.current];
        wanted.extend((first..self.current).rev());
        wanted.extend(self.current + 1..=last);
        for position in wanted {
            let live = self
                .items
                .get(&position)
                .is_some_and(|page| self.container.is_attached(*page));
            if !live {
                let page = adapter.instantiate_item(&mut self.container, position);
                self.items.insert(position, page);
            }
        }
    }

    fn destroy_all_items(&mut self) {
        if let Some(adapter) = self.adapter.as_mut() {
            Self::destroy_items(adapter.as_mut(), &mut self.container, &mut self.items);
        }
        self.items.clear();
        self.container.remove_all_views();
    }

    fn destroy_items(
        adapter: &mut dyn PagerAdapter,
        container: &mut PageContainer,
        items: &mut BTreeMap<usize, PageId>,
    ) {
        for (position, page) in std::mem::take(items) {
            adapter.destroy_item(container, position, page);
        }
    }
}
