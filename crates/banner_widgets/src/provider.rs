//! Carousel page provider - infinite paging adapter over an image list
//!
//! Maps the unbounded virtual position space onto a finite list of image
//! URLs: page `p` shows `images[p % n]`. Built surfaces are cached by
//! *virtual* position as [`PageId`] handles. A handle may stop resolving at
//! any time (see [`PageContainer::reclaim_detached`]); every lookup checks it
//! and rebuilds on a miss, and a miss also drops entries whose surface is gone.
//!
//! Rendering only queues the image load on the container. The owner runs
//! the image loader once it is safe to call out.

use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::container::{PageContainer, PageId};
use crate::listener::Listeners;
use crate::pager::PagerAdapter;
use crate::surface::{PageSurface, ScaleType};

/// Page count reported for a non-empty list
pub const INFINITE_PAGE_COUNT: usize = i32::MAX as usize;

/// Paging adapter rendering `images[position % len]` for every position
pub struct CarouselPageProvider {
    images: Rc<[String]>,
    listeners: Rc<Listeners>,
    cache: FxHashMap<usize, PageId>,
    lock_single_page: bool,
}

impl CarouselPageProvider {
    /// Create a provider over `images`
    pub fn new(images: Rc<[String]>, listeners: Rc<Listeners>) -> Self {
        Self {
            images,
            listeners,
            cache: FxHashMap::default(),
            lock_single_page: false,
        }
    }

    /// Report a single page when there is exactly one image
    pub fn with_lock_single_page(mut self, lock: bool) -> Self {
        self.lock_single_page = lock;
        self
    }

    /// Number of images
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether the image list is empty
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Page count reported to the pager
    pub fn page_count(&self) -> usize {
        match self.images.len() {
            0 => 0,
            1 if self.lock_single_page => 1,
            _ => INFINITE_PAGE_COUNT,
        }
    }

    /// Real image index for a virtual position
    pub fn real_index(&self, position: usize) -> Option<usize> {
        match self.images.len() {
            0 => None,
            len => Some(position % len),
        }
    }

    /// URL shown at a virtual position
    pub fn image_at(&self, position: usize) -> Option<&str> {
        self.real_index(position).map(|index| self.images[index].as_str())
    }

    /// Build or reuse the surface for `position`, attach it and queue its image
    ///
    /// With an empty list nothing can be rendered and a bare detached
    /// placeholder is returned; the pager never asks for one since it sees a
    /// count of 0.
    pub fn render_page(&mut self, container: &mut PageContainer, position: usize) -> PageId {
        let Some(index) = self.real_index(position) else {
            return container.create_surface(PageSurface::new());
        };

        let page = match self.cached_page(container, position) {
            Some(page) => {
                tracing::trace!("provider: cache hit for page {}", position);
                page
            }
            None => {
                tracing::trace!("provider: cache miss for page {}, building", position);
                self.cache.retain(|_, page| container.contains(*page));
                let page = container.create_surface(self.build_surface(index));
                self.cache.insert(position, page);
                page
            }
        };

        container.add_view(page);
        if self.listeners.image_loader().is_some() {
            container.request_load(page, self.images[index].as_str());
        }
        page
    }

    /// Detach the surface for `position`
    ///
    /// The cache entry is left in place; it is revalidated on the next read.
    pub fn release_page(&mut self, container: &mut PageContainer, position: usize, page: PageId) {
        tracing::trace!("provider: releasing page {}", position);
        container.remove_view(page);
    }

    /// Cached surface for `position`, if its handle still resolves
    pub fn cached_page(&self, container: &PageContainer, position: usize) -> Option<PageId> {
        self.cache
            .get(&position)
            .copied()
            .filter(|page| container.contains(*page))
    }

    /// Number of cache entries, valid or not
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    fn build_surface(&self, index: usize) -> PageSurface {
        let mut surface = PageSurface::new();
        surface.set_scale_type(ScaleType::FitXy);

        let listeners: Weak<Listeners> = Rc::downgrade(&self.listeners);
        surface.set_on_click(Some(move || {
            let listener = listeners
                .upgrade()
                .and_then(|listeners| listeners.item_clicked_listener());
            if let Some(listener) = listener {
                listener.on_click_item(index);
            }
        }));
        surface
    }
}

impl PagerAdapter for CarouselPageProvider {
    fn count(&self) -> usize {
        self.page_count()
    }

    fn instantiate_item(&mut self, container: &mut PageContainer, position: usize) -> PageId {
        self.render_page(container, position)
    }

    fn destroy_item(&mut self, container: &mut PageContainer, position: usize, page: PageId) {
        self.release_page(container, position, page);
    }
}

impl fmt::Debug for CarouselPageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CarouselPageProvider")
            .field("images", &self.images.len())
            .field("cache", &self.cache.len())
            .field("lock_single_page", &self.lock_single_page)
            .finish()
    }
}
