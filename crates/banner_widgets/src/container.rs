//! Page container - owns page surfaces and tracks which are attached
//!
//! Surfaces live in a generational slot map. Anything outside the container
//! (the paging adapter's cache in particular) refers to a surface by
//! [`PageId`], which acts as a non-owning handle: once the container drops a
//! surface, every outstanding id for it stops resolving, and a reused slot
//! never answers to an old id.
//!
//! Removing a view detaches it. Detached surfaces are kept in a small
//! recycle pool (oldest dropped first once it exceeds its cap, see
//! [`PageContainer::trim_detached`]) so a page that comes straight back can
//! reuse its surface. [`PageContainer::reclaim_detached`] drops the whole
//! pool at once.
//!
//! Image loads are queued rather than run in place; the owner drains the
//! queue with [`PageContainer::take_pending_loads`] once it is safe to call
//! out to the image loader.

use std::collections::VecDeque;

use slotmap::{new_key_type, SlotMap};

use crate::surface::PageSurface;

new_key_type! {
    /// Non-owning handle to a surface inside a [`PageContainer`]
    pub struct PageId;
}

/// An image that still has to be loaded into a surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    /// Target surface; may have been dropped by the time the load runs
    pub page: PageId,
    /// Image to load
    pub url: String,
}

/// Owner of all page surfaces of one pager
#[derive(Debug, Default)]
pub struct PageContainer {
    surfaces: SlotMap<PageId, PageSurface>,
    /// Attached surfaces in attach order
    children: Vec<PageId>,
    /// Detached but still alive, oldest first
    detached: VecDeque<PageId>,
    pending_loads: Vec<PendingLoad>,
}

impl PageContainer {
    /// Create an empty container
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a new, detached surface
    pub fn create_surface(&mut self, surface: PageSurface) -> PageId {
        let id = self.surfaces.insert(surface);
        self.detached.push_back(id);
        id
    }

    /// Attach a live surface; no-op if it is gone or already attached
    pub fn add_view(&mut self, id: PageId) -> bool {
        if !self.surfaces.contains_key(id) || self.children.contains(&id) {
            return false;
        }
        self.detached.retain(|page| *page != id);
        self.children.push(id);
        true
    }

    /// Detach a surface; it stays alive in the recycle pool
    pub fn remove_view(&mut self, id: PageId) -> bool {
        match self.children.iter().position(|child| *child == id) {
            Some(index) => {
                self.children.remove(index);
                self.detached.push_back(id);
                true
            }
            None => false,
        }
    }

    /// Detach every surface
    pub fn remove_all_views(&mut self) {
        self.detached.extend(self.children.drain(..));
    }

    /// Drop the oldest detached surfaces until at most `keep` remain
    ///
    /// Returns how many surfaces were dropped.
    pub fn trim_detached(&mut self, keep: usize) -> usize {
        let mut dropped = 0;
        while self.detached.len() > keep {
            if let Some(id) = self.detached.pop_front() {
                if self.surfaces.remove(id).is_some() {
                    dropped += 1;
                }
            }
        }
        if dropped > 0 {
            self.pending_loads
                .retain(|load| self.surfaces.contains_key(load.page));
            tracing::trace!("page container: dropped {} detached surfaces", dropped);
        }
        dropped
    }

    /// Drop all detached surfaces, invalidating their ids
    ///
    /// Returns how many surfaces were dropped.
    pub fn reclaim_detached(&mut self) -> usize {
        let reclaimed = self.trim_detached(0);
        if reclaimed > 0 {
            tracing::debug!("page container: reclaimed {} detached surfaces", reclaimed);
        }
        reclaimed
    }

    /// Queue an image load for a surface
    pub fn request_load(&mut self, id: PageId, url: impl Into<String>) {
        self.pending_loads.push(PendingLoad {
            page: id,
            url: url.into(),
        });
    }

    /// Drain the queued image loads
    pub fn take_pending_loads(&mut self) -> Vec<PendingLoad> {
        std::mem::take(&mut self.pending_loads)
    }

    /// Number of queued image loads
    pub fn pending_load_count(&self) -> usize {
        self.pending_loads.len()
    }

    /// Move a surface out so it can be worked on without borrowing the
    /// container; a placeholder holds its slot until [`Self::restore_surface`]
    pub fn take_surface(&mut self, id: PageId) -> Option<PageSurface> {
        self.surfaces.get_mut(id).map(std::mem::take)
    }

    /// Put back a surface moved out with [`Self::take_surface`]
    ///
    /// Returns false (and drops `surface`) if the slot was freed meanwhile.
    pub fn restore_surface(&mut self, id: PageId, surface: PageSurface) -> bool {
        match self.surfaces.get_mut(id) {
            Some(slot) => {
                *slot = surface;
                true
            }
            None => false,
        }
    }

    /// Whether the id still resolves to a live surface
    pub fn contains(&self, id: PageId) -> bool {
        self.surfaces.contains_key(id)
    }

    /// Whether the surface is currently attached
    pub fn is_attached(&self, id: PageId) -> bool {
        self.children.contains(&id)
    }

    /// Look up a live surface
    pub fn surface(&self, id: PageId) -> Option<&PageSurface> {
        self.surfaces.get(id)
    }

    /// Look up a live surface mutably
    pub fn surface_mut(&mut self, id: PageId) -> Option<&mut PageSurface> {
        self.surfaces.get_mut(id)
    }

    /// Attached surfaces in attach order
    pub fn children(&self) -> &[PageId] {
        &self.children
    }

    /// Number of attached surfaces
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Number of detached surfaces still alive
    pub fn detached_count(&self) -> usize {
        self.detached.len()
    }

    /// Number of live surfaces, attached or not
    pub fn live_count(&self) -> usize {
        self.surfaces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_keeps_surface_alive() {
        let mut container = PageContainer::new();
        let id = container.create_surface(PageSurface::new());

        assert!(container.add_view(id));
        assert!(!container.add_view(id));
        assert_eq!(container.child_count(), 1);
        assert_eq!(container.detached_count(), 0);

        assert!(container.remove_view(id));
        assert!(!container.remove_view(id));
        assert!(container.contains(id));
        assert!(!container.is_attached(id));
        assert_eq!(container.detached_count(), 1);
    }

    #[test]
    fn test_reclaim_invalidates_detached_only() {
        let mut container = PageContainer::new();
        let kept = container.create_surface(PageSurface::new());
        let dropped = container.create_surface(PageSurface::new());
        container.add_view(kept);

        assert_eq!(container.reclaim_detached(), 1);
        assert!(container.contains(kept));
        assert!(!container.contains(dropped));
        assert!(container.surface(dropped).is_none());
        assert!(!container.add_view(dropped));
    }

    #[test]
    fn test_trim_drops_oldest_first() {
        let mut container = PageContainer::new();
        let ids: Vec<PageId> = (0..4)
            .map(|_| {
                let id = container.create_surface(PageSurface::new());
                container.add_view(id);
                id
            })
            .collect();
        for id in &ids {
            container.remove_view(*id);
        }

        assert_eq!(container.trim_detached(1), 3);
        assert!(!container.contains(ids[0]));
        assert!(!container.contains(ids[2]));
        assert!(container.contains(ids[3]));
        assert_eq!(container.live_count(), 1);
    }

    #[test]
    fn test_remove_all_views_feeds_pool() {
        let mut container = PageContainer::new();
        for _ in 0..3 {
            let id = container.create_surface(PageSurface::new());
            container.add_view(id);
        }
        container.remove_all_views();
        assert_eq!(container.child_count(), 0);
        assert_eq!(container.reclaim_detached(), 3);
        assert_eq!(container.live_count(), 0);
    }

    #[test]
    fn test_reused_slot_does_not_answer_old_id() {
        let mut container = PageContainer::new();
        let old = container.create_surface(PageSurface::new());
        container.reclaim_detached();

        let new = container.create_surface(PageSurface::new());
        assert_ne!(old, new);
        assert!(!container.contains(old));
        assert!(container.contains(new));
    }

    #[test]
    fn test_loads_for_dropped_surfaces_are_discarded() {
        let mut container = PageContainer::new();
        let kept = container.create_surface(PageSurface::new());
        let dropped = container.create_surface(PageSurface::new());
        container.add_view(kept);
        container.request_load(kept, "a");
        container.request_load(dropped, "b");

        container.reclaim_detached();
        let loads = container.take_pending_loads();
        assert_eq!(loads, vec![PendingLoad { page: kept, url: "a".into() }]);
        assert_eq!(container.pending_load_count(), 0);
    }

    #[test]
    fn test_take_and_restore_surface() {
        let mut container = PageContainer::new();
        let id = container.create_surface(PageSurface::new());

        let mut surface = container.take_surface(id).unwrap();
        surface.set_image_url("a");
        assert!(container.restore_surface(id, surface));
        assert_eq!(container.surface(id).unwrap().image_url(), Some("a"));

        let surface = container.take_surface(id).unwrap();
        container.reclaim_detached();
        assert!(!container.restore_surface(id, surface));
    }
}
