//! Collaborator traits and single-slot listener storage
//!
//! A scroll page talks to three external collaborators: an image loader
//! that fills page surfaces, a click listener and a selection listener.
//! Each slot holds at most one collaborator; registering a new one replaces
//! the old one.
//!
//! Closures implement the traits directly:
//!
//! ```rust
//! use banner_widgets::{Listeners, OnItemSelectedListener};
//!
//! let listeners = Listeners::new();
//! listeners.set_item_selected_listener(Some(|prev: usize, cur: usize, count: usize| {
//!     println!("{prev} -> {cur} of {count}");
//! }));
//! assert!(listeners.item_selected_listener().is_some());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::surface::PageSurface;

/// Renders an image URL into a page surface
///
/// The widget never fetches or caches image bytes itself.
pub trait ImageLoader {
    /// Load `url` into `surface`
    fn update_image(&self, surface: &mut PageSurface, url: &str);
}

/// Notified when a page is clicked
pub trait OnItemClickedListener {
    /// `position` is the real index into the image list
    fn on_click_item(&self, position: usize);
}

/// Notified when the selected page changes
pub trait OnItemSelectedListener {
    /// Both positions are real indices (already wrapped); `count` is the
    /// number of images
    fn on_item_select(&self, previous: usize, current: usize, count: usize);
}

impl<F> ImageLoader for F
where
    F: Fn(&mut PageSurface, &str),
{
    fn update_image(&self, surface: &mut PageSurface, url: &str) {
        self(surface, url)
    }
}

impl<F> OnItemClickedListener for F
where
    F: Fn(usize),
{
    fn on_click_item(&self, position: usize) {
        self(position)
    }
}

impl<F> OnItemSelectedListener for F
where
    F: Fn(usize, usize, usize),
{
    fn on_item_select(&self, previous: usize, current: usize, count: usize) {
        self(previous, current, count)
    }
}

/// Single-slot storage for the three collaborators
///
/// Getters hand out `Rc` clones so callers can invoke a collaborator without
/// holding a borrow; a collaborator is free to replace itself mid-call.
#[derive(Default)]
pub struct Listeners {
    image_loader: RefCell<Option<Rc<dyn ImageLoader>>>,
    item_clicked: RefCell<Option<Rc<dyn OnItemClickedListener>>>,
    item_selected: RefCell<Option<Rc<dyn OnItemSelectedListener>>>,
}

impl Listeners {
    /// Create empty slots
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the image loader
    pub fn set_image_loader<L>(&self, loader: Option<L>)
    where
        L: ImageLoader + 'static,
    {
        *self.image_loader.borrow_mut() = loader.map(|l| Rc::new(l) as Rc<dyn ImageLoader>);
    }

    /// Replace the click listener
    pub fn set_item_clicked_listener<L>(&self, listener: Option<L>)
    where
        L: OnItemClickedListener + 'static,
    {
        *self.item_clicked.borrow_mut() =
            listener.map(|l| Rc::new(l) as Rc<dyn OnItemClickedListener>);
    }

    /// Replace the selection listener
    pub fn set_item_selected_listener<L>(&self, listener: Option<L>)
    where
        L: OnItemSelectedListener + 'static,
    {
        *self.item_selected.borrow_mut() =
            listener.map(|l| Rc::new(l) as Rc<dyn OnItemSelectedListener>);
    }

    /// Current image loader
    pub fn image_loader(&self) -> Option<Rc<dyn ImageLoader>> {
        self.image_loader.borrow().clone()
    }

    /// Current click listener
    pub fn item_clicked_listener(&self) -> Option<Rc<dyn OnItemClickedListener>> {
        self.item_clicked.borrow().clone()
    }

    /// Current selection listener
    pub fn item_selected_listener(&self) -> Option<Rc<dyn OnItemSelectedListener>> {
        self.item_selected.borrow().clone()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("image_loader", &self.image_loader.borrow().is_some())
            .field("item_clicked", &self.item_clicked.borrow().is_some())
            .field("item_selected", &self.item_selected.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_last_registration_wins() {
        let listeners = Listeners::new();
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let sink = Rc::clone(&first);
        listeners.set_item_clicked_listener(Some(move |pos: usize| sink.set(pos + 1)));
        let sink = Rc::clone(&second);
        listeners.set_item_clicked_listener(Some(move |pos: usize| sink.set(pos + 1)));

        listeners.item_clicked_listener().unwrap().on_click_item(4);
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 5);
    }

    #[test]
    fn test_clearing_a_slot() {
        let listeners = Listeners::new();
        listeners.set_item_selected_listener(Some(|_: usize, _: usize, _: usize| {}));
        assert!(listeners.item_selected_listener().is_some());

        listeners.set_item_selected_listener(None::<fn(usize, usize, usize)>);
        assert!(listeners.item_selected_listener().is_none());
    }
}
