//! Carousel scenarios driven on a virtual-clock looper

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use banner_platform::{Lifecycle, LifecycleEvent, LifecycleState, Looper, TouchEvent};

use crate::prelude::*;

const SECOND: Duration = Duration::from_secs(1);

/// Records every selection event
type Selections = Rc<RefCell<Vec<(usize, usize, usize)>>>;

fn one_second_page() -> (Looper, ScrollPage) {
    let looper = Looper::new();
    let config = ScrollPageConfig::default().rolling_frequency_secs(1);
    let page = ScrollPage::new(looper.clone(), config).unwrap();
    page.on_size_changed(400.0, 200.0);
    (looper, page)
}

fn record_selections(page: &ScrollPage) -> Selections {
    let selections: Selections = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&selections);
    page.set_item_selected_listener(Some(move |prev: usize, cur: usize, count: usize| {
        sink.borrow_mut().push((prev, cur, count))
    }));
    selections
}

fn record_clicks(page: &ScrollPage) -> Rc<RefCell<Vec<usize>>> {
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&clicks);
    page.set_item_clicked_listener(Some(move |pos: usize| sink.borrow_mut().push(pos)));
    clicks
}

fn url_loader(page: &ScrollPage) {
    page.set_image_loader(Some(|surface: &mut PageSurface, url: &str| {
        surface.set_image_url(url)
    }));
}

fn swipe(page: &ScrollPage, from_x: f32, to_x: f32) -> bool {
    page.dispatch_touch_event(&TouchEvent::Started { id: 1, x: from_x, y: 50.0 });
    page.dispatch_touch_event(&TouchEvent::Moved { id: 1, x: (from_x + to_x) / 2.0, y: 50.0 });
    page.dispatch_touch_event(&TouchEvent::Ended { id: 1, x: to_x, y: 50.0 })
}

// =============================================================================
// Auto-advance
// =============================================================================

#[test]
fn test_three_ticks_wrap_two_images() {
    let (looper, page) = one_second_page();
    let selections = record_selections(&page);

    page.set_images(["A", "B"]);
    for _ in 0..3 {
        assert_eq!(looper.advance_by(SECOND), 1);
    }

    assert_eq!(
        *selections.borrow(),
        vec![(0, 0, 2), (0, 1, 2), (1, 0, 2), (0, 1, 2)]
    );
    assert_eq!(page.current_item(), 3);
    assert!(page.is_polling());
}

#[test]
fn test_clearing_images_resets() {
    let (looper, page) = one_second_page();
    let selections = record_selections(&page);

    page.set_images(["A", "B", "C"]);
    looper.advance_by(SECOND * 2);
    assert_eq!(page.current_item(), 2);

    page.set_images(Vec::<String>::new());
    assert_eq!(selections.borrow().last(), Some(&(0, 0, 0)));
    assert_eq!(page.current_item(), 0);
    assert_eq!(page.page_count(), 0);
    assert_eq!(page.timer_state(), TimerState::Idle);

    looper.advance_by(SECOND * 5);
    assert_eq!(selections.borrow().len(), 4);
}

#[test]
fn test_replacing_images_restarts_from_first() {
    let (looper, page) = one_second_page();
    let selections = record_selections(&page);

    page.set_images(["A", "B"]);
    looper.advance_by(SECOND);
    page.set_images(["C", "D", "E"]);
    looper.advance_by(SECOND);

    assert_eq!(
        *selections.borrow(),
        vec![(0, 0, 2), (0, 1, 2), (0, 0, 3), (0, 1, 3)]
    );
}

#[test]
fn test_set_images_twice_keeps_one_tick() {
    let (looper, page) = one_second_page();
    page.set_images(["A", "B"]);
    page.set_images(["A", "B", "C"]);
    assert_eq!(looper.pending_count(), 1);
}

#[test]
fn test_single_unlocked_image_still_advances() {
    let (looper, page) = one_second_page();
    let selections = record_selections(&page);
    page.set_images(["A"]);
    looper.advance_by(SECOND);
    assert_eq!(*selections.borrow(), vec![(0, 0, 1), (0, 0, 1)]);
    assert_eq!(page.current_item(), 1);
}

// =============================================================================
// Detach & teardown
// =============================================================================

#[test]
fn test_detach_while_tick_pending_is_silent() {
    let (looper, page) = one_second_page();
    let selections = record_selections(&page);
    page.set_images(["A", "B"]);

    page.on_detached_from_window();
    looper.advance_by(SECOND * 10);

    assert_eq!(*selections.borrow(), vec![(0, 0, 2)]);
    assert_eq!(page.current_item(), 0);
    assert_eq!(looper.pending_count(), 0);
}

#[test]
fn test_dropping_page_cancels_tick() {
    let (looper, page) = one_second_page();
    let selections = record_selections(&page);
    page.set_images(["A", "B"]);
    assert_eq!(looper.pending_count(), 1);

    drop(page);
    assert_eq!(looper.pending_count(), 0);
    looper.advance_by(SECOND * 3);
    assert_eq!(selections.borrow().len(), 1);
}

#[test]
fn test_quit_looper_leaves_timer_idle() {
    let (looper, page) = one_second_page();
    looper.quit();
    page.set_images(["A", "B"]);
    assert_eq!(page.timer_state(), TimerState::Idle);
}

// =============================================================================
// Touch
// =============================================================================

#[test]
fn test_touch_pauses_and_resumes() {
    let (looper, page) = one_second_page();
    page.set_images(["A", "B"]);

    page.dispatch_touch_event(&TouchEvent::Started { id: 3, x: 10.0, y: 10.0 });
    assert_eq!(page.timer_state(), TimerState::Idle);
    looper.advance_by(SECOND * 3);
    assert_eq!(page.current_item(), 0);

    page.dispatch_touch_event(&TouchEvent::Ended { id: 3, x: 10.0, y: 10.0 });
    assert_eq!(page.timer_state(), TimerState::Armed);
    assert_eq!(looper.pending_count(), 1);
}

#[test]
fn test_cancel_resumes_polling() {
    let (_looper, page) = one_second_page();
    page.set_images(["A", "B"]);
    page.dispatch_touch_event(&TouchEvent::Started { id: 3, x: 10.0, y: 10.0 });
    page.dispatch_touch_event(&TouchEvent::Cancelled { id: 3 });
    assert!(page.is_polling());
}

#[test]
fn test_swipe_selects_neighbours() {
    let (_looper, page) = one_second_page();
    let selections = record_selections(&page);
    page.set_images(["A", "B", "C"]);

    assert!(swipe(&page, 350.0, 100.0));
    assert!(swipe(&page, 350.0, 100.0));
    assert!(swipe(&page, 50.0, 300.0));

    assert_eq!(
        *selections.borrow(),
        vec![(0, 0, 3), (0, 1, 3), (1, 2, 3), (2, 1, 3)]
    );
    assert!(page.is_polling());
}

#[test]
fn test_tap_reports_real_index() {
    let (_looper, page) = one_second_page();
    let clicks = record_clicks(&page);
    page.set_images(["A", "B", "C"]);
    page.set_current_item(7);

    page.dispatch_touch_event(&TouchEvent::Started { id: 1, x: 200.0, y: 50.0 });
    page.dispatch_touch_event(&TouchEvent::Ended { id: 1, x: 203.0, y: 51.0 });
    assert!(page.perform_click());

    assert_eq!(*clicks.borrow(), vec![1, 1]);
}

#[test]
fn test_perform_click_on_empty_page() {
    let (_looper, page) = one_second_page();
    let clicks = record_clicks(&page);
    assert!(!page.perform_click());
    assert!(clicks.borrow().is_empty());
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_rendered_image_is_position_mod_len() {
    let (_looper, page) = one_second_page();
    url_loader(&page);

    for len in 1..=4 {
        let images: Vec<String> = (0..len).map(|i| format!("img-{i}")).collect();
        page.set_images(images.clone());
        for position in 0..12 {
            page.set_current_item(position);
            assert_eq!(
                page.rendered_image(position),
                Some(images[position % len].clone()),
                "len {len}, position {position}"
            );
        }
    }
}

#[test]
fn test_no_loader_leaves_placeholder() {
    let (_looper, page) = one_second_page();
    page.set_images(["A", "B"]);
    assert_eq!(page.rendered_image(0), None);
    assert_eq!(page.instantiated_positions(), vec![0, 1]);
}

#[test]
fn test_low_memory_reclaims_offscreen_pages() {
    let (_looper, page) = one_second_page();
    url_loader(&page);
    page.set_images(["A", "B"]);

    page.set_current_item(5);
    assert!(page.on_low_memory() >= 2);

    // Coming back rebuilds the reclaimed pages from scratch
    page.set_current_item(0);
    assert_eq!(page.rendered_image(0).as_deref(), Some("A"));
    assert_eq!(page.rendered_image(1).as_deref(), Some("B"));
}

#[test]
fn test_long_run_keeps_surfaces_bounded() {
    let (looper, page) = one_second_page();
    url_loader(&page);
    page.set_images(["A", "B"]);

    looper.advance_by(SECOND * 10_000);
    assert_eq!(page.current_item(), 10_000);
    // One window attached plus at most one window recycled
    assert!(page.live_page_count() <= 6, "{} live", page.live_page_count());

    for _ in 0..50 {
        page.set_images(["A", "B", "C"]);
    }
    assert!(page.live_page_count() <= 6, "{} live", page.live_page_count());
    assert_eq!(page.rendered_image(0).as_deref(), Some("A"));
    assert_eq!(page.rendered_image(1).as_deref(), Some("B"));
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_lifecycle_gates_polling() {
    let (looper, page) = one_second_page();
    let lifecycle = Lifecycle::new();
    page.register_lifecycle_observer(&lifecycle);
    page.set_images(["A", "B"]);
    assert!(!page.is_polling());

    lifecycle.move_to_state(LifecycleState::Resumed).unwrap();
    assert!(page.is_polling());
    looper.advance_by(SECOND);
    assert_eq!(page.current_item(), 1);

    lifecycle.move_to_state(LifecycleState::Started).unwrap();
    assert!(!page.is_polling());
    looper.advance_by(SECOND * 3);
    assert_eq!(page.current_item(), 1);

    // Touch-up does not override the lifecycle
    page.dispatch_touch_event(&TouchEvent::Started { id: 1, x: 0.0, y: 0.0 });
    page.dispatch_touch_event(&TouchEvent::Ended { id: 1, x: 0.0, y: 0.0 });
    assert!(!page.is_polling());

    lifecycle.move_to_state(LifecycleState::Resumed).unwrap();
    assert!(page.is_polling());
}

#[test]
fn test_register_on_resumed_lifecycle_polls() {
    let (_looper, page) = one_second_page();
    page.set_images(["A", "B"]);
    let lifecycle = Lifecycle::new();
    lifecycle.move_to_state(LifecycleState::Resumed).unwrap();

    page.register_lifecycle_observer(&lifecycle);
    assert!(page.has_lifecycle());
    assert!(page.is_polling());
}

#[test]
fn test_destroy_detaches_for_good() {
    let (looper, page) = one_second_page();
    let selections = record_selections(&page);
    let lifecycle = Lifecycle::new();
    lifecycle.move_to_state(LifecycleState::Resumed).unwrap();
    page.register_lifecycle_observer(&lifecycle);
    page.set_images(["A", "B"]);
    assert!(page.is_polling());

    lifecycle.move_to_state(LifecycleState::Destroyed).unwrap();
    assert!(!page.is_attached());
    assert!(!page.has_lifecycle());
    assert_eq!(lifecycle.observer_count(), 0);

    looper.advance_by(SECOND * 5);
    assert_eq!(selections.borrow().len(), 1);
}

#[test]
fn test_register_on_destroyed_lifecycle() {
    let (_looper, page) = one_second_page();
    let lifecycle = Lifecycle::new();
    lifecycle.move_to_state(LifecycleState::Created).unwrap();
    lifecycle.move_to_state(LifecycleState::Destroyed).unwrap();

    page.register_lifecycle_observer(&lifecycle);
    page.set_images(["A", "B"]);
    assert!(!page.has_lifecycle());
    assert!(!page.is_attached());
    assert!(!page.is_polling());
}

#[test]
fn test_second_lifecycle_replaces_first() {
    let (_looper, page) = one_second_page();
    let first = Lifecycle::new();
    let second = Lifecycle::new();
    page.register_lifecycle_observer(&first);
    page.register_lifecycle_observer(&second);

    assert_eq!(first.observer_count(), 0);
    assert_eq!(second.observer_count(), 1);
}

#[test]
fn test_low_memory_event_forwarded() {
    let (_looper, page) = one_second_page();
    url_loader(&page);
    let lifecycle = Lifecycle::new();
    lifecycle.move_to_state(LifecycleState::Resumed).unwrap();
    page.register_lifecycle_observer(&lifecycle);
    page.set_images(["A", "B"]);
    page.set_current_item(6);

    lifecycle.handle_event(LifecycleEvent::LowMemory).unwrap();
    // Everything detached was reclaimed already
    assert_eq!(page.on_low_memory(), 0);
}

// =============================================================================
// Indicator & re-entrancy
// =============================================================================

#[test]
fn test_indicator_tracks_selection() {
    let (looper, page) = one_second_page();
    page.attach_indicator(DotIndicator::new(DotIndicatorConfig::default()));
    page.set_images(["A", "B", "C", "D"]);
    assert_eq!(page.with_indicator(|dots| dots.len()), Some(4));
    assert_eq!(page.with_indicator(|dots| dots.selected_index()), Some(Some(0)));

    looper.advance_by(SECOND * 5);
    assert_eq!(page.with_indicator(|dots| dots.selected_index()), Some(Some(1)));

    page.set_images(Vec::<String>::new());
    assert_eq!(page.with_indicator(|dots| dots.is_empty()), Some(true));
}

#[test]
fn test_listener_may_replace_images() {
    let (looper, page) = one_second_page();
    let page = Rc::new(page);
    let weak = Rc::downgrade(&page);
    let selections = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&selections);

    page.set_item_selected_listener(Some(move |prev: usize, cur: usize, count: usize| {
        sink.borrow_mut().push((prev, cur, count));
        if cur == 1 {
            if let Some(page) = weak.upgrade() {
                page.set_images(["X", "Y", "Z"]);
            }
        }
    }));
    page.set_images(["A", "B"]);
    looper.advance_by(SECOND);

    assert_eq!(
        *selections.borrow(),
        vec![(0, 0, 2), (0, 1, 2), (0, 0, 3)]
    );
    assert_eq!(page.image_count(), 3);
    assert_eq!(page.current_item(), 0);
}

#[test]
fn test_loader_may_query_page() {
    let (looper, page) = one_second_page();
    let page = Rc::new(page);
    let weak = Rc::downgrade(&page);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    page.set_image_loader(Some(move |surface: &mut PageSurface, url: &str| {
        if let Some(page) = weak.upgrade() {
            sink.borrow_mut()
                .push((url.to_string(), page.image_count(), page.real_position()));
        }
        surface.set_image_url(url);
    }));
    page.set_images(["A", "B"]);

    assert_eq!(
        *seen.borrow(),
        vec![("A".to_string(), 2, Some(0)), ("B".to_string(), 2, Some(0))]
    );
    assert_eq!(page.rendered_image(0).as_deref(), Some("A"));
    assert_eq!(page.rendered_image(1).as_deref(), Some("B"));

    looper.advance_by(SECOND);
    assert_eq!(page.rendered_image(2).as_deref(), Some("A"));
    assert_eq!(seen.borrow().last(), Some(&("A".to_string(), 2, Some(1))));
}

#[test]
fn test_loader_may_move_page() {
    let (_looper, page) = one_second_page();
    let page = Rc::new(page);
    let weak = Rc::downgrade(&page);

    page.set_image_loader(Some(move |surface: &mut PageSurface, url: &str| {
        surface.set_image_url(url);
        if url == "B" {
            if let Some(page) = weak.upgrade() {
                page.set_current_item(3);
            }
        }
    }));
    page.set_images(["A", "B"]);

    assert_eq!(page.current_item(), 3);
    assert_eq!(page.rendered_image(3).as_deref(), Some("B"));
    assert_eq!(page.rendered_image(4).as_deref(), Some("A"));
}
