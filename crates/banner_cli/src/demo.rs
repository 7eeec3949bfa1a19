//! The demo screen: one carousel, a dot indicator and a scripted timeline

use std::rc::{Rc, Weak};
use std::time::Duration;

use anyhow::{Context, Result};
use banner_platform::{Lifecycle, LifecycleState, Looper, TouchEvent};
use banner_widgets::prelude::*;
use tracing::{debug, info};

use crate::config::DemoConfig;

const SCREEN_WIDTH: f32 = 1080.0;
const BANNER_HEIGHT: f32 = 400.0;

/// A running demo screen
pub struct Demo {
    looper: Looper,
    lifecycle: Lifecycle,
    page: Rc<ScrollPage>,
}

impl Demo {
    /// Build the screen and queue its timeline
    pub fn new(config: DemoConfig) -> Result<Self> {
        let looper = Looper::new();
        let page = Rc::new(
            ScrollPage::new(looper.clone(), config.widget.clone())
                .context("Failed to create scroll page")?,
        );
        page.on_size_changed(SCREEN_WIDTH, BANNER_HEIGHT);
        page.attach_indicator(DotIndicator::new(config.widget.indicator.clone()));

        page.set_image_loader(Some(|surface: &mut PageSurface, url: &str| {
            debug!("loading {}", url);
            surface.set_image_url(url);
        }));
        page.set_item_clicked_listener(Some(|position: usize| {
            info!("clicked banner {}", position);
        }));

        let weak = Rc::downgrade(&page);
        page.set_item_selected_listener(Some(move |prev: usize, cur: usize, count: usize| {
            let dots = weak
                .upgrade()
                .and_then(|page| page.with_indicator(render_dots))
                .unwrap_or_default();
            info!("selected {} -> {} of {}  {}", prev, cur, count, dots);
        }));

        let lifecycle = Lifecycle::new();
        page.register_lifecycle_observer(&lifecycle);
        lifecycle
            .move_to_state(LifecycleState::Resumed)
            .context("Failed to resume demo screen")?;

        let demo = Self {
            looper,
            lifecycle,
            page,
        };
        demo.schedule_script(config)?;
        Ok(demo)
    }

    fn schedule_script(&self, config: DemoConfig) -> Result<()> {
        let script = config.script;
        self.page.set_images(script.initial_images);

        let page = Rc::downgrade(&self.page);
        self.looper
            .post_delayed(Duration::from_secs(script.clear_after_secs), move || {
                with_page(&page, |page| {
                    info!("clearing banners");
                    page.set_images(Vec::<String>::new());
                })
            })?;

        let page = Rc::downgrade(&self.page);
        let images = script.refill_images;
        self.looper
            .post_delayed(Duration::from_secs(script.refill_after_secs), move || {
                with_page(&page, |page| {
                    info!("showing {} banners", images.len());
                    page.set_images(images.iter().cloned());
                })
            })?;
        Ok(())
    }

    /// Queue a tap in the middle of the banner after `delay`
    pub fn tap_at(&self, delay: Duration) -> Result<()> {
        let page = Rc::downgrade(&self.page);
        self.looper.post_delayed(delay, move || {
            with_page(&page, |page| {
                let (x, y) = (SCREEN_WIDTH / 2.0, BANNER_HEIGHT / 2.0);
                page.dispatch_touch_event(&TouchEvent::Started { id: 0, x, y });
                page.dispatch_touch_event(&TouchEvent::Ended { id: 0, x, y });
            })
        })?;
        Ok(())
    }

    /// Run on the virtual clock until `end`, instantly
    pub fn run_virtual(&self, end: Duration) -> usize {
        self.looper.advance_to(end)
    }

    /// Run until `end`, sleeping between messages so it plays in real time
    pub async fn run_realtime(&self, end: Duration) -> usize {
        let mut delivered = 0;
        loop {
            let now = self.looper.now();
            let next = match self.looper.next_due() {
                Some(due) if due <= end => due,
                _ => {
                    tokio::time::sleep(end.saturating_sub(now)).await;
                    return delivered + self.looper.advance_to(end);
                }
            };
            tokio::time::sleep(next.saturating_sub(now)).await;
            delivered += self.looper.advance_to(next);
        }
    }

    /// Tear the screen down and report where it ended
    pub fn finish(self) -> Result<()> {
        info!(
            "finished at {:?}: banner {:?} of {}, timer {:?}",
            self.looper.now(),
            self.page.real_position(),
            self.page.image_count(),
            self.page.timer_state()
        );
        self.lifecycle
            .move_to_state(LifecycleState::Destroyed)
            .context("Failed to destroy demo screen")?;
        self.looper.quit();
        Ok(())
    }
}

fn with_page(page: &Weak<ScrollPage>, f: impl FnOnce(&ScrollPage)) {
    if let Some(page) = page.upgrade() {
        f(&page);
    }
}

/// Text rendering of the dot row, e.g. `o * o o`
fn render_dots(indicator: &DotIndicator) -> String {
    indicator
        .dots()
        .iter()
        .map(|dot| if dot.is_enabled() { "*" } else { "o" })
        .collect::<Vec<_>>()
        .join(" ")
}
