//! Dot indicator - one dot per image, the current one selected
//!
//! Dots are laid out left to right, each `dot_size` square with a leading
//! `dot_margin`. A dot is drawn with its background style in the *enabled*
//! state when selected and *disabled* otherwise.
//!
//! # Example
//!
//! ```rust
//! use banner_widgets::{DotIndicator, DotIndicatorConfig};
//!
//! let mut dots = DotIndicator::new(DotIndicatorConfig::default());
//! dots.set_selected(0, 2, 4);
//! assert_eq!(dots.len(), 4);
//! assert_eq!(dots.selected_index(), Some(2));
//! ```

use crate::config::DotIndicatorConfig;

/// A single dot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotView {
    id: u64,
    size: u32,
    left_margin: u32,
    background: String,
    enabled: bool,
}

impl DotView {
    /// Serial number; changes whenever the dot is rebuilt
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Width and height in pixels
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Leading margin in pixels
    pub fn left_margin(&self) -> u32 {
        self.left_margin
    }

    /// Background style name
    pub fn background(&self) -> &str {
        &self.background
    }

    /// Whether the dot is drawn as selected
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Row of page dots
#[derive(Debug, Clone)]
pub struct DotIndicator {
    config: DotIndicatorConfig,
    dots: Vec<DotView>,
    next_id: u64,
}

impl DotIndicator {
    /// Create an indicator with no dots
    pub fn new(config: DotIndicatorConfig) -> Self {
        Self {
            config,
            dots: Vec::new(),
            next_id: 0,
        }
    }

    /// Appearance in use
    pub fn config(&self) -> &DotIndicatorConfig {
        &self.config
    }

    /// Rebuild the row with `count` unselected dots
    ///
    /// Returns false (and touches nothing) if the count is unchanged.
    pub fn set_count(&mut self, count: usize) -> bool {
        if count == self.dots.len() {
            return false;
        }

        self.dots.clear();
        for _ in 0..count {
            let id = self.next_id;
            self.next_id += 1;
            self.dots.push(DotView {
                id,
                size: self.config.dot_size,
                left_margin: self.config.dot_margin,
                background: self.config.dot_background.clone(),
                enabled: false,
            });
        }
        tracing::debug!("dot indicator: rebuilt with {} dots", count);
        true
    }

    /// Move the selection from `previous` to `current`
    ///
    /// The row is resized to `count` first. Indices outside the row are
    /// ignored.
    pub fn set_selected(&mut self, previous: usize, current: usize, count: usize) {
        self.set_count(count);
        if let Some(dot) = self.dots.get_mut(previous) {
            dot.enabled = false;
        }
        if let Some(dot) = self.dots.get_mut(current) {
            dot.enabled = true;
        }
    }

    /// All dots, left to right
    pub fn dots(&self) -> &[DotView] {
        &self.dots
    }

    /// Number of dots
    pub fn len(&self) -> usize {
        self.dots.len()
    }

    /// Whether the row is empty
    pub fn is_empty(&self) -> bool {
        self.dots.is_empty()
    }

    /// Whether dot `index` is selected
    pub fn is_selected(&self, index: usize) -> bool {
        self.dots.get(index).is_some_and(|dot| dot.enabled)
    }

    /// First selected dot
    pub fn selected_index(&self) -> Option<usize> {
        self.dots.iter().position(|dot| dot.enabled)
    }

    /// Total width of the row in pixels
    pub fn measured_width(&self) -> u32 {
        let per_dot = self.config.dot_size + self.config.dot_margin;
        per_dot.saturating_mul(self.dots.len() as u32)
    }
}
