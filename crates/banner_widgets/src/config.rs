//! Widget configuration
//!
//! Construction-time parameters for the scroll page and its dot indicator,
//! loadable from TOML:
//!
//! ```toml
//! rolling_frequency_secs = 5
//! offscreen_page_limit = 1
//! lock_single_page = false
//!
//! [indicator]
//! dot_size = 20
//! dot_margin = 10
//! dot_background = "default_dot_selector"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WidgetError};

// =============================================================================
// Scroll Page
// =============================================================================

/// Configuration for a [`ScrollPage`](crate::ScrollPage)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScrollPageConfig {
    /// Seconds between auto-advance ticks
    #[serde(default = "default_rolling_frequency_secs")]
    pub rolling_frequency_secs: u64,
    /// Pages kept instantiated on each side of the current page
    #[serde(default = "default_offscreen_page_limit")]
    pub offscreen_page_limit: usize,
    /// With exactly one image, report a single page (no swiping, no rolling)
    #[serde(default)]
    pub lock_single_page: bool,
    /// Drag distance (px) below which a touch counts as a tap
    #[serde(default = "default_touch_slop")]
    pub touch_slop: f32,
    /// Dot indicator appearance
    #[serde(default)]
    pub indicator: DotIndicatorConfig,
}

fn default_rolling_frequency_secs() -> u64 {
    5
}

fn default_offscreen_page_limit() -> usize {
    1
}

/// Largest accepted `offscreen_page_limit`
pub const MAX_OFFSCREEN_PAGE_LIMIT: usize = 16;

fn default_touch_slop() -> f32 {
    8.0
}

impl Default for ScrollPageConfig {
    fn default() -> Self {
        Self {
            rolling_frequency_secs: default_rolling_frequency_secs(),
            offscreen_page_limit: default_offscreen_page_limit(),
            lock_single_page: false,
            touch_slop: default_touch_slop(),
            indicator: DotIndicatorConfig::default(),
        }
    }
}

impl ScrollPageConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ScrollPageConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| WidgetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.rolling_frequency_secs == 0 {
            return Err(WidgetError::InvalidConfig {
                field: "rolling_frequency_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }
        if self.offscreen_page_limit > MAX_OFFSCREEN_PAGE_LIMIT {
            return Err(WidgetError::InvalidConfig {
                field: "offscreen_page_limit",
                reason: format!(
                    "must be at most {}, got {}",
                    MAX_OFFSCREEN_PAGE_LIMIT, self.offscreen_page_limit
                ),
            });
        }
        if !self.touch_slop.is_finite() || self.touch_slop < 0.0 {
            return Err(WidgetError::InvalidConfig {
                field: "touch_slop",
                reason: format!("must be a non-negative number, got {}", self.touch_slop),
            });
        }
        self.indicator.validate()
    }

    /// Interval between auto-advance ticks
    pub fn rolling_frequency(&self) -> Duration {
        Duration::from_secs(self.rolling_frequency_secs)
    }

    /// Set the auto-advance interval in seconds
    pub fn rolling_frequency_secs(mut self, secs: u64) -> Self {
        self.rolling_frequency_secs = secs;
        self
    }

    /// Set how many pages stay instantiated on each side
    ///
    /// 0 is treated as 1; values above [`MAX_OFFSCREEN_PAGE_LIMIT`] fail
    /// validation.
    pub fn offscreen_page_limit(mut self, limit: usize) -> Self {
        self.offscreen_page_limit = limit;
        self
    }

    /// Lock the pager to one page when there is exactly one image
    pub fn lock_single_page(mut self, lock: bool) -> Self {
        self.lock_single_page = lock;
        self
    }

    /// Set the dot indicator appearance
    pub fn indicator(mut self, indicator: DotIndicatorConfig) -> Self {
        self.indicator = indicator;
        self
    }
}

// =============================================================================
// Dot Indicator
// =============================================================================

/// Appearance of the dot indicator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DotIndicatorConfig {
    /// Dot width and height in pixels
    #[serde(default = "default_dot_size")]
    pub dot_size: u32,
    /// Leading margin before each dot in pixels
    #[serde(default = "default_dot_margin")]
    pub dot_margin: u32,
    /// Name of the state-list background drawn by each dot
    #[serde(default = "default_dot_background")]
    pub dot_background: String,
}

fn default_dot_size() -> u32 {
    20
}

fn default_dot_margin() -> u32 {
    10
}

fn default_dot_background() -> String {
    "default_dot_selector".to_string()
}

impl Default for DotIndicatorConfig {
    fn default() -> Self {
        Self {
            dot_size: default_dot_size(),
            dot_margin: default_dot_margin(),
            dot_background: default_dot_background(),
        }
    }
}

impl DotIndicatorConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.dot_size == 0 {
            return Err(WidgetError::InvalidConfig {
                field: "indicator.dot_size",
                reason: "must be at least 1 pixel".to_string(),
            });
        }
        if self.dot_background.trim().is_empty() {
            return Err(WidgetError::InvalidConfig {
                field: "indicator.dot_background",
                reason: "must name a background style".to_string(),
            });
        }
        Ok(())
    }

    /// Set the dot size
    pub fn dot_size(mut self, size: u32) -> Self {
        self.dot_size = size;
        self
    }

    /// Set the dot margin
    pub fn dot_margin(mut self, margin: u32) -> Self {
        self.dot_margin = margin;
        self
    }

    /// Set the dot background style
    pub fn dot_background(mut self, background: impl Into<String>) -> Self {
        self.dot_background = background.into();
        self
    }
}
