//! Demo configuration file handling
//!
//! The demo reads one optional TOML file with two sections:
//! - `[widget]` - the scroll page configuration
//! - `[script]` - which banners to show and when to swap them

use anyhow::{Context, Result};
use banner_widgets::ScrollPageConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// =============================================================================
// Demo Configuration
// =============================================================================

/// Full demo configuration
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub widget: ScrollPageConfig,
    #[serde(default)]
    pub script: ScriptConfig,
}

/// Timeline of the demo screen
#[derive(Debug, Deserialize, Serialize)]
pub struct ScriptConfig {
    /// Banners shown on start
    #[serde(default = "default_initial_images")]
    pub initial_images: Vec<String>,
    /// When the banners are cleared (seconds)
    #[serde(default = "default_clear_after")]
    pub clear_after_secs: u64,
    /// Banners shown after the clear
    #[serde(default = "default_refill_images")]
    pub refill_images: Vec<String>,
    /// When the new banners appear (seconds)
    #[serde(default = "default_refill_after")]
    pub refill_after_secs: u64,
}

fn banner_url(n: usize) -> String {
    format!("https://img.example.com/banners/{n}.jpg")
}

fn default_initial_images() -> Vec<String> {
    (1..=2).map(banner_url).collect()
}

fn default_clear_after() -> u64 {
    2
}

fn default_refill_images() -> Vec<String> {
    (1..=4).map(banner_url).collect()
}

fn default_refill_after() -> u64 {
    5
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            initial_images: default_initial_images(),
            clear_after_secs: default_clear_after(),
            refill_images: default_refill_images(),
            refill_after_secs: default_refill_after(),
        }
    }
}

impl DemoConfig {
    /// Load the config file, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse and validate config text
    pub fn parse(content: &str) -> Result<Self> {
        let config: DemoConfig = toml::from_str(content).context("Failed to parse config")?;
        config.widget.validate()?;
        if config.script.refill_after_secs < config.script.clear_after_secs {
            anyhow::bail!(
                "script.refill_after_secs ({}) must not be before script.clear_after_secs ({})",
                config.script.refill_after_secs,
                config.script.clear_after_secs
            );
        }
        Ok(config)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
