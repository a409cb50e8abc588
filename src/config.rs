//! Host-supplied engine configuration.
//!
//! The engine never loads configuration itself. The host hands it plain
//! data (optionally through the JSON helpers here) and the values flow
//! into the overlay and highlight registry as constructor arguments, so
//! the core stays testable without any environment setup.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::highlight::HighlightStyle;
use crate::overlay::OverlayConfig;
use crate::suffix::SuffixConfig;

/// Current configuration format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Engine configuration supplied by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Version of the configuration format
    pub version: u32,

    /// Author stamped on new annotations
    #[serde(default)]
    pub author: String,

    /// Suffix policy for finalized annotation text
    #[serde(default)]
    pub suffix: SuffixConfig,

    /// Minimum draw extent in view pixels
    #[serde(default = "default_min_drag_px")]
    pub min_drag_px: f32,

    /// Hit radius around a resize handle, in view pixels
    #[serde(default = "default_handle_hit_radius_px")]
    pub handle_hit_radius_px: f32,

    /// Maximum pointer travel for a press to count as a click
    #[serde(default = "default_click_epsilon_px")]
    pub click_epsilon_px: f32,

    /// Keep dragged annotations within the page bounds
    #[serde(default = "default_clamp_drag_to_page")]
    pub clamp_drag_to_page: bool,

    /// Default contents for new FreeText annotations
    #[serde(default)]
    pub free_text_default: Option<String>,

    /// Contents of stamp annotations
    #[serde(default = "default_stamp_text")]
    pub stamp_text: String,

    /// Default style for programmatic highlights
    #[serde(default)]
    pub highlight: HighlightStyle,
}

fn default_min_drag_px() -> f32 {
    constants::DEFAULT_MIN_DRAG_PX
}

fn default_handle_hit_radius_px() -> f32 {
    constants::DEFAULT_HANDLE_HIT_RADIUS_PX
}

fn default_click_epsilon_px() -> f32 {
    constants::DEFAULT_CLICK_EPSILON_PX
}

fn default_clamp_drag_to_page() -> bool {
    true
}

fn default_stamp_text() -> String {
    "APPROVED".to_string()
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            author: String::new(),
            suffix: SuffixConfig::default(),
            min_drag_px: default_min_drag_px(),
            handle_hit_radius_px: default_handle_hit_radius_px(),
            click_epsilon_px: default_click_epsilon_px(),
            clamp_drag_to_page: default_clamp_drag_to_page(),
            free_text_default: None,
            stamp_text: default_stamp_text(),
            highlight: HighlightStyle::default(),
        }
    }

    /// Build the overlay configuration these settings describe.
    pub fn overlay_config(&self) -> OverlayConfig {
        OverlayConfig {
            author: self.author.clone(),
            min_drag_px: self.min_drag_px,
            handle_hit_radius_px: self.handle_hit_radius_px,
            click_epsilon_px: self.click_epsilon_px,
            clamp_drag_to_page: self.clamp_drag_to_page,
            free_text_default: self.free_text_default.clone(),
            stamp_text: self.stamp_text.clone(),
            suffix: self.suffix.clone(),
        }
    }

    /// Default style for the highlight registry.
    pub fn highlight_style(&self) -> HighlightStyle {
        self.highlight.clone()
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when parsing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },
}
