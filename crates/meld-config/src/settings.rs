//! Editor settings: canvas geometry and interaction thresholds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Canvas geometry and pointer thresholds used by the routing editor.
///
/// Every field falls back to its default when missing from the file, so a
/// partial `settings.toml` only overrides what it names.
///
/// ```toml
/// pin_size = 20.0
/// drag_threshold = 6.0
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorSettings {
    /// Side length of a pin square.
    pub pin_size: f32,
    /// Width of the stroked band around a wire that counts as a hit.
    pub wire_hit_width: f32,
    /// Radius around each wire end where wire hits are ignored.
    pub endpoint_exclusion_radius: f32,
    /// Painted wire thickness.
    pub wire_stroke: f32,
    /// Pointer travel before a press on a wire or node becomes a drag.
    pub drag_threshold: f32,
    /// Minimum node width.
    pub node_width: f32,
    /// Node height for titles that fit on one line.
    pub node_height: f32,
    /// Horizontal space reserved per pin when sizing a node.
    pub pin_spacing: f32,
    /// Widest title width accounted for when sizing a node.
    pub title_clamp: f32,
    /// Node height used when the title is wider than `title_clamp`.
    pub tall_node_height: f32,
    /// Estimated width of one title character, for headless text measuring.
    pub char_width: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            pin_size: 16.0,
            wire_hit_width: 8.0,
            endpoint_exclusion_radius: 7.0,
            wire_stroke: 2.5,
            drag_threshold: 4.0,
            node_width: 100.0,
            node_height: 60.0,
            pin_spacing: 20.0,
            title_clamp: 300.0,
            tall_node_height: 100.0,
            char_width: 7.0,
        }
    }
}

impl EditorSettings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load settings from `path`, or the defaults when the file does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }
}
