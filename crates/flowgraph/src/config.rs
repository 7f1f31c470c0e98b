// SPDX-License-Identifier: MIT OR Apache-2.0
//! Widget configuration.
//!
//! All fields have defaults, so a config file only needs to name what it
//! changes:
//!
//! ```ron
//! FlowGraphConfig(
//!     size: (1280.0, 720.0),
//!     zoom_anchor: Cursor,
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Where wheel zoom keeps the view fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZoomAnchor {
    /// Keep the pan origin fixed
    #[default]
    Origin,
    /// Keep the point under the pointer fixed
    Cursor,
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON for this config
    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be written as RON
    #[error("Could not serialize config: {0}")]
    Serialize(#[from] ron::Error),

    /// Values parse but make no sense together
    #[error("Invalid zoom range {min}..={max}")]
    ZoomRange {
        /// Lower bound
        min: f32,
        /// Upper bound
        max: f32,
    },

    /// Zoom step is zero, negative or not a number
    #[error("Invalid zoom step {0}")]
    ZoomStep(f32),
}

/// Options for a [`FlowGraph`](crate::widget::FlowGraph) instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowGraphConfig {
    /// Viewport width and height in screen pixels
    pub size: [f32; 2],
    /// Extent of the canvas, centred on the logical origin
    pub canvas_size: [f32; 2],
    /// Smallest zoom scale
    pub zoom_min: f32,
    /// Largest zoom scale
    pub zoom_max: f32,
    /// Scale change per wheel notch
    pub zoom_step: f32,
    /// Point kept fixed while zooming
    pub zoom_anchor: ZoomAnchor,
    /// Size of the context menu, used to keep it inside the viewport
    pub context_menu_size: [f32; 2],
    /// Downward offset of wire control points, in canvas units
    pub wire_droop: f32,
    /// Pick radius around port centres, in canvas units
    pub port_hit_radius: f32,
    /// Pick distance from a wire, in canvas units
    pub wire_hit_width: f32,
}

impl Default for FlowGraphConfig {
    fn default() -> Self {
        Self {
            size: [1280.0, 720.0],
            canvas_size: [8096.0, 8096.0],
            zoom_min: 0.4,
            zoom_max: 1.3,
            zoom_step: 0.05,
            zoom_anchor: ZoomAnchor::Origin,
            context_menu_size: [230.0, 200.0],
            wire_droop: 0.0,
            port_hit_radius: 9.0,
            wire_hit_width: 6.0,
        }
    }
}

impl FlowGraphConfig {
    /// Config with a given viewport size and defaults elsewhere
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            size: [width, height],
            ..Self::default()
        }
    }

    /// Parse a config from RON text
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::info!("Loaded flow graph config from {:?}", path);
        Ok(config)
    }

    /// Save the config to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Check that the values are usable together
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.zoom_min > 0.0 && self.zoom_min <= self.zoom_max) {
            return Err(ConfigError::ZoomRange {
                min: self.zoom_min,
                max: self.zoom_max,
            });
        }
        if self.zoom_step.is_nan() || self.zoom_step <= 0.0 {
            return Err(ConfigError::ZoomStep(self.zoom_step));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = FlowGraphConfig::from_ron("(size: (800.0, 600.0), zoom_anchor: Cursor)").unwrap();
        assert_eq!(config.size, [800.0, 600.0]);
        assert_eq!(config.zoom_anchor, ZoomAnchor::Cursor);
        assert_eq!(config.zoom_min, 0.4);
        assert_eq!(config.zoom_max, 1.3);
        assert_eq!(config.context_menu_size, [230.0, 200.0]);
    }

    #[test]
    fn test_config_ron_roundtrip() {
        let config = FlowGraphConfig {
            wire_droop: 25.0,
            ..FlowGraphConfig::with_size(640.0, 480.0)
        };
        let text = config.to_ron().unwrap();
        assert!(text.starts_with("FlowGraphConfig("));
        assert_eq!(FlowGraphConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_inverted_zoom_range() {
        let result = FlowGraphConfig::from_ron("(zoom_min: 2.0, zoom_max: 1.0)");
        assert!(matches!(result, Err(ConfigError::ZoomRange { .. })));
    }

    #[test]
    fn test_rejects_non_positive_zoom_step() {
        for text in ["(zoom_step: 0.0)", "(zoom_step: -0.05)"] {
            let result = FlowGraphConfig::from_ron(text);
            assert!(matches!(result, Err(ConfigError::ZoomStep(_))), "{text}");
        }
    }
}
