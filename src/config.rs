//! Layout and rendering settings.
//!
//! All lengths are in points (1/72 inch) except the chart raster size,
//! which is in pixels. Every field has a default, so a YAML file only needs
//! the values it changes:
//!
//! ```
//! use longan::RenderConfig;
//!
//! let config = RenderConfig::from_yaml_str("font_size: 10\nmargins:\n  left: 72\n").unwrap();
//! assert_eq!(config.font_size, 10.0);
//! assert_eq!(config.margins.left, 72.0);
//! assert_eq!(config.margins.right, 40.0);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::Size;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML: {0}")]
    Parse(String),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(40.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margins: Margins,
    pub font_size: f32,
    pub line_height: f32,
    /// Space after every image and table.
    pub block_gap: f32,
    pub cell_padding: f32,
    pub max_image_width: f32,
    pub max_image_height: f32,
    /// Raster size for charts without a drawing extent.
    pub chart_width: u32,
    pub chart_height: u32,
    /// Raster density for charts with a drawing extent.
    pub chart_pixels_per_point: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margins: Margins::default(),
            font_size: 12.0,
            line_height: 14.4,
            block_gap: 6.0,
            cell_padding: 4.0,
            max_image_width: 515.0,
            max_image_height: 692.0,
            chart_width: 800,
            chart_height: 600,
            chart_pixels_per_point: 2.0,
        }
    }
}

impl RenderConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject settings that leave no room for content.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("font_size", self.font_size),
            ("line_height", self.line_height),
            ("max_image_width", self.max_image_width),
            ("max_image_height", self.max_image_height),
            ("chart_pixels_per_point", self.chart_pixels_per_point),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }

        let non_negative = [
            ("margins.top", self.margins.top),
            ("margins.right", self.margins.right),
            ("margins.bottom", self.margins.bottom),
            ("margins.left", self.margins.left),
            ("block_gap", self.block_gap),
            ("cell_padding", self.cell_padding),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!("{} must not be negative, got {}", name, value)));
            }
        }

        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(ConfigError::Invalid("chart raster size must be non-zero".to_string()));
        }

        let content = self.content_size();
        if !content.is_positive() {
            return Err(ConfigError::Invalid(format!(
                "margins leave no content area on a {}x{} page",
                self.page_width, self.page_height
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn page_size(&self) -> Size {
        Size::new(self.page_width, self.page_height)
    }

    /// Page size minus the margins.
    pub fn content_size(&self) -> Size {
        Size::new(
            self.page_width - self.margins.left - self.margins.right,
            self.page_height - self.margins.top - self.margins.bottom,
        )
    }

    #[inline]
    pub fn content_width(&self) -> f32 {
        self.content_size().width
    }

    #[inline]
    pub fn content_height(&self) -> f32 {
        self.content_size().height
    }

    #[inline]
    pub fn max_image_size(&self) -> Size {
        Size::new(self.max_image_width, self.max_image_height)
    }

    /// Bottom edge of the content area.
    #[inline]
    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.margins.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.content_size(), Size::new(515.0, 762.0));
        assert_eq!(config.content_bottom(), 802.0);
    }

    #[test]
    fn test_partial_yaml() {
        let config = RenderConfig::from_yaml_str("max_image_width: 500\nmax_image_height: 400\n").unwrap();
        assert_eq!(config.max_image_size(), Size::new(500.0, 400.0));
        assert_eq!(config.page_width, 595.0);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = RenderConfig {
            chart_width: 320,
            ..RenderConfig::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(RenderConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_rejects_margins_that_fill_the_page() {
        let err = RenderConfig::from_yaml_str("page_width: 60\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_non_positive_values() {
        for yaml in ["line_height: 0", "font_size: -3", "margins:\n  top: -1", "chart_width: 0"] {
            assert!(
                matches!(RenderConfig::from_yaml_str(yaml), Err(ConfigError::Invalid(_))),
                "{yaml}"
            );
        }
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            RenderConfig::from_yaml_str("font_size: [1, 2"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = RenderConfig::from_file("/nonexistent/longan.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
