//! Engine configuration.
//!
//! Every field has a built-in default; a JSON file only needs the keys it
//! overrides.

use crate::entitlements::Entitlements;
use crate::page::{DEFAULT_PAGE_HEIGHT, DEFAULT_PAGE_WIDTH, Page};
use crate::style::{InkStyle, SerializableColor};
use crate::view::{MAX_ZOOM, MIN_ZOOM, ViewTransform};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Canvas defaults for newly added pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageDefaults {
    pub width: f64,
    pub height: f64,
    pub background: SerializableColor,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            width: DEFAULT_PAGE_WIDTH,
            height: DEFAULT_PAGE_HEIGHT,
            background: SerializableColor::white(),
        }
    }
}

impl PageDefaults {
    /// Build an empty page from these defaults.
    pub fn new_page(&self) -> Page {
        Page::new(Size::new(self.width, self.height)).with_background(self.background)
    }
}

/// Zoom bounds for new views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewDefaults {
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

/// Starting ink for new sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InkDefaults {
    pub color: SerializableColor,
    pub width: f64,
    /// Point-reduction tolerance applied when a sketch is saved, in backing
    /// pixels. Zero keeps every recorded point.
    pub simplify_tolerance: f64,
}

impl Default for InkDefaults {
    fn default() -> Self {
        let ink = InkStyle::default();
        Self {
            color: ink.color,
            width: ink.width,
            simplify_tolerance: 0.5,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub page: PageDefaults,
    pub view: ViewDefaults,
    pub ink: InkDefaults,
    pub entitlements: Entitlements,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check sizes, zoom bounds and ink settings.
    pub fn validate(&self) -> ConfigResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.page.width) || !positive(self.page.height) {
            return Err(ConfigError::Invalid(format!(
                "page size must be positive, got {}x{}",
                self.page.width, self.page.height
            )));
        }
        if !positive(self.view.min_zoom) || !positive(self.view.max_zoom) || self.view.min_zoom > self.view.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds must satisfy 0 < min <= max, got [{}, {}]",
                self.view.min_zoom, self.view.max_zoom
            )));
        }
        if !positive(self.ink.width) {
            return Err(ConfigError::Invalid(format!("ink width must be positive, got {}", self.ink.width)));
        }
        if !self.ink.simplify_tolerance.is_finite() || self.ink.simplify_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "simplify tolerance must be zero or positive, got {}",
                self.ink.simplify_tolerance
            )));
        }
        Ok(())
    }

    /// A fresh view using the configured zoom bounds.
    pub fn new_view(&self) -> ViewTransform {
        ViewTransform::with_bounds(self.view.min_zoom, self.view.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entitlements::Limit;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.view.min_zoom, MIN_ZOOM);
        assert_eq!(config.entitlements.max_pages, Limit::Unlimited);
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_json(r#"{"entitlements": {"max_pages": 3, "max_upload_bytes": -1}, "ink": {"width": 8}}"#)
            .unwrap();
        assert_eq!(config.entitlements.max_pages, Limit::AtMost(3));
        assert!((config.ink.width - 8.0).abs() < f64::EPSILON);
        assert_eq!(config.ink.color, SerializableColor::black());
        assert_eq!(config.page, PageDefaults::default());
    }

    #[test]
    fn test_rejects_inverted_zoom() {
        let result = EngineConfig::from_json(r#"{"view": {"min_zoom": 2.0, "max_zoom": 1.0}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let result = EngineConfig::from_json(r#"{"ink": {"simplify_tolerance": -1}}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        let config = EngineConfig::from_json(r#"{"ink": {"simplify_tolerance": 0}}"#).unwrap();
        assert!(config.ink.simplify_tolerance.abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"page": {{"width": 800, "height": 600}}}}"#).unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        let page = config.page.new_page();
        assert_eq!(page.size(), Size::new(800.0, 600.0));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(EngineConfig::load("/nonexistent/markboard.json"), Err(ConfigError::Io(_))));
    }
}
