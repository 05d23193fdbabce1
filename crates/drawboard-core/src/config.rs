//! Board configuration.

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

/// A font the user can pick for text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontOption {
    pub label: String,
    /// CSS font-family stack.
    pub value: String,
}

impl FontOption {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Tunables of the whiteboard. Every field has a default, so a partial JSON
/// document only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub palette: Vec<String>,
    pub default_color: String,
    pub default_thickness: f64,
    pub min_thickness: f64,
    pub max_thickness: f64,
    pub fonts: Vec<FontOption>,
    pub default_font: String,
    pub hit_tolerance: f64,
    pub eraser_tolerance: f64,
    pub resize_handle_radius: f64,
    /// Shapes smaller than this on both axes are discarded on release.
    pub min_drawable_size: f64,
    pub fill_alpha: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
    pub default_zoom: f64,
}

const COMIC_STACK: &str = r#""Comic Sans MS", "Chalkboard SE", "Comic Neue", sans-serif"#;
const MONO_STACK: &str = r#""Menlo", "Monaco", "Courier New", monospace"#;
const SANS_STACK: &str = r#""Inter", "Helvetica Neue", "Arial", sans-serif"#;

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            palette: [
                "#6b7280", "#ef4444", "#f59e0b", "#10b981", "#3b82f6", "#9333ea", "#ec4899",
                "#ffffff",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            default_color: "#6b7280".to_string(),
            default_thickness: 3.0,
            min_thickness: 1.0,
            max_thickness: 16.0,
            fonts: vec![
                FontOption::new("Comic", COMIC_STACK),
                FontOption::new("Mono", MONO_STACK),
                FontOption::new("Sans", SANS_STACK),
            ],
            default_font: COMIC_STACK.to_string(),
            hit_tolerance: crate::hit_test::DEFAULT_HIT_TOLERANCE,
            eraser_tolerance: crate::hit_test::ERASER_TOLERANCE,
            resize_handle_radius: crate::hit_test::RESIZE_HANDLE_HIT_RADIUS,
            min_drawable_size: 2.0,
            fill_alpha: crate::color::FILL_ALPHA,
            min_zoom: crate::viewport::MIN_ZOOM_PERCENT,
            max_zoom: crate::viewport::MAX_ZOOM_PERCENT,
            zoom_step: crate::viewport::ZOOM_STEP_PERCENT,
            default_zoom: crate::viewport::DEFAULT_ZOOM_PERCENT,
        }
    }
}

impl BoardConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded board config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.palette.is_empty() {
            return Err(ConfigError::Invalid("palette is empty".into()));
        }
        if self.fonts.is_empty() {
            return Err(ConfigError::Invalid("font list is empty".into()));
        }
        if !(self.min_thickness > 0.0 && self.min_thickness <= self.max_thickness) {
            return Err(ConfigError::Invalid(format!(
                "thickness range {}..={} is invalid",
                self.min_thickness, self.max_thickness
            )));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..={} is invalid",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_step <= 0.0 {
            return Err(ConfigError::Invalid("zoom step must be positive".into()));
        }
        for (name, value) in [
            ("hit_tolerance", self.hit_tolerance),
            ("eraser_tolerance", self.eraser_tolerance),
            ("resize_handle_radius", self.resize_handle_radius),
        ] {
            if value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if self.min_drawable_size < 0.0 {
            return Err(ConfigError::Invalid("min_drawable_size must not be negative".into()));
        }
        if !(0.0..=1.0).contains(&self.fill_alpha) {
            return Err(ConfigError::Invalid("fill_alpha must be within 0..=1".into()));
        }
        Ok(())
    }

    /// Clamp a thickness into the configured range.
    pub fn clamp_thickness(&self, thickness: f64) -> f64 {
        if thickness.is_nan() {
            return self.default_thickness;
        }
        thickness.clamp(self.min_thickness, self.max_thickness)
    }
}
