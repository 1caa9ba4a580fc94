use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::assets::color::{BackgroundColor, parse_hex_rgb};
use crate::foundation::error::{CollageError, CollageResult};
use crate::gesture::controller::DEFAULT_WHEEL_STEP;
use crate::render::compositor::CompositorStyle;

/// Overrides the decode pool size.
pub const ENV_DECODE_THREADS: &str = "COLLAGE_DECODE_THREADS";
/// Overrides the zoom change per wheel step.
pub const ENV_WHEEL_STEP: &str = "COLLAGE_WHEEL_STEP";

/// Tunables for a [`crate::CollageSession`].
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Slot border thickness in canvas pixels. `0` disables borders.
    pub border_width_px: f64,
    /// `#RGB` / `#RRGGBB`.
    pub border_color: String,
    pub wheel_step: f64,
    /// Background used by a fresh (or reset) session.
    pub default_background: String,
    /// Decode worker count. `None` uses rayon's default.
    pub decode_threads: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            border_width_px: 2.0,
            border_color: "#e5e7eb".to_owned(),
            wheel_step: DEFAULT_WHEEL_STEP,
            default_background: "#ffffff".to_owned(),
            decode_threads: None,
        }
    }
}

impl SessionConfig {
    pub fn from_json_str(json: &str) -> CollageResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> CollageResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read session config '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> CollageResult<()> {
        if !self.border_width_px.is_finite() || self.border_width_px < 0.0 {
            return Err(CollageError::validation(
                "config 'border_width_px' must be finite and >= 0",
            ));
        }
        if !self.wheel_step.is_finite() || self.wheel_step <= 0.0 {
            return Err(CollageError::validation(
                "config 'wheel_step' must be finite and > 0",
            ));
        }
        if self.decode_threads == Some(0) {
            return Err(CollageError::validation(
                "config 'decode_threads' must be >= 1 when set",
            ));
        }
        for (field, value) in [
            ("border_color", &self.border_color),
            ("default_background", &self.default_background),
        ] {
            if parse_hex_rgb(value).is_none() {
                return Err(CollageError::validation(format!(
                    "config '{field}' is not a #RGB or #RRGGBB color: '{value}'"
                )));
            }
        }
        Ok(())
    }

    /// Apply `COLLAGE_*` environment overrides. Unparseable or out-of-range values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(n) = lookup(ENV_DECODE_THREADS)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            self.decode_threads = Some(n);
        }
        if let Some(step) = lookup(ENV_WHEEL_STEP)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
        {
            self.wheel_step = step;
        }
        self
    }

    /// Border styling for the compositor. An unparseable color falls back to the stock border.
    pub fn compositor_style(&self) -> CompositorStyle {
        let stock = CompositorStyle::default();
        CompositorStyle {
            border_width: self.border_width_px,
            border_color: parse_hex_rgb(&self.border_color).unwrap_or(stock.border_color),
        }
    }

    pub fn background(&self) -> BackgroundColor {
        BackgroundColor::parse(self.default_background.as_str())
    }
}
