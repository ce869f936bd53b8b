//! Engine configuration.
//!
//! Every field has a default so hosts can pass a partial JSON object (or
//! nothing at all) and get the stock site behaviour.

use serde::{Deserialize, Serialize};

use crate::error::{check_padding, MotionError};
use crate::spring::SpringConfig;
use crate::typewriter::TypewriterTimings;

/// Colour scheme requested by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Theme after `System` has been resolved against the platform preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl Theme {
    pub fn resolve(self, system_prefers_dark: bool) -> ResolvedTheme {
        match self {
            Theme::Light => ResolvedTheme::Light,
            Theme::Dark => ResolvedTheme::Dark,
            Theme::System if system_prefers_dark => ResolvedTheme::Dark,
            Theme::System => ResolvedTheme::Light,
        }
    }
}

/// Padding radii used when a binding does not pin its own.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingDefaults {
    pub button: f32,
    pub card: f32,
}

impl Default for PaddingDefaults {
    fn default() -> Self {
        Self {
            button: 50.0,
            card: 100.0,
        }
    }
}

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Theme,
    /// Only consulted when `theme` is `System`.
    pub system_prefers_dark: bool,
    /// Smoothing applied to scroll observations that ask for it.
    pub spring: SpringConfig,
    pub typewriter: TypewriterTimings,
    pub padding: PaddingDefaults,
    /// Upper bound on the frame delta fed to springs, so a backgrounded tab
    /// does not integrate one huge step when it comes back.
    pub max_frame_dt_ms: f64,
    /// Scale applied to the custom cursor while it hovers a tracked region.
    pub cursor_hover_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::System,
            system_prefers_dark: false,
            spring: SpringConfig::default(),
            typewriter: TypewriterTimings::default(),
            padding: PaddingDefaults::default(),
            max_frame_dt_ms: 100.0,
            cursor_hover_scale: 1.5,
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, MotionError> {
        let cfg: Config =
            serde_json::from_str(json).map_err(|e| MotionError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        self.spring.validate()?;
        self.typewriter.validate()?;
        check_padding(self.padding.button)?;
        check_padding(self.padding.card)?;
        if !(self.max_frame_dt_ms.is_finite() && self.max_frame_dt_ms > 0.0) {
            return Err(MotionError::Config(format!(
                "max_frame_dt_ms must be > 0, got {}",
                self.max_frame_dt_ms
            )));
        }
        if !(self.cursor_hover_scale.is_finite() && self.cursor_hover_scale > 0.0) {
            return Err(MotionError::Config(format!(
                "cursor_hover_scale must be > 0, got {}",
                self.cursor_hover_scale
            )));
        }
        Ok(())
    }

    pub fn resolved_theme(&self) -> ResolvedTheme {
        self.theme.resolve(self.system_prefers_dark)
    }
}
