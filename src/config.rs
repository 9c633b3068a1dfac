//! View configuration for crack rendering.

use serde::{Deserialize, Serialize};

use crate::error::{CrackError, CrackResult};
use crate::filter::CycleRange;

/// Default number of formation-time color buckets.
pub const DEFAULT_TIME_BUCKETS: usize = 16;

/// How a crack icon is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconStyle {
    /// Outline only.
    #[default]
    Line,
    /// Filled solid.
    Filled,
}

/// What a crack's color class encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// One of four buckets, by bond family and failure mode.
    #[default]
    ByFailureKind,
    /// Position of the formation time within the selected time range.
    ByFormationTime,
}

/// Recognized rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrackViewConfig {
    pub icon_style: IconStyle,
    /// Scale applied to every crack radius. 0 means 1.0.
    pub icon_size_multiplier: f64,
    pub color_mode: ColorMode,
    /// Draw only cracks formed in this cycle window. `None` draws all.
    pub cycle_range: Option<CycleRange>,
    /// Number of buckets for `ColorMode::ByFormationTime`.
    pub time_buckets: usize,
}

impl Default for CrackViewConfig {
    fn default() -> Self {
        Self {
            icon_style: IconStyle::Line,
            icon_size_multiplier: 1.0,
            color_mode: ColorMode::ByFailureKind,
            cycle_range: None,
            time_buckets: DEFAULT_TIME_BUCKETS,
        }
    }
}

impl CrackViewConfig {
    /// Parse and validate a JSON view configuration. Missing keys default.
    pub fn from_json_str(json: &str) -> CrackResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CrackResult<()> {
        if !self.icon_size_multiplier.is_finite() || self.icon_size_multiplier < 0.0 {
            return Err(CrackError::InvalidConfig(format!(
                "icon_size_multiplier must be a non-negative number, got {}",
                self.icon_size_multiplier
            )));
        }
        if self.time_buckets == 0 {
            return Err(CrackError::InvalidConfig(
                "time_buckets must be at least 1".to_string(),
            ));
        }
        if let Some(range) = self.cycle_range {
            if range.min > range.max {
                return Err(CrackError::InvalidConfig(format!(
                    "cycle_range min {} exceeds max {}",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }

    /// The radius multiplier this view applies.
    pub fn effective_size_multiplier(&self) -> f64 {
        if self.icon_size_multiplier == 0.0 {
            1.0
        } else {
            self.icon_size_multiplier
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CrackViewConfig::from_json_str(
            r#"{"color_mode": "by_formation_time", "cycle_range": {"min": 5, "max": 9}}"#,
        )
        .unwrap();

        assert_eq!(config.color_mode, ColorMode::ByFormationTime);
        assert_eq!(config.cycle_range, Some(CycleRange::new(5, 9)));
        assert_eq!(config.icon_style, IconStyle::Line);
        assert_eq!(config.time_buckets, DEFAULT_TIME_BUCKETS);
    }

    #[test]
    fn test_zero_size_multiplier_means_one() {
        let config = CrackViewConfig {
            icon_size_multiplier: 0.0,
            ..Default::default()
        };
        assert_eq!(config.effective_size_multiplier(), 1.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            CrackViewConfig::from_json_str(r#"{"time_buckets": 0}"#),
            Err(CrackError::InvalidConfig(_))
        ));
        assert!(matches!(
            CrackViewConfig::from_json_str(r#"{"icon_size_multiplier": -2.0}"#),
            Err(CrackError::InvalidConfig(_))
        ));
        assert!(matches!(
            CrackViewConfig::from_json_str(r#"{"cycle_range": {"min": 9, "max": 1}}"#),
            Err(CrackError::InvalidConfig(_))
        ));
        assert!(matches!(
            CrackViewConfig::from_json_str(r#"{"icon_style": "dotted"}"#),
            Err(CrackError::Json(_))
        ));
    }
}
