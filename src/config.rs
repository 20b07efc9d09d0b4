use crate::data::ScoringError;
use crate::mask::{Kernel, SlopeRange};
use crate::time::Resolution;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Tuning knobs for the scoring engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SuggestionConfig {
    /// Minutes per interval; must divide a day.
    pub interval_minutes: u32,
    pub kernel: Kernel,
    pub working_hours_slope: SlopeRange,
    pub block_slope: SlopeRange,
    /// Busyness a single historical block adds to each interval it covers.
    pub block_heat: f64,
    pub lookback_days: u32,
    /// Search length when a request has no end.
    pub horizon_days: u32,
    /// Return overlapping suggestions instead of skipping them.
    pub allow_overlap: bool,
    /// Only blocks with recipients count towards historical busyness.
    pub meetings_only: bool,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        SuggestionConfig {
            interval_minutes: 15,
            kernel: Kernel::Sigmoid,
            working_hours_slope: SlopeRange(-2, 2),
            block_slope: SlopeRange(-2, 0),
            block_heat: 0.1,
            lookback_days: 90,
            horizon_days: 14,
            allow_overlap: false,
            meetings_only: false,
        }
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse::<T>().ok())
}

fn parsed_slope(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<SlopeRange> {
    let value = lookup(key)?;
    let (outward, inward) = value.split_once(',')?;

    Some(SlopeRange(
        outward.trim().parse().ok()?,
        inward.trim().parse().ok()?,
    ))
}

impl SuggestionConfig {
    /// Defaults overridden by `ZEITPLAN_*` environment variables. Values that
    /// do not parse are ignored.
    pub fn from_env() -> Self {
        SuggestionConfig::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `ZEITPLAN_*`
    /// keys.
    ///
    /// # Examples
    /// ```
    /// use zeitplan_slots::{Kernel, SlopeRange, SuggestionConfig};
    ///
    /// let config = SuggestionConfig::from_lookup(|key| match key {
    ///     "ZEITPLAN_INTERVAL_MINUTES" => Some("30".to_string()),
    ///     "ZEITPLAN_KERNEL" => Some("linear".to_string()),
    ///     "ZEITPLAN_BLOCK_SLOPE" => Some("-1, 0".to_string()),
    ///     "ZEITPLAN_LOOKBACK_DAYS" => Some("not a number".to_string()),
    ///     _ => None,
    /// });
    ///
    /// assert_eq!(config.interval_minutes, 30);
    /// assert_eq!(config.kernel, Kernel::Linear);
    /// assert_eq!(config.block_slope, SlopeRange(-1, 0));
    /// assert_eq!(config.lookback_days, 90);
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = SuggestionConfig::default();

        SuggestionConfig {
            interval_minutes: parsed(&lookup, "ZEITPLAN_INTERVAL_MINUTES")
                .unwrap_or(defaults.interval_minutes),
            kernel: lookup("ZEITPLAN_KERNEL")
                .and_then(|kernel| match kernel.trim().to_ascii_lowercase().as_str() {
                    "linear" => Some(Kernel::Linear),
                    "parabolic" => Some(Kernel::Parabolic),
                    "sigmoid" => Some(Kernel::Sigmoid),
                    _ => None,
                })
                .unwrap_or(defaults.kernel),
            working_hours_slope: parsed_slope(&lookup, "ZEITPLAN_WORKING_HOURS_SLOPE")
                .unwrap_or(defaults.working_hours_slope),
            block_slope: parsed_slope(&lookup, "ZEITPLAN_BLOCK_SLOPE")
                .unwrap_or(defaults.block_slope),
            block_heat: parsed(&lookup, "ZEITPLAN_BLOCK_HEAT").unwrap_or(defaults.block_heat),
            lookback_days: parsed(&lookup, "ZEITPLAN_LOOKBACK_DAYS")
                .unwrap_or(defaults.lookback_days),
            horizon_days: parsed(&lookup, "ZEITPLAN_HORIZON_DAYS")
                .unwrap_or(defaults.horizon_days),
            allow_overlap: parsed(&lookup, "ZEITPLAN_ALLOW_OVERLAP")
                .unwrap_or(defaults.allow_overlap),
            meetings_only: parsed(&lookup, "ZEITPLAN_MEETINGS_ONLY")
                .unwrap_or(defaults.meetings_only),
        }
    }

    pub fn resolution(&self) -> Result<Resolution, ScoringError> {
        Resolution::new(self.interval_minutes)
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        self.resolution()?;
        self.working_hours_slope.validate()?;
        self.block_slope.validate()?;

        if !self.block_heat.is_finite() || self.block_heat < 0.0 {
            return Err(ScoringError::invalid(format!(
                "block heat {} must be a non-negative number",
                self.block_heat
            )));
        }

        Ok(())
    }
}
