//! # Configuration
//!
//! `SlotConfig` describes the machine: board shape, symbol pitch and spin timing.
//! Every field has a default, so a JSON file only needs the values it changes.

use crate::errors::ConfigError;
use crate::layout::ReelLayout;
use reel_curve::{AnticipationConfig, SpinDistances, StandardReelCurveConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    pub reel_count: usize,
    pub visible_rows: usize,
    /// Physical slots per reel, visible ones included.
    pub slots_per_reel: usize,
    /// Symbol ids are drawn from `0..symbol_types`.
    pub symbol_types: u32,
    /// Vertical distance between two slots (px).
    pub symbol_pitch: f64,
    pub timing: SpinTiming,
    pub anticipation: AnticipationSettings,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            reel_count: 5,
            visible_rows: 3,
            slots_per_reel: 6,
            symbol_types: 13,
            symbol_pitch: 110.0,
            timing: SpinTiming::default(),
            anticipation: AnticipationSettings::default(),
        }
    }
}

/// Durations in seconds, speed in px/s.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTiming {
    pub acceleration_time: f64,
    pub normal_speed: f64,
    pub normal_duration: f64,
    pub deceleration_time: f64,
    pub stop_delay: f64,
    pub bounce_duration: f64,
    pub quick_stop_time: f64,
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self {
            acceleration_time: 0.3,
            normal_speed: 2000.0,
            normal_duration: 1.5,
            deceleration_time: 1.2,
            stop_delay: 0.15,
            bounce_duration: 0.0,
            quick_stop_time: 0.3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnticipationSettings {
    pub extra_symbols: u32,
    pub time_compression: f64,
}

impl Default for AnticipationSettings {
    fn default() -> Self {
        Self {
            extra_symbols: 3,
            time_compression: 1.2,
        }
    }
}

impl SlotConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SlotConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), ?config, "loaded slot config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reel_count == 0 {
            return Err(ConfigError::Zero { field: "reel_count" });
        }
        if self.visible_rows == 0 {
            return Err(ConfigError::Zero { field: "visible_rows" });
        }
        if self.symbol_types == 0 {
            return Err(ConfigError::Zero { field: "symbol_types" });
        }
        if self.slots_per_reel <= self.visible_rows {
            return Err(ConfigError::TooFewSlots {
                slots: self.slots_per_reel,
                visible: self.visible_rows,
            });
        }

        let timing = &self.timing;
        for (field, value) in [
            ("symbol_pitch", self.symbol_pitch),
            ("normal_speed", timing.normal_speed),
            ("acceleration_time", timing.acceleration_time),
            ("normal_duration", timing.normal_duration),
            ("deceleration_time", timing.deceleration_time),
            ("quick_stop_time", timing.quick_stop_time),
            ("time_compression", self.anticipation.time_compression),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("stop_delay", timing.stop_delay),
            ("bounce_duration", timing.bounce_duration),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        let distance = SpinDistances::compute(&self.curve_config()).total;
        let last_page = self.layout()?.last_page_distance();
        if distance < last_page {
            return Err(ConfigError::SpinTooShort { distance, last_page });
        }
        Ok(())
    }

    pub fn layout(&self) -> Result<ReelLayout, ConfigError> {
        ReelLayout::new(self.slots_per_reel, self.visible_rows, self.symbol_pitch)
    }

    pub fn curve_config(&self) -> StandardReelCurveConfig {
        StandardReelCurveConfig {
            symbol_pitch: self.symbol_pitch,
            acceleration_time: self.timing.acceleration_time,
            normal_speed: self.timing.normal_speed,
            normal_duration: self.timing.normal_duration,
            deceleration_time: self.timing.deceleration_time,
            bounce_duration: self.timing.bounce_duration,
            reel_count: self.reel_count,
            stop_delay: self.timing.stop_delay,
        }
    }

    pub fn anticipation_config(&self) -> AnticipationConfig {
        AnticipationConfig {
            extra_symbols: self.anticipation.extra_symbols,
            symbol_pitch: self.symbol_pitch,
            time_compression: self.anticipation.time_compression,
        }
    }
}
