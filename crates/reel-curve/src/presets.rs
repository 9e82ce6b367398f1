//! # Reel Curve Presets
//!
//! Builds the motion curves that drive reels during a spin.
//!
//! ## Responsibilities
//! - **Standard spin**: One curve per reel, staggered stop times, total distance
//!   snapped to a whole number of symbols.
//! - **Transforms**: Anticipation extensions, time extensions for later reels,
//!   quick-stop curves.
//! - **Tooling**: Easing presets, validation and diagnostics.

use crate::curve::AnimationCurve;
use crate::easing::EasingType;
use crate::error::CurveError;
use crate::model::{InterpolationMode, Keyframe};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Number of linear sub-segments in the deceleration phase.
pub const DECELERATION_SEGMENTS: usize = 5;

/// Parameters of the standard staggered spin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardReelCurveConfig {
    /// Distance between two neighbouring slots (px).
    pub symbol_pitch: f64,
    /// Seconds spent reaching `normal_speed`.
    pub acceleration_time: f64,
    /// Cruise speed (px/s).
    pub normal_speed: f64,
    /// Cruise duration of reel 0 (s).
    pub normal_duration: f64,
    /// Seconds spent braking.
    pub deceleration_time: f64,
    /// Settle time appended after the last deceleration key.
    pub bounce_duration: f64,
    pub reel_count: usize,
    /// Extra cruise time added per reel index.
    pub stop_delay: f64,
}

impl Default for StandardReelCurveConfig {
    fn default() -> Self {
        Self {
            symbol_pitch: 110.0,
            acceleration_time: 0.3,
            normal_speed: 2000.0,
            normal_duration: 1.0,
            deceleration_time: 1.2,
            bounce_duration: 0.0,
            reel_count: 5,
            stop_delay: 0.15,
        }
    }
}

/// Distances shared by every reel of a standard spin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinDistances {
    pub acceleration: f64,
    pub normal: f64,
    /// Braking distance after absorbing the alignment error.
    pub deceleration: f64,
    /// Whole number of symbols travelled.
    pub symbol_count: f64,
    /// `symbol_count * symbol_pitch`.
    pub total: f64,
}

impl SpinDistances {
    /// Splits a standard spin into phase distances, snapping the total to the pitch.
    ///
    /// Rounding goes to the nearest symbol unless that would leave the
    /// deceleration phase with a negative distance.
    pub fn compute(config: &StandardReelCurveConfig) -> Self {
        let speed = config.normal_speed;
        let acceleration = 0.5 * speed * config.acceleration_time;
        let normal = speed * config.normal_duration;
        let raw_deceleration = 0.5 * speed * config.deceleration_time;
        let raw_total = acceleration + normal + raw_deceleration;

        let raw_symbols = raw_total / config.symbol_pitch;
        let mut symbol_count = raw_symbols.round();
        if symbol_count * config.symbol_pitch < acceleration + normal {
            warn!(raw_symbols, "rounding would reverse braking, rounding up instead");
            symbol_count = ((acceleration + normal) / config.symbol_pitch).ceil();
        }
        let total = symbol_count * config.symbol_pitch;

        debug!(
            raw_total,
            raw_symbols,
            symbol_count,
            total,
            error = total - raw_total,
            "aligned spin distance"
        );

        Self {
            acceleration,
            normal,
            deceleration: total - acceleration - normal,
            symbol_count,
            total,
        }
    }
}

/// Builds one curve per reel.
///
/// Every curve covers the same aligned distance; reel `i` cruises
/// `i * stop_delay` seconds longer so reels stop one after another.
#[instrument(level = "debug", skip(config), fields(reels = config.reel_count))]
pub fn create_standard_reel_curves(config: &StandardReelCurveConfig) -> Vec<AnimationCurve> {
    if config.acceleration_time <= 0.0 || config.normal_duration <= 0.0 || config.deceleration_time <= 0.0 {
        warn!(?config, "non-positive phase duration, curve times may collide");
    }

    let distances = SpinDistances::compute(config);
    let base_speed = config.normal_speed;

    (0..config.reel_count)
        .map(|reel| {
            let cruise = config.normal_duration + reel as f64 * config.stop_delay;
            let t1 = config.acceleration_time;
            let t2 = t1 + cruise;
            let v1 = distances.acceleration;
            let v2 = v1 + distances.normal;
            let cruise_speed = distances.normal / cruise;

            let mut keys = Vec::with_capacity(DECELERATION_SEGMENTS + 4);
            keys.push(Keyframe::new(0.0, 0.0, 0.0, base_speed * 0.5));
            keys.push(Keyframe::new(t1, v1, base_speed, cruise_speed));
            keys.push(Keyframe::new(t2, v2, cruise_speed, base_speed * 0.8));

            let time_step = config.deceleration_time / DECELERATION_SEGMENTS as f64;
            let distance_step = distances.deceleration / DECELERATION_SEGMENTS as f64;
            for i in 1..=DECELERATION_SEGMENTS {
                let speed = base_speed * (1.0 - i as f64 / DECELERATION_SEGMENTS as f64) * 0.5;
                let time = t2 + time_step * i as f64;
                if i < DECELERATION_SEGMENTS {
                    keys.push(Keyframe::new(time, v2 + distance_step * i as f64, speed, speed));
                } else {
                    keys.push(Keyframe::new(time, distances.total, speed, 0.0));
                }
            }

            if config.bounce_duration > 0.0 {
                let t3 = t2 + config.deceleration_time;
                keys.push(Keyframe::flat(t3 + config.bounce_duration, distances.total));
            }

            let curve = AnimationCurve::from_keys(keys, InterpolationMode::Linear);
            debug!(
                reel,
                duration = curve.duration(),
                distance = curve.final_value(),
                cruise_speed,
                "reel curve ready"
            );
            curve
        })
        .collect()
}

/// Easing strength of a quick-stop curve.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickStopEasing {
    #[default]
    Quad,
    Cubic,
    Quart,
}

impl QuickStopEasing {
    fn tangent_factor(self) -> f64 {
        match self {
            QuickStopEasing::Quad => 2.0,
            QuickStopEasing::Cubic => 2.5,
            QuickStopEasing::Quart => 3.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuickStopConfig {
    /// Distance to cover (px).
    pub stop_distance: f64,
    /// Seconds to cover it.
    pub stop_time: f64,
    #[serde(default)]
    pub easing: QuickStopEasing,
}

/// A Hermite ease-out from rest position to `stop_distance`.
pub fn create_quick_stop_curve(config: &QuickStopConfig) -> AnimationCurve {
    let out_tangent = config.stop_distance / config.stop_time * config.easing.tangent_factor();
    debug!(?config.easing, config.stop_time, config.stop_distance, "quick stop curve");
    AnimationCurve::from_keys(
        [
            Keyframe::new(0.0, 0.0, 0.0, out_tangent),
            Keyframe::flat(config.stop_time, config.stop_distance),
        ],
        InterpolationMode::Hermite,
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnticipationConfig {
    /// Additional symbols scrolled while anticipating.
    pub extra_symbols: u32,
    pub symbol_pitch: f64,
    /// Divides the extra time so anticipation does not last as long as cruising would.
    pub time_compression: f64,
}

impl Default for AnticipationConfig {
    fn default() -> Self {
        Self {
            extra_symbols: 3,
            symbol_pitch: 110.0,
            time_compression: 1.2,
        }
    }
}

/// A transformed curve together with what was added to it.
#[derive(Clone, Debug)]
pub struct CurveExtension {
    pub curve: AnimationCurve,
    pub extra_time: f64,
    pub extra_distance: f64,
}

/// Slope between keys 1 and 2, the cruise phase of a standard curve.
pub fn cruise_velocity(curve: &AnimationCurve) -> Option<f64> {
    let keys = curve.keys();
    if keys.len() < 3 {
        return None;
    }
    let (k1, k2) = (&keys[1], &keys[2]);
    Some((k2.value - k1.value) / (k2.time - k1.time))
}

/// Pushes the last two keys later and further by `extra_symbols` symbols.
pub fn create_anticipation_curve(base: &AnimationCurve, config: &AnticipationConfig) -> CurveExtension {
    let unchanged = || CurveExtension {
        curve: base.clone(),
        extra_time: 0.0,
        extra_distance: 0.0,
    };

    let velocity = match cruise_velocity(base) {
        Some(v) if v > 0.0 && v.is_finite() => v,
        Some(v) => {
            warn!(velocity = v, "anticipation needs a positive cruise velocity");
            return unchanged();
        }
        None => {
            warn!(keys = base.len(), "base curve has too few keys for anticipation");
            return unchanged();
        }
    };

    let extra_distance = config.extra_symbols as f64 * config.symbol_pitch;
    let extra_time = extra_distance / velocity / config.time_compression;

    let last = base.len() - 1;
    let keys = base.keys().iter().enumerate().map(|(i, key)| {
        if i + 1 >= last {
            Keyframe {
                time: key.time + extra_time,
                value: key.value + extra_distance,
                ..*key
            }
        } else {
            *key
        }
    });

    debug!(extra_distance, extra_time, velocity, "anticipation curve");
    CurveExtension {
        curve: AnimationCurve::from_keys(keys, base.mode()),
        extra_time,
        extra_distance,
    }
}

/// Shifts every key from the third onward by `extra_time` and the distance
/// cruised in that time.
pub fn extend_curve_time(base: &AnimationCurve, extra_time: f64) -> AnimationCurve {
    match cruise_velocity(base) {
        Some(velocity) => shift_from_cruise_end(base, extra_time, velocity * extra_time),
        None => base.clone(),
    }
}

/// Like [`extend_curve_time`], with the added distance rounded to whole symbols
/// so the curve still stops on a symbol boundary.
pub fn extend_curve_time_aligned(base: &AnimationCurve, extra_time: f64, symbol_pitch: f64) -> AnimationCurve {
    match cruise_velocity(base) {
        Some(velocity) => {
            let symbols = (velocity * extra_time / symbol_pitch).round();
            shift_from_cruise_end(base, extra_time, symbols * symbol_pitch)
        }
        None => base.clone(),
    }
}

fn shift_from_cruise_end(base: &AnimationCurve, extra_time: f64, extra_distance: f64) -> AnimationCurve {
    let keys = base.keys().iter().enumerate().map(|(i, key)| {
        if i >= 2 {
            Keyframe {
                time: key.time + extra_time,
                value: key.value + extra_distance,
                ..*key
            }
        } else {
            *key
        }
    });
    debug!(extra_time, extra_distance, "extended curve time");
    AnimationCurve::from_keys(keys, base.mode())
}

/// Builds one of the stock easing curves between two points.
pub fn create_easing_curve(
    easing: EasingType,
    start_time: f64,
    start_value: f64,
    end_time: f64,
    end_value: f64,
) -> AnimationCurve {
    match easing {
        EasingType::Linear => AnimationCurve::linear(start_time, start_value, end_time, end_value),
        EasingType::EaseIn => AnimationCurve::ease_in(start_time, start_value, end_time, end_value),
        EasingType::EaseOut => AnimationCurve::ease_out(start_time, start_value, end_time, end_value),
        EasingType::EaseInOut => AnimationCurve::ease_in_out(start_time, start_value, end_time, end_value),
    }
}

/// Lists every problem that makes a curve unusable as a spin curve.
pub fn validate_curve(curve: &AnimationCurve) -> Vec<CurveError> {
    let mut errors = Vec::new();
    if curve.len() < 2 {
        errors.push(CurveError::TooFewKeys { found: curve.len() });
    }
    for (i, pair) in curve.keys().windows(2).enumerate() {
        if pair[1].time <= pair[0].time {
            errors.push(CurveError::NonIncreasingTime {
                index: i + 1,
                time: pair[1].time,
            });
        }
        if pair[1].value < pair[0].value {
            errors.push(CurveError::DecreasingValue {
                index: i + 1,
                value: pair[1].value,
            });
        }
    }
    errors
}

/// Covered distance divided by duration (px/s).
pub fn average_speed(curve: &AnimationCurve) -> f64 {
    let (t0, t1) = curve.time_range();
    let (v0, v1) = curve.value_range();
    if t1 - t0 == 0.0 {
        return 0.0;
    }
    (v1 - v0) / (t1 - t0)
}

/// Logs a curve's keys at debug level.
pub fn describe_curve(curve: &AnimationCurve, name: &str) {
    let (t0, t1) = curve.time_range();
    let (v0, v1) = curve.value_range();
    debug!(
        name,
        keys = curve.len(),
        time = ?(t0, t1),
        value = ?(v0, v1),
        average_speed = average_speed(curve),
        "curve info"
    );
    for (i, key) in curve.keys().iter().enumerate() {
        debug!(
            name,
            index = i,
            time = key.time,
            value = key.value,
            in_tangent = key.in_tangent,
            out_tangent = key.out_tangent,
            "key"
        );
    }
}
