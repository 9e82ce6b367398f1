//! # Curve Module
//!
//! Keyframe curves sampled by time.
//!
//! ## Responsibilities
//! - **Storage**: Keys kept sorted by time after every structural edit.
//! - **Evaluation**: Hermite, linear or constant interpolation with boundary clamping.
//! - **Builders**: Linear, constant and ease presets used by tools and tests.
//!
//! ## Key Types
//! - `AnimationCurve`: The curve itself.

use crate::error::CurveError;
use crate::model::{CurveDocument, InterpolationMode, Keyframe};
use std::cell::Cell;
use tracing::warn;

/// A distance-over-time curve made of keyframes.
///
/// Evaluation never fails: an empty curve evaluates to `0.0` and a single-key
/// curve to that key's value.
#[derive(Clone, Debug, Default)]
pub struct AnimationCurve {
    keys: Vec<Keyframe>,
    mode: InterpolationMode,
    /// Segment used by the previous `evaluate` call.
    last_segment: Cell<usize>,
}

impl AnimationCurve {
    /// Creates an empty Hermite curve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a curve from keys in any order.
    pub fn from_keys(keys: impl IntoIterator<Item = Keyframe>, mode: InterpolationMode) -> Self {
        let mut curve = Self {
            keys: keys.into_iter().collect(),
            mode,
            last_segment: Cell::new(0),
        };
        curve.sort_keys();
        curve
    }

    /// Samples the curve at `time` (seconds).
    pub fn evaluate(&self, time: f64) -> f64 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        if self.keys.len() == 1 || time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        let segment = self.find_segment(time);
        self.last_segment.set(segment);

        let k0 = &self.keys[segment];
        let k1 = &self.keys[segment + 1];

        match self.mode {
            InterpolationMode::Hermite => hermite(k0, k1, time),
            InterpolationMode::Linear => linear(k0, k1, time),
            InterpolationMode::Constant => k0.value,
        }
    }

    /// Segment `i` covers `[keys[i].time, keys[i + 1].time)`.
    ///
    /// Only called with `first.time < time < last.time`.
    fn find_segment(&self, time: f64) -> usize {
        let cached = self.last_segment.get();
        if cached + 1 < self.keys.len() {
            let (start, end) = (self.keys[cached].time, self.keys[cached + 1].time);
            if time >= start && time < end {
                return cached;
            }
        }

        // Index of the first key strictly after `time`; the segment starts one before it.
        let idx = self.keys.partition_point(|k| k.time <= time);
        idx.saturating_sub(1).min(self.keys.len().saturating_sub(2))
    }

    fn sort_keys(&mut self) {
        self.keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        self.last_segment.set(0);
    }

    /// Inserts a key and re-sorts.
    pub fn add_key(&mut self, time: f64, value: f64, in_tangent: f64, out_tangent: f64) {
        self.keys.push(Keyframe::new(time, value, in_tangent, out_tangent));
        self.sort_keys();
    }

    /// Replaces the key at `index`. Out-of-range indices are ignored with a warning.
    pub fn move_key(&mut self, index: usize, key: Keyframe) {
        match self.keys.get_mut(index) {
            Some(slot) => {
                *slot = key;
                self.sort_keys();
            }
            None => warn!(index, len = self.keys.len(), "move_key: invalid key index"),
        }
    }

    /// Removes the key at `index`. Out-of-range indices are ignored with a warning.
    pub fn remove_key(&mut self, index: usize) {
        if index < self.keys.len() {
            self.keys.remove(index);
            self.sort_keys();
        } else {
            warn!(index, len = self.keys.len(), "remove_key: invalid key index");
        }
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn key(&self, index: usize) -> Option<Keyframe> {
        self.keys.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.last_segment.set(0);
    }

    pub fn mode(&self) -> InterpolationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InterpolationMode) {
        self.mode = mode;
    }

    /// Builder-style variant of [`set_mode`](Self::set_mode).
    pub fn with_mode(mut self, mode: InterpolationMode) -> Self {
        self.mode = mode;
        self
    }

    /// `(first time, last time)`, or `(0, 0)` when empty.
    pub fn time_range(&self) -> (f64, f64) {
        match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first.time, last.time),
            _ => (0.0, 0.0),
        }
    }

    /// `(min value, max value)` over all keys, or `(0, 0)` when empty.
    pub fn value_range(&self) -> (f64, f64) {
        let mut iter = self.keys.iter().map(|k| k.value);
        match iter.next() {
            Some(first) => iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))),
            None => (0.0, 0.0),
        }
    }

    /// Time of the last key.
    pub fn duration(&self) -> f64 {
        self.keys.last().map_or(0.0, |k| k.time)
    }

    /// Value of the last key, the distance covered once the curve completes.
    pub fn final_value(&self) -> f64 {
        self.keys.last().map_or(0.0, |k| k.value)
    }

    /// Checks that key times strictly increase.
    pub fn validate_times(&self) -> Result<(), CurveError> {
        for (index, pair) in self.keys.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(CurveError::NonIncreasingTime {
                    index: index + 1,
                    time: pair[1].time,
                });
            }
        }
        Ok(())
    }

    /// Straight line between two points; both tangents carry the slope.
    pub fn linear(start_time: f64, start_value: f64, end_time: f64, end_value: f64) -> Self {
        let slope = (end_value - start_value) / (end_time - start_time);
        Self::from_keys(
            [
                Keyframe::new(start_time, start_value, slope, slope),
                Keyframe::new(end_time, end_value, slope, slope),
            ],
            InterpolationMode::Hermite,
        )
    }

    /// A flat curve holding `value` for `duration` seconds.
    pub fn constant(value: f64, duration: f64) -> Self {
        Self::from_keys(
            [Keyframe::flat(0.0, value), Keyframe::flat(duration, value)],
            InterpolationMode::Constant,
        )
    }

    /// Slow start, fast arrival.
    pub fn ease_in(start_time: f64, start_value: f64, end_time: f64, end_value: f64) -> Self {
        let end_tangent = (end_value - start_value) / (end_time - start_time) * 2.0;
        Self::from_keys(
            [
                Keyframe::flat(start_time, start_value),
                Keyframe::new(end_time, end_value, end_tangent, end_tangent),
            ],
            InterpolationMode::Hermite,
        )
    }

    /// Fast start, slow arrival.
    pub fn ease_out(start_time: f64, start_value: f64, end_time: f64, end_value: f64) -> Self {
        let start_tangent = (end_value - start_value) / (end_time - start_time) * 2.0;
        Self::from_keys(
            [
                Keyframe::new(start_time, start_value, start_tangent, start_tangent),
                Keyframe::flat(end_time, end_value),
            ],
            InterpolationMode::Hermite,
        )
    }

    /// Slow start and arrival with a steeper midpoint.
    pub fn ease_in_out(start_time: f64, start_value: f64, end_time: f64, end_value: f64) -> Self {
        let tangent = (end_value - start_value) / (end_time - start_time) * 1.5;
        let mid_time = (start_time + end_time) / 2.0;
        let mid_value = (start_value + end_value) / 2.0;
        Self::from_keys(
            [
                Keyframe::new(start_time, start_value, 0.0, tangent),
                Keyframe::new(mid_time, mid_value, tangent, tangent),
                Keyframe::new(end_time, end_value, tangent, 0.0),
            ],
            InterpolationMode::Hermite,
        )
    }

    /// Converts the curve into its on-disk form.
    pub fn to_document(&self, name: impl Into<String>, description: Option<String>) -> CurveDocument {
        CurveDocument {
            name: name.into(),
            description,
            interpolation_mode: Some(self.mode),
            keyframes: self.keys.clone(),
            metadata: Default::default(),
        }
    }
}

impl From<&CurveDocument> for AnimationCurve {
    fn from(doc: &CurveDocument) -> Self {
        Self::from_keys(
            doc.keyframes.iter().copied(),
            doc.interpolation_mode.unwrap_or_default(),
        )
    }
}

/// Cubic Hermite interpolation with tangents scaled by the segment duration.
fn hermite(k0: &Keyframe, k1: &Keyframe, time: f64) -> f64 {
    let dt = k1.time - k0.time;
    let u = (time - k0.time) / dt;
    let u2 = u * u;
    let u3 = u2 * u;

    let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
    let h10 = u3 - 2.0 * u2 + u;
    let h01 = -2.0 * u3 + 3.0 * u2;
    let h11 = u3 - u2;

    let m0 = k0.out_tangent * dt;
    let m1 = k1.in_tangent * dt;

    h00 * k0.value + h10 * m0 + h01 * k1.value + h11 * m1
}

fn linear(k0: &Keyframe, k1: &Keyframe, time: f64) -> f64 {
    let u = (time - k0.time) / (k1.time - k0.time);
    k0.value + (k1.value - k0.value) * u
}
