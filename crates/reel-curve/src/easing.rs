use crate::curve::AnimationCurve;
use crate::model::{InterpolationMode, Keyframe};
use keyframe::EasingFunction;
use serde::{Deserialize, Serialize};

/// Supported easing functions for baked curves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl EasingFunction for EasingType {
    fn y(&self, x: f64) -> f64 {
        match self {
            EasingType::Linear => keyframe::functions::Linear.y(x),
            EasingType::EaseIn => keyframe::functions::EaseIn.y(x),
            EasingType::EaseOut => keyframe::functions::EaseOut.y(x),
            EasingType::EaseInOut => keyframe::functions::EaseInOut.y(x),
        }
    }
}

impl EasingType {
    /// Evaluates the easing at `x`, both input and output clamped to `[0, 1]`.
    pub fn eval(&self, x: f64) -> f64 {
        self.y(x.clamp(0.0, 1.0)).clamp(0.0, 1.0)
    }
}

/// Bakes an easing between two points into a Linear curve with `samples` segments.
///
/// The first and last keys are exactly the given endpoints, so the curve
/// completes at `end_value` without rounding drift.
pub fn bake_easing(
    easing: EasingType,
    start_time: f64,
    start_value: f64,
    end_time: f64,
    end_value: f64,
    samples: usize,
) -> AnimationCurve {
    let samples = samples.max(1);
    let duration = end_time - start_time;
    let delta = end_value - start_value;

    let mut keys = Vec::with_capacity(samples + 1);
    keys.push(Keyframe::flat(start_time, start_value));
    for i in 1..samples {
        let x = i as f64 / samples as f64;
        keys.push(Keyframe::flat(start_time + duration * x, start_value + delta * easing.eval(x)));
    }
    keys.push(Keyframe::flat(end_time, end_value));

    let mut previous = keys[0];
    for key in keys.iter_mut().skip(1) {
        let slope = (key.value - previous.value) / (key.time - previous.time);
        key.in_tangent = slope;
        previous = *key;
    }

    AnimationCurve::from_keys(keys, InterpolationMode::Linear)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            EasingType::Linear,
            EasingType::EaseIn,
            EasingType::EaseOut,
            EasingType::EaseInOut,
        ] {
            assert!(easing.eval(0.0).abs() < 1e-3, "{:?}", easing);
            assert!((easing.eval(1.0) - 1.0).abs() < 1e-3, "{:?}", easing);
        }
    }

    #[test]
    fn test_bake_hits_endpoints_exactly() {
        let curve = bake_easing(EasingType::EaseOut, 1.25, 330.0, 1.55, 990.0, 12);
        assert_eq!(curve.len(), 13);
        assert_eq!(curve.evaluate(1.25), 330.0);
        assert_eq!(curve.evaluate(1.55), 990.0);
        assert_eq!(curve.mode(), InterpolationMode::Linear);
    }

    #[test]
    fn test_bake_ease_out_is_monotonic() {
        let curve = bake_easing(EasingType::EaseOut, 0.0, 0.0, 1.0, 600.0, 16);
        let mut previous = f64::MIN;
        for i in 0..=100 {
            let v = curve.evaluate(i as f64 / 100.0);
            assert!(v >= previous, "not monotonic at step {}", i);
            previous = v;
        }
        // Ease-out covers more than half the distance by mid time.
        assert!(curve.evaluate(0.5) > 300.0);
    }
}
