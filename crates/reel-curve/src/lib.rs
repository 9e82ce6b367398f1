//! # Reel Curve
//!
//! Keyframe motion curves for slot machine reels.
//!
//! A curve maps elapsed seconds to travelled distance in pixels. Reels sample
//! their curve every frame and turn the distance into slot positions.
//!
//! ```rust
//! use reel_curve::{create_standard_reel_curves, StandardReelCurveConfig};
//!
//! let curves = create_standard_reel_curves(&StandardReelCurveConfig::default());
//! assert_eq!(curves.len(), 5);
//! // Every reel stops on a symbol boundary.
//! assert_eq!(curves[0].final_value() % 110.0, 0.0);
//! ```

/// Keyframe and document data types.
pub mod model;

/// The `AnimationCurve` type and its interpolation.
pub mod curve;

/// Easing functions and baking them into keyed curves.
pub mod easing;

/// Factory functions for spin, anticipation and quick-stop curves.
pub mod presets;

/// JSON import and export with a name cache.
pub mod loader;

pub mod error;

pub use curve::AnimationCurve;
pub use easing::{bake_easing, EasingType};
pub use error::CurveError;
pub use loader::CurveLoader;
pub use model::{CurveDocument, CurveLibrary, InterpolationMode, Keyframe};
pub use presets::{
    average_speed, create_anticipation_curve, create_easing_curve, create_quick_stop_curve,
    create_standard_reel_curves, cruise_velocity, describe_curve, extend_curve_time,
    extend_curve_time_aligned, validate_curve, AnticipationConfig, CurveExtension,
    QuickStopConfig, QuickStopEasing, SpinDistances, StandardReelCurveConfig,
};
