//! # Reel Engine
//!
//! Curve-driven slot machine reels that always stop on the requested symbols.
//!
//! This crate re-exports the two workspace libraries:
//!
//! *   [`curves`] (`reel-curve`): keyframe curves, easing, spin curve presets and
//!     the JSON curve loader.
//! *   [`reels`] (`reel-core`): slot trackers, reel controllers and the slot
//!     machine orchestrator.
//!
//! ```rust
//! use reel_engine::{RandomSymbols, SlotConfig, SlotMachine, SpinRequest};
//!
//! let config = SlotConfig { reel_count: 3, ..SlotConfig::default() };
//! let result = vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8]];
//! let mut machine = SlotMachine::new(config, Box::new(RandomSymbols::new(13))).unwrap();
//! machine.spin(SpinRequest::new(result.clone()).with_anticipation([2])).unwrap();
//! while machine.is_spinning() {
//!     for event in machine.update(1.0 / 60.0) {
//!         println!("{:?}", event);
//!     }
//! }
//! assert_eq!(machine.board(), result);
//! ```

pub use reel_core as reels;
pub use reel_curve as curves;

pub use reel_core::{
    MachineState, RandomSymbols, ReelController, ReelEvent, ReelPhase, ReelSpinPlan, SlotConfig,
    SlotMachine, SpinRequest, StopReport, SymbolId, SymbolSource,
};
pub use reel_curve::{AnimationCurve, CurveLoader, InterpolationMode, Keyframe};
