//! # Reel Core
//!
//! Frame-driven slot machine reels that stop on a predetermined result.
//!
//! Each reel owns a ring of slots. A motion curve from `reel-curve` says how far
//! the reel has travelled at any time; slots derive their wrapped positions from
//! that distance and receive their final symbols as they scroll through the last
//! page, so the visible rows match the requested result exactly when the curve
//! ends.
//!
//! ## Usage
//!
//! ```rust
//! use reel_core::{RandomSymbols, SlotConfig, SlotMachine, SpinRequest};
//!
//! let mut machine = SlotMachine::new(SlotConfig::default(), Box::new(RandomSymbols::seeded(13, 7))).unwrap();
//! let result = vec![vec![1, 2, 3, 4, 5], vec![6, 7, 8, 9, 10], vec![11, 12, 0, 1, 2]];
//! machine.spin(SpinRequest::new(result.clone())).unwrap();
//! while machine.is_spinning() {
//!     machine.update(1.0 / 60.0);
//! }
//! assert_eq!(machine.finish().unwrap(), result);
//! ```

/// Machine configuration and its JSON loading.
pub mod config;

/// Error types for reels, machines and configuration.
pub mod errors;

/// Window geometry of a single reel.
pub mod layout;

/// Index and page arithmetic.
pub mod math;

/// The per-slot position tracker.
pub mod slot;

/// Symbol sources used to fill recycled slots.
pub mod symbols;

/// The per-reel controller and its events.
pub mod reel;

/// The multi-reel orchestrator.
pub mod machine;

pub use config::{AnticipationSettings, SlotConfig, SpinTiming};
pub use errors::{ConfigError, ReelError};
pub use layout::ReelLayout;
pub use machine::{MachineState, SlotMachine, SpinRequest};
pub use reel::{ReelController, ReelEvent, ReelPhase, ReelSpinPlan, ReelState, StopReport};
pub use slot::Slot;
pub use symbols::{RandomSymbols, SequenceSymbols, SymbolId, SymbolSource};
