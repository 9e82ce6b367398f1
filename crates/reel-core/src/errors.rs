use crate::reel::ReelPhase;
use crate::symbols::SymbolId;
use reel_curve::CurveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Reel {reel} expects {expected} target symbols, got {found}")]
    TargetCount {
        reel: usize,
        expected: usize,
        found: usize,
    },
    #[error("Reel {reel} expects {expected} initial symbols, got {found}")]
    SlotCount {
        reel: usize,
        expected: usize,
        found: usize,
    },
    #[error("Reel {reel} cannot start a spin while {phase:?}")]
    Busy { reel: usize, phase: ReelPhase },
    #[error("Reel {reel} has an unusable curve: {source}")]
    Curve {
        reel: usize,
        #[source]
        source: CurveError,
    },
    #[error("Spin layout must be {rows}x{reels}, got {found_rows}x{found_reels}")]
    LayoutShape {
        rows: usize,
        reels: usize,
        found_rows: usize,
        found_reels: usize,
    },
    #[error("Reel {0} does not exist")]
    UnknownReel(usize),
    #[error("Symbol {symbol} at row {row}, reel {reel} is outside 0..{symbol_types}")]
    UnknownSymbol {
        row: usize,
        reel: usize,
        symbol: SymbolId,
        symbol_types: u32,
    },
    #[error("Machine cannot {action} while {state:?}")]
    MachineState {
        action: &'static str,
        state: crate::machine::MachineState,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} must not be zero")]
    Zero { field: &'static str },
    #[error("slots_per_reel ({slots}) must exceed visible_rows ({visible})")]
    TooFewSlots { slots: usize, visible: usize },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("spin distance {distance} px is shorter than the last page ({last_page} px)")]
    SpinTooShort { distance: f64, last_page: f64 },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
