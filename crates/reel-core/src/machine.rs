//! # Slot Machine
//!
//! Coordinates every reel of a machine through one spin.
//!
//! ## Responsibilities
//! - **Curves**: Builds the staggered standard curves and applies anticipation.
//!   Reels after an anticipating reel are pushed back by the same time so the
//!   stop order is preserved.
//! - **Ticking**: Updates reels in index order and collects their events.
//! - **Result**: Exposes the composed board once every reel stopped.

use crate::config::SlotConfig;
use crate::errors::ReelError;
use crate::reel::{ReelController, ReelEvent, ReelPhase, ReelSpinPlan, StopReport};
use crate::symbols::{SymbolId, SymbolSource};
use reel_curve::{create_anticipation_curve, create_standard_reel_curves, extend_curve_time_aligned};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum MachineState {
    Idle,
    Spinning,
    Stopped,
}

/// The outcome of a spin, decided before it starts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpinRequest {
    /// `final_layout[row][reel]`, top row first.
    pub final_layout: Vec<Vec<SymbolId>>,
    /// Reels that scroll extra symbols before stopping.
    #[serde(default)]
    pub anticipation_reels: BTreeSet<usize>,
}

impl SpinRequest {
    pub fn new(final_layout: Vec<Vec<SymbolId>>) -> Self {
        Self {
            final_layout,
            anticipation_reels: BTreeSet::new(),
        }
    }

    pub fn with_anticipation(mut self, reels: impl IntoIterator<Item = usize>) -> Self {
        self.anticipation_reels.extend(reels);
        self
    }
}

pub struct SlotMachine {
    config: SlotConfig,
    reels: Vec<ReelController>,
    symbols: Box<dyn SymbolSource>,
    state: MachineState,
    events: Vec<ReelEvent>,
    spin_time: f64,
}

impl SlotMachine {
    /// Creates an idle machine with random symbols on every reel.
    pub fn new(config: SlotConfig, mut symbols: Box<dyn SymbolSource>) -> Result<Self, ReelError> {
        config.validate()?;
        let layout = config.layout()?;
        let reels = (0..config.reel_count)
            .map(|i| ReelController::filled(i, layout, symbols.as_mut()))
            .collect();
        Ok(Self::assemble(config, reels, symbols))
    }

    /// Creates an idle machine showing `initial[row][reel]` in the visible rows.
    /// Hidden slots are drawn from `symbols`.
    pub fn with_initial_layout(
        config: SlotConfig,
        initial: &[Vec<SymbolId>],
        mut symbols: Box<dyn SymbolSource>,
    ) -> Result<Self, ReelError> {
        config.validate()?;
        check_shape(&config, initial)?;
        let layout = config.layout()?;
        let reels = (0..config.reel_count)
            .map(|i| {
                let column = (0..config.slots_per_reel)
                    .map(|j| match initial.get(j) {
                        Some(row) => row[i],
                        None => symbols.next_symbol(),
                    })
                    .collect();
                ReelController::new(i, layout, column)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::assemble(config, reels, symbols))
    }

    fn assemble(config: SlotConfig, reels: Vec<ReelController>, symbols: Box<dyn SymbolSource>) -> Self {
        Self {
            config,
            reels,
            symbols,
            state: MachineState::Idle,
            events: Vec::new(),
            spin_time: 0.0,
        }
    }

    #[instrument(level = "debug", skip(self, request), fields(anticipation = ?request.anticipation_reels))]
    pub fn spin(&mut self, request: SpinRequest) -> Result<(), ReelError> {
        if self.state != MachineState::Idle {
            return Err(ReelError::MachineState {
                action: "spin",
                state: self.state,
            });
        }
        check_shape(&self.config, &request.final_layout)?;
        check_symbols(&self.config, &request.final_layout)?;
        if let Some(&reel) = request
            .anticipation_reels
            .iter()
            .find(|&&reel| reel >= self.config.reel_count)
        {
            return Err(ReelError::UnknownReel(reel));
        }

        let pitch = self.config.symbol_pitch;
        let anticipation = self.config.anticipation_config();
        let mut shift = 0.0;
        let mut plans = Vec::with_capacity(self.reels.len());
        for (i, base) in create_standard_reel_curves(&self.config.curve_config())
            .into_iter()
            .enumerate()
        {
            let mut curve = if shift > 0.0 {
                extend_curve_time_aligned(&base, shift, pitch)
            } else {
                base
            };
            let is_anticipation = request.anticipation_reels.contains(&i);
            if is_anticipation {
                let extension = create_anticipation_curve(&curve, &anticipation);
                shift += extension.extra_time;
                curve = extension.curve;
            }
            debug!(reel = i, shift, is_anticipation, duration = curve.duration(), "reel plan");
            plans.push(ReelSpinPlan {
                curve,
                target_symbols: request.final_layout.iter().map(|row| row[i]).collect(),
                is_anticipation,
            });
        }

        for (reel, plan) in self.reels.iter_mut().zip(plans) {
            reel.start_spin(plan)?;
        }
        self.events.clear();
        self.spin_time = 0.0;
        self.state = MachineState::Spinning;
        info!(reels = self.reels.len(), "spin started");
        Ok(())
    }

    /// Advances every reel by `dt` seconds and returns this frame's events.
    pub fn update(&mut self, dt: f64) -> &[ReelEvent] {
        self.events.clear();
        if self.state != MachineState::Spinning {
            return &self.events;
        }
        self.spin_time += dt.max(0.0);
        for reel in &mut self.reels {
            reel.update(dt, self.symbols.as_mut(), &mut self.events);
        }
        if self.reels.iter().all(|reel| reel.phase() == ReelPhase::Stopped) {
            self.state = MachineState::Stopped;
            let corrections: usize = self.stop_reports().map(|r| r.corrections).sum();
            info!(spin_time = self.spin_time, corrections, "all reels stopped");
        }
        &self.events
    }

    /// Cuts every spinning reel short. Returns the events it fired.
    pub fn quick_stop(&mut self) -> &[ReelEvent] {
        self.events.clear();
        if self.state != MachineState::Spinning {
            return &self.events;
        }
        let stop_time = self.config.timing.quick_stop_time;
        let stopped = self
            .reels
            .iter_mut()
            .filter(|reel| reel.is_spinning())
            .map(|reel| reel.quick_stop(stop_time, &mut self.events))
            .filter(|&applied| applied)
            .count();
        debug!(stopped, stop_time, "quick stop");
        &self.events
    }

    /// Visible symbols as `board[row][reel]`.
    pub fn board(&self) -> Vec<Vec<SymbolId>> {
        let columns: Vec<Vec<SymbolId>> = self.reels.iter().map(ReelController::current_visible_symbols).collect();
        (0..self.config.visible_rows)
            .map(|row| columns.iter().map(|column| column[row]).collect())
            .collect()
    }

    /// Returns a stopped machine to idle and hands back the final board.
    pub fn finish(&mut self) -> Result<Vec<Vec<SymbolId>>, ReelError> {
        if self.state != MachineState::Stopped {
            return Err(ReelError::MachineState {
                action: "finish",
                state: self.state,
            });
        }
        for reel in &mut self.reels {
            reel.finish();
        }
        self.state = MachineState::Idle;
        Ok(self.board())
    }

    pub fn stop_reports(&self) -> impl Iterator<Item = &StopReport> {
        self.reels.iter().filter_map(ReelController::last_stop_report)
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn is_spinning(&self) -> bool {
        self.state == MachineState::Spinning
    }

    pub fn reels(&self) -> &[ReelController] {
        &self.reels
    }

    pub fn reel(&self, index: usize) -> Option<&ReelController> {
        self.reels.get(index)
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    /// Seconds since the current spin started.
    pub fn spin_time(&self) -> f64 {
        self.spin_time
    }
}

fn check_shape(config: &SlotConfig, layout: &[Vec<SymbolId>]) -> Result<(), ReelError> {
    let bad_row = layout.iter().find(|row| row.len() != config.reel_count);
    if layout.len() != config.visible_rows || bad_row.is_some() {
        return Err(ReelError::LayoutShape {
            rows: config.visible_rows,
            reels: config.reel_count,
            found_rows: layout.len(),
            found_reels: bad_row.or(layout.first()).map_or(0, Vec::len),
        });
    }
    Ok(())
}

fn check_symbols(config: &SlotConfig, layout: &[Vec<SymbolId>]) -> Result<(), ReelError> {
    for (row, symbols) in layout.iter().enumerate() {
        if let Some((reel, &symbol)) = symbols
            .iter()
            .enumerate()
            .find(|&(_, &symbol)| symbol >= config.symbol_types)
        {
            return Err(ReelError::UnknownSymbol {
                row,
                reel,
                symbol,
                symbol_types: config.symbol_types,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::RandomSymbols;

    fn machine() -> SlotMachine {
        SlotMachine::new(SlotConfig::default(), Box::new(RandomSymbols::seeded(13, 1))).unwrap()
    }

    fn layout() -> Vec<Vec<SymbolId>> {
        vec![vec![1, 2, 3, 4, 5], vec![6, 7, 8, 9, 10], vec![11, 12, 0, 1, 2]]
    }

    fn run(machine: &mut SlotMachine) -> Vec<ReelEvent> {
        let mut all = Vec::new();
        for _ in 0..100_000 {
            if !machine.is_spinning() {
                break;
            }
            all.extend_from_slice(machine.update(1.0 / 60.0));
        }
        all
    }

    #[test]
    fn test_spin_and_finish() {
        let mut machine = machine();
        machine.spin(SpinRequest::new(layout())).unwrap();
        let events = run(&mut machine);
        assert_eq!(machine.state(), MachineState::Stopped);
        assert_eq!(machine.board(), layout());

        let stops: Vec<usize> = events
            .iter()
            .filter(|e| matches!(e, ReelEvent::Stopped { .. }))
            .map(ReelEvent::reel)
            .collect();
        assert_eq!(stops, vec![0, 1, 2, 3, 4], "reels should stop left to right");

        assert_eq!(machine.finish().unwrap(), layout());
        assert_eq!(machine.state(), MachineState::Idle);
    }

    #[test]
    fn test_spin_rejects_bad_requests() {
        let mut machine = machine();
        assert!(matches!(
            machine.spin(SpinRequest::new(vec![vec![1, 2, 3, 4, 5]])),
            Err(ReelError::LayoutShape { found_rows: 1, .. })
        ));
        assert!(matches!(
            machine.spin(SpinRequest::new(layout()).with_anticipation([5])),
            Err(ReelError::UnknownReel(5))
        ));
        let mut unknown = layout();
        unknown[1][3] = 13;
        assert!(matches!(
            machine.spin(SpinRequest::new(unknown)),
            Err(ReelError::UnknownSymbol {
                row: 1,
                reel: 3,
                symbol: 13,
                symbol_types: 13
            })
        ));
        assert_eq!(machine.state(), MachineState::Idle);
        machine.spin(SpinRequest::new(layout())).unwrap();
        assert!(matches!(
            machine.spin(SpinRequest::new(layout())),
            Err(ReelError::MachineState { action: "spin", .. })
        ));
        assert!(machine.finish().is_err());
    }

    #[test]
    fn test_anticipation_delays_later_reels() {
        let mut plain = machine();
        plain.spin(SpinRequest::new(layout())).unwrap();
        let mut anticipating = machine();
        anticipating
            .spin(SpinRequest::new(layout()).with_anticipation([2]))
            .unwrap();

        let duration = |m: &SlotMachine, i: usize| m.reel(i).unwrap().state().total_duration;
        assert_eq!(duration(&plain, 1), duration(&anticipating, 1));
        let extra = duration(&anticipating, 2) - duration(&plain, 2);
        assert!(extra > 0.0);
        for i in 3..5 {
            let delta = duration(&anticipating, i) - duration(&plain, i);
            assert!((delta - extra).abs() < 1e-9, "reel {} should be delayed by {}, got {}", i, extra, delta);
        }

        run(&mut anticipating);
        assert_eq!(anticipating.board(), layout());
    }

    #[test]
    fn test_initial_layout_is_visible() {
        let machine =
            SlotMachine::with_initial_layout(SlotConfig::default(), &layout(), Box::new(RandomSymbols::seeded(13, 3)))
                .unwrap();
        assert_eq!(machine.board(), layout());
    }

    #[test]
    fn test_update_when_idle_is_empty() {
        let mut machine = machine();
        assert!(machine.update(0.5).is_empty());
        assert!(machine.quick_stop().is_empty());
    }
}
