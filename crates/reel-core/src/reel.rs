//! # Reel Controller
//!
//! Drives the slots of one reel from a motion curve and lands a predetermined
//! set of symbols in the visible rows.
//!
//! ## Responsibilities
//! - **Motion**: Samples the curve once per frame and moves every slot.
//! - **Content**: Chooses a symbol each time a slot wraps. Slots that wrap during
//!   the last page receive their target symbol, everything else gets filler.
//! - **Stop**: Snaps to the final distance, aligns the stop slot with row 0 and
//!   verifies the visible rows against the targets.
//! - **Events**: One-shot slow-down and bounce cues, then `Stopped`.
//!
//! ## Key Types
//! - `ReelController`: The per-reel state machine.
//! - `ReelSpinPlan`: Curve and targets for one spin.
//! - `ReelEvent`: Cues emitted from `update`.

use crate::errors::ReelError;
use crate::layout::ReelLayout;
use crate::math::{symbols_in, wrap_index};
use crate::slot::Slot;
use crate::symbols::{SymbolId, SymbolSource};
use reel_curve::{bake_easing, AnimationCurve, CurveError, EasingType};
use serde::Serialize;
use tracing::{debug, error, instrument, trace, warn};

/// Linear segments used to bake a quick-stop ease-out.
const QUICK_STOP_SAMPLES: usize = 12;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ReelPhase {
    Idle,
    Spinning,
    Stopped,
}

/// Everything a reel needs to run one spin.
#[derive(Clone, Debug)]
pub struct ReelSpinPlan {
    pub curve: AnimationCurve,
    /// Symbols for the visible rows, top row first.
    pub target_symbols: Vec<SymbolId>,
    /// Anticipating reels hold the bounce cue until they stop.
    pub is_anticipation: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReelEvent {
    SlowDownStart { reel: usize },
    BounceBack { reel: usize },
    Stopped { reel: usize },
}

impl ReelEvent {
    pub fn reel(&self) -> usize {
        match *self {
            ReelEvent::SlowDownStart { reel } | ReelEvent::BounceBack { reel } | ReelEvent::Stopped { reel } => reel,
        }
    }
}

/// Spin bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReelState {
    /// Slot that will sit in row 0 when the current spin stops.
    pub stop_index: usize,
    /// Slot that sat in row 0 when the current spin started.
    pub last_stop_index: usize,
    pub total_distance: f64,
    pub total_duration: f64,
    pub elapsed: f64,
    pub last_sampled_distance: f64,
    /// Whole symbols the current spin scrolls past.
    pub rotated_slots: i64,
}

/// What the stop sequence had to fix.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StopReport {
    pub reel: usize,
    /// Shift applied to every slot to put the stop slot exactly on row 0.
    pub alignment_offset: f64,
    /// Visible slots whose symbol had to be overwritten with the target.
    pub corrections: usize,
    /// Wraps counted across all slots during the spin.
    pub page_changes: u64,
    pub rotated_slots: i64,
}

#[derive(Clone, Copy, Debug, Default)]
struct OneShot {
    armed: bool,
    at: Option<f64>,
    fired: bool,
}

impl OneShot {
    /// Fires at `at`, or never when `None`.
    fn at(at: Option<f64>) -> Self {
        Self {
            armed: at.is_some(),
            at,
            fired: false,
        }
    }

    /// Fires only when the spin completes.
    fn at_completion() -> Self {
        Self {
            armed: true,
            at: None,
            fired: false,
        }
    }

    /// Fires once when `elapsed` reaches the armed time.
    fn poll(&mut self, elapsed: f64) -> bool {
        match self.at {
            Some(at) if !self.fired && elapsed >= at => {
                self.fired = true;
                true
            }
            _ => false,
        }
    }

    /// Fires if armed and not already fired, regardless of time.
    fn flush(&mut self) -> bool {
        if self.armed && !self.fired {
            self.fired = true;
            return true;
        }
        false
    }
}

/// When the slow-down and bounce cues fire for a curve.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CueTimes {
    slow_down: Option<f64>,
    bounce: Option<f64>,
}

impl CueTimes {
    /// The bounce fires on the key where the curve reaches its final distance,
    /// trailing settle keys excluded. Slow-down fires one key earlier.
    fn of(curve: &AnimationCurve) -> Self {
        let keys = curve.keys();
        if keys.len() < 2 {
            return Self {
                slow_down: None,
                bounce: None,
            };
        }
        let total = curve.final_value();
        let mut arrival = keys.len() - 1;
        while arrival > 1 && (keys[arrival - 1].value - total).abs() < 1e-9 {
            arrival -= 1;
        }
        Self {
            slow_down: (arrival >= 2).then(|| keys[arrival - 1].time),
            bounce: Some(keys[arrival].time),
        }
    }
}

pub struct ReelController {
    reel_index: usize,
    layout: ReelLayout,
    slots: Vec<Slot>,
    phase: ReelPhase,
    curve: AnimationCurve,
    targets: Vec<SymbolId>,
    is_anticipation: bool,
    state: ReelState,
    slow_down: OneShot,
    bounce: OneShot,
    deferred: Vec<usize>,
    last_report: Option<StopReport>,
}

impl ReelController {
    /// Creates an idle reel with `initial_symbols[j]` in slot `j`.
    ///
    /// Slot `j` starts in visible row `j` for `j < visible_rows`.
    pub fn new(reel_index: usize, layout: ReelLayout, initial_symbols: Vec<SymbolId>) -> Result<Self, ReelError> {
        if initial_symbols.len() != layout.slot_count() {
            return Err(ReelError::SlotCount {
                reel: reel_index,
                expected: layout.slot_count(),
                found: initial_symbols.len(),
            });
        }
        Ok(Self::build(reel_index, layout, initial_symbols))
    }

    /// Creates an idle reel with every slot drawn from `symbols`.
    pub fn filled(reel_index: usize, layout: ReelLayout, symbols: &mut dyn SymbolSource) -> Self {
        let initial = (0..layout.slot_count()).map(|_| symbols.next_symbol()).collect();
        Self::build(reel_index, layout, initial)
    }

    fn build(reel_index: usize, layout: ReelLayout, initial_symbols: Vec<SymbolId>) -> Self {
        let (min, max) = (layout.min_scope_y(), layout.max_scope_y());
        let slots = initial_symbols
            .into_iter()
            .enumerate()
            .map(|(j, symbol)| Slot::new(j, symbol, layout.initial_slot_y(j), min, max))
            .collect();

        Self {
            reel_index,
            layout,
            slots,
            phase: ReelPhase::Idle,
            curve: AnimationCurve::new(),
            targets: Vec::new(),
            is_anticipation: false,
            state: ReelState::default(),
            slow_down: OneShot::default(),
            bounce: OneShot::default(),
            deferred: Vec::with_capacity(layout.slot_count()),
            last_report: None,
        }
    }

    #[instrument(level = "debug", skip(self, plan), fields(reel = self.reel_index, anticipation = plan.is_anticipation))]
    pub fn start_spin(&mut self, plan: ReelSpinPlan) -> Result<(), ReelError> {
        if self.phase == ReelPhase::Spinning {
            return Err(ReelError::Busy {
                reel: self.reel_index,
                phase: self.phase,
            });
        }
        if plan.target_symbols.len() != self.layout.visible_rows() {
            return Err(ReelError::TargetCount {
                reel: self.reel_index,
                expected: self.layout.visible_rows(),
                found: plan.target_symbols.len(),
            });
        }
        if plan.curve.len() < 2 {
            return Err(ReelError::Curve {
                reel: self.reel_index,
                source: CurveError::TooFewKeys { found: plan.curve.len() },
            });
        }
        plan.curve.validate_times().map_err(|source| ReelError::Curve {
            reel: self.reel_index,
            source,
        })?;

        let pitch = self.layout.pitch();
        let total_distance = plan.curve.final_value();
        let rotated = symbols_in(total_distance, pitch);
        if (total_distance - rotated as f64 * pitch).abs() > 1e-6 {
            warn!(
                reel = self.reel_index,
                total_distance,
                pitch,
                "spin distance is not a whole number of symbols"
            );
        }
        if total_distance < self.layout.last_page_distance() {
            warn!(
                reel = self.reel_index,
                total_distance,
                last_page = self.layout.last_page_distance(),
                "spin too short to recycle the visible rows"
            );
        }

        let (min, max) = (self.layout.min_scope_y(), self.layout.max_scope_y());
        for slot in &mut self.slots {
            slot.record_position(min, max);
        }

        let last_stop_index = self.state.stop_index;
        self.state = ReelState {
            stop_index: wrap_index(last_stop_index as i64 + rotated, self.layout.slot_count()),
            last_stop_index,
            total_distance,
            total_duration: plan.curve.duration(),
            elapsed: 0.0,
            last_sampled_distance: 0.0,
            rotated_slots: rotated,
        };

        let cues = CueTimes::of(&plan.curve);
        self.slow_down = OneShot::at(cues.slow_down);
        self.bounce = if plan.is_anticipation {
            OneShot::at_completion()
        } else {
            OneShot::at(cues.bounce)
        };

        self.curve = plan.curve;
        self.targets = plan.target_symbols;
        self.is_anticipation = plan.is_anticipation;
        self.last_report = None;
        self.phase = ReelPhase::Spinning;

        debug!(
            reel = self.reel_index,
            total_distance,
            duration = self.state.total_duration,
            rotated,
            stop_index = self.state.stop_index,
            "spin started"
        );
        Ok(())
    }

    /// Advances the spin by `dt` seconds, pushing any cues into `events`.
    ///
    /// Does nothing unless spinning.
    pub fn update(&mut self, dt: f64, symbols: &mut dyn SymbolSource, events: &mut Vec<ReelEvent>) {
        if self.phase != ReelPhase::Spinning {
            return;
        }
        self.state.elapsed += dt.max(0.0);

        if self.state.elapsed >= self.state.total_duration {
            self.complete(symbols, events);
            return;
        }

        let distance = self.curve.evaluate(self.state.elapsed);
        self.advance_slots(distance, symbols);

        let reel = self.reel_index;
        if self.slow_down.poll(self.state.elapsed) {
            events.push(ReelEvent::SlowDownStart { reel });
        }
        if self.bounce.poll(self.state.elapsed) {
            events.push(ReelEvent::BounceBack { reel });
        }
    }

    /// Replaces the rest of the spin with a short ease-out.
    ///
    /// The reel keeps scrolling one full ring past the next symbol boundary so
    /// every visible slot is recycled once more. Returns `false` when the reel is
    /// not spinning or the current plan already ends sooner.
    pub fn quick_stop(&mut self, stop_time: f64, events: &mut Vec<ReelEvent>) -> bool {
        if self.phase != ReelPhase::Spinning {
            return false;
        }
        if stop_time.is_nan() || stop_time <= 0.0 {
            warn!(reel = self.reel_index, stop_time, "quick stop needs a positive duration");
            return false;
        }

        let pitch = self.layout.pitch();
        let current = self.state.last_sampled_distance;
        let target = ((current / pitch).ceil() + self.layout.slot_count() as f64) * pitch;
        let start = self.state.elapsed;
        let end = start + stop_time;
        if target >= self.state.total_distance || end >= self.state.total_duration {
            debug!(
                reel = self.reel_index,
                target,
                total = self.state.total_distance,
                "quick stop would not shorten the spin"
            );
            return false;
        }

        let curve = bake_easing(EasingType::EaseOut, start, current, end, target, QUICK_STOP_SAMPLES);
        let rotated = symbols_in(target, pitch);
        self.state.total_distance = target;
        self.state.total_duration = end;
        self.state.rotated_slots = rotated;
        self.state.stop_index = wrap_index(
            self.state.last_stop_index as i64 + rotated,
            self.layout.slot_count(),
        );

        if self.slow_down.flush() {
            events.push(ReelEvent::SlowDownStart { reel: self.reel_index });
        }
        if !self.is_anticipation && !self.bounce.fired {
            self.bounce = OneShot::at(CueTimes::of(&curve).bounce);
        }
        self.curve = curve;

        debug!(
            reel = self.reel_index,
            from = current,
            to = target,
            stop_time,
            stop_index = self.state.stop_index,
            "quick stop"
        );
        true
    }

    /// Returns a stopped reel to idle.
    pub fn finish(&mut self) {
        match self.phase {
            ReelPhase::Stopped => self.phase = ReelPhase::Idle,
            phase => warn!(reel = self.reel_index, ?phase, "finish ignored"),
        }
    }

    fn advance_slots(&mut self, distance: f64, symbols: &mut dyn SymbolSource) {
        self.state.last_sampled_distance = distance;
        let remaining = self.state.total_distance - distance;
        let last_page = self.layout.last_page_distance();

        self.deferred.clear();
        for slot in self.slots.iter_mut() {
            if !slot.move_distance(distance) {
                continue;
            }
            if remaining <= last_page {
                self.deferred.push(slot.array_index());
            } else {
                slot.set_symbol(symbols.next_symbol());
            }
            trace!(
                reel = self.reel_index,
                slot = slot.array_index(),
                remaining,
                page = slot.page_index(),
                "slot wrapped"
            );
        }

        let n = self.layout.slot_count();
        for &index in &self.deferred {
            let row = wrap_index(index as i64 - self.state.stop_index as i64, n);
            let symbol = match self.targets.get(row) {
                Some(&target) => target,
                None => symbols.next_symbol(),
            };
            self.slots[index].set_symbol(symbol);
        }
    }

    fn complete(&mut self, symbols: &mut dyn SymbolSource, events: &mut Vec<ReelEvent>) {
        let total = self.state.total_distance;
        self.state.elapsed = self.state.total_duration;
        self.advance_slots(total, symbols);

        let pitch = self.layout.pitch();
        let stop_index = self.state.stop_index;
        let alignment_offset = self.layout.row_y(0) - self.slots[stop_index].y();
        if alignment_offset.abs() > pitch / 2.0 {
            error!(
                reel = self.reel_index,
                alignment_offset,
                stop_index,
                "stop slot is more than half a symbol away from row 0"
            );
        }
        for slot in &mut self.slots {
            slot.shift_y(alignment_offset);
        }

        let n = self.layout.slot_count();
        let mut corrections = 0;
        for (row, &target) in self.targets.iter().enumerate() {
            let slot = &mut self.slots[wrap_index((row + stop_index) as i64, n)];
            if slot.symbol() != target {
                warn!(
                    reel = self.reel_index,
                    row,
                    slot = slot.array_index(),
                    found = slot.symbol(),
                    expected = target,
                    "visible symbol mismatch corrected"
                );
                slot.set_symbol(target);
                corrections += 1;
            }
        }

        let page_changes: u64 = self.slots.iter().map(Slot::wrap_count).sum();
        if page_changes as i64 != self.state.rotated_slots {
            warn!(
                reel = self.reel_index,
                page_changes,
                rotated = self.state.rotated_slots,
                "wrap count differs from symbols travelled"
            );
        }

        let reel = self.reel_index;
        if self.slow_down.flush() {
            events.push(ReelEvent::SlowDownStart { reel });
        }
        if self.bounce.flush() {
            events.push(ReelEvent::BounceBack { reel });
        }
        events.push(ReelEvent::Stopped { reel });

        debug!(reel, alignment_offset, corrections, page_changes, "reel stopped");
        self.last_report = Some(StopReport {
            reel,
            alignment_offset,
            corrections,
            page_changes,
            rotated_slots: self.state.rotated_slots,
        });
        self.phase = ReelPhase::Stopped;
    }

    /// Symbols in the visible rows, top first, read from slot positions.
    pub fn current_visible_symbols(&self) -> Vec<SymbolId> {
        (0..self.layout.visible_rows())
            .map(|row| self.slot_at_row(row).map_or(0, Slot::symbol))
            .collect()
    }

    /// The slot nearest to visible row `row`.
    pub fn slot_at_row(&self, row: usize) -> Option<&Slot> {
        if row >= self.layout.visible_rows() {
            warn!(reel = self.reel_index, row, visible = self.layout.visible_rows(), "row out of range");
            return None;
        }
        self.slots
            .iter()
            .find(|slot| self.layout.row_of_y(slot.y()) == row as i64)
    }

    pub fn is_spinning(&self) -> bool {
        self.phase == ReelPhase::Spinning
    }

    pub fn phase(&self) -> ReelPhase {
        self.phase
    }

    pub fn state(&self) -> &ReelState {
        &self.state
    }

    /// Fraction of the current spin's duration elapsed, 1.0 once stopped.
    pub fn spin_progress(&self) -> f64 {
        match self.phase {
            ReelPhase::Spinning if self.state.total_duration > 0.0 => {
                (self.state.elapsed / self.state.total_duration).clamp(0.0, 1.0)
            }
            ReelPhase::Spinning | ReelPhase::Stopped => 1.0,
            ReelPhase::Idle => 0.0,
        }
    }

    pub fn spin_running_time(&self) -> f64 {
        self.state.elapsed
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn curve(&self) -> &AnimationCurve {
        &self.curve
    }

    pub fn last_stop_report(&self) -> Option<&StopReport> {
        self.last_report.as_ref()
    }

    pub fn layout(&self) -> &ReelLayout {
        &self.layout
    }

    pub fn reel_index(&self) -> usize {
        self.reel_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlotConfig;
    use crate::symbols::SequenceSymbols;
    use reel_curve::{create_standard_reel_curves, InterpolationMode, Keyframe, StandardReelCurveConfig};

    fn layout() -> ReelLayout {
        ReelLayout::new(6, 3, 110.0).unwrap()
    }

    fn reel() -> ReelController {
        ReelController::new(0, layout(), vec![0, 1, 2, 3, 4, 5]).unwrap()
    }

    fn plan(distance: f64, targets: Vec<SymbolId>) -> ReelSpinPlan {
        ReelSpinPlan {
            curve: AnimationCurve::from_keys(
                [
                    Keyframe::flat(0.0, 0.0),
                    Keyframe::flat(0.5, distance * 0.3),
                    Keyframe::flat(1.0, distance * 0.9),
                    Keyframe::flat(1.5, distance),
                ],
                InterpolationMode::Linear,
            ),
            target_symbols: targets,
            is_anticipation: false,
        }
    }

    fn run(reel: &mut ReelController, filler: &mut dyn SymbolSource) -> Vec<ReelEvent> {
        let mut events = Vec::new();
        for _ in 0..10_000 {
            if !reel.is_spinning() {
                break;
            }
            reel.update(1.0 / 60.0, filler, &mut events);
        }
        events
    }

    #[test]
    fn test_initial_rows() {
        let reel = reel();
        assert_eq!(reel.current_visible_symbols(), vec![0, 1, 2]);
        assert_eq!(reel.phase(), ReelPhase::Idle);
        assert!(reel.slot_at_row(3).is_none());
    }

    #[test]
    fn test_spin_lands_targets() {
        let mut reel = reel();
        let mut filler = SequenceSymbols::new(vec![12]);
        reel.start_spin(plan(110.0 * 20.0, vec![7, 8, 9])).unwrap();
        assert_eq!(reel.state().stop_index, 2);

        let events = run(&mut reel, &mut filler);
        assert_eq!(reel.phase(), ReelPhase::Stopped);
        assert_eq!(reel.current_visible_symbols(), vec![7, 8, 9]);
        assert_eq!(
            events,
            vec![
                ReelEvent::SlowDownStart { reel: 0 },
                ReelEvent::BounceBack { reel: 0 },
                ReelEvent::Stopped { reel: 0 }
            ]
        );

        let report = reel.last_stop_report().unwrap();
        assert_eq!(report.corrections, 0);
        assert_eq!(report.page_changes, 20);
        assert!(report.alignment_offset.abs() < 1e-6);
    }

    #[test]
    fn test_single_huge_step_fires_every_event_once() {
        let mut reel = reel();
        let mut filler = SequenceSymbols::new(vec![12]);
        reel.start_spin(plan(110.0 * 9.0, vec![3, 3, 3])).unwrap();
        let mut events = Vec::new();
        reel.update(100.0, &mut filler, &mut events);
        reel.update(100.0, &mut filler, &mut events);
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], ReelEvent::Stopped { reel: 0 });
        assert_eq!(reel.current_visible_symbols(), vec![3, 3, 3]);
    }

    #[test]
    fn test_start_spin_validation() {
        let mut reel = reel();
        assert!(matches!(
            reel.start_spin(plan(1100.0, vec![1, 2])),
            Err(ReelError::TargetCount { expected: 3, found: 2, .. })
        ));

        let flat = ReelSpinPlan {
            curve: AnimationCurve::from_keys([Keyframe::flat(0.0, 0.0)], InterpolationMode::Linear),
            target_symbols: vec![1, 2, 3],
            is_anticipation: false,
        };
        assert!(matches!(reel.start_spin(flat), Err(ReelError::Curve { .. })));

        let duplicate_time = ReelSpinPlan {
            curve: AnimationCurve::from_keys(
                [Keyframe::flat(0.0, 0.0), Keyframe::flat(1.0, 550.0), Keyframe::flat(1.0, 660.0)],
                InterpolationMode::Linear,
            ),
            target_symbols: vec![1, 2, 3],
            is_anticipation: false,
        };
        assert!(matches!(reel.start_spin(duplicate_time), Err(ReelError::Curve { .. })));

        reel.start_spin(plan(1100.0, vec![1, 2, 3])).unwrap();
        assert!(matches!(
            reel.start_spin(plan(1100.0, vec![1, 2, 3])),
            Err(ReelError::Busy { .. })
        ));
    }

    #[test]
    fn test_anticipation_bounces_on_completion() {
        let mut reel = reel();
        let mut filler = SequenceSymbols::new(vec![12]);
        let mut spin = plan(1320.0, vec![1, 2, 3]);
        spin.is_anticipation = true;
        reel.start_spin(spin).unwrap();

        let mut events = Vec::new();
        while reel.is_spinning() {
            let before = events.len();
            reel.update(1.0 / 60.0, &mut filler, &mut events);
            if reel.is_spinning() {
                assert!(!events[before..].contains(&ReelEvent::BounceBack { reel: 0 }));
            }
        }
        assert_eq!(
            events,
            vec![
                ReelEvent::SlowDownStart { reel: 0 },
                ReelEvent::BounceBack { reel: 0 },
                ReelEvent::Stopped { reel: 0 }
            ]
        );
        assert_eq!(reel.current_visible_symbols(), vec![1, 2, 3]);
    }

    #[test]
    fn test_cue_times_follow_arrival_key() {
        let config = SlotConfig::default().curve_config();
        let curve = create_standard_reel_curves(&config).remove(0);
        let cues = CueTimes::of(&curve);
        assert!((cues.slow_down.unwrap() - 2.76).abs() < 1e-9);
        assert!((cues.bounce.unwrap() - 3.0).abs() < 1e-9);

        let settled = StandardReelCurveConfig {
            bounce_duration: 0.2,
            ..config
        };
        let curve = create_standard_reel_curves(&settled).remove(0);
        assert!((curve.duration() - 3.2).abs() < 1e-9);
        assert_eq!(CueTimes::of(&curve), cues);
    }

    #[test]
    fn test_default_curve_fires_cues_on_time() {
        let curve = create_standard_reel_curves(&SlotConfig::default().curve_config()).remove(0);
        let mut reel = reel();
        let mut filler = SequenceSymbols::new(vec![12]);
        reel.start_spin(ReelSpinPlan {
            curve,
            target_symbols: vec![1, 2, 3],
            is_anticipation: false,
        })
        .unwrap();

        let dt = 1.0 / 60.0;
        let mut timeline = Vec::new();
        let mut events = Vec::new();
        while reel.is_spinning() {
            reel.update(dt, &mut filler, &mut events);
            timeline.extend(events.drain(..).map(|e| (reel.spin_running_time(), e)));
        }
        assert_eq!(timeline.len(), 3);
        let (slow_at, slow) = timeline[0];
        assert_eq!(slow, ReelEvent::SlowDownStart { reel: 0 });
        assert!(slow_at >= 2.76 && slow_at < 2.76 + dt + 1e-9, "slow-down at {}", slow_at);
        for ((at, event), expected) in timeline[1..].iter().zip([
            ReelEvent::BounceBack { reel: 0 },
            ReelEvent::Stopped { reel: 0 },
        ]) {
            assert_eq!(*event, expected);
            assert!((at - 3.0).abs() < 1e-9, "{:?} at {}", event, at);
        }
    }

    #[test]
    fn test_unaligned_distance_is_snapped_and_repaired() {
        let mut reel = reel();
        let mut filler = SequenceSymbols::new(vec![12]);
        reel.start_spin(plan(1100.0 + 50.0, vec![7, 8, 9])).unwrap();
        run(&mut reel, &mut filler);

        let report = reel.last_stop_report().unwrap();
        assert!((report.alignment_offset - 50.0).abs() < 1e-6, "offset {}", report.alignment_offset);
        assert_eq!(report.rotated_slots, 10);
        let layout = reel.layout();
        for slot in reel.slots() {
            let snapped = layout.row_y(layout.row_of_y(slot.y()));
            assert!((slot.y() - snapped).abs() < 1e-6, "slot {} at {}", slot.array_index(), slot.y());
        }
        assert_eq!(reel.state().stop_index, 4);
        assert_eq!(reel.current_visible_symbols(), vec![7, 8, 9]);
        assert_eq!(reel.slots()[4].symbol(), 7);
    }

    #[test]
    fn test_consecutive_spins() {
        let mut reel = reel();
        let mut filler = SequenceSymbols::new(vec![11, 12]);
        for (k, targets) in [(13, vec![1, 2, 3]), (8, vec![4, 5, 6]), (27, vec![7, 7, 8])] {
            reel.start_spin(plan(110.0 * k as f64, targets.clone())).unwrap();
            run(&mut reel, &mut filler);
            assert_eq!(reel.current_visible_symbols(), targets);
            assert_eq!(reel.last_stop_report().unwrap().corrections, 0);
            reel.finish();
            assert_eq!(reel.phase(), ReelPhase::Idle);
        }
        // 13 + 8 + 27 = 48 = 8 * 6
        assert_eq!(reel.state().stop_index, 0);
    }

    #[test]
    fn test_short_spin_is_corrected() {
        let mut reel = reel();
        let mut filler = SequenceSymbols::new(vec![12]);
        reel.start_spin(plan(220.0, vec![7, 8, 9])).unwrap();
        run(&mut reel, &mut filler);
        assert_eq!(reel.current_visible_symbols(), vec![7, 8, 9]);
        assert!(reel.last_stop_report().unwrap().corrections > 0);
    }

    #[test]
    fn test_quick_stop() {
        let mut reel = reel();
        let mut filler = SequenceSymbols::new(vec![12]);
        let mut events = Vec::new();
        reel.start_spin(plan(110.0 * 60.0, vec![4, 5, 6])).unwrap();
        for _ in 0..20 {
            reel.update(1.0 / 60.0, &mut filler, &mut events);
        }
        assert!(reel.quick_stop(0.3, &mut events));
        assert_eq!(events, vec![ReelEvent::SlowDownStart { reel: 0 }]);
        assert!(reel.state().total_distance < 110.0 * 60.0);
        assert!(!reel.quick_stop(0.3, &mut events), "a second quick stop should not extend the spin");

        events.extend(run(&mut reel, &mut filler));
        assert_eq!(reel.current_visible_symbols(), vec![4, 5, 6]);
        let report = reel.last_stop_report().unwrap();
        assert_eq!(report.corrections, 0);
        assert_eq!(report.page_changes as i64, report.rotated_slots);
        assert_eq!(events.iter().filter(|e| matches!(e, ReelEvent::SlowDownStart { .. })).count(), 1);
        assert_eq!(events.last(), Some(&ReelEvent::Stopped { reel: 0 }));
    }

    #[test]
    fn test_finish_requires_stop() {
        let mut reel = reel();
        reel.finish();
        assert_eq!(reel.phase(), ReelPhase::Idle);
        assert!(!reel.quick_stop(0.3, &mut Vec::new()));
    }

    #[test]
    fn test_new_checks_slot_count() {
        assert!(matches!(
            ReelController::new(2, layout(), vec![1, 2, 3]),
            Err(ReelError::SlotCount { reel: 2, expected: 6, found: 3 })
        ));
    }
}
