//! # Slot Position Tracker
//!
//! Turns the distance a reel has travelled into the wrapped Y of one slot.

use crate::math::floor_page;
use crate::symbols::SymbolId;

/// One physical symbol holder on a reel.
///
/// The tracker remembers where it was when the spin started and derives its
/// position from that and the travelled distance alone, so positions never drift
/// regardless of frame timing.
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    array_index: usize,
    symbol: SymbolId,
    y: f64,
    start_y: f64,
    page_index: i64,
    min_scope_y: f64,
    max_scope_y: f64,
    wrap_count: u64,
}

impl Slot {
    pub fn new(array_index: usize, symbol: SymbolId, y: f64, min_scope_y: f64, max_scope_y: f64) -> Self {
        let mut slot = Self {
            array_index,
            symbol,
            y,
            start_y: y,
            page_index: 0,
            min_scope_y,
            max_scope_y,
            wrap_count: 0,
        };
        slot.record_position(min_scope_y, max_scope_y);
        slot
    }

    /// Takes the current Y as the origin for the next spin.
    pub fn record_position(&mut self, min_scope_y: f64, max_scope_y: f64) {
        self.min_scope_y = min_scope_y;
        self.max_scope_y = max_scope_y;
        self.start_y = self.y;
        self.page_index = floor_page(self.start_y - self.max_scope_y, self.range());
        self.wrap_count = 0;
    }

    /// Moves to `distance` past the recorded origin.
    ///
    /// Returns `true` when the slot crossed a wrap boundary since the previous call.
    pub fn move_distance(&mut self, distance: f64) -> bool {
        let range = self.range();
        let theoretical = self.start_y - distance;
        let page = floor_page(theoretical - self.max_scope_y, range);
        let changed = page != self.page_index;
        if changed {
            self.wrap_count += page.abs_diff(self.page_index);
            self.page_index = page;
        }
        self.y = theoretical - range * page as f64;
        changed
    }

    /// Re-derives the stored page from `distance` without moving.
    pub fn reset_page_index(&mut self, distance: f64) {
        self.page_index = floor_page(self.start_y - distance - self.max_scope_y, self.range());
    }

    pub fn shift_y(&mut self, offset: f64) {
        self.y += offset;
    }

    pub fn set_symbol(&mut self, symbol: SymbolId) {
        self.symbol = symbol;
    }

    pub fn array_index(&self) -> usize {
        self.array_index
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn start_y(&self) -> f64 {
        self.start_y
    }

    pub fn page_index(&self) -> i64 {
        self.page_index
    }

    /// Pages crossed since the last `record_position`.
    pub fn wrap_count(&self) -> u64 {
        self.wrap_count
    }

    pub fn range(&self) -> f64 {
        self.max_scope_y - self.min_scope_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Six slots of 110 px, two hidden rows above the window.
    const MAX: f64 = -275.0;
    const MIN: f64 = -935.0;

    #[test]
    fn test_move_without_wrap() {
        let mut slot = Slot::new(0, 7, 0.0, MIN, MAX);
        assert_eq!(slot.page_index(), 0);
        assert!(!slot.move_distance(200.0));
        assert_eq!(slot.y(), -200.0);
        assert_eq!(slot.wrap_count(), 0);
    }

    #[test]
    fn test_wrap_reappears_below() {
        let mut slot = Slot::new(0, 7, 0.0, MIN, MAX);
        assert!(slot.move_distance(280.0));
        assert_eq!(slot.page_index(), -1);
        assert_eq!(slot.y(), 380.0);
        assert!(slot.y() >= MAX && slot.y() < MAX + slot.range());
        assert_eq!(slot.wrap_count(), 1);

        // Same page on the next frame.
        assert!(!slot.move_distance(300.0));
        assert_eq!(slot.y(), 360.0);
    }

    #[test]
    fn test_large_jump_counts_every_page() {
        let mut slot = Slot::new(3, 1, 330.0, MIN, MAX);
        assert!(slot.move_distance(660.0 * 3.0));
        assert_eq!(slot.wrap_count(), 3);
        assert!((slot.y() - 330.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_position_resets_origin() {
        let mut slot = Slot::new(0, 7, 0.0, MIN, MAX);
        slot.move_distance(330.0);
        slot.record_position(MIN, MAX);
        assert_eq!(slot.start_y(), slot.y());
        assert_eq!(slot.wrap_count(), 0);
        assert!(!slot.move_distance(0.0));
    }

    #[test]
    fn test_reset_page_index() {
        let mut slot = Slot::new(0, 7, 0.0, MIN, MAX);
        slot.reset_page_index(700.0);
        assert_eq!(slot.page_index(), -1);
        // The stored page already matches, so moving there is not a wrap.
        assert!(!slot.move_distance(700.0));
    }

    #[test]
    fn test_shift_and_symbol() {
        let mut slot = Slot::new(2, 4, 220.0, MIN, MAX);
        slot.shift_y(-0.25);
        slot.set_symbol(9);
        assert_eq!(slot.y(), 219.75);
        assert_eq!(slot.symbol(), 9);
        assert_eq!(slot.array_index(), 2);
    }
}
