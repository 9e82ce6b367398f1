//! # Reel Layout
//!
//! Geometry of one reel window in screen coordinates (Y grows downward).
//!
//! Visible row `r` is centered at `y = r * pitch`. `rows_above` hidden rows sit
//! over the window and `rows_below` under it. Slots scroll upward; a slot
//! passing `max_scope_y` reappears one full range lower, below the window.
//! Scope bounds lie half a pitch between rows so a resting slot never sits on a
//! wrap boundary.

use crate::errors::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReelLayout {
    pitch: f64,
    slot_count: usize,
    visible_rows: usize,
    rows_above: usize,
    rows_below: usize,
}

impl ReelLayout {
    pub fn new(slot_count: usize, visible_rows: usize, pitch: f64) -> Result<Self, ConfigError> {
        if visible_rows == 0 {
            return Err(ConfigError::Zero { field: "visible_rows" });
        }
        if slot_count <= visible_rows {
            return Err(ConfigError::TooFewSlots {
                slots: slot_count,
                visible: visible_rows,
            });
        }
        if pitch.is_nan() || pitch <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "symbol_pitch",
                value: pitch,
            });
        }
        let hidden = slot_count - visible_rows;
        let rows_above = hidden / 2 + 1;
        Ok(Self {
            pitch,
            slot_count,
            visible_rows,
            rows_above,
            rows_below: hidden - rows_above,
        })
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    pub fn visible_rows(&self) -> usize {
        self.visible_rows
    }

    pub fn rows_above(&self) -> usize {
        self.rows_above
    }

    pub fn rows_below(&self) -> usize {
        self.rows_below
    }

    /// Full height of the slot ring.
    pub fn range(&self) -> f64 {
        self.slot_count as f64 * self.pitch
    }

    /// Upper wrap boundary, half a pitch above the top hidden row.
    pub fn max_scope_y(&self) -> f64 {
        -(self.rows_above as f64 + 0.5) * self.pitch
    }

    pub fn min_scope_y(&self) -> f64 {
        self.max_scope_y() - self.range()
    }

    pub fn row_y(&self, row: i64) -> f64 {
        row as f64 * self.pitch
    }

    /// Nearest row to a Y coordinate.
    pub fn row_of_y(&self, y: f64) -> i64 {
        (y / self.pitch).round() as i64
    }

    /// Row slot `index` occupies before the first spin.
    pub fn initial_row(&self, index: usize) -> i64 {
        ((index + self.rows_above) % self.slot_count) as i64 - self.rows_above as i64
    }

    pub fn initial_slot_y(&self, index: usize) -> f64 {
        self.row_y(self.initial_row(index))
    }

    /// Distance still to travel once the last recycled page starts:
    /// `visible_rows + rows_below` pitches.
    pub fn last_page_distance(&self) -> f64 {
        (self.visible_rows + self.rows_below) as f64 * self.pitch
    }
}
