//! Modulo helpers shared by the slot trackers and the reel controller.

/// Euclidean index into a ring of `len` slots. Never negative.
///
/// Returns 0 for an empty ring.
pub fn wrap_index(index: i64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    index.rem_euclid(len as i64) as usize
}

/// Number of whole `range`s `offset` lies from zero, rounded toward negative infinity.
pub fn floor_page(offset: f64, range: f64) -> i64 {
    (offset / range).floor() as i64
}

/// Whole symbols covered by `distance`.
pub fn symbols_in(distance: f64, pitch: f64) -> i64 {
    (distance / pitch).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_index_negative() {
        assert_eq!(wrap_index(-1, 6), 5);
        assert_eq!(wrap_index(-6, 6), 0);
        assert_eq!(wrap_index(-13, 6), 5);
        assert_eq!(wrap_index(14, 6), 2);
        assert_eq!(wrap_index(3, 0), 0);
    }

    #[test]
    fn test_wrap_index_inverse() {
        let n = 7;
        for stop in -20..20i64 {
            for row in 0..n as i64 {
                let index = wrap_index(row + stop, n);
                assert_eq!(wrap_index(index as i64 - stop, n), row as usize);
            }
        }
    }

    #[test]
    fn test_floor_page() {
        assert_eq!(floor_page(0.0, 660.0), 0);
        assert_eq!(floor_page(659.9, 660.0), 0);
        assert_eq!(floor_page(-0.1, 660.0), -1);
        assert_eq!(floor_page(-660.0, 660.0), -1);
        assert_eq!(floor_page(-660.1, 660.0), -2);
    }

    #[test]
    fn test_symbols_in() {
        assert_eq!(symbols_in(1100.0000001, 110.0), 10);
        assert_eq!(symbols_in(1099.9999999, 110.0), 10);
        assert_eq!(symbols_in(0.0, 110.0), 0);
    }
}
