//! Pointer acceleration response curves.
//!
//! A response table maps the rounded magnitude of a filtered displacement
//! to a multiplier. Small moves (likely jitter) stay at 1.0; larger moves
//! are amplified according to the acceleration level.

/// Number of entries in every response table.
pub const TABLE_LEN: usize = 10;

/// Highest supported acceleration level; larger levels clamp to it.
pub const MAX_ACCELERATION_LEVEL: u8 = 5;

/// Breakpoint meaning "never reached".
const UNREACHED: usize = 9999;

/// Two-segment curve parameters.
///
/// `delta1` and `delta2` are entry-count breakpoints, clamped to the table
/// length when the table is filled.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CurveSegments {
    delta1: usize,
    factor1: f64,
    delta2: usize,
    factor2: f64,
}

impl CurveSegments {
    const fn new(delta1: usize, factor1: f64) -> Self {
        Self {
            delta1,
            factor1,
            delta2: UNREACHED,
            factor2: 1.0,
        }
    }

    const fn with_tail(delta1: usize, factor1: f64, delta2: usize, factor2: f64) -> Self {
        Self {
            delta1,
            factor1,
            delta2,
            factor2,
        }
    }

    fn for_level(level: u8) -> Self {
        match level {
            0 => Self::new(UNREACHED, 1.0),
            1 => Self::new(7, 1.5),
            2 => Self::new(7, 2.0),
            3 => Self::with_tail(7, 1.5, 14, 2.0),
            4 => Self::with_tail(7, 2.0, 14, 1.5),
            _ => Self::with_tail(7, 2.0, 14, 2.0),
        }
    }

    fn fill(&self) -> [f64; TABLE_LEN] {
        let delta1 = self.delta1.min(TABLE_LEN);
        let delta2 = self.delta2.min(TABLE_LEN);

        let mut table = [1.0; TABLE_LEN];
        for slot in table.iter_mut().take(delta2).skip(delta1) {
            *slot = self.factor1;
        }
        for (step, slot) in table.iter_mut().skip(delta2).enumerate() {
            *slot = self.factor1 * self.factor2 + 0.1 * step as f64;
        }
        table
    }
}

/// Acceleration multipliers indexed by rounded displacement magnitude.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseTable {
    level: u8,
    multipliers: [f64; TABLE_LEN],
}

impl ResponseTable {
    /// Build the table for an acceleration level (0..=5, larger clamps).
    pub fn for_level(level: u8) -> Self {
        let level = level.min(MAX_ACCELERATION_LEVEL);
        Self {
            level,
            multipliers: CurveSegments::for_level(level).fill(),
        }
    }

    /// Effective (clamped) acceleration level.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Level 0 applies no acceleration at all.
    pub fn is_linear(&self) -> bool {
        self.level == 0
    }

    pub fn multipliers(&self) -> &[f64; TABLE_LEN] {
        &self.multipliers
    }

    /// Table index for a displacement magnitude.
    pub fn index_for(distance: f64) -> usize {
        let rounded = distance.max(0.0).round();
        if rounded >= (TABLE_LEN - 1) as f64 {
            TABLE_LEN - 1
        } else {
            rounded as usize
        }
    }

    /// Multiplier to apply to a displacement of the given magnitude.
    pub fn multiplier(&self, distance: f64) -> f64 {
        self.multipliers[Self::index_for(distance)]
    }
}

impl Default for ResponseTable {
    fn default() -> Self {
        Self::for_level(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_level_zero_is_flat() {
        let table = ResponseTable::for_level(0);
        assert!(table.is_linear());
        assert!(table.multipliers().iter().all(|&m| m == 1.0));
    }

    #[test]
    fn test_level_one_and_two() {
        let one = ResponseTable::for_level(1);
        assert_eq!(
            one.multipliers(),
            &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.5, 1.5, 1.5]
        );
        let two = ResponseTable::for_level(2);
        assert_eq!(two.multipliers()[6], 1.0);
        assert_eq!(two.multipliers()[7], 2.0);
        assert_eq!(two.multipliers()[9], 2.0);
    }

    #[test]
    fn test_tail_breakpoint_past_table_is_never_reached() {
        // Levels 3..=5 place the tail at 14, beyond the 10 entries.
        assert_eq!(
            ResponseTable::for_level(3).multipliers(),
            ResponseTable::for_level(1).multipliers()
        );
        assert_eq!(
            ResponseTable::for_level(4).multipliers(),
            ResponseTable::for_level(2).multipliers()
        );
        assert_eq!(
            ResponseTable::for_level(5).multipliers(),
            ResponseTable::for_level(2).multipliers()
        );
    }

    #[test]
    fn test_tail_segment_increases() {
        let table = CurveSegments::with_tail(2, 1.5, 5, 2.0).fill();
        assert_eq!(&table[..5], &[1.0, 1.0, 1.5, 1.5, 1.5]);
        for (step, value) in table[5..].iter().enumerate() {
            assert!((value - (3.0 + 0.1 * step as f64)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_level_clamps_to_five() {
        let table = ResponseTable::for_level(42);
        assert_eq!(table.level(), 5);
        assert_eq!(table, ResponseTable::for_level(5));
    }

    #[test]
    fn test_index_rounds_and_clamps() {
        assert_eq!(ResponseTable::index_for(0.0), 0);
        assert_eq!(ResponseTable::index_for(2.49), 2);
        assert_eq!(ResponseTable::index_for(2.5), 3);
        assert_eq!(ResponseTable::index_for(8.6), 9);
        assert_eq!(ResponseTable::index_for(250.0), 9);
    }

    proptest! {
        #[test]
        fn prop_table_shape(level in any::<u8>()) {
            let table = ResponseTable::for_level(level);
            prop_assert_eq!(table.multipliers().len(), TABLE_LEN);
            prop_assert!(table.multipliers().iter().all(|&m| m >= 0.0));
            for pair in table.multipliers().windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }

        #[test]
        fn prop_multiplier_is_a_table_entry(level in 0u8..=5, distance in 0.0f64..100.0) {
            let table = ResponseTable::for_level(level);
            let m = table.multiplier(distance);
            prop_assert!(table.multipliers().contains(&m));
        }
    }
}
