//! Fixed-capacity history of eye-openness samples.

use blinkmouse_signal_model::sample::OpennessSample;

/// Number of samples retained.
pub const HISTORY_CAPACITY: usize = 10;

/// Ring buffer of the most recent openness samples.
///
/// `cursor` is the slot the next push writes to; once `len` reaches
/// [`HISTORY_CAPACITY`] each push overwrites the oldest sample. The buffer
/// is seeded with one wide-open sample and is never empty.
#[derive(Debug, Clone)]
pub struct OpennessHistory {
    slots: [OpennessSample; HISTORY_CAPACITY],
    cursor: usize,
    len: usize,
}

impl OpennessHistory {
    pub fn new() -> Self {
        let mut history = Self {
            slots: [OpennessSample::wide_open(); HISTORY_CAPACITY],
            cursor: 0,
            len: 0,
        };
        history.push(OpennessSample::wide_open());
        history
    }

    pub fn push(&mut self, sample: OpennessSample) {
        self.slots[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % HISTORY_CAPACITY;
        self.len = (self.len + 1).min(HISTORY_CAPACITY);
    }

    /// Most recently pushed sample.
    pub fn latest(&self) -> OpennessSample {
        self.slots[(self.cursor + HISTORY_CAPACITY - 1) % HISTORY_CAPACITY]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = OpennessSample> + '_ {
        let start = (self.cursor + HISTORY_CAPACITY - self.len) % HISTORY_CAPACITY;
        (0..self.len).map(move |i| self.slots[(start + i) % HISTORY_CAPACITY])
    }
}

impl Default for OpennessHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_wide_open() {
        let history = OpennessHistory::new();
        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
        assert_eq!(history.latest(), OpennessSample::wide_open());
    }

    #[test]
    fn test_insertion_order() {
        let mut history = OpennessHistory::new();
        history.push(OpennessSample::new(0.2, 0.3));
        history.push(OpennessSample::new(0.4, 0.5));

        let samples: Vec<_> = history.iter().collect();
        assert_eq!(
            samples,
            vec![
                OpennessSample::wide_open(),
                OpennessSample::new(0.2, 0.3),
                OpennessSample::new(0.4, 0.5),
            ]
        );
        assert_eq!(history.latest(), OpennessSample::new(0.4, 0.5));
    }

    #[test]
    fn test_oldest_evicted_when_full() {
        let mut history = OpennessHistory::new();
        for i in 0..15 {
            history.push(OpennessSample::new(i as f64, 0.0));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);

        let lefts: Vec<f64> = history.iter().map(|s| s.left).collect();
        let expected: Vec<f64> = (5..15).map(|i| i as f64).collect();
        assert_eq!(lefts, expected);
        assert_eq!(history.latest().left, 14.0);
    }
}
