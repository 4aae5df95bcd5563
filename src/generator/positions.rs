//! Variant positions of a session

use rand::seq::index;
use rand::Rng;

/// Sorted, unique 1-based positions consumed one per row
#[derive(Debug, Clone)]
pub struct PositionSeries {
    positions: Vec<u64>,
    cursor: usize,
}

impl PositionSeries {
    /// Draw `num_rows` distinct positions from `[1, num_rows * 100)`
    ///
    /// `num_rows * 100` must not overflow; the config builder enforces this.
    pub fn new<R: Rng + ?Sized>(num_rows: usize, rng: &mut R) -> Self {
        let upper = num_rows.saturating_mul(100);
        let span = upper.saturating_sub(1);
        let mut positions: Vec<u64> = index::sample(rng, span, num_rows.min(span))
            .into_iter()
            .map(|i| i as u64 + 1)
            .collect();
        positions.sort_unstable();
        Self {
            positions,
            cursor: 0,
        }
    }

    /// Largest position in the series, 0 if empty
    pub fn max_position(&self) -> u64 {
        self.positions.last().copied().unwrap_or(0)
    }

    /// Number of positions in the series
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True if the series holds no positions
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions not yet consumed
    pub fn remaining(&self) -> usize {
        self.positions.len() - self.cursor
    }

    /// All positions, consumed or not
    pub fn as_slice(&self) -> &[u64] {
        &self.positions
    }
}

impl Iterator for PositionSeries {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let position = self.positions.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(position)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}
