//! Luminance histogram shared by the exposure measurements.

use std::ops::RangeInclusive;

/// Counts of each 8-bit luminance level.
#[derive(Debug, Clone)]
pub struct Histogram {
    counts: [u64; 256],
    samples: u64,
}

impl Histogram {
    /// Counts every value of `luma`.
    #[must_use]
    pub fn from_luma(luma: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        luma.iter().for_each(|&v| counts[usize::from(v)] += 1);
        Self {
            counts,
            samples: luma.len() as u64,
        }
    }

    /// Number of counted values.
    #[must_use]
    pub const fn samples(&self) -> u64 {
        self.samples
    }

    /// Mean and population standard deviation, `(0, 0)` when empty.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn moments(&self) -> (f64, f64) {
        if self.samples == 0 {
            return (0.0, 0.0);
        }
        let n = self.samples as f64;
        let levels = || (0u32..).zip(self.counts.iter().map(|&c| c as f64));
        let mean = levels().map(|(level, c)| f64::from(level) * c).sum::<f64>() / n;
        let variance = levels()
            .map(|(level, c)| (f64::from(level) - mean).powi(2) * c)
            .sum::<f64>()
            / n;
        (mean, variance.sqrt())
    }

    /// Share of values inside `levels`, 0.0 when empty.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fraction_in(&self, levels: RangeInclusive<u8>) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        let (lo, hi) = (usize::from(*levels.start()), usize::from(*levels.end()));
        if lo > hi {
            return 0.0;
        }
        self.counts[lo..=hi].iter().sum::<u64>() as f64 / self.samples as f64
    }
}
