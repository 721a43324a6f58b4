// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Implementation of a histogram with equally-sized bins.

use std::ops::AddAssign;

use crate::errors::HistogramError;

/// Histogram with equally-sized bins spanning a closed range.
///
/// Values are binned into half-open bins `[lo, hi)` except for the last bin which
/// also includes its upper edge. Values outside the range are not counted.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    range: (f64, f64),
    counts: Vec<u64>,
}

impl Histogram {
    /// Create a new empty histogram with `bins` bins spanning `range`.
    ///
    /// ## Returns
    /// - `HistogramError::InvalidBins` if `bins` is zero.
    /// - `HistogramError::InvalidRange` if the range is not finite or if its start is larger than its end.
    ///
    /// ## Notes
    /// - If the start and the end of the range are identical, the range is extended by 0.5 on each side.
    pub fn new(bins: usize, range: (f64, f64)) -> Result<Histogram, HistogramError> {
        if bins == 0 {
            return Err(HistogramError::InvalidBins);
        }

        let (mut lo, mut hi) = range;
        if !lo.is_finite() || !hi.is_finite() || lo > hi {
            return Err(HistogramError::InvalidRange(lo.to_string(), hi.to_string()));
        }

        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        Ok(Histogram {
            range: (lo, hi),
            counts: vec![0; bins],
        })
    }

    /// Get the range of the histogram.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Get the number of bins.
    pub fn n_bins(&self) -> usize {
        self.counts.len()
    }

    /// Get the counts in individual bins.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Get the total number of counted values.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Get the width of a bin.
    pub fn bin_width(&self) -> f64 {
        (self.range.1 - self.range.0) / self.counts.len() as f64
    }

    /// Get the edges of all bins (`n_bins + 1` values).
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.counts.len()).map(|i| self.edge(i)).collect()
    }

    /// Lower edge of the bin `i`. The edge `n_bins` is the end of the range.
    fn edge(&self, i: usize) -> f64 {
        if i == self.counts.len() {
            self.range.1
        } else {
            self.range.0 + i as f64 * self.bin_width()
        }
    }

    /// Get the centers of all bins.
    pub fn centers(&self) -> Vec<f64> {
        let width = self.bin_width();
        (0..self.counts.len())
            .map(|i| self.range.0 + (i as f64 + 0.5) * width)
            .collect()
    }

    /// Add a value to the histogram. Values outside the range and `NaN` are ignored.
    pub fn add(&mut self, value: f64) {
        let (lo, hi) = self.range;
        if !(lo..=hi).contains(&value) {
            return;
        }

        let n_bins = self.counts.len();
        let mut index = (((value - lo) / (hi - lo) * n_bins as f64) as usize).min(n_bins - 1);

        // bin i holds edges[i] <= value < edges[i + 1]
        if index > 0 && value < self.edge(index) {
            index -= 1;
        }
        if index + 1 < n_bins && value >= self.edge(index + 1) {
            index += 1;
        }

        self.counts[index] += 1;
    }

    /// Add all values from an iterator to the histogram.
    pub fn extend(&mut self, values: impl IntoIterator<Item = f64>) {
        for value in values {
            self.add(value);
        }
    }

    /// Sum the counts of another histogram into this histogram.
    ///
    /// ## Returns
    /// `HistogramError::IncompatibleHistograms` if the histograms do not have identical bins.
    pub fn merge(&mut self, other: &Histogram) -> Result<(), HistogramError> {
        if self.counts.len() != other.counts.len() || self.range != other.range {
            return Err(HistogramError::IncompatibleHistograms);
        }

        *self += other;
        Ok(())
    }
}

impl AddAssign<&Histogram> for Histogram {
    /// Sum the counts of two histograms, bin by bin.
    /// Bins that are not present in `self` are ignored.
    fn add_assign(&mut self, rhs: &Histogram) {
        for (a, b) in self.counts.iter_mut().zip(rhs.counts.iter()) {
            *a += b;
        }
    }
}

/// Integrate `y(x)` using the composite trapezoidal rule.
/// Returns 0 if fewer than two points are provided.
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    y.windows(2)
        .zip(x.windows(2))
        .map(|(y, x)| (x[1] - x[0]) * (y[0] + y[1]) / 2.0)
        .sum()
}

/******************************/
/*         UNIT TESTS         */
/******************************/
