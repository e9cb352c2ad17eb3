//! Square grid of normalized height samples.

use crate::error::TerrainError;

/// An `size × size` grid of normalized heights in `[0, 1]`.
///
/// Samples are stored row-major: `samples[row * size + col]`. Rows run along
/// the world Z axis and columns along X. The grid is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    size: usize,
    samples: Vec<f32>,
}

impl HeightGrid {
    /// Wraps a row-major sample buffer.
    ///
    /// Values outside `[0, 1]` are clamped. Returns an error if `size < 2`,
    /// if the buffer length is not `size²`, or if any sample is not finite.
    pub fn from_samples(size: usize, mut samples: Vec<f32>) -> Result<Self, TerrainError> {
        if size < 2 {
            return Err(TerrainError::GridTooSmall { size });
        }
        let expected = size * size;
        if samples.len() != expected {
            return Err(TerrainError::SampleCountMismatch {
                expected,
                actual: samples.len(),
            });
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(TerrainError::NonFiniteSample { index });
        }
        for s in &mut samples {
            *s = s.clamp(0.0, 1.0);
        }
        Ok(Self { size, samples })
    }

    /// A grid where every sample equals `value` (clamped to `[0, 1]`).
    pub fn flat(size: usize, value: f32) -> Result<Self, TerrainError> {
        Self::from_samples(size, vec![value; size.saturating_mul(size)])
    }

    /// Builds a grid by evaluating `f(row, col)` at every cell.
    pub fn from_fn(size: usize, mut f: impl FnMut(usize, usize) -> f32) -> Result<Self, TerrainError> {
        let mut samples = Vec::with_capacity(size.saturating_mul(size));
        for row in 0..size {
            for col in 0..size {
                samples.push(f(row, col));
            }
        }
        Self::from_samples(size, samples)
    }

    /// Number of samples along one grid edge.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major sample buffer.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample at `(row, col)`. Panics when out of range.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.samples[row * self.size + col]
    }

    /// Smallest and largest sample.
    pub fn min_max(&self) -> (f32, f32) {
        self.samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)))
    }
}
