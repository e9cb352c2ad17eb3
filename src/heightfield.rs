//! Collision-engine layout of the terrain heights.
//!
//! Physics heightfields index samples column-major (outer X, inner Z) while
//! [`HeightGrid`](crate::HeightGrid) is row-major. A layout mismatch produces
//! a transposed collision surface without any runtime error, so the
//! transposition lives in exactly one place: [`CollisionHeightfield::from_terrain`].

use bevy::prelude::*;

use crate::error::TerrainError;
use crate::terrain::TerrainModel;

/// Heights re-laid for a physics engine, plus the world scale to apply.
///
/// `heights[col * (rows + 1) + row]` holds the normalized sample of grid
/// vertex `(row, col)`. `scale` is `(world_size, height_scale, world_size)`;
/// an engine centers the surface at its local origin, so the collider entity
/// is translated by `height_offset` on Y to match the rendered mesh.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CollisionHeightfield {
    pub rows: usize,
    pub cols: usize,
    pub heights: Vec<f32>,
    pub scale: Vec3,
    pub height_offset: f32,
}

impl CollisionHeightfield {
    /// Transposes the terrain's row-major grid into column-major order.
    pub fn from_terrain(terrain: &TerrainModel) -> Self {
        let size = terrain.size();
        let samples = terrain.grid().samples();
        let mut heights = vec![0.0; size * size];
        for row in 0..size {
            for col in 0..size {
                heights[col * size + row] = samples[row * size + col];
            }
        }
        Self {
            rows: size - 1,
            cols: size - 1,
            heights,
            scale: Vec3::new(terrain.world_size(), terrain.height_scale(), terrain.world_size()),
            height_offset: terrain.height_offset(),
        }
    }

    /// Wraps an already column-major buffer, checking its topology.
    pub fn from_parts(
        rows: usize,
        cols: usize,
        heights: Vec<f32>,
        scale: Vec3,
    ) -> Result<Self, TerrainError> {
        if rows < 1 || cols < 1 {
            return Err(TerrainError::GridTooSmall { size: rows.min(cols) + 1 });
        }
        let expected = (rows + 1) * (cols + 1);
        if heights.len() != expected {
            return Err(TerrainError::SampleCountMismatch {
                expected,
                actual: heights.len(),
            });
        }
        if let Some(index) = heights.iter().position(|h| !h.is_finite()) {
            return Err(TerrainError::NonFiniteSample { index });
        }
        if !(scale.x > 0.0 && scale.z > 0.0) {
            return Err(TerrainError::InvalidWorldSize(scale.x.min(scale.z)));
        }
        Ok(Self {
            rows,
            cols,
            heights,
            scale,
            height_offset: 0.0,
        })
    }

    /// Total vertex count, `(rows + 1) * (cols + 1)`.
    pub fn vertex_count(&self) -> usize {
        (self.rows + 1) * (self.cols + 1)
    }

    /// Nested view: one inner `Vec` per column (X), each running along Z.
    pub fn as_columns(&self) -> Vec<Vec<f32>> {
        self.heights
            .chunks_exact(self.rows + 1)
            .map(<[f32]>::to_vec)
            .collect()
    }
}
