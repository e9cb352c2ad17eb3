//! World-space terrain model built over a [`HeightGrid`].
//!
//! The grid is centered at the world origin: vertex `(row, col)` sits at
//! `x = col * cell_size - world_size / 2`, `z = row * cell_size - world_size / 2`.

use bevy::prelude::*;

use crate::error::TerrainError;
use crate::heightmap::HeightGrid;

/// A height grid placed in world space.
///
/// Immutable after construction; all methods are pure queries.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct TerrainModel {
    grid: HeightGrid,
    world_size: f32,
    height_scale: f32,
    height_offset: f32,
    cell_size: f32,
}

impl TerrainModel {
    /// Places `grid` in the world.
    ///
    /// `world_size` is the edge length in meters, `height_scale` the vertical
    /// range a sample of `1.0` maps to, and `height_offset` a vertical shift.
    pub fn new(
        grid: HeightGrid,
        world_size: f32,
        height_scale: f32,
        height_offset: f32,
    ) -> Result<Self, TerrainError> {
        if !world_size.is_finite() || world_size <= 0.0 {
            return Err(TerrainError::InvalidWorldSize(world_size));
        }
        if !height_scale.is_finite() || height_scale < 0.0 {
            return Err(TerrainError::InvalidHeightScale(height_scale));
        }
        let cell_size = world_size / (grid.size() - 1) as f32;
        if cell_size <= 0.0 || !cell_size.is_finite() {
            return Err(TerrainError::InvalidWorldSize(world_size));
        }
        Ok(Self {
            grid,
            world_size,
            height_scale,
            height_offset,
            cell_size,
        })
    }

    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn world_size(&self) -> f32 {
        self.world_size
    }

    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }

    pub fn height_offset(&self) -> f32 {
        self.height_offset
    }

    /// Distance between adjacent grid vertices.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Half the world edge; the terrain spans `[-half, half]` on X and Z.
    pub fn half_extent(&self) -> f32 {
        self.world_size * 0.5
    }

    /// Whether `(x, z)` lies on the terrain footprint.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let h = self.half_extent();
        (-h..=h).contains(&x) && (-h..=h).contains(&z)
    }

    /// Normalized sample at `(row, col)`, with both indices clamped into the grid.
    pub fn sample_at(&self, row: isize, col: isize) -> f32 {
        let last = (self.grid.size() - 1) as isize;
        let r = row.clamp(0, last) as usize;
        let c = col.clamp(0, last) as usize;
        self.grid.get(r, c)
    }

    /// World height of grid vertex `(row, col)`.
    ///
    /// Out-of-range indices are clamped to the nearest edge rather than
    /// rejected, so callers near the boundary never need bounds checks.
    pub fn height_at(&self, row: isize, col: isize) -> f32 {
        self.sample_at(row, col) * self.height_scale + self.height_offset
    }

    /// World-space position of grid vertex `(row, col)`.
    pub fn grid_position(&self, row: usize, col: usize) -> Vec3 {
        let half = self.half_extent();
        Vec3::new(
            col as f32 * self.cell_size - half,
            self.height_at(row as isize, col as isize),
            row as f32 * self.cell_size - half,
        )
    }

    /// Bilinearly interpolated terrain height at world `(x, z)`.
    ///
    /// Agrees with the rendered mesh at every grid vertex. Coordinates off the
    /// footprint take the height of the nearest edge.
    pub fn world_height_at(&self, x: f32, z: f32) -> f32 {
        let half = self.half_extent();
        let last = (self.grid.size() - 1) as f32;
        let gx = ((x + half) / self.cell_size).clamp(0.0, last);
        let gz = ((z + half) / self.cell_size).clamp(0.0, last);
        let x0 = gx.floor();
        let z0 = gz.floor();
        let fx = gx - x0;
        let fz = gz - z0;
        let (col, row) = (x0 as isize, z0 as isize);

        let h00 = self.height_at(row, col);
        let h10 = self.height_at(row, col + 1);
        let h01 = self.height_at(row + 1, col);
        let h11 = self.height_at(row + 1, col + 1);

        h00 * (1.0 - fx) * (1.0 - fz) + h10 * fx * (1.0 - fz) + h01 * (1.0 - fx) * fz + h11 * fx * fz
    }

    /// Unit surface normal at world `(x, z)` from central differences over
    /// [`world_height_at`](Self::world_height_at), half a cell to each side.
    pub fn world_normal_at(&self, x: f32, z: f32) -> Vec3 {
        central_difference_normal(x, z, self.cell_size * 0.5, |x, z| self.world_height_at(x, z))
    }
}

/// Unit normal of the surface `height(x, z)` from central differences `d` to
/// each side of `(x, z)`.
pub(crate) fn central_difference_normal(x: f32, z: f32, d: f32, height: impl Fn(f32, f32) -> f32) -> Vec3 {
    let dx = height(x + d, z) - height(x - d, z);
    let dz = height(x, z + d) - height(x, z - d);
    Vec3::new(-dx, 2.0 * d, -dz).normalize_or(Vec3::Y)
}
