//! Mesh generation from [`TerrainModel`] data.
//!
//! Converts a terrain into a renderable surface with:
//! - `TriangleList` topology, two triangles per grid cell
//! - Smooth per-vertex normals accumulated from adjacent face normals
//! - UV coordinates spanning the terrain (or tiling in world space)
//! - Elevation-banded vertex colors keyed on the normalized sample

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use crate::terrain::TerrainModel;

/// Upper bounds of the first three color bands; the fourth runs to `1.0`.
pub const COLOR_BAND_LIMITS: [f32; 3] = [0.30, 0.65, 0.85];

/// Start and end color of each elevation band (linear RGB).
const COLOR_BANDS: [([f32; 3], [f32; 3]); 4] = [
    // shore
    ([0.76, 0.70, 0.50], [0.55, 0.60, 0.35]),
    // grass
    ([0.30, 0.55, 0.20], [0.20, 0.40, 0.15]),
    // rock
    ([0.45, 0.40, 0.35], [0.58, 0.55, 0.52]),
    // snow
    ([0.86, 0.86, 0.90], [1.00, 1.00, 1.00]),
];

/// How per-vertex normals are derived from the triangles around a vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NormalMethod {
    /// Each adjacent triangle contributes its unit face normal.
    #[default]
    FaceAccumulated,
    /// Each adjacent triangle contributes its raw cross product, so larger
    /// triangles weigh more.
    AreaWeighted,
}

/// Color for a normalized height `h`.
///
/// Four bands split at [`COLOR_BAND_LIMITS`], each ramping linearly from its
/// start color to its end color.
pub fn height_color(h: f32) -> [f32; 4] {
    let h = h.clamp(0.0, 1.0);
    let [b0, b1, b2] = COLOR_BAND_LIMITS;
    let (band, lo, hi) = if h < b0 {
        (0, 0.0, b0)
    } else if h < b1 {
        (1, b0, b1)
    } else if h < b2 {
        (2, b1, b2)
    } else {
        (3, b2, 1.0)
    };
    let t = (h - lo) / (hi - lo);
    let (from, to) = COLOR_BANDS[band];
    [
        from[0] + (to[0] - from[0]) * t,
        from[1] + (to[1] - from[1]) * t,
        from[2] + (to[2] - from[2]) * t,
        1.0,
    ]
}

/// CPU-side terrain surface, ready to hand to a renderer.
#[derive(Debug, Clone, Default)]
pub struct TerrainMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl TerrainMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl From<TerrainMesh> for Mesh {
    fn from(terrain: TerrainMesh) -> Self {
        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, terrain.positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, terrain.normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, terrain.uvs);
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, terrain.colors);
        mesh.insert_indices(Indices::U32(terrain.indices));
        mesh
    }
}

/// Converts a [`TerrainModel`] into a [`TerrainMesh`] or Bevy [`Mesh`].
///
/// The mesh is centered at the origin like the terrain itself, so it needs
/// no entity offset to line up with [`TerrainModel::world_height_at`] or the
/// collision heightfield.
///
/// # UV Mapping
///
/// By default UVs run from `0` to `1` across the whole terrain. With
/// [`with_uv_tile_size`](Self::with_uv_tile_size) they become world-space
/// coordinates divided by the tile size, measured from the terrain corner.
///
/// # Example
///
/// ```ignore
/// use bevy_symbios_walker::{HeightGrid, TerrainMeshBuilder, TerrainModel};
///
/// let grid = HeightGrid::flat(65, 0.5)?;
/// let terrain = TerrainModel::new(grid, 128.0, 20.0, 0.0)?;
/// let mesh = TerrainMeshBuilder::new()
///     .with_uv_tile_size(4.0)
///     .build_mesh(&terrain);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TerrainMeshBuilder {
    uv_tile_size: Option<f32>,
    normal_method: NormalMethod,
}

impl TerrainMeshBuilder {
    /// Creates a new builder with stretched UVs and face-accumulated normals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the world-space size of one UV tile.
    ///
    /// Clamped to a positive minimum to avoid division by zero.
    pub fn with_uv_tile_size(mut self, size: f32) -> Self {
        self.uv_tile_size = Some(size.max(f32::EPSILON));
        self
    }

    pub fn with_normal_method(mut self, method: NormalMethod) -> Self {
        self.normal_method = method;
        self
    }

    /// Builds the CPU-side mesh.
    pub fn build(&self, terrain: &TerrainModel) -> TerrainMesh {
        let n = terrain.size();
        let half = terrain.half_extent();
        let span = terrain.world_size();

        let vertex_count = n * n;
        let mut positions: Vec<[f32; 3]> = Vec::with_capacity(vertex_count);
        let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(vertex_count);
        let mut colors: Vec<[f32; 4]> = Vec::with_capacity(vertex_count);

        for row in 0..n {
            for col in 0..n {
                let p = terrain.grid_position(row, col);
                positions.push(p.into());

                let (u, v) = match self.uv_tile_size {
                    Some(tile) => ((p.x + half) / tile, (p.z + half) / tile),
                    None => ((p.x + half) / span, (p.z + half) / span),
                };
                uvs.push([u, v]);
                colors.push(height_color(terrain.grid().get(row, col)));
            }
        }

        // Each cell (row, col) → (row+1, col+1) is split along the
        // top-left/bottom-right diagonal, CCW seen from +Y:
        //   tl──tr
        //   │╲  │     Triangle 1: tl, bl, br
        //   │ ╲ │     Triangle 2: tl, br, tr
        //   bl──br
        let quad_count = (n - 1) * (n - 1);
        let mut indices: Vec<u32> = Vec::with_capacity(quad_count * 6);

        for row in 0..(n - 1) {
            for col in 0..(n - 1) {
                let tl = (row * n + col) as u32;
                let tr = (row * n + col + 1) as u32;
                let bl = ((row + 1) * n + col) as u32;
                let br = ((row + 1) * n + col + 1) as u32;

                indices.extend_from_slice(&[tl, bl, br]);
                indices.extend_from_slice(&[tl, br, tr]);
            }
        }

        let mut normals: Vec<Vec3> = vec![Vec3::ZERO; vertex_count];

        for tri in indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = Vec3::from(positions[i0]);
            let p1 = Vec3::from(positions[i1]);
            let p2 = Vec3::from(positions[i2]);
            let cross = (p1 - p0).cross(p2 - p0);
            let face_normal = match self.normal_method {
                NormalMethod::FaceAccumulated => cross.normalize_or_zero(),
                NormalMethod::AreaWeighted => cross,
            };
            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        let normals: Vec<[f32; 3]> = normals
            .iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).into())
            .collect();

        TerrainMesh {
            positions,
            normals,
            uvs,
            colors,
            indices,
        }
    }

    /// Builds a Bevy [`Mesh`] with positions, normals, UV_0 and colors.
    pub fn build_mesh(&self, terrain: &TerrainModel) -> Mesh {
        self.build(terrain).into()
    }
}
