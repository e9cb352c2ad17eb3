use bevy::prelude::*;
use bevy_symbios_walker::{HeightGrid, TerrainError, TerrainModel};

fn ramp_terrain(size: usize, world_size: f32, height_scale: f32) -> TerrainModel {
    let last = (size - 1) as f32;
    let grid = HeightGrid::from_fn(size, |row, col| (row as f32 + 2.0 * col as f32) / (3.0 * last))
        .expect("valid grid");
    TerrainModel::new(grid, world_size, height_scale, 1.5).expect("valid terrain")
}

#[test]
fn flat_grid_height_is_scaled_sample() {
    let grid = HeightGrid::flat(3, 0.5).unwrap();
    let terrain = TerrainModel::new(grid, 4.0, 10.0, 0.0).unwrap();
    for row in -2..5 {
        for col in -2..5 {
            assert_eq!(terrain.height_at(row, col), 5.0, "height_at({row}, {col})");
        }
    }
    assert_eq!(terrain.world_height_at(0.0, 0.0), 5.0);
}

#[test]
fn cell_size_spans_world() {
    let terrain = ramp_terrain(5, 8.0, 1.0);
    assert_eq!(terrain.cell_size(), 2.0);
    assert_eq!(terrain.half_extent(), 4.0);
}

#[test]
fn out_of_range_indices_clamp_to_edge() {
    let terrain = ramp_terrain(5, 8.0, 10.0);
    for k in 0..5isize {
        assert_eq!(terrain.height_at(-3, k), terrain.height_at(0, k));
        assert_eq!(terrain.height_at(k, -1), terrain.height_at(k, 0));
        assert_eq!(terrain.height_at(9, k), terrain.height_at(4, k));
        assert_eq!(terrain.height_at(k, 100), terrain.height_at(k, 4));
    }
    assert_eq!(terrain.height_at(-7, 42), terrain.height_at(0, 4));
}

#[test]
fn world_height_matches_vertices() {
    let terrain = ramp_terrain(5, 8.0, 10.0);
    for row in 0..5 {
        for col in 0..5 {
            let p = terrain.grid_position(row, col);
            let h = terrain.world_height_at(p.x, p.z);
            let expected = terrain.height_at(row as isize, col as isize);
            assert!(
                (h - expected).abs() < 1e-4,
                "vertex ({row}, {col}): interpolated {h}, sample {expected}"
            );
        }
    }
}

#[test]
fn world_height_blends_between_vertices() {
    let terrain = ramp_terrain(5, 8.0, 10.0);
    let a = terrain.grid_position(1, 1);
    let b = terrain.grid_position(1, 2);
    let mid = (a + b) * 0.5;
    let h = terrain.world_height_at(mid.x, mid.z);
    assert!((h - (a.y + b.y) * 0.5).abs() < 1e-4, "midpoint height {h}");

    let c = terrain.grid_position(2, 2);
    let center = (a + c) * 0.5;
    let d = terrain.grid_position(2, 1);
    let expected = (a.y + b.y + c.y + d.y) * 0.25;
    assert!((terrain.world_height_at(center.x, center.z) - expected).abs() < 1e-4);
}

#[test]
fn world_height_clamps_beyond_footprint() {
    let terrain = ramp_terrain(5, 8.0, 10.0);
    let corner = terrain.height_at(4, 4);
    assert!((terrain.world_height_at(50.0, 50.0) - corner).abs() < 1e-5);
    assert!(!terrain.contains(50.0, 0.0));
    assert!(terrain.contains(4.0, -4.0));
}

#[test]
fn extreme_coordinates_take_the_corner_height() {
    let terrain = ramp_terrain(5, 8.0, 10.0);
    // x maps to columns, z to rows
    let corner = terrain.height_at(0, 4);
    assert!((terrain.world_height_at(1e20, -1e20) - corner).abs() < 1e-5);
    assert!((terrain.world_height_at(f32::MAX, f32::MIN) - corner).abs() < 1e-5);
    assert!(terrain.world_normal_at(-1e20, 1e20).is_finite());
}

#[test]
fn height_offset_shifts_everything() {
    let grid = HeightGrid::flat(4, 0.25).unwrap();
    let terrain = TerrainModel::new(grid, 6.0, 8.0, -3.0).unwrap();
    assert_eq!(terrain.height_at(1, 1), -1.0);
    assert!((terrain.world_height_at(0.7, -1.3) + 1.0).abs() < 1e-5);
}

#[test]
fn flat_normal_points_up() {
    let terrain = TerrainModel::new(HeightGrid::flat(9, 0.3).unwrap(), 16.0, 5.0, 0.0).unwrap();
    let n = terrain.world_normal_at(1.0, -2.0);
    assert!((n - Vec3::Y).length() < 1e-6, "normal {n:?}");
}

#[test]
fn ramp_normal_leans_downhill() {
    let terrain = ramp_terrain(9, 16.0, 10.0);
    let n = terrain.world_normal_at(0.0, 0.0);
    assert!(n.x < 0.0 && n.z < 0.0, "normal {n:?}");
    assert!((n.length() - 1.0).abs() < 1e-5);
}

#[test]
fn samples_are_clamped_to_unit_range() {
    let grid = HeightGrid::from_samples(2, vec![-1.0, 0.5, 2.0, 1.0]).unwrap();
    assert_eq!(grid.samples(), &[0.0, 0.5, 1.0, 1.0]);
    assert_eq!(grid.min_max(), (0.0, 1.0));
}

#[test]
fn degenerate_grids_are_rejected() {
    assert_eq!(
        HeightGrid::flat(1, 0.0),
        Err(TerrainError::GridTooSmall { size: 1 })
    );
    assert_eq!(
        HeightGrid::from_samples(3, vec![0.0; 8]),
        Err(TerrainError::SampleCountMismatch { expected: 9, actual: 8 })
    );
    let mut samples = vec![0.0; 4];
    samples[2] = f32::NAN;
    assert_eq!(
        HeightGrid::from_samples(2, samples),
        Err(TerrainError::NonFiniteSample { index: 2 })
    );
}

#[test]
fn invalid_world_parameters_are_rejected() {
    let grid = HeightGrid::flat(3, 0.5).unwrap();
    assert_eq!(
        TerrainModel::new(grid.clone(), 0.0, 1.0, 0.0),
        Err(TerrainError::InvalidWorldSize(0.0))
    );
    assert_eq!(
        TerrainModel::new(grid.clone(), -5.0, 1.0, 0.0),
        Err(TerrainError::InvalidWorldSize(-5.0))
    );
    assert_eq!(
        TerrainModel::new(grid, 4.0, -1.0, 0.0),
        Err(TerrainError::InvalidHeightScale(-1.0))
    );
}
