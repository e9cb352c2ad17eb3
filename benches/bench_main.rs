use std::hint::black_box;

use bevy_symbios_walker::sampler::procedural_heights;
use bevy_symbios_walker::{CollisionHeightfield, TerrainMeshBuilder, TerrainModel};
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_procedural_heights(c: &mut Criterion) {
    c.bench_function("procedural_heights 101x101", |b| {
        b.iter(|| procedural_heights(black_box(101)).unwrap());
    });
}

fn bench_mesh_generation(c: &mut Criterion) {
    let grid = procedural_heights(101).unwrap();
    let terrain = TerrainModel::new(grid, 200.0, 30.0, -10.0).unwrap();

    c.bench_function("TerrainMeshBuilder 101x101", |b| {
        b.iter(|| TerrainMeshBuilder::new().build(black_box(&terrain)));
    });

    c.bench_function("CollisionHeightfield 101x101", |b| {
        b.iter(|| CollisionHeightfield::from_terrain(black_box(&terrain)));
    });
}

criterion_group!(benches, bench_procedural_heights, bench_mesh_generation);
criterion_main!(benches);
