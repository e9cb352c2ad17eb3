//! Height sources: fractal value noise and grayscale images.
//!
//! Both producers emit a [`HeightGrid`] of the same shape. [`sample_heights`]
//! prefers an image when one is configured and silently falls back to the
//! procedural generator when it cannot be read.

use std::path::Path;

use bevy::prelude::*;
use image::DynamicImage;
use image::imageops::FilterType;

use crate::error::{SamplerError, TerrainError};
use crate::heightmap::HeightGrid;

/// Lattice cycles across the whole grid for the first octave.
pub const FBM_BASE_FREQUENCY: f32 = 4.0;
pub const FBM_OCTAVES: usize = 6;
/// Frequency multiplier between octaves.
pub const FBM_LACUNARITY: f32 = 2.1;
/// Amplitude multiplier between octaves.
pub const FBM_GAIN: f32 = 0.5;

/// Where a [`HeightGrid`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeightSource {
    Image,
    Procedural,
}

/// Stable pseudo-random value in `[0, 1)` for an integer lattice point.
fn lattice_hash(x: i32, y: i32) -> f32 {
    let mut h = (x as u32).wrapping_mul(0x8da6_b343) ^ (y as u32).wrapping_mul(0xd816_3841);
    h ^= h >> 15;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    (h >> 8) as f32 / (1u32 << 24) as f32
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Smoothstep-blended bilinear value noise, bounded to `[0, 1)`.
pub fn value_noise(x: f32, y: f32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let ux = smoothstep(x - x0);
    let uy = smoothstep(y - y0);
    let (ix, iy) = (x0 as i32, y0 as i32);

    let a = lattice_hash(ix, iy);
    let b = lattice_hash(ix.wrapping_add(1), iy);
    let c = lattice_hash(ix, iy.wrapping_add(1));
    let d = lattice_hash(ix.wrapping_add(1), iy.wrapping_add(1));

    a * (1.0 - ux) * (1.0 - uy) + b * ux * (1.0 - uy) + c * (1.0 - ux) * uy + d * ux * uy
}

/// Fractal sum of [`value_noise`] octaves, normalized by total amplitude.
pub fn fbm(x: f32, y: f32) -> f32 {
    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut total = 0.0;
    for _ in 0..FBM_OCTAVES {
        value += amplitude * value_noise(x * frequency, y * frequency);
        total += amplitude;
        amplitude *= FBM_GAIN;
        frequency *= FBM_LACUNARITY;
    }
    value / total
}

/// Deterministic fractal terrain, rescaled so the grid spans exactly `[0, 1]`.
pub fn procedural_heights(size: usize) -> Result<HeightGrid, TerrainError> {
    if size < 2 {
        return Err(TerrainError::GridTooSmall { size });
    }
    let n = size as f32;
    let mut raw = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            let x = col as f32 / n * FBM_BASE_FREQUENCY;
            let y = row as f32 / n * FBM_BASE_FREQUENCY;
            raw.push(fbm(x, y));
        }
    }

    let (lo, hi) = raw
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = hi - lo;
    for v in &mut raw {
        *v = if range > f32::EPSILON { (*v - lo) / range } else { 0.0 };
    }
    HeightGrid::from_samples(size, raw)
}

/// Downsamples `img` to `size × size` and reads the red channel as height.
pub fn image_heights(img: &DynamicImage, size: usize) -> Result<HeightGrid, TerrainError> {
    if size < 2 {
        return Err(TerrainError::GridTooSmall { size });
    }
    let edge = size as u32;
    let resized = image::imageops::resize(&img.to_rgba8(), edge, edge, FilterType::Triangle);
    let samples: Vec<f32> = resized.pixels().map(|p| p.0[0] as f32 / 255.0).collect();
    HeightGrid::from_samples(size, samples)
}

/// Reads an image file and converts it with [`image_heights`].
pub fn load_image_heights(path: &Path, size: usize) -> Result<HeightGrid, SamplerError> {
    let image = image::open(path)?;
    Ok(image_heights(&image, size)?)
}

/// Produces the startup height grid.
///
/// Uses the image at `path` when it decodes, otherwise the procedural
/// generator. Image failures are logged and never returned.
pub fn sample_heights(
    path: Option<&Path>,
    size: usize,
) -> Result<(HeightGrid, HeightSource), TerrainError> {
    if size < 2 {
        return Err(TerrainError::GridTooSmall { size });
    }
    if let Some(path) = path {
        match load_image_heights(path, size) {
            Ok(grid) => {
                let (lo, hi) = grid.min_max();
                info!(
                    "heightmap loaded from {} ({size}x{size}, brightness {lo:.3}..{hi:.3})",
                    path.display()
                );
                return Ok((grid, HeightSource::Image));
            }
            Err(e) => {
                warn!("{e}; falling back to procedural terrain");
            }
        }
    }
    let grid = procedural_heights(size)?;
    info!("generated procedural terrain ({size}x{size})");
    Ok((grid, HeightSource::Procedural))
}
