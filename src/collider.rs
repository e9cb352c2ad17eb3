//! Avian3D physics collider generation from [`CollisionHeightfield`] data.
//!
//! Provides [`build_heightfield_collider`] which converts the exported
//! heightfield into an Avian3D `Collider::heightfield`, the cheapest
//! collision shape for static terrain, and [`ColliderResolver`], which walks
//! the actor over that same collider with downward ray casts.

use avian3d::prelude::{Collider, Position, RigidBody, Rotation};
use bevy::prelude::*;

use crate::heightfield::CollisionHeightfield;
use crate::resolver::{GroundSurface, SurfaceResolver};
use crate::terrain::central_difference_normal;

/// Builds an Avian3D `Collider::heightfield` from a [`CollisionHeightfield`].
///
/// The collider is centered at the origin of its local space, spanning
/// `[-world_size/2, world_size/2]` on X and Z, which is also where the
/// terrain mesh lies. Heights stay normalized; the exported Y scale maps them
/// to world units.
///
/// # Example
///
/// ```ignore
/// let heightfield = CollisionHeightfield::from_terrain(&terrain);
/// commands.spawn(terrain_collider_bundle(&heightfield));
/// ```
pub fn build_heightfield_collider(heightfield: &CollisionHeightfield) -> Collider {
    Collider::heightfield(heightfield.as_columns(), heightfield.scale)
}

/// Static body, collider and the Y offset that lines it up with the mesh.
pub fn terrain_collider_bundle(heightfield: &CollisionHeightfield) -> impl Bundle {
    (
        RigidBody::Static,
        build_heightfield_collider(heightfield),
        Transform::from_xyz(0.0, heightfield.height_offset, 0.0),
    )
}

/// Ground queries answered by ray casts against a heightfield collider.
#[derive(Debug, Clone)]
pub struct ColliderSurface {
    collider: Collider,
    translation: Vec3,
    half_extent: f32,
    /// Ray origin height, above the tallest possible sample.
    top: f32,
    /// Ray length reaching below the lowest possible sample.
    depth: f32,
    spacing: f32,
}

impl ColliderSurface {
    /// Builds the collider for `heightfield`, placed the way
    /// [`terrain_collider_bundle`] places it.
    pub fn new(heightfield: &CollisionHeightfield) -> Self {
        let scale = heightfield.scale;
        let translation = Vec3::new(0.0, heightfield.height_offset, 0.0);
        Self {
            collider: build_heightfield_collider(heightfield),
            translation,
            half_extent: scale.x * 0.5,
            top: translation.y + scale.y + 1.0,
            depth: scale.y + 2.0,
            spacing: scale.x / heightfield.cols.max(1) as f32,
        }
    }

    pub fn collider(&self) -> &Collider {
        &self.collider
    }
}

impl GroundSurface for ColliderSurface {
    fn contains(&self, x: f32, z: f32) -> bool {
        let h = self.half_extent;
        (-h..=h).contains(&x) && (-h..=h).contains(&z)
    }

    fn ground_height(&self, x: f32, z: f32) -> f32 {
        // Rays exactly on the outer edge can slip past the shape.
        let inner = self.half_extent * (1.0 - 1.0e-5);
        let origin = Vec3::new(x.clamp(-inner, inner), self.top, z.clamp(-inner, inner));
        match self.collider.cast_ray(
            Position(self.translation),
            Rotation::default(),
            origin,
            Vec3::NEG_Y,
            self.depth,
            true,
        ) {
            Some((distance, _)) => self.top - distance,
            None => self.translation.y,
        }
    }

    fn ground_normal(&self, x: f32, z: f32) -> Vec3 {
        central_difference_normal(x, z, self.spacing * 0.5, |x, z| self.ground_height(x, z))
    }
}

/// Resolver backed by the Avian3D heightfield collider.
pub type ColliderResolver = SurfaceResolver<ColliderSurface>;
