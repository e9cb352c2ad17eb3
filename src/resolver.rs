//! Collision resolution contract for a kinematic actor.
//!
//! The movement integrator never touches geometry itself. Each frame it hands
//! a desired displacement to a [`MovementResolver`], which returns the
//! corrected displacement and whether the actor ended up on the ground.
//!
//! [`SurfaceResolver`] implements the contract over any [`GroundSurface`]:
//! ground clamping with a contact offset, slope-limited climbing, sliding
//! along blocked slopes, autostep and snap-to-ground. [`HeightfieldResolver`]
//! queries a [`TerrainModel`] directly; with the `physics` feature,
//! [`ColliderResolver`](crate::collider::ColliderResolver) queries the Avian3D
//! heightfield collider.

use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::terrain::TerrainModel;

/// Step-up behavior for small ledges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Autostep {
    /// Tallest ledge that is climbed without jumping.
    pub max_height: f32,
    /// Walkable ground required past the ledge.
    pub min_width: f32,
    /// Whether dynamic bodies may be stepped onto. Static terrain ignores it.
    pub include_dynamic_bodies: bool,
}

impl Default for Autostep {
    fn default() -> Self {
        Self {
            max_height: 0.5,
            min_width: 0.2,
            include_dynamic_bodies: true,
        }
    }
}

/// The six tunables a resolver is configured with once at setup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Skin gap kept between the shape and the surface.
    pub offset: f32,
    /// Slide along obstacles instead of stopping dead.
    pub slide: bool,
    /// Steepest slope, in radians, the actor can walk up.
    pub max_slope_climb_angle: f32,
    /// Slopes steeper than this, in radians, make a resting actor slide down.
    pub min_slope_slide_angle: f32,
    pub autostep: Option<Autostep>,
    /// Largest gap, in meters, the actor is pulled down across to stay grounded.
    pub snap_to_ground: Option<f32>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            offset: 0.01,
            slide: true,
            max_slope_climb_angle: FRAC_PI_4,
            min_slope_slide_angle: 30f32.to_radians(),
            autostep: Some(Autostep::default()),
            snap_to_ground: Some(0.5),
        }
    }
}

/// Upright capsule; the actor position is its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsuleShape {
    pub half_height: f32,
    pub radius: f32,
}

impl Default for CapsuleShape {
    fn default() -> Self {
        Self {
            half_height: 0.5,
            radius: 0.35,
        }
    }
}

impl CapsuleShape {
    /// Distance from the center to the bottom of the capsule.
    pub fn half_extent(&self) -> f32 {
        self.half_height + self.radius
    }
}

/// Outcome of one resolution request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedMovement {
    /// Displacement to apply, already corrected against the scene.
    pub translation: Vec3,
    pub grounded: bool,
}

/// Resolves a desired displacement against static scene geometry.
pub trait MovementResolver: Send + Sync + 'static {
    /// Applies controller tunables and the actor shape. Called once at setup.
    fn configure(&mut self, config: &ControllerConfig, shape: &CapsuleShape);

    /// Corrects `desired` for an actor centered at `position`.
    fn resolve(&mut self, position: Vec3, desired: Vec3) -> Result<ResolvedMovement, ResolveError>;

    /// Forgets contact state carried between requests. Called when the actor
    /// is teleported.
    fn reset(&mut self) {}
}

/// Walkable ground queried by a [`SurfaceResolver`].
pub trait GroundSurface: Send + Sync + 'static {
    /// Whether `(x, z)` lies on the collidable footprint.
    fn contains(&self, x: f32, z: f32) -> bool;

    /// World height of the ground at `(x, z)`, clamped to the footprint.
    fn ground_height(&self, x: f32, z: f32) -> f32;

    /// Unit surface normal at `(x, z)`.
    fn ground_normal(&self, x: f32, z: f32) -> Vec3;
}

impl GroundSurface for TerrainModel {
    fn contains(&self, x: f32, z: f32) -> bool {
        TerrainModel::contains(self, x, z)
    }

    fn ground_height(&self, x: f32, z: f32) -> f32 {
        self.world_height_at(x, z)
    }

    fn ground_normal(&self, x: f32, z: f32) -> Vec3 {
        self.world_normal_at(x, z)
    }
}

/// Tolerance used when comparing heights.
const HEIGHT_EPSILON: f32 = 1.0e-4;

/// Resolver that collides an upright capsule with a [`GroundSurface`].
///
/// Remembers whether the previous request ended grounded; snap-to-ground
/// only applies to an actor that was standing on the surface.
#[derive(Debug, Clone)]
pub struct SurfaceResolver<S> {
    surface: S,
    config: ControllerConfig,
    shape: CapsuleShape,
    grounded: bool,
}

/// Resolver backed by the terrain model itself.
pub type HeightfieldResolver = SurfaceResolver<TerrainModel>;

impl<S: GroundSurface> SurfaceResolver<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            config: ControllerConfig::default(),
            shape: CapsuleShape::default(),
            grounded: false,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Whether the last resolved request ended on the ground.
    pub fn was_grounded(&self) -> bool {
        self.grounded
    }

    /// Center height of a capsule resting on the ground at `(x, z)`.
    fn rest_height(&self, x: f32, z: f32) -> f32 {
        self.surface.ground_height(x, z) + self.shape.half_extent() + self.config.offset
    }

    /// Slope angle of the surface at `(x, z)`, in radians.
    fn slope_at(&self, x: f32, z: f32) -> f32 {
        self.surface.ground_normal(x, z).y.clamp(-1.0, 1.0).acos()
    }

    /// Whether walking `horizontal` from `from` would climb too steeply.
    fn is_blocked(&self, from: Vec3, horizontal: Vec3) -> bool {
        let run = horizontal.length();
        if run <= f32::EPSILON {
            return false;
        }
        let to = from + horizontal;
        let start = self.surface.ground_height(from.x, from.z);
        let end = self.surface.ground_height(to.x, to.z);
        let rise = end - start;
        if rise <= 0.0 || rise.atan2(run) <= self.config.max_slope_climb_angle {
            return false;
        }
        !self.can_step(to, horizontal / run, end, rise)
    }

    /// Autostep succeeds when the ledge is low enough and the ground past it
    /// is walkable for at least `min_width`.
    fn can_step(&self, landing: Vec3, dir: Vec3, landing_height: f32, rise: f32) -> bool {
        let Some(step) = self.config.autostep else {
            return false;
        };
        if rise > step.max_height {
            return false;
        }
        let width = step.min_width.max(f32::EPSILON);
        let beyond = landing + dir * width;
        if !self.surface.contains(beyond.x, beyond.z) {
            return false;
        }
        let beyond_rise = self.surface.ground_height(beyond.x, beyond.z) - landing_height;
        beyond_rise.atan2(width) <= self.config.max_slope_climb_angle
    }

    /// Removes the component of `horizontal` heading up the obstacle it hits.
    fn slide_along(&self, from: Vec3, horizontal: Vec3) -> Vec3 {
        let hit = from + horizontal;
        let normal = self.surface.ground_normal(hit.x, hit.z);
        let downhill = Vec3::new(normal.x, 0.0, normal.z).normalize_or_zero();
        let uphill_amount = horizontal.dot(-downhill).max(0.0);
        let slid = horizontal + downhill * uphill_amount;
        if self.is_blocked(from, slid) {
            Vec3::ZERO
        } else {
            slid
        }
    }
}

impl SurfaceResolver<TerrainModel> {
    pub fn terrain(&self) -> &TerrainModel {
        &self.surface
    }
}

impl<S: GroundSurface> MovementResolver for SurfaceResolver<S> {
    fn configure(&mut self, config: &ControllerConfig, shape: &CapsuleShape) {
        self.config = *config;
        self.shape = *shape;
    }

    fn resolve(&mut self, position: Vec3, desired: Vec3) -> Result<ResolvedMovement, ResolveError> {
        if !position.is_finite() || !desired.is_finite() {
            return Err(ResolveError::NonFinite);
        }

        let mut horizontal = Vec3::new(desired.x, 0.0, desired.z);
        let reach = position + horizontal;
        if !self.surface.contains(reach.x, reach.z) {
            self.grounded = false;
            return Err(ResolveError::OutOfBounds {
                x: reach.x,
                z: reach.z,
            });
        }

        if self.is_blocked(position, horizontal) {
            horizontal = if self.config.slide {
                self.slide_along(position, horizontal)
            } else {
                Vec3::ZERO
            };
        }

        let mut target = position + horizontal + Vec3::Y * desired.y;
        let mut rest = self.rest_height(target.x, target.z);
        let mut grounded = false;

        if target.y <= rest + HEIGHT_EPSILON {
            target.y = rest;
            grounded = true;
        } else if let Some(snap) = self.config.snap_to_ground {
            if self.grounded && desired.y <= 0.0 && target.y - rest <= snap {
                target.y = rest;
                grounded = true;
            }
        }

        if grounded && self.config.slide {
            let slope = self.slope_at(target.x, target.z);
            if slope > self.config.min_slope_slide_angle {
                let normal = self.surface.ground_normal(target.x, target.z);
                let downhill = Vec3::new(normal.x, 0.0, normal.z).normalize_or_zero();
                let slid = target + downhill * desired.y.abs();
                if self.surface.contains(slid.x, slid.z) {
                    target.x = slid.x;
                    target.z = slid.z;
                    rest = self.rest_height(target.x, target.z);
                    target.y = target.y.max(rest);
                }
                grounded = slope <= self.config.max_slope_climb_angle;
            }
        }

        self.grounded = grounded;
        Ok(ResolvedMovement {
            translation: target - position,
            grounded,
        })
    }

    fn reset(&mut self) {
        self.grounded = false;
    }
}
