//! Height-field terrain and a first-person kinematic walker for Bevy.
//!
//! Builds a square grid of normalized heights (from a grayscale image or
//! fractal noise), places it in world space, and derives from it a smoothly
//! shaded Bevy [`Mesh`](bevy::prelude::Mesh) and a collision heightfield. A
//! [`CharacterMotor`] walks a capsule over the surface under gravity with
//! jump, sprint, autostep, slope sliding and snap-to-ground.
//!
//! # Features
//!
//! - **Height sampling**: [`sampler::sample_heights`] loads an image and falls
//!   back to deterministic [`sampler::procedural_heights`] on any failure.
//! - **Terrain queries**: clamped grid lookup and bilinear world-space height
//!   via [`TerrainModel`].
//! - **Mesh generation**: [`TerrainMeshBuilder`] with smooth normals, UVs and
//!   elevation-banded vertex colors.
//! - **Collision export**: [`CollisionHeightfield`] in column-major layout.
//! - **Movement**: [`CharacterMotor`] plus the [`MovementResolver`] contract
//!   and a terrain-backed [`HeightfieldResolver`].
//! - **Physics colliders** (optional, `physics` feature): an Avian3D
//!   `Collider::heightfield` via [`collider`], which the walker then
//!   resolves against.
//!
//! # Feature Flags
//!
//! - `physics`: Enables [`collider`], [`collider::build_heightfield_collider`]
//!   and [`collider::ColliderResolver`] for Avian3D integration.
//!
//! # Example
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_symbios_walker::{WalkerConfig, WalkerPlugin};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(WalkerPlugin::new(WalkerConfig::default()))
//!         .run();
//! }
//! ```

pub mod config;
pub mod error;
pub mod heightfield;
pub mod heightmap;
pub mod input;
pub mod mesher;
pub mod motor;
pub mod plugin;
pub mod resolver;
pub mod sampler;
pub mod terrain;

#[cfg(feature = "physics")]
pub mod collider;

pub use config::{TerrainSettings, WalkerConfig};
pub use error::{ConfigError, ResolveError, SamplerError, TerrainError};
pub use heightfield::CollisionHeightfield;
pub use heightmap::HeightGrid;
pub use input::{InputContext, MoveAction, MoveKeys};
pub use mesher::{NormalMethod, TerrainMesh, TerrainMeshBuilder, height_color};
pub use motor::{ActorState, CharacterMotor, EyePose, MovementSettings, StepReport};
pub use plugin::{WalkerCamera, WalkerPlugin, WalkerSet, WalkerWorld, build_world};
pub use resolver::{
    Autostep, CapsuleShape, ControllerConfig, GroundSurface, HeightfieldResolver, MovementResolver,
    ResolvedMovement, SurfaceResolver,
};
pub use sampler::HeightSource;
pub use terrain::TerrainModel;

#[cfg(feature = "physics")]
pub use collider::{
    ColliderResolver, ColliderSurface, build_heightfield_collider, terrain_collider_bundle,
};
