//! Bevy plugin wiring terrain construction and the per-frame walker loop.
//!
//! Startup samples the heights, builds the [`TerrainModel`], spawns the
//! terrain mesh and camera, and inserts the [`CollisionHeightfield`] and
//! [`CharacterMotor`] resources. Each frame then runs, in order:
//! `read_input → step_walker → sync_camera`.
//!
//! With the `physics` feature an Avian3D heightfield collider is spawned as
//! well, and the walker resolves its movement against that collider through
//! [`ColliderResolver`](crate::collider::ColliderResolver) instead of the
//! terrain model. The collider is static, so no physics schedule ordering is
//! required.

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;

use crate::config::WalkerConfig;
use crate::error::TerrainError;
use crate::heightfield::CollisionHeightfield;
use crate::input::{InputContext, MoveAction};
use crate::mesher::{TerrainMesh, TerrainMeshBuilder};
use crate::motor::CharacterMotor;
#[cfg(not(feature = "physics"))]
use crate::resolver::HeightfieldResolver;
use crate::sampler::{HeightSource, sample_heights};
use crate::terrain::TerrainModel;

/// Systems advancing the walker each frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalkerSet;

/// Marker for the rendered terrain surface.
#[derive(Component)]
pub struct TerrainSurface;

/// Marker for the first-person camera following the walker.
#[derive(Component)]
pub struct WalkerCamera;

/// Default key bindings.
const BINDINGS: [(KeyCode, MoveAction); 10] = [
    (KeyCode::KeyW, MoveAction::Forward),
    (KeyCode::ArrowUp, MoveAction::Forward),
    (KeyCode::KeyS, MoveAction::Back),
    (KeyCode::ArrowDown, MoveAction::Back),
    (KeyCode::KeyA, MoveAction::Left),
    (KeyCode::ArrowLeft, MoveAction::Left),
    (KeyCode::KeyD, MoveAction::Right),
    (KeyCode::ArrowRight, MoveAction::Right),
    (KeyCode::ShiftLeft, MoveAction::Sprint),
    (KeyCode::Space, MoveAction::Jump),
];

/// Everything derived from a [`WalkerConfig`] at startup.
pub struct WalkerWorld {
    pub terrain: TerrainModel,
    pub source: HeightSource,
    pub mesh: TerrainMesh,
    pub heightfield: CollisionHeightfield,
    pub motor: CharacterMotor,
}

/// Samples heights and derives the mesh, collision heightfield and a motor
/// standing on the terrain center.
///
/// The motor resolves against the terrain model, or against the Avian3D
/// collider when the `physics` feature is enabled.
pub fn build_world(config: &WalkerConfig) -> Result<WalkerWorld, TerrainError> {
    let t = &config.terrain;
    let (grid, source) = sample_heights(t.heightmap_path.as_deref(), t.grid_size)?;
    let terrain = TerrainModel::new(grid, t.world_size, t.height_scale, t.height_offset)?;

    let mesh = TerrainMeshBuilder::new().build(&terrain);
    info!(
        "terrain mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    let heightfield = CollisionHeightfield::from_terrain(&terrain);

    #[cfg(feature = "physics")]
    let mut motor = CharacterMotor::new(
        config.movement,
        crate::collider::ColliderResolver::new(crate::collider::ColliderSurface::new(&heightfield)),
    );
    #[cfg(not(feature = "physics"))]
    let mut motor = CharacterMotor::new(config.movement, HeightfieldResolver::new(terrain.clone()));
    motor.spawn_on_terrain(&terrain, 0.0, 0.0);

    Ok(WalkerWorld {
        terrain,
        source,
        mesh,
        heightfield,
        motor,
    })
}

/// Height-field terrain with a first-person walker.
///
/// # Panics
///
/// The startup system panics if the config is invalid or the terrain cannot
/// be built; a corrupt world is never constructed.
#[derive(Default)]
pub struct WalkerPlugin {
    pub config: WalkerConfig,
}

impl WalkerPlugin {
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }
}

impl Plugin for WalkerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .init_resource::<InputContext>()
            .add_systems(Startup, setup_walker)
            .add_systems(
                Update,
                (read_input, step_walker, sync_camera)
                    .chain()
                    .in_set(WalkerSet),
            );
    }
}

fn setup_walker(
    mut commands: Commands,
    config: Res<WalkerConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if let Err(e) = config.validate() {
        panic!("{e}");
    }
    let world = match build_world(&config) {
        Ok(world) => world,
        Err(e) => panic!("failed to build terrain: {e}"),
    };

    commands.spawn((
        Mesh3d(meshes.add(Mesh::from(world.mesh))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            perceptual_roughness: 0.9,
            ..default()
        })),
        Transform::default(),
        TerrainSurface,
    ));

    #[cfg(feature = "physics")]
    commands.spawn(crate::collider::terrain_collider_bundle(&world.heightfield));

    commands.spawn((
        Camera3d::default(),
        world.motor.eye_pose().transform(),
        WalkerCamera,
    ));

    commands.insert_resource(world.heightfield);
    commands.insert_resource(world.terrain);
    commands.insert_resource(world.motor);
}

/// Maps keyboard and pointer state into the [`InputContext`].
///
/// Left click captures the pointer for look; Escape releases it.
fn read_input(
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    motion: Res<AccumulatedMouseMotion>,
    mut input: ResMut<InputContext>,
) {
    if buttons.just_pressed(MouseButton::Left) {
        input.set_captured(true);
    }
    if keys.just_pressed(KeyCode::Escape) {
        input.set_captured(false);
    }

    for action in [
        MoveAction::Forward,
        MoveAction::Back,
        MoveAction::Left,
        MoveAction::Right,
        MoveAction::Sprint,
        MoveAction::Jump,
    ] {
        let held = BINDINGS
            .iter()
            .any(|(key, bound)| *bound == action && keys.pressed(*key));
        input.keys.set(action, held);
    }

    input.add_look_delta(motion.delta);
}

fn step_walker(
    time: Res<Time>,
    motor: Option<ResMut<CharacterMotor>>,
    mut input: ResMut<InputContext>,
) {
    let Some(mut motor) = motor else {
        return;
    };
    motor.step(time.delta_secs(), &mut input);
}

fn sync_camera(
    motor: Option<Res<CharacterMotor>>,
    mut cameras: Query<&mut Transform, With<WalkerCamera>>,
) {
    let Some(motor) = motor else {
        return;
    };
    let pose = motor.eye_pose().transform();
    for mut transform in &mut cameras {
        *transform = pose;
    }
}
