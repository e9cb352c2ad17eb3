//! Walk over fractal terrain, or over `assets/heightmap.png` when present.
//!
//! Click to capture the pointer, WASD to move, Shift to sprint, Space to jump,
//! Escape to release the pointer.

use bevy::prelude::*;
use bevy_symbios_walker::{WalkerConfig, WalkerPlugin};

fn main() {
    let mut config = match std::env::args().nth(1) {
        Some(path) => match WalkerConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{path}: {e}");
                std::process::exit(1);
            }
        },
        None => WalkerConfig::default(),
    };
    if config.terrain.heightmap_path.is_none() {
        config.terrain.heightmap_path = Some("assets/heightmap.png".into());
    }

    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(WalkerPlugin::new(config))
        .insert_resource(ClearColor(Color::srgb(0.62, 0.75, 0.90)))
        .add_systems(Startup, spawn_light)
        .run();
}

fn spawn_light(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(60.0, 120.0, 40.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}
