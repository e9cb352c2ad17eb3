use std::f32::consts::FRAC_PI_2;
use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use bevy_symbios_walker::motor::{forward_vector, look_rotation, right_vector};
use bevy_symbios_walker::{
    CapsuleShape, CharacterMotor, ControllerConfig, HeightGrid, HeightfieldResolver, InputContext,
    MoveAction, MovementResolver, MovementSettings, ResolveError, ResolvedMovement, TerrainModel,
};

const DT: f32 = 1.0 / 60.0;

/// Applies every request unchanged and reports a fixed grounded flag.
struct Unobstructed {
    grounded: bool,
}

impl MovementResolver for Unobstructed {
    fn configure(&mut self, _: &ControllerConfig, _: &CapsuleShape) {}

    fn resolve(&mut self, _: Vec3, desired: Vec3) -> Result<ResolvedMovement, ResolveError> {
        Ok(ResolvedMovement {
            translation: desired,
            grounded: self.grounded,
        })
    }
}

/// Infinite floor: the capsule center never goes below `rest_y`.
struct Floor {
    rest_y: f32,
}

impl MovementResolver for Floor {
    fn configure(&mut self, _: &ControllerConfig, _: &CapsuleShape) {}

    fn resolve(&mut self, position: Vec3, desired: Vec3) -> Result<ResolvedMovement, ResolveError> {
        let target = position + desired;
        if target.y <= self.rest_y {
            Ok(ResolvedMovement {
                translation: Vec3::new(desired.x, self.rest_y - position.y, desired.z),
                grounded: true,
            })
        } else {
            Ok(ResolvedMovement {
                translation: desired,
                grounded: false,
            })
        }
    }
}

struct Failing;

impl MovementResolver for Failing {
    fn configure(&mut self, _: &ControllerConfig, _: &CapsuleShape) {}

    fn resolve(&mut self, position: Vec3, _: Vec3) -> Result<ResolvedMovement, ResolveError> {
        Err(ResolveError::OutOfBounds {
            x: position.x,
            z: position.z,
        })
    }
}

struct Recording {
    seen: Arc<Mutex<Option<(ControllerConfig, CapsuleShape)>>>,
}

impl MovementResolver for Recording {
    fn configure(&mut self, config: &ControllerConfig, shape: &CapsuleShape) {
        *self.seen.lock().unwrap() = Some((*config, *shape));
    }

    fn resolve(&mut self, _: Vec3, desired: Vec3) -> Result<ResolvedMovement, ResolveError> {
        Ok(ResolvedMovement {
            translation: desired,
            grounded: false,
        })
    }
}

fn grounded_motor(resolver: impl MovementResolver) -> CharacterMotor {
    let mut motor = CharacterMotor::new(MovementSettings::default(), resolver);
    motor.set_grounded(true);
    motor
}

#[test]
fn new_configures_resolver_once() {
    let seen = Arc::new(Mutex::new(None));
    let settings = MovementSettings {
        controller: ControllerConfig {
            offset: 0.02,
            snap_to_ground: Some(0.3),
            ..default()
        },
        ..default()
    };
    let _motor = CharacterMotor::new(settings, Recording { seen: seen.clone() });
    let recorded = *seen.lock().unwrap();
    let (config, shape) = recorded.expect("resolver should be configured");
    assert_eq!(config, settings.controller);
    assert_eq!(shape, settings.capsule);
}

#[test]
fn jump_overrides_gravity_for_the_frame() {
    let mut motor = grounded_motor(Unobstructed { grounded: true });
    assert!(motor.state().jump_cooldown <= 0.0);
    let mut input = InputContext::new();
    input.press(MoveAction::Jump);

    let report = motor.step(DT, &mut input);
    assert!(report.jumped);
    assert_eq!(motor.state().vertical_velocity, 9.0);
    assert_eq!(motor.state().jump_cooldown, 0.4);
    assert!((report.desired.y - 9.0 * DT).abs() < 1e-6);
}

#[test]
fn held_jump_fires_once_per_cooldown() {
    let mut motor = grounded_motor(Unobstructed { grounded: true });
    let mut input = InputContext::new();
    input.press(MoveAction::Jump);

    let mut frames = Vec::new();
    for frame in 0..60 {
        if motor.step(DT, &mut input).jumped {
            frames.push(frame);
        }
    }
    assert_eq!(frames[0], 0, "first press should jump immediately");
    assert!(frames.len() >= 2, "jump should re-arm after the cooldown");
    for pair in frames.windows(2) {
        let gap = (pair[1] - pair[0]) as f32 * DT;
        assert!(gap >= 0.4 - 1e-4, "jumps {pair:?} only {gap}s apart");
    }
}

#[test]
fn no_jump_while_airborne() {
    let mut motor = CharacterMotor::new(MovementSettings::default(), Unobstructed { grounded: false });
    motor.set_position(Vec3::new(0.0, 10.0, 0.0));
    let mut input = InputContext::new();
    input.press(MoveAction::Jump);
    for _ in 0..10 {
        assert!(!motor.step(DT, &mut input).jumped);
    }
    assert!(motor.state().vertical_velocity < 0.0);
}

#[test]
fn grounded_velocity_stays_clamped() {
    let mut motor = grounded_motor(Floor { rest_y: 1.0 });
    motor.set_position(Vec3::new(0.0, 1.0, 0.0));
    let mut input = InputContext::new();
    let mut total_drop = 0.0;
    for _ in 0..60 {
        let report = motor.step(DT, &mut input);
        total_drop += report.applied.y;
        assert!(report.grounded);
        assert_eq!(motor.state().vertical_velocity, -0.5);
    }
    assert!(total_drop.abs() < 1e-6, "grounded actor drifted {total_drop}");
    assert_eq!(motor.state().position.y, 1.0);
}

#[test]
fn free_fall_lands_and_clamps() {
    let mut motor = CharacterMotor::new(MovementSettings::default(), Floor { rest_y: 1.0 });
    motor.set_position(Vec3::new(0.0, 1.5, 0.0));
    let mut input = InputContext::new();

    let mut peak_speed: f32 = 0.0;
    for _ in 0..60 {
        motor.step(DT, &mut input);
        peak_speed = peak_speed.max(-motor.state().vertical_velocity);
    }
    // Falling 0.5 m under 25 m/s² takes 0.2 s and reaches about 5 m/s.
    assert!(peak_speed > 4.0 && peak_speed < 6.0, "peak fall speed {peak_speed}");
    assert!(motor.state().grounded);
    assert_eq!(motor.state().vertical_velocity, -0.5);
    assert!((motor.state().position.y - 1.0).abs() < 1e-6);
}

#[test]
fn forward_moves_along_negative_z_at_zero_yaw() {
    let mut motor = grounded_motor(Unobstructed { grounded: true });
    let mut input = InputContext::new();
    input.press(MoveAction::Forward);
    let report = motor.step(DT, &mut input);
    let expected = Vec3::new(0.0, 0.0, -6.0 * DT);
    assert!((report.desired.with_y(0.0) - expected).length() < 1e-6, "{:?}", report.desired);
}

#[test]
fn sprint_multiplies_speed_and_diagonals_are_normalized() {
    let motor = grounded_motor(Unobstructed { grounded: true });
    let mut input = InputContext::new();
    input.press(MoveAction::Forward);
    input.press(MoveAction::Right);
    assert!((motor.horizontal_intent(&input).length() - 6.0).abs() < 1e-5);

    input.press(MoveAction::Sprint);
    assert!((motor.horizontal_intent(&input).length() - 10.8).abs() < 1e-4);

    input.press(MoveAction::Back);
    input.release(MoveAction::Right);
    assert_eq!(motor.horizontal_intent(&input), Vec3::ZERO);
}

#[test]
fn yaw_rotates_basis_vectors() {
    let f = forward_vector(FRAC_PI_2);
    let r = right_vector(FRAC_PI_2);
    assert!((f - Vec3::NEG_X).length() < 1e-6, "forward {f:?}");
    assert!((r - Vec3::NEG_Z).length() < 1e-6, "right {r:?}");
    assert!(forward_vector(0.7).dot(right_vector(0.7)).abs() < 1e-6);
}

#[test]
fn look_rotation_matches_basis() {
    let yaw = 0.8;
    let rot = look_rotation(yaw, 0.0);
    assert!((rot * Vec3::NEG_Z - forward_vector(yaw)).length() < 1e-5);
    assert!((rot * Vec3::X - right_vector(yaw)).length() < 1e-5);

    let expected = Quat::from_rotation_y(yaw) * Quat::from_rotation_x(0.3);
    assert!(look_rotation(yaw, 0.3).abs_diff_eq(expected, 1e-5));
}

#[test]
fn resolver_failure_degrades_to_free_movement() {
    let mut motor = grounded_motor(Failing);
    let mut input = InputContext::new();
    input.press(MoveAction::Left);
    let start = motor.state().position;
    let report = motor.step(DT, &mut input);
    assert!(!report.resolved);
    assert!(!report.grounded);
    assert_eq!(report.applied, report.desired);
    assert_eq!(motor.state().position, start + report.desired);
}

#[test]
fn set_position_resets_vertical_velocity() {
    let mut motor = CharacterMotor::new(MovementSettings::default(), Unobstructed { grounded: false });
    let mut input = InputContext::new();
    for _ in 0..10 {
        motor.step(DT, &mut input);
    }
    assert!(motor.state().vertical_velocity < 0.0);
    motor.set_position(Vec3::new(3.0, 4.0, 5.0));
    assert_eq!(motor.state().position, Vec3::new(3.0, 4.0, 5.0));
    assert_eq!(motor.state().vertical_velocity, 0.0);
}

#[test]
fn look_requires_capture_and_clamps_pitch() {
    let mut motor = grounded_motor(Unobstructed { grounded: true });
    let mut input = InputContext::new();
    input.add_look_delta(Vec2::new(100.0, 0.0));
    motor.step(DT, &mut input);
    assert_eq!(motor.state().yaw, 0.0, "uncaptured pointer motion must be ignored");

    input.set_captured(true);
    input.add_look_delta(Vec2::new(100.0, -100_000.0));
    motor.step(DT, &mut input);
    assert!((motor.state().yaw + 0.2).abs() < 1e-6);
    assert_eq!(motor.state().pitch, 1.4);

    input.add_look_delta(Vec2::new(0.0, 100_000.0));
    motor.step(DT, &mut input);
    assert_eq!(motor.state().pitch, -1.4);
}

#[test]
fn releasing_capture_drops_pending_look() {
    let mut input = InputContext::new();
    input.set_captured(true);
    input.add_look_delta(Vec2::new(3.0, 4.0));
    input.toggle_capture();
    assert!(!input.is_captured());
    assert_eq!(input.take_look_delta(), Vec2::ZERO);
}

#[test]
fn eye_pose_sits_above_center() {
    let mut motor = grounded_motor(Unobstructed { grounded: true });
    motor.set_position(Vec3::new(1.0, 2.0, 3.0));
    motor.set_look(0.5, -0.25);
    let pose = motor.eye_pose();
    assert!((pose.position - Vec3::new(1.0, 2.6, 3.0)).length() < 1e-6);
    assert!(pose.rotation.abs_diff_eq(look_rotation(0.5, -0.25), 1e-6));
    assert_eq!(pose.transform().translation, pose.position);
}

#[test]
fn spawn_rests_capsule_on_terrain() {
    let terrain = TerrainModel::new(HeightGrid::flat(3, 0.5).unwrap(), 4.0, 10.0, 0.0).unwrap();
    let mut motor = CharacterMotor::new(MovementSettings::default(), Unobstructed { grounded: true });
    motor.spawn_on_terrain(&terrain, 0.0, 0.0);
    assert!((motor.state().position.y - (5.0 + 0.85 + 0.01)).abs() < 1e-5);
}

#[test]
fn walks_across_terrain_with_heightfield_resolver() {
    let terrain = TerrainModel::new(HeightGrid::flat(11, 0.2).unwrap(), 20.0, 10.0, 0.0).unwrap();
    let mut motor = CharacterMotor::new(MovementSettings::default(), HeightfieldResolver::new(terrain.clone()));
    motor.spawn_on_terrain(&terrain, 0.0, 0.0);
    let rest_y = motor.state().position.y;

    let mut input = InputContext::new();
    input.press(MoveAction::Forward);
    for _ in 0..60 {
        motor.step(DT, &mut input);
    }
    let p = motor.state().position;
    assert!(motor.state().grounded);
    assert!((p.z + 6.0).abs() < 1e-3, "walked to {p:?}");
    assert!((p.y - rest_y).abs() < 1e-4, "height drifted to {}", p.y);
}

#[test]
fn teleported_actor_falls_instead_of_snapping() {
    let terrain = TerrainModel::new(HeightGrid::flat(11, 0.2).unwrap(), 20.0, 10.0, 0.0).unwrap();
    let mut motor = CharacterMotor::new(MovementSettings::default(), HeightfieldResolver::new(terrain.clone()));
    motor.spawn_on_terrain(&terrain, 0.0, 0.0);
    let rest_y = motor.state().position.y;
    let mut input = InputContext::new();
    for _ in 0..5 {
        motor.step(DT, &mut input);
    }
    assert!(motor.state().grounded);

    motor.set_position(Vec3::new(0.0, rest_y + 0.3, 0.0));
    let report = motor.step(DT, &mut input);
    assert!(!report.grounded);
    assert!(report.applied.y > -0.05, "pulled down by {}", report.applied.y);
}

#[test]
fn jump_lands_without_early_snap() {
    let terrain = TerrainModel::new(HeightGrid::flat(11, 0.2).unwrap(), 20.0, 10.0, 0.0).unwrap();
    let mut motor = CharacterMotor::new(MovementSettings::default(), HeightfieldResolver::new(terrain.clone()));
    motor.spawn_on_terrain(&terrain, 0.0, 0.0);
    let rest_y = motor.state().position.y;
    let mut input = InputContext::new();
    motor.step(DT, &mut input);
    input.press(MoveAction::Jump);
    assert!(motor.step(DT, &mut input).jumped);
    input.release(MoveAction::Jump);

    let mut landed = false;
    for _ in 0..120 {
        let report = motor.step(DT, &mut input);
        // Landing may only shorten the requested drop.
        assert!(report.applied.y >= report.desired.y - 1e-5, "snapped by {:?}", report);
        if report.grounded {
            landed = true;
            break;
        }
    }
    assert!(landed);
    assert!((motor.state().position.y - rest_y).abs() < 1e-4);
}
