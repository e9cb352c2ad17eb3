//! Per-frame character movement integration.
//!
//! [`CharacterMotor`] turns input intent, gravity and jump state into a
//! desired displacement, lets its [`MovementResolver`] correct it, and applies
//! the result. It performs no collision geometry of its own.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut motor = CharacterMotor::new(MovementSettings::default(), HeightfieldResolver::new(terrain.clone()));
//! motor.spawn_on_terrain(&terrain, 0.0, 0.0);
//!
//! // Each frame:
//! motor.step(delta_time, &mut input);
//! camera_transform = motor.eye_pose().transform();
//! ```

use bevy::math::EulerRot;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::input::InputContext;
use crate::resolver::{CapsuleShape, ControllerConfig, MovementResolver};
use crate::terrain::TerrainModel;

/// Movement tunables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    /// Horizontal speed in m/s.
    pub walk_speed: f32,
    /// Speed multiplier while sprint is held.
    pub sprint_multiplier: f32,
    /// Vertical acceleration in m/s², negative pulls down.
    pub gravity: f32,
    /// Upward speed set by a jump, in m/s.
    pub jump_speed: f32,
    /// Seconds before another jump is accepted.
    pub jump_cooldown: f32,
    /// Vertical velocity held while grounded so ground contact is detected
    /// every frame. Small and negative.
    pub ground_stick_velocity: f32,
    /// Eye height above the capsule center.
    pub eye_height: f32,
    /// Radians of rotation per pointer unit.
    pub look_sensitivity: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]`.
    pub pitch_limit: f32,
    pub capsule: CapsuleShape,
    pub controller: ControllerConfig,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            walk_speed: 6.0,
            sprint_multiplier: 1.8,
            gravity: -25.0,
            jump_speed: 9.0,
            jump_cooldown: 0.4,
            ground_stick_velocity: -0.5,
            eye_height: 0.6,
            look_sensitivity: 0.002,
            pitch_limit: 1.4,
            capsule: CapsuleShape::default(),
            controller: ControllerConfig::default(),
        }
    }
}

/// Mutable per-actor state, advanced once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActorState {
    /// Capsule center in world meters.
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub vertical_velocity: f32,
    pub grounded: bool,
    /// Seconds until the next jump is allowed; only tested for `<= 0`.
    pub jump_cooldown: f32,
}

/// Camera pose derived from the actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyePose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl EyePose {
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation)
    }
}

/// What a single [`CharacterMotor::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    /// Displacement requested from the resolver.
    pub desired: Vec3,
    /// Displacement actually applied.
    pub applied: Vec3,
    pub grounded: bool,
    pub jumped: bool,
    /// `false` when the resolver failed and `desired` was applied unchanged.
    pub resolved: bool,
}

/// Horizontal forward direction for `yaw` (`-Z` at zero yaw).
pub fn forward_vector(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Horizontal right direction for `yaw` (`+X` at zero yaw).
pub fn right_vector(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Look orientation: yaw about world Y first, then pitch about the local X.
pub fn look_rotation(yaw: f32, pitch: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
}

/// Kinematic first-person actor driven by an external collision resolver.
#[derive(Resource)]
pub struct CharacterMotor {
    state: ActorState,
    settings: MovementSettings,
    resolver: Box<dyn MovementResolver>,
}

impl CharacterMotor {
    /// Creates a motor and configures `resolver` with the controller tunables.
    pub fn new(settings: MovementSettings, mut resolver: impl MovementResolver) -> Self {
        resolver.configure(&settings.controller, &settings.capsule);
        Self {
            state: ActorState::default(),
            settings,
            resolver: Box::new(resolver),
        }
    }

    pub fn state(&self) -> &ActorState {
        &self.state
    }

    pub fn settings(&self) -> &MovementSettings {
        &self.settings
    }

    /// Teleports the actor, zeroes its vertical velocity and resets the
    /// resolver's contact state.
    pub fn set_position(&mut self, position: Vec3) {
        self.state.position = position;
        self.state.vertical_velocity = 0.0;
        self.resolver.reset();
    }

    /// Overrides the grounded flag until the next [`step`](Self::step).
    pub fn set_grounded(&mut self, grounded: bool) {
        self.state.grounded = grounded;
    }

    /// Places the capsule resting on the terrain surface at `(x, z)`.
    pub fn spawn_on_terrain(&mut self, terrain: &TerrainModel, x: f32, z: f32) {
        let y = terrain.world_height_at(x, z)
            + self.settings.capsule.half_extent()
            + self.settings.controller.offset;
        self.set_position(Vec3::new(x, y, z));
    }

    /// Rotates the view by a pointer delta, clamping pitch.
    pub fn look(&mut self, delta: Vec2) {
        let s = self.settings.look_sensitivity;
        self.set_look(self.state.yaw - delta.x * s, self.state.pitch - delta.y * s);
    }

    pub fn set_look(&mut self, yaw: f32, pitch: f32) {
        let limit = self.settings.pitch_limit;
        self.state.yaw = yaw;
        self.state.pitch = pitch.clamp(-limit, limit);
    }

    /// Horizontal velocity requested by the held keys.
    pub fn horizontal_intent(&self, input: &InputContext) -> Vec3 {
        let axes = input.keys.axes();
        let dir = forward_vector(self.state.yaw) * axes.y + right_vector(self.state.yaw) * axes.x;
        let speed = if input.keys.sprint {
            self.settings.walk_speed * self.settings.sprint_multiplier
        } else {
            self.settings.walk_speed
        };
        dir.normalize_or_zero() * speed
    }

    /// Advances the actor by `dt` seconds.
    pub fn step(&mut self, dt: f32, input: &mut InputContext) -> StepReport {
        let look = input.take_look_delta();
        if look != Vec2::ZERO {
            self.look(look);
        }

        self.state.jump_cooldown -= dt;

        let horizontal = self.horizontal_intent(input);

        self.state.vertical_velocity += self.settings.gravity * dt;
        if self.state.grounded && self.state.vertical_velocity < 0.0 {
            self.state.vertical_velocity = self.settings.ground_stick_velocity;
        }

        let jumped = input.keys.jump && self.state.grounded && self.state.jump_cooldown <= 0.0;
        if jumped {
            self.state.vertical_velocity = self.settings.jump_speed;
            self.state.jump_cooldown = self.settings.jump_cooldown;
        }

        let desired = Vec3::new(
            horizontal.x * dt,
            self.state.vertical_velocity * dt,
            horizontal.z * dt,
        );

        let (applied, grounded, resolved) = match self.resolver.resolve(self.state.position, desired) {
            Ok(movement) => (movement.translation, movement.grounded, true),
            Err(e) => {
                debug!("{e}; applying unobstructed movement");
                (desired, false, false)
            }
        };

        self.state.position += applied;
        self.state.grounded = grounded;

        StepReport {
            desired,
            applied,
            grounded,
            jumped,
            resolved,
        }
    }

    /// Eye position and look orientation for the camera.
    pub fn eye_pose(&self) -> EyePose {
        EyePose {
            position: self.state.position + Vec3::Y * self.settings.eye_height,
            rotation: look_rotation(self.state.yaw, self.state.pitch),
        }
    }
}
