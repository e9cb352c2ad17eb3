//! Input state consumed by the movement integrator.
//!
//! The host translates its key and pointer events into an [`InputContext`];
//! the integrator only ever reads this object, so it can be driven from tests
//! without a window.

use bevy::prelude::*;

/// Logical movement actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveAction {
    Forward,
    Back,
    Left,
    Right,
    Sprint,
    Jump,
}

/// Held state of every [`MoveAction`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    pub jump: bool,
}

impl MoveKeys {
    pub fn set(&mut self, action: MoveAction, held: bool) {
        match action {
            MoveAction::Forward => self.forward = held,
            MoveAction::Back => self.back = held,
            MoveAction::Left => self.left = held,
            MoveAction::Right => self.right = held,
            MoveAction::Sprint => self.sprint = held,
            MoveAction::Jump => self.jump = held,
        }
    }

    /// Strafe (`x`, right positive) and forward (`y`) axes in `[-1, 1]`.
    pub fn axes(&self) -> Vec2 {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.right, self.left), axis(self.forward, self.back))
    }
}

/// Key state, pointer-look accumulator and capture flag for one actor.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct InputContext {
    pub keys: MoveKeys,
    look_delta: Vec2,
    captured: bool,
}

impl InputContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: MoveAction) {
        self.keys.set(action, true);
    }

    pub fn release(&mut self, action: MoveAction) {
        self.keys.set(action, false);
    }

    /// Accumulates a pointer delta. Ignored unless input is captured.
    pub fn add_look_delta(&mut self, delta: Vec2) {
        if self.captured {
            self.look_delta += delta;
        }
    }

    /// Returns and clears the pointer delta gathered since the last call.
    pub fn take_look_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.look_delta)
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Enters or leaves capture mode. Leaving drops any pending look delta.
    pub fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
        if !captured {
            self.look_delta = Vec2::ZERO;
        }
    }

    pub fn toggle_capture(&mut self) {
        self.set_captured(!self.captured);
    }
}
