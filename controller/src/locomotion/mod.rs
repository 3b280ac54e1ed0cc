//! Locomotion strategies
//!
//! Both strategies share the same input contract: a desired horizontal velocity built
//! from held keys and yaw, a jump request, and the ground probe result. They differ in
//! how the displacement reaches the physics service.

mod slide;
mod velocity;

pub use slide::CollideAndSlide;
pub use velocity::VelocityBody;

use bevy::prelude::*;

use crate::config::{MovementConfig, Strategy};
use crate::input::ControlSample;
use crate::physics::{BodyHandle, PhysicsWorld};

/// Horizontal movement basis for a yaw angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Basis {
    pub forward: Vec3,
    pub right: Vec3,
}

pub fn horizontal_basis(yaw: f32) -> Basis {
    let (sin, cos) = yaw.sin_cos();
    Basis {
        forward: Vec3::new(sin, 0.0, cos),
        right: Vec3::new(cos, 0.0, -sin),
    }
}

/// Desired horizontal velocity. Diagonals are normalized so they never exceed `speed`.
pub fn wish_velocity(controls: &ControlSample, yaw: f32, walk_speed: f32, run_speed: f32) -> Vec3 {
    let basis = horizontal_basis(yaw);
    let mut direction = Vec3::ZERO;
    if controls.forward {
        direction += basis.forward;
    }
    if controls.back {
        direction -= basis.forward;
    }
    if controls.left {
        direction -= basis.right;
    }
    if controls.right {
        direction += basis.right;
    }

    let speed = if controls.run { run_speed } else { walk_speed };
    direction.normalize_or_zero() * speed
}

/// Per-tick input to a strategy.
#[derive(Clone, Copy, Debug)]
pub struct StepContext {
    pub dt: f32,
    pub body: BodyHandle,
    /// Horizontal velocity the player asked for (y is always 0).
    pub wish: Vec3,
    pub jump: bool,
    /// Ground probe result for this tick.
    pub grounded: bool,
}

/// What a strategy did this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub jumped: bool,
    /// The jump press was used up and must be released before another jump.
    pub consume_jump: bool,
}

/// A movement-integration strategy.
pub trait Locomotion: Send + Sync {
    fn step(&mut self, ctx: &StepContext, world: &mut dyn PhysicsWorld) -> StepReport;

    /// Forget any internal motion state (called after a respawn).
    fn reset(&mut self) {}

    fn name(&self) -> &'static str;
}

impl Strategy {
    pub fn build(self, config: &MovementConfig) -> Box<dyn Locomotion> {
        match self {
            Strategy::VelocityBody => Box::new(VelocityBody::new(config.jump_impulse)),
            Strategy::CollideAndSlide => Box::new(CollideAndSlide::new(
                config.gravity,
                config.jump_impulse,
                config.jump_cooldown,
            )),
        }
    }
}
