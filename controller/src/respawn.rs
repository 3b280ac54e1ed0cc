//! Fall-through recovery
//!
//! If the body drops below the kill plane it is put back at the spawn point with zero
//! velocity. Position and velocity always reset together so no fall speed survives the
//! teleport.

use bevy::prelude::*;

use crate::physics::{BodyHandle, PhysicsWorld};

/// Reset instruction produced by [`RespawnGuard::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Respawn {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Respawn {
    /// Apply the reset to the body in one go.
    pub fn apply(&self, world: &mut dyn PhysicsWorld, body: BodyHandle) {
        world.set_position(body, self.position);
        world.set_linear_velocity(body, self.velocity);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RespawnGuard {
    threshold: f32,
    spawn: Vec3,
}

impl RespawnGuard {
    pub fn new(threshold: f32, spawn: Vec3) -> Self {
        Self { threshold, spawn }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// A body strictly below the threshold (or with a non-finite height) must respawn.
    pub fn tick(&self, position: Vec3) -> Option<Respawn> {
        let out_of_bounds = !position.y.is_finite() || position.y < self.threshold;
        out_of_bounds.then_some(Respawn {
            position: self.spawn,
            velocity: Vec3::ZERO,
        })
    }
}
