//! Explicit-velocity capsule
//!
//! Horizontal velocity is assigned outright each tick (no acceleration) and vertical
//! velocity is left to gravity, except on the tick a jump fires.

use bevy::prelude::*;

use super::{Locomotion, StepContext, StepReport};
use crate::physics::PhysicsWorld;

#[derive(Clone, Debug)]
pub struct VelocityBody {
    jump_impulse: f32,
}

impl VelocityBody {
    pub fn new(jump_impulse: f32) -> Self {
        Self { jump_impulse }
    }
}

impl Locomotion for VelocityBody {
    fn step(&mut self, ctx: &StepContext, world: &mut dyn PhysicsWorld) -> StepReport {
        let mut vertical = world.linear_velocity(ctx.body).y;
        if !vertical.is_finite() {
            vertical = 0.0;
        }

        // Edge triggered: the press is consumed, so holding the key cannot re-fire.
        let jumped = ctx.jump && ctx.grounded;
        if jumped {
            vertical = self.jump_impulse;
        }

        world.set_linear_velocity(ctx.body, Vec3::new(ctx.wish.x, vertical, ctx.wish.z));

        StepReport {
            jumped,
            consume_jump: jumped,
        }
    }

    fn name(&self) -> &'static str {
        "velocity-body"
    }
}
