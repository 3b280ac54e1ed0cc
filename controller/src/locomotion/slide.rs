//! Engine sweep-and-slide character
//!
//! The physics service resolves collisions for a kinematic capsule; this strategy only
//! supplies the desired displacement. Gravity is integrated here, and jumping adds a
//! one-shot upward bias gated by a cooldown instead of the ground probe.

use bevy::prelude::*;

use super::{Locomotion, StepContext, StepReport};
use crate::physics::PhysicsWorld;

#[derive(Clone, Debug)]
pub struct CollideAndSlide {
    gravity: f32,
    jump_impulse: f32,
    cooldown: f32,
    vertical_speed: f32,
    cooldown_remaining: f32,
}

impl CollideAndSlide {
    pub fn new(gravity: f32, jump_impulse: f32, cooldown: f32) -> Self {
        Self {
            gravity,
            jump_impulse,
            cooldown,
            vertical_speed: 0.0,
            cooldown_remaining: 0.0,
        }
    }

    pub fn vertical_speed(&self) -> f32 {
        self.vertical_speed
    }
}

impl Locomotion for CollideAndSlide {
    fn step(&mut self, ctx: &StepContext, world: &mut dyn PhysicsWorld) -> StepReport {
        let dt = ctx.dt.max(0.0);
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);

        // Landing (or bumping a ceiling while supported) kills downward speed.
        if world.is_supported(ctx.body) && self.vertical_speed < 0.0 {
            self.vertical_speed = 0.0;
        }

        let jumped = ctx.jump && self.cooldown_remaining <= 0.0;
        if jumped {
            self.vertical_speed = self.jump_impulse;
            self.cooldown_remaining = self.cooldown;
        } else {
            self.vertical_speed += self.gravity * dt;
        }

        let translation = Vec3::new(ctx.wish.x, self.vertical_speed, ctx.wish.z) * dt;
        world.move_and_slide(ctx.body, translation);

        StepReport {
            jumped,
            consume_jump: false,
        }
    }

    fn reset(&mut self) {
        self.vertical_speed = 0.0;
        self.cooldown_remaining = 0.0;
    }

    fn name(&self) -> &'static str {
        "collide-and-slide"
    }
}
