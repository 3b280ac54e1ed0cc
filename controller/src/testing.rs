//! In-memory physics double for controller tests.
//!
//! A single body over an optional square floor. Like the engine, nothing moves until
//! `step`: a dynamic body integrates its velocity with gravity, a kinematic body applies
//! the move queued by `move_and_slide` and resolves it against the floor.

use std::cell::RefCell;

use bevy::prelude::*;

use crate::physics::{BodyHandle, PhysicsWorld, RayHit};

pub struct ScriptedWorld {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Top surface of the floor, or no floor at all.
    pub floor_y: Option<f32>,
    /// Floor covers |x| and |z| up to this value.
    pub floor_extent: f32,
    pub half_height: f32,
    /// Kinematic bodies only move through `move_and_slide`.
    pub kinematic: bool,
    /// Move requested this frame, applied on the next `step`.
    pub pending_move: Option<Vec3>,
    pub supported: bool,
    pub slide_moves: Vec<Vec3>,
    pub velocity_writes: Vec<Vec3>,
    pub teleports: Vec<Vec3>,
    pub cast_log: RefCell<Vec<Option<BodyHandle>>>,
}

impl ScriptedWorld {
    pub fn new(half_height: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            floor_y: None,
            floor_extent: f32::INFINITY,
            half_height,
            kinematic: false,
            pending_move: None,
            supported: false,
            slide_moves: Vec::new(),
            velocity_writes: Vec::new(),
            teleports: Vec::new(),
            cast_log: RefCell::new(Vec::new()),
        }
    }

    /// Body resting on a floor at y = 0.
    pub fn on_floor(half_height: f32) -> Self {
        let mut world = Self::new(half_height);
        world.floor_y = Some(0.0);
        world.position = Vec3::new(0.0, half_height, 0.0);
        world.supported = true;
        world
    }

    pub fn body(&self) -> BodyHandle {
        BodyHandle(Entity::PLACEHOLDER)
    }

    fn floor_under(&self, point: Vec3) -> Option<f32> {
        let floor_y = self.floor_y?;
        (point.x.abs() <= self.floor_extent && point.z.abs() <= self.floor_extent)
            .then_some(floor_y)
    }

    /// Keep the capsule out of the floor. Returns true if it had to be pushed up.
    fn resolve_floor(&mut self) -> bool {
        let Some(floor_y) = self.floor_under(self.position) else {
            return false;
        };
        let rest_y = floor_y + self.half_height;
        // Only catch bodies that are at or slightly into the floor, not ones that
        // have already fallen past its edge.
        if self.position.y < rest_y && self.position.y > floor_y {
            self.position.y = rest_y;
            return true;
        }
        false
    }

    /// Advance the simulation one step.
    pub fn step(&mut self, dt: f32, gravity: f32) {
        if self.kinematic {
            if let Some(translation) = self.pending_move.take() {
                self.position += translation;
                self.supported = self.resolve_floor();
            }
            return;
        }
        self.velocity.y += gravity * dt;
        self.position += self.velocity * dt;
        if self.resolve_floor() && self.velocity.y < 0.0 {
            self.velocity.y = 0.0;
        }
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn linear_velocity(&self, _body: BodyHandle) -> Vec3 {
        self.velocity
    }

    fn set_linear_velocity(&mut self, _body: BodyHandle, velocity: Vec3) {
        self.velocity = velocity;
        self.velocity_writes.push(velocity);
    }

    fn position(&self, _body: BodyHandle) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, _body: BodyHandle, position: Vec3) {
        self.position = position;
        self.pending_move = None;
        self.teleports.push(position);
    }

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<BodyHandle>,
    ) -> Option<RayHit> {
        self.cast_log.borrow_mut().push(exclude);
        // Only downward rays can reach the floor.
        if direction.y >= 0.0 {
            return None;
        }
        let floor_y = self.floor_under(origin)?;
        let distance = (origin.y - floor_y) / -direction.y;
        (distance >= 0.0 && distance <= max_distance).then_some(RayHit { distance })
    }

    fn move_and_slide(&mut self, _body: BodyHandle, translation: Vec3) {
        self.slide_moves.push(translation);
        self.pending_move = Some(translation);
    }

    fn is_supported(&self, _body: BodyHandle) -> bool {
        self.supported
    }
}
