//! Physics service abstraction.
//!
//! The controller never owns a physics engine. It reads and writes the player body
//! through [`PhysicsWorld`], which the Rapier adapter implements at runtime and a
//! scripted world implements in tests.
//!
//! All vectors handed across this trait are in controller space: +Y up, yaw 0 faces +Z
//! and the right-hand side is +X.

use bevy::prelude::*;

/// Handle to the simulated player body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub Entity);

/// Result of a ray query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
}

/// The calls the controller makes into the physics/collision service each tick.
pub trait PhysicsWorld {
    fn linear_velocity(&self, body: BodyHandle) -> Vec3;

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec3);

    fn position(&self, body: BodyHandle) -> Vec3;

    /// Teleport the body. Cancels any move queued by `move_and_slide` this frame, so
    /// nothing from before the teleport is applied at the new position.
    fn set_position(&mut self, body: BodyHandle, position: Vec3);

    /// Cast a ray, optionally ignoring one body. `direction` must be unit length.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<BodyHandle>,
    ) -> Option<RayHit>;

    /// Queue a collision-resolved displacement (sweep and slide) for a kinematic body.
    /// The engine applies it when it next steps.
    fn move_and_slide(&mut self, body: BodyHandle, translation: Vec3);

    /// Whether the engine's last sweep left the body resting on something.
    fn is_supported(&self, body: BodyHandle) -> bool;
}
