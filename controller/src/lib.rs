//! First-person player controller
//!
//! Turns held keys and mouse motion into a view orientation and a physically simulated
//! capsule's motion. The per-frame logic in [`controller`] only talks to the physics
//! engine through [`physics::PhysicsWorld`]; [`plugin`] wires it into Bevy and Rapier.

pub mod config;
pub mod controller;
pub mod ground;
pub mod input;
pub mod locomotion;
pub mod look;
pub mod physics;
pub mod plugin;
pub mod respawn;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, MovementConfig, Strategy};
pub use controller::{ControllerOutput, FpsController};
pub use input::InputState;
pub use look::Orientation;
pub use plugin::{ControllerPlugin, ControllerSet, PlayerBody, PlayerCamera, ViewPose};
