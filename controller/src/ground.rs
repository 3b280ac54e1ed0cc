//! Ground detection
//!
//! A short ray straight down from the body center. Recomputed every tick because the
//! surface under the player can move away between frames.

use bevy::prelude::*;

use crate::config::GroundProbeConfig;
use crate::physics::{BodyHandle, PhysicsWorld};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSensor {
    margin: f32,
    accept_ratio: f32,
}

impl GroundSensor {
    pub fn new(config: GroundProbeConfig) -> Self {
        Self {
            margin: config.margin,
            accept_ratio: config.accept_ratio,
        }
    }

    /// Full length of the probe ray.
    pub fn cast_length(&self, half_height: f32) -> f32 {
        half_height + self.margin
    }

    /// Hits must be strictly closer than this to count as support.
    pub fn accept_distance(&self, half_height: f32) -> f32 {
        half_height + self.margin * self.accept_ratio
    }

    /// True if something supports the body. No hit, or a hit in the tolerance band, is
    /// simply airborne.
    pub fn probe(
        &self,
        world: &dyn PhysicsWorld,
        body: BodyHandle,
        position: Vec3,
        half_height: f32,
    ) -> bool {
        if !position.is_finite() {
            return false;
        }
        world
            .cast_ray(
                position,
                Vec3::NEG_Y,
                self.cast_length(half_height),
                Some(body),
            )
            .is_some_and(|hit| hit.distance < self.accept_distance(half_height))
    }
}

impl Default for GroundSensor {
    fn default() -> Self {
        Self::new(GroundProbeConfig::default())
    }
}
