//! View orientation from mouse and arrow keys

use std::f32::consts::{FRAC_PI_2, TAU};

use bevy::prelude::*;

use crate::input::KeyLook;

/// Pitch is kept within +/- this many radians.
pub const PITCH_LIMIT: f32 = FRAC_PI_2;

/// Yaw/pitch in radians. Positive pitch looks down, positive yaw turns right.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Orientation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch: clamp_pitch(pitch),
        }
    }
}

/// Yaw is kept in [0, 2π).
fn wrap_yaw(yaw: f32) -> f32 {
    yaw.rem_euclid(TAU)
}

fn clamp_pitch(pitch: f32) -> f32 {
    if pitch.is_nan() {
        return 0.0;
    }
    pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT)
}

/// Owns the player's view orientation.
#[derive(Debug, Clone, Default)]
pub struct LookController {
    orientation: Orientation,
}

impl LookController {
    pub fn new(initial_yaw: f32) -> Self {
        Self {
            orientation: Orientation::new(wrap_yaw(initial_yaw), 0.0),
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Mouse look. `delta` is in pixels; moving the mouse down looks down.
    pub fn apply_mouse_delta(&mut self, delta: Vec2, sensitivity: f32) {
        if !delta.is_finite() {
            return;
        }
        self.orientation.yaw = wrap_yaw(self.orientation.yaw + delta.x * sensitivity);
        self.orientation.pitch = clamp_pitch(self.orientation.pitch + delta.y * sensitivity);
    }

    /// Arrow-key look, scaled by elapsed time so turn rate is frame-rate independent.
    pub fn apply_key_look(&mut self, dt: f32, rotation_speed: f32, keys: KeyLook) {
        let step = rotation_speed * dt.max(0.0);
        let mut yaw = 0.0;
        let mut pitch = 0.0;
        if keys.left {
            yaw -= step;
        }
        if keys.right {
            yaw += step;
        }
        if keys.up {
            pitch -= step;
        }
        if keys.down {
            pitch += step;
        }
        self.orientation.yaw = wrap_yaw(self.orientation.yaw + yaw);
        self.orientation.pitch = clamp_pitch(self.orientation.pitch + pitch);
    }
}
