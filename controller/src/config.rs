//! Controller configuration
//!
//! Everything the controller needs to know about the player is set once at startup
//! and never re-checked inside the tick. `MovementConfig::validate` is the only gate.
//! Defaults are the house demo tuning (5/10 m/s, 7 m/s jump, respawn below y = -10).

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Setup-time configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be {expected} (got {value})")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f32,
    },
    #[error("capsule height {height} is shorter than its diameter {diameter}")]
    DegenerateCapsule { height: f32, diameter: f32 },
    #[error("respawn position y={spawn_y} lies below the respawn threshold {threshold}")]
    SpawnBelowThreshold { spawn_y: f32, threshold: f32 },
    #[error("key binding for {action} is empty")]
    EmptyBinding { action: &'static str },
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse controller config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

// =============================================================================
// CONFIG TYPES
// =============================================================================

/// Which movement-integration strategy drives the body.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Dynamic capsule, horizontal velocity assigned directly, ray-probed jump.
    #[default]
    VelocityBody,
    /// Kinematic character with engine sweep-and-slide, cooldown-gated jump.
    CollideAndSlide,
}

/// Physical description of the player capsule.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BodyConfig {
    /// Total capsule height including both caps (meters).
    pub height: f32,
    pub radius: f32,
    /// Mass in kg.
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            height: 2.2,
            radius: 0.4,
            mass: 70.0,
            friction: 0.0,
            restitution: 0.0,
        }
    }
}

impl BodyConfig {
    /// Distance from the body center to the bottom of the capsule.
    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    /// Half length of the capsule's cylindrical section.
    pub fn segment_half_height(&self) -> f32 {
        (self.height * 0.5 - self.radius).max(0.0)
    }
}

/// Ground probe margins.
///
/// The ray is cast `half_height + margin` long, but only hits closer than
/// `half_height + margin * accept_ratio` count as support.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct GroundProbeConfig {
    pub margin: f32,
    pub accept_ratio: f32,
}

impl Default for GroundProbeConfig {
    fn default() -> Self {
        Self {
            margin: 0.2,
            accept_ratio: 0.75,
        }
    }
}

/// Logical actions mapped to physical keys. Any key in a list triggers the action.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: Vec<KeyCode>,
    pub back: Vec<KeyCode>,
    pub left: Vec<KeyCode>,
    pub right: Vec<KeyCode>,
    pub run: Vec<KeyCode>,
    pub jump: Vec<KeyCode>,
    pub look_left: Vec<KeyCode>,
    pub look_right: Vec<KeyCode>,
    pub look_up: Vec<KeyCode>,
    pub look_down: Vec<KeyCode>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: vec![KeyCode::KeyW],
            back: vec![KeyCode::KeyS],
            left: vec![KeyCode::KeyA],
            right: vec![KeyCode::KeyD],
            run: vec![KeyCode::ShiftLeft, KeyCode::ShiftRight],
            jump: vec![KeyCode::Space],
            look_left: vec![KeyCode::ArrowLeft],
            look_right: vec![KeyCode::ArrowRight],
            look_up: vec![KeyCode::ArrowUp],
            look_down: vec![KeyCode::ArrowDown],
        }
    }
}

impl KeyBindings {
    fn entries(&self) -> [(&'static str, &[KeyCode]); 10] {
        [
            ("forward", &self.forward),
            ("back", &self.back),
            ("left", &self.left),
            ("right", &self.right),
            ("run", &self.run),
            ("jump", &self.jump),
            ("look_left", &self.look_left),
            ("look_right", &self.look_right),
            ("look_up", &self.look_up),
            ("look_down", &self.look_down),
        ]
    }
}

/// Immutable movement configuration.
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MovementConfig {
    pub strategy: Strategy,
    /// Horizontal speed without the run modifier (m/s).
    pub walk_speed: f32,
    /// Horizontal speed while the run modifier is held (m/s).
    pub run_speed: f32,
    /// Vertical velocity written on jump (m/s).
    pub jump_impulse: f32,
    /// Radians per pixel of mouse motion.
    pub mouse_sensitivity: f32,
    /// Arrow-key look rate (rad/s).
    pub key_look_speed: f32,
    /// Bodies below this Y are respawned.
    pub respawn_threshold: f32,
    pub respawn_position: [f32; 3],
    /// Yaw the view starts with (radians).
    pub initial_yaw: f32,
    /// Eye height above the body center (meters).
    pub eye_offset: f32,
    /// World gravity along Y (m/s^2).
    pub gravity: f32,
    /// Minimum time between jumps for the collide-and-slide strategy (seconds).
    pub jump_cooldown: f32,
    pub probe: GroundProbeConfig,
    pub body: BodyConfig,
    pub bindings: KeyBindings,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::VelocityBody,
            walk_speed: 5.0,
            run_speed: 10.0,
            jump_impulse: 7.0,
            mouse_sensitivity: 0.002,
            // 0.03 rad per frame at 60 Hz
            key_look_speed: 1.8,
            respawn_threshold: -10.0,
            respawn_position: [-14.0, 13.0, 27.0],
            initial_yaw: std::f32::consts::PI,
            eye_offset: 1.4,
            gravity: -14.0,
            jump_cooldown: 0.6,
            probe: GroundProbeConfig::default(),
            body: BodyConfig::default(),
            bindings: KeyBindings::default(),
        }
    }
}

impl MovementConfig {
    /// Parse a RON document and validate it.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: MovementConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a RON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    pub fn respawn_position(&self) -> Vec3 {
        Vec3::from_array(self.respawn_position)
    }

    /// Reject configurations the tick loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("walk_speed", self.walk_speed)?;
        non_negative("run_speed", self.run_speed)?;
        non_negative("jump_impulse", self.jump_impulse)?;
        non_negative("mouse_sensitivity", self.mouse_sensitivity)?;
        non_negative("key_look_speed", self.key_look_speed)?;
        non_negative("jump_cooldown", self.jump_cooldown)?;
        finite("respawn_threshold", self.respawn_threshold)?;
        finite("initial_yaw", self.initial_yaw)?;
        finite("eye_offset", self.eye_offset)?;
        finite("gravity", self.gravity)?;
        for value in self.respawn_position {
            finite("respawn_position", value)?;
        }

        let spawn_y = self.respawn_position[1];
        if spawn_y < self.respawn_threshold {
            return Err(ConfigError::SpawnBelowThreshold {
                spawn_y,
                threshold: self.respawn_threshold,
            });
        }

        positive("probe.margin", self.probe.margin)?;
        if !(self.probe.accept_ratio > 0.0 && self.probe.accept_ratio <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "probe.accept_ratio",
                expected: "in (0, 1]",
                value: self.probe.accept_ratio,
            });
        }

        let body = &self.body;
        positive("body.height", body.height)?;
        positive("body.radius", body.radius)?;
        positive("body.mass", body.mass)?;
        non_negative("body.friction", body.friction)?;
        non_negative("body.restitution", body.restitution)?;
        if body.height < body.radius * 2.0 {
            return Err(ConfigError::DegenerateCapsule {
                height: body.height,
                diameter: body.radius * 2.0,
            });
        }

        for (action, keys) in self.bindings.entries() {
            if keys.is_empty() {
                return Err(ConfigError::EmptyBinding { action });
            }
        }

        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "finite",
            value,
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "finite and >= 0",
            value,
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected: "finite and > 0",
            value,
        })
    }
}
