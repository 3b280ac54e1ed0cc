//! Held-key table and mouse accumulation
//!
//! Event handlers write here as key/mouse messages arrive; the controller tick reads it
//! once per frame through [`InputState::sample`].

use std::collections::HashMap;

use bevy::prelude::*;

use crate::config::KeyBindings;

/// Currently held keys plus mouse motion accumulated since the last tick.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct InputState {
    held: HashMap<KeyCode, bool>,
    mouse_delta: Vec2,
    pointer_locked: bool,
}

impl InputState {
    /// Record the current state of a key. Setting the same state twice is a no-op.
    pub fn set_held(&mut self, key: KeyCode, held: bool) {
        self.held.insert(key, held);
    }

    /// Unknown keys read as not held.
    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.get(&key).copied().unwrap_or(false)
    }

    pub fn any_held(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|&key| self.is_held(key))
    }

    /// Forget a press. The key stays released until a fresh key-down arrives.
    pub fn release(&mut self, keys: &[KeyCode]) {
        for &key in keys {
            self.set_held(key, false);
        }
    }

    /// Drop every held key (window focus lost).
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Mouse motion only counts while the pointer is locked to the viewport.
    pub fn accumulate_mouse(&mut self, delta: Vec2) {
        if self.pointer_locked {
            self.mouse_delta += delta;
        }
    }

    /// Drain the accumulated mouse motion.
    pub fn take_mouse_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    pub fn set_pointer_locked(&mut self, locked: bool) {
        self.pointer_locked = locked;
        if !locked {
            self.mouse_delta = Vec2::ZERO;
        }
    }

    /// Resolve bindings into one frame's worth of control flags.
    pub fn sample(&self, bindings: &KeyBindings) -> ControlSample {
        ControlSample {
            forward: self.any_held(&bindings.forward),
            back: self.any_held(&bindings.back),
            left: self.any_held(&bindings.left),
            right: self.any_held(&bindings.right),
            run: self.any_held(&bindings.run),
            jump: self.any_held(&bindings.jump),
            look: KeyLook {
                left: self.any_held(&bindings.look_left),
                right: self.any_held(&bindings.look_right),
                up: self.any_held(&bindings.look_up),
                down: self.any_held(&bindings.look_down),
            },
        }
    }
}

/// Arrow-key look flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyLook {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Control flags for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlSample {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// Run modifier (binary walk/run toggle)
    pub run: bool,
    pub jump: bool,
    pub look: KeyLook,
}
