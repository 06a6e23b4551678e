//! Input collaborator.
//!
//! [`InputState`] turns raw key and pointer events into action state. The
//! platform layer feeds it events between frames; systems read it during the
//! frame; [`InputState::end_frame`] clears the per-frame edges afterwards.

use std::collections::{BTreeSet, HashMap};

use engine_math::{Vec2, Vec3};

use crate::config::InputConfig;

/// Names of the actions the engine itself reads.
pub mod actions {
    /// Move away from the camera.
    pub const FORWARD: &str = "forward";
    /// Move towards the camera.
    pub const BACKWARD: &str = "backward";
    /// Strafe left.
    pub const LEFT: &str = "left";
    /// Strafe right.
    pub const RIGHT: &str = "right";
    /// Jump while on walkable ground.
    pub const JUMP: &str = "jump";
}

/// Keyboard and pointer state for the current frame, mapped to actions.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// key → actions bound to it.
    bindings: HashMap<String, Vec<String>>,
    pressed: BTreeSet<String>,
    pointer_delta: Vec2,
    clicked: bool,
    focused: bool,
}

impl InputState {
    /// No keys held, no focus, mappings from `config`.
    #[must_use]
    pub fn new(config: &InputConfig) -> Self {
        let mut state = Self::default();
        for (action, keys) in &config.mappings {
            for key in keys {
                state.bind(action, key);
            }
        }
        state
    }

    /// Let `key` also trigger `action`.
    pub fn bind(&mut self, action: &str, key: &str) {
        let actions = self.bindings.entry(key.to_owned()).or_default();
        if !actions.iter().any(|a| a == action) {
            actions.push(action.to_owned());
        }
    }

    /// Key down. Unbound keys are ignored.
    pub fn press(&mut self, key: &str) {
        if self.bindings.contains_key(key) {
            self.pressed.insert(key.to_owned());
        }
    }

    /// Key up.
    pub fn release(&mut self, key: &str) {
        self.pressed.remove(key);
    }

    /// Returns `true` while any key bound to `action` is held.
    #[must_use]
    pub fn is_active(&self, action: &str) -> bool {
        self.pressed.iter().any(|key| {
            self.bindings
                .get(key)
                .is_some_and(|actions| actions.iter().any(|a| a == action))
        })
    }

    /// Accumulate pointer motion for this frame.
    pub fn move_pointer(&mut self, delta: Vec2) {
        self.pointer_delta += delta;
    }

    /// Pointer movement accumulated this frame.
    #[must_use]
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    /// A click requests pointer focus.
    pub fn click(&mut self) {
        self.clicked = true;
        self.focused = true;
    }

    /// Returns `true` on the frame a click happened.
    #[must_use]
    pub fn clicked(&self) -> bool {
        self.clicked
    }

    /// Whether pointer look is active.
    #[must_use]
    pub fn has_focus(&self) -> bool {
        self.focused
    }

    /// Pointer capture lost (escape, window blur).
    pub fn release_focus(&mut self) {
        self.focused = false;
        self.pressed.clear();
    }

    /// Movement intent as `(right - left, 0, backward - forward)`. Forward is −Z.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        let axis = |positive: &str, negative: &str| {
            f32::from(u8::from(self.is_active(positive))) - f32::from(u8::from(self.is_active(negative)))
        };
        let right = axis(actions::RIGHT, actions::LEFT);
        let forward = axis(actions::FORWARD, actions::BACKWARD);
        Vec3::new(right, 0.0, -forward)
    }

    /// Clear per-frame state: pointer delta and click edge.
    pub fn end_frame(&mut self) {
        self.pointer_delta = Vec2::ZERO;
        self.clicked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn input() -> InputState {
        InputState::new(&EngineConfig::engine_defaults().unwrap().input)
    }

    #[test]
    fn test_direction_from_bindings() {
        let mut input = input();
        assert_eq!(input.direction(), Vec3::ZERO);

        input.press("KeyW");
        assert_eq!(input.direction(), Vec3::new(0.0, 0.0, -1.0));

        input.press("ArrowRight");
        assert_eq!(input.direction(), Vec3::new(1.0, 0.0, -1.0));

        input.press("KeyS");
        assert_eq!(input.direction(), Vec3::new(1.0, 0.0, 0.0));

        input.release("KeyW");
        input.release("KeyS");
        input.release("ArrowRight");
        assert_eq!(input.direction(), Vec3::ZERO);
    }

    #[test]
    fn test_two_keys_same_action() {
        let mut input = input();
        input.press("KeyW");
        input.press("ArrowUp");
        input.release("KeyW");
        assert!(input.is_active(actions::FORWARD));
        input.release("ArrowUp");
        assert!(!input.is_active(actions::FORWARD));
    }

    #[test]
    fn test_unbound_key_ignored() {
        let mut input = input();
        input.press("KeyQ");
        assert_eq!(input.direction(), Vec3::ZERO);
        assert!(!input.is_active(actions::JUMP));
    }

    #[test]
    fn test_pointer_delta_accumulates_until_end_frame() {
        let mut input = input();
        input.move_pointer(Vec2::new(3.0, 1.0));
        input.move_pointer(Vec2::new(2.0, -4.0));
        assert_eq!(input.pointer_delta(), Vec2::new(5.0, -3.0));
        input.end_frame();
        assert_eq!(input.pointer_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_click_takes_focus() {
        let mut input = input();
        assert!(!input.has_focus());
        input.click();
        assert!(input.clicked());
        assert!(input.has_focus());

        input.end_frame();
        assert!(!input.clicked());
        assert!(input.has_focus());

        input.press("Space");
        input.release_focus();
        assert!(!input.has_focus());
        assert!(!input.is_active(actions::JUMP));
    }
}
