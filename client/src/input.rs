//! Keyboard sampling with edge detection. The wire protocol wants one
//! `Move` per key press and one `Stop` (or opposite `Move`) per release,
//! never a message per frame; this module turns held-key state into exactly
//! those edges.

use macroquad::prelude::*;
use shared::{Direction, InputAction};

/// Tracks which keys were held last frame and emits actions on changes only.
#[derive(Debug, Default)]
pub struct InputTracker {
    left: bool,
    right: bool,
    jump: bool,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edge-detection core, separated from the window so tests can drive it
    /// with plain booleans.
    pub fn update(&mut self, left: bool, right: bool, jump: bool) -> Vec<InputAction> {
        let mut actions = Vec::new();

        if left && !self.left {
            actions.push(InputAction::Move(Direction::Left));
        }
        if right && !self.right {
            actions.push(InputAction::Move(Direction::Right));
        }
        if !left && self.left {
            // Releasing one direction falls back to the other if still held.
            actions.push(if right {
                InputAction::Move(Direction::Right)
            } else {
                InputAction::Stop
            });
        }
        if !right && self.right {
            actions.push(if left {
                InputAction::Move(Direction::Left)
            } else {
                InputAction::Stop
            });
        }
        if jump && !self.jump {
            actions.push(InputAction::Jump);
        }

        self.left = left;
        self.right = right;
        self.jump = jump;
        actions
    }

    /// Samples the keyboard (arrows or WASD) and returns the actions to send.
    pub fn sample(&mut self) -> Vec<InputAction> {
        let left = is_key_down(KeyCode::Left) || is_key_down(KeyCode::A);
        let right = is_key_down(KeyCode::Right) || is_key_down(KeyCode::D);
        let jump =
            is_key_down(KeyCode::Space) || is_key_down(KeyCode::Up) || is_key_down(KeyCode::W);
        self.update(left, right, jump)
    }
}
