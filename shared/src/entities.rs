use serde::{Deserialize, Serialize};

use crate::config::Court;
use crate::physics::Vec2;
use crate::protocol::{Direction, InputAction};

/// Which half of the court a paddle owns. Doubles as the participant's role
/// in the wire protocol: side one serves first and plays the left half.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PaddleSide {
    One,
    Two,
}

impl PaddleSide {
    pub fn other(self) -> PaddleSide {
        match self {
            PaddleSide::One => PaddleSide::Two,
            PaddleSide::Two => PaddleSide::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PaddleSide::One => 0,
            PaddleSide::Two => 1,
        }
    }

    /// 1-based role number, for logs and the score display.
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Per-tick movement intent. These flags are the only paddle state a remote
/// participant can set; positions and velocities never cross the wire inbound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct InputIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl InputIntent {
    /// Folds one input action into the intent: `Move` sets exactly one
    /// direction flag and clears the other, `Stop` clears both, `Jump` arms
    /// the one-shot request consumed by the next grounded integration step.
    pub fn apply(&mut self, action: InputAction) {
        match action {
            InputAction::Move(Direction::Left) => {
                self.left = true;
                self.right = false;
            }
            InputAction::Move(Direction::Right) => {
                self.right = true;
                self.left = false;
            }
            InputAction::Jump => {
                self.jump = true;
            }
            InputAction::Stop => {
                self.left = false;
                self.right = false;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Paddle {
    pub side: PaddleSide,
    /// Top-left corner.
    pub pos: Vec2,
    pub vel: Vec2,
    pub intent: InputIntent,
    pub score: u8,
}

impl Paddle {
    pub fn new(side: PaddleSide, x: f32, y: f32) -> Self {
        Paddle {
            side,
            pos: Vec2::new(x, y),
            vel: Vec2::zero(),
            intent: InputIntent::default(),
            score: 0,
        }
    }

    pub fn bounds(&self, court: &Court) -> (f32, f32, f32, f32) {
        (
            self.pos.x,
            self.pos.y,
            self.pos.x + court.paddle_width,
            self.pos.y + court.paddle_height,
        )
    }

    pub fn center_x(&self, court: &Court) -> f32 {
        self.pos.x + court.paddle_width / 2.0
    }

    pub fn on_ground(&self, court: &Court) -> bool {
        self.pos.y >= court.ground_y() - court.paddle_height
    }

    /// Ascending means mid-jump, moving up. Only an ascending serving paddle
    /// may put a locked ball into play.
    pub fn ascending(&self) -> bool {
        self.vel.y < 0.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Ball {
    /// Center of the ball.
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Ball {
            pos: Vec2::new(x, y),
            vel: Vec2::zero(),
            radius,
        }
    }

    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        (
            self.pos.x - self.radius,
            self.pos.y - self.radius,
            self.pos.x + self.radius,
            self.pos.y + self.radius,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_sets_one_direction_and_clears_the_other() {
        let mut intent = InputIntent::default();

        intent.apply(InputAction::Move(Direction::Left));
        assert!(intent.left && !intent.right);

        intent.apply(InputAction::Move(Direction::Right));
        assert!(intent.right && !intent.left);
    }

    #[test]
    fn stop_clears_directions_but_not_a_pending_jump() {
        let mut intent = InputIntent::default();
        intent.apply(InputAction::Move(Direction::Left));
        intent.apply(InputAction::Jump);

        intent.apply(InputAction::Stop);
        assert!(!intent.left && !intent.right);
        assert!(intent.jump);
    }

    #[test]
    fn paddle_bounds_follow_court_geometry() {
        let court = Court::default();
        let paddle = Paddle::new(PaddleSide::One, 50.0, 75.0);
        let (x1, y1, x2, y2) = paddle.bounds(&court);
        assert_eq!(x1, 50.0);
        assert_eq!(y1, 75.0);
        assert_eq!(x2, 50.0 + court.paddle_width);
        assert_eq!(y2, 75.0 + court.paddle_height);
    }

    #[test]
    fn side_helpers() {
        assert_eq!(PaddleSide::One.other(), PaddleSide::Two);
        assert_eq!(PaddleSide::Two.other(), PaddleSide::One);
        assert_eq!(PaddleSide::One.number(), 1);
        assert_eq!(PaddleSide::Two.index(), 1);
    }

    #[test]
    fn ball_bounds_are_centered_on_position() {
        let ball = Ball::new(100.0, 200.0, 20.0);
        assert_eq!(ball.bounds(), (80.0, 180.0, 120.0, 220.0));
    }
}
