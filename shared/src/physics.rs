use serde::{Deserialize, Serialize};

use crate::config::{Court, MatchConfig, REFERENCE_FRAME_MS};
use crate::entities::Paddle;

///Represents a vector in 2D space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct Vec2 {
    ///Value along the x-axis. Positive direction is to the right.
    pub x: f32,
    ///Value along the y-axis. Positive direction is down (top-left convention).
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn zero() -> Self {
        Vec2 { x: 0.0, y: 0.0 }
    }

    ///Returns the magnitude of the vector.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    ///Returns the scaled vector.
    pub fn scale(&self, scalar: f32) -> Vec2 {
        Vec2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    ///Returns the sum of two vectors.
    pub fn add(&self, other: &Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    ///Returns the vector with its magnitude capped at `max`.
    pub fn clamp_magnitude(&self, max: f32) -> Vec2 {
        let mag = self.magnitude();
        if mag > max {
            self.scale(max / mag)
        } else {
            *self
        }
    }
}

/// Axis-aligned bounding-box intersection test. Boxes are given as
/// (left, top, right, bottom); touching edges do not count as overlap.
pub fn aabb_overlap(a: (f32, f32, f32, f32), b: (f32, f32, f32, f32)) -> bool {
    let (ax1, ay1, ax2, ay2) = a;
    let (bx1, by1, bx2, by2) = b;
    !(ax2 <= bx1 || bx2 <= ax1 || ay2 <= by1 || by2 <= ay1)
}

/// Clamps an elapsed wall-clock delta to the configured maximum step and
/// converts it to reference-frame units, so the per-frame physics constants
/// behave the same at any tick or render rate.
pub fn normalize_step(elapsed_ms: f32, max_step_ms: f32) -> f32 {
    elapsed_ms.clamp(0.0, max_step_ms) / REFERENCE_FRAME_MS
}

/// Advances one paddle by `dt` reference frames.
///
/// Exactly this function runs on the server (authority) and on the client
/// (prediction of the locally controlled paddle):
/// - horizontal velocity comes straight from the intent flags
/// - a pending jump fires only while grounded and is consumed when it fires
/// - gravity, integration, then clamping to the paddle's half court and
///   the ground line
pub fn step_paddle(paddle: &mut Paddle, court: &Court, config: &MatchConfig, dt: f32) {
    paddle.vel.x = if paddle.intent.left {
        -config.move_speed
    } else if paddle.intent.right {
        config.move_speed
    } else {
        0.0
    };

    if paddle.intent.jump && paddle.on_ground(court) {
        paddle.vel.y = config.jump_velocity;
        paddle.intent.jump = false;
    }

    paddle.vel.y += config.gravity * dt;
    paddle.pos = paddle.pos.add(&paddle.vel.scale(dt));

    let (min_x, max_x) = court.paddle_bounds(paddle.side);
    paddle.pos.x = paddle.pos.x.clamp(min_x, max_x);

    let floor = court.ground_y() - court.paddle_height;
    if paddle.pos.y >= floor {
        paddle.pos.y = floor;
        paddle.vel.y = 0.0;
    }
}
