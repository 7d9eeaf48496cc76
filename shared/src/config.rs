use serde::{Deserialize, Serialize};

use crate::entities::PaddleSide;

/// One reference frame in milliseconds. Physics constants are expressed per
/// reference frame; `normalize_step` converts wall-clock deltas into these
/// units so the constants hold at any tick rate.
pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

/// Static court geometry. The net is centered horizontally and stands on the
/// ground line; each paddle's movement range is its own half of the court.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Court {
    pub width: f32,
    pub height: f32,
    /// Visual thickness of the ground band; the ground *line* the simulation
    /// uses is `height` itself.
    pub ground_thickness: f32,
    pub net_width: f32,
    pub net_height: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub ball_radius: f32,
}

impl Default for Court {
    fn default() -> Self {
        Court {
            width: 800.0,
            height: 400.0,
            ground_thickness: 15.0,
            net_width: 10.0,
            net_height: 120.0,
            paddle_width: 40.0,
            paddle_height: 40.0,
            ball_radius: 20.0,
        }
    }
}

impl Court {
    pub fn ground_y(&self) -> f32 {
        self.height
    }

    pub fn mid_x(&self) -> f32 {
        self.width / 2.0
    }

    /// Net rectangle as (left, top, width, height).
    pub fn net_rect(&self) -> (f32, f32, f32, f32) {
        (
            self.mid_x() - self.net_width / 2.0,
            self.height - self.net_height,
            self.net_width,
            self.net_height,
        )
    }

    /// Range of legal x positions for a paddle's left edge on the given side.
    pub fn paddle_bounds(&self, side: PaddleSide) -> (f32, f32) {
        match side {
            PaddleSide::One => (0.0, self.mid_x() - self.paddle_width),
            PaddleSide::Two => (self.mid_x(), self.width - self.paddle_width),
        }
    }

    /// Initial paddle x for each side, a fixed margin in from the wall.
    pub fn spawn_x(&self, side: PaddleSide) -> f32 {
        match side {
            PaddleSide::One => 50.0,
            PaddleSide::Two => self.width - self.paddle_width - 50.0,
        }
    }

    /// Vertical center of a serve-locked ball.
    pub fn serve_y(&self) -> f32 {
        self.height - 3.0 * self.paddle_height
    }
}

/// Tunable match parameters. Velocity-like values are per reference frame,
/// gravity-like values per reference frame squared; durations are in
/// milliseconds of wall-clock time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Authoritative ticks per second.
    pub tick_rate: u32,
    pub gravity: f32,
    /// The ball falls slower than the paddles by this factor.
    pub ball_gravity_scale: f32,
    pub move_speed: f32,
    pub jump_velocity: f32,
    /// Horizontal speed imparted by a serve, directed away from the server.
    pub serve_speed_x: f32,
    pub serve_speed_y: f32,
    /// Horizontal response scale for a live hit: `offset * hit_speed`.
    pub hit_speed: f32,
    /// Minimum upward speed a live hit always imparts.
    pub hit_lift_base: f32,
    /// Extra upward speed per unit of strike offset.
    pub hit_lift_scale: f32,
    /// Fraction of speed retained on wall, ceiling, and net bounces.
    pub restitution: f32,
    /// Hard cap on the ball's speed, so compounding hits can never outrun
    /// the collision tests.
    pub max_ball_speed: f32,
    pub win_score: u8,
    /// Serve-lock duration. The serving paddle cannot put the ball in play
    /// until this much time has elapsed since the lock was armed.
    pub serve_delay_ms: f32,
    /// Upper bound on a single integration step.
    pub max_step_ms: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            tick_rate: 30,
            gravity: 0.5,
            ball_gravity_scale: 0.7,
            move_speed: 5.0,
            jump_velocity: -12.0,
            serve_speed_x: 5.0,
            serve_speed_y: -8.0,
            hit_speed: 10.0,
            hit_lift_base: 10.0,
            hit_lift_scale: 4.0,
            restitution: 0.9,
            max_ball_speed: 20.0,
            win_score: 11,
            serve_delay_ms: 2000.0,
            max_step_ms: 33.0,
        }
    }
}
