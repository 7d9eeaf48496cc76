//! Authoritative per-match simulation: paddle integration, serve-locked ball
//! pinning, live ball flight, hit resolution, and scoring.

use log::info;
use shared::{
    aabb_overlap, normalize_step, step_paddle, Ball, BallView, Court, InputAction, MatchConfig,
    Paddle, PaddleSide, Snapshot, Vec2,
};

use crate::serve::ServeState;

/// Events a tick can surface beyond the plain state change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    PointScored {
        scores: [u8; 2],
        /// Side that serves the next rally: the scorer.
        server: PaddleSide,
    },
    Finished {
        winner: PaddleSide,
        final_score: [u8; 2],
    },
}

/// One match's authoritative world. The single writer is the match task that
/// owns it; inputs arrive as intent flags between ticks and are visible in
/// full to the next `step`.
#[derive(Debug, Clone)]
pub struct MatchSim {
    court: Court,
    config: MatchConfig,
    paddles: [Paddle; 2],
    ball: Ball,
    serve: ServeState,
    active: bool,
}

impl MatchSim {
    pub fn new(court: Court, config: MatchConfig) -> Self {
        let floor = court.ground_y() - court.paddle_height;
        let paddles = [
            Paddle::new(PaddleSide::One, court.spawn_x(PaddleSide::One), floor),
            Paddle::new(PaddleSide::Two, court.spawn_x(PaddleSide::Two), floor),
        ];
        let ball = Ball::new(0.0, 0.0, court.ball_radius);

        let mut sim = MatchSim {
            court,
            config,
            paddles,
            ball,
            serve: ServeState::locked(PaddleSide::One, config.serve_delay_ms),
            active: true,
        };
        sim.pin_ball();
        sim
    }

    pub fn paddle(&self, side: PaddleSide) -> &Paddle {
        &self.paddles[side.index()]
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_serving(&self) -> bool {
        self.serve.is_locked()
    }

    pub fn serving_side(&self) -> Option<PaddleSide> {
        self.serve.serving_side()
    }

    pub fn scores(&self) -> [u8; 2] {
        [self.paddles[0].score, self.paddles[1].score]
    }

    /// Folds one participant action into that paddle's intent. Only intent
    /// flags are reachable from outside; position and velocity are not.
    pub fn apply_action(&mut self, side: PaddleSide, action: InputAction) {
        self.paddles[side.index()].intent.apply(action);
    }

    /// Advances the match by one tick of `elapsed_ms` wall-clock time and
    /// returns whatever events the tick produced. A no-op once the match has
    /// finished.
    pub fn step(&mut self, elapsed_ms: f32) -> Vec<SimEvent> {
        if !self.active {
            return Vec::new();
        }

        let clamped_ms = elapsed_ms.clamp(0.0, self.config.max_step_ms);
        let dt = normalize_step(elapsed_ms, self.config.max_step_ms);

        for paddle in &mut self.paddles {
            step_paddle(paddle, &self.court, &self.config, dt);
        }

        match self.serve {
            ServeState::Locked { .. } => {
                // The locked ball is not integrated: its pose is recomputed
                // from the serving paddle and its velocity forced to zero.
                self.pin_ball();
                self.serve.advance(clamped_ms);
            }
            ServeState::Live => self.step_ball(dt),
        }

        self.resolve_paddle_hits();
        self.check_scoring()
    }

    /// Encodes the current state into the wire snapshot for this tick.
    pub fn snapshot(&self, server_timestamp: u64) -> Snapshot {
        Snapshot {
            paddle1: self.paddles[0].pos,
            paddle2: self.paddles[1].pos,
            ball: BallView {
                x: self.ball.pos.x,
                y: self.ball.pos.y,
                visible: true,
            },
            serving: self.serve.is_locked(),
            server_timestamp,
        }
    }

    fn pin_ball(&mut self) {
        if let Some(server) = self.serve.serving_side() {
            let paddle = &self.paddles[server.index()];
            self.ball.pos = Vec2::new(paddle.center_x(&self.court), self.court.serve_y());
            self.ball.vel = Vec2::zero();
        }
    }

    fn step_ball(&mut self, dt: f32) {
        let restitution = self.config.restitution;
        let ball = &mut self.ball;

        ball.vel.y += self.config.gravity * self.config.ball_gravity_scale * dt;
        ball.vel = ball.vel.clamp_magnitude(self.config.max_ball_speed);
        ball.pos = ball.pos.add(&ball.vel.scale(dt));

        if ball.pos.x - ball.radius < 0.0 {
            ball.pos.x = ball.radius;
            ball.vel.x = -ball.vel.x * restitution;
        } else if ball.pos.x + ball.radius > self.court.width {
            ball.pos.x = self.court.width - ball.radius;
            ball.vel.x = -ball.vel.x * restitution;
        }

        if ball.pos.y - ball.radius < 0.0 {
            ball.pos.y = ball.radius;
            ball.vel.y = -ball.vel.y * restitution;
        }

        let (net_x, net_y, net_w, net_h) = self.court.net_rect();
        if aabb_overlap(ball.bounds(), (net_x, net_y, net_x + net_w, net_y + net_h)) {
            // Push to the nearer outside face, reflect horizontally.
            if ball.pos.x < net_x + net_w / 2.0 {
                ball.pos.x = net_x - ball.radius;
            } else {
                ball.pos.x = net_x + net_w + ball.radius;
            }
            ball.vel.x = -ball.vel.x * restitution;
        }
    }

    fn resolve_paddle_hits(&mut self) {
        for index in 0..self.paddles.len() {
            let (px1, py1, px2, py2) = self.paddles[index].bounds(&self.court);
            if !aabb_overlap(self.ball.bounds(), (px1, py1, px2, py2)) {
                continue;
            }
            let side = self.paddles[index].side;

            match self.serve {
                ServeState::Locked { .. } => {
                    if self.serve.allows_serve(side, self.paddles[index].ascending()) {
                        self.serve = ServeState::Live;
                        let direction = match side {
                            PaddleSide::One => 1.0,
                            PaddleSide::Two => -1.0,
                        };
                        self.ball.vel = Vec2::new(
                            direction * self.config.serve_speed_x,
                            self.config.serve_speed_y,
                        );
                        info!("Paddle {} served", side.number());
                    }
                }
                ServeState::Live => {
                    let paddle = &self.paddles[index];
                    let half_width = self.court.paddle_width / 2.0;
                    let offset = ((self.ball.pos.x - paddle.center_x(&self.court)) / half_width)
                        .clamp(-1.0, 1.0);

                    self.ball.vel.x = offset * self.config.hit_speed;
                    // The lift base keeps any touch from driving the ball
                    // straight into the ground.
                    self.ball.vel.y =
                        -(self.config.hit_lift_base + offset.abs() * self.config.hit_lift_scale);
                    self.ball.pos.y = paddle.pos.y - self.ball.radius;
                }
            }
        }
    }

    fn check_scoring(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();

        if self.ball.pos.y + self.ball.radius < self.court.ground_y() {
            return events;
        }

        // Ball landed left of the midline: paddle two scores and serves
        // next, symmetric on the right.
        let scorer = if self.ball.pos.x < self.court.mid_x() {
            PaddleSide::Two
        } else {
            PaddleSide::One
        };

        self.paddles[scorer.index()].score += 1;
        let scores = self.scores();
        info!(
            "Point for paddle {} ({} - {})",
            scorer.number(),
            scores[0],
            scores[1]
        );
        events.push(SimEvent::PointScored {
            scores,
            server: scorer,
        });

        if scores[scorer.index()] >= self.config.win_score {
            self.active = false;
            events.push(SimEvent::Finished {
                winner: scorer,
                final_score: scores,
            });
            info!("Match over, paddle {} wins", scorer.number());
        } else {
            self.serve = ServeState::locked(scorer, self.config.serve_delay_ms);
            self.pin_ball();
        }

        events
    }
}
