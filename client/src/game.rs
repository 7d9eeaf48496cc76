//! Client-side state reconciliation: the locally controlled paddle is
//! predicted ahead of the server, while the remote paddle and the ball are
//! replayed a fixed delay behind it from a buffer of timestamped snapshots.

use shared::{
    step_paddle, BallView, Court, InputAction, MatchConfig, Paddle, PaddleSide, Snapshot, Vec2,
};

/// Tunables for the reconciliation scheme.
#[derive(Debug, Clone, Copy)]
pub struct PredictionTuning {
    /// Deliberate render-time lag, chosen so two straddling snapshots are
    /// almost always available despite jitter.
    pub interpolation_delay_ms: u64,
    /// Bounded snapshot history; the oldest entry is evicted past this.
    pub buffer_capacity: usize,
    /// Fraction of the remaining error toward the authoritative pose removed
    /// per correction step. Exponential smoothing, never a hard snap.
    pub correction_rate: f32,
}

impl Default for PredictionTuning {
    fn default() -> Self {
        PredictionTuning {
            interpolation_delay_ms: 100,
            buffer_capacity: 20,
            correction_rate: 0.8,
        }
    }
}

/// One buffered snapshot, stamped with the client's receipt time. Receipt
/// times are what interpolation runs on; send order is not assumed.
#[derive(Debug, Clone, Copy)]
pub struct TimedSnapshot {
    pub received_at: u64,
    pub snapshot: Snapshot,
}

/// What the renderer needs for the entities the server animates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteView {
    pub remote_paddle: Vec2,
    pub ball: BallView,
    pub serving: bool,
}

/// Per-match client state: the predicted local paddle plus the snapshot
/// buffer the remote entities are interpolated from.
pub struct ClientMatchState {
    side: PaddleSide,
    court: Court,
    config: MatchConfig,
    tuning: PredictionTuning,
    local: Paddle,
    /// Last authoritative pose of the local paddle, blended toward.
    target: Option<Vec2>,
    buffer: Vec<TimedSnapshot>,
}

impl ClientMatchState {
    pub fn new(
        side: PaddleSide,
        court: Court,
        config: MatchConfig,
        tuning: PredictionTuning,
    ) -> Self {
        let local = Paddle::new(
            side,
            court.spawn_x(side),
            court.ground_y() - court.paddle_height,
        );
        ClientMatchState {
            side,
            court,
            config,
            tuning,
            local,
            target: None,
            buffer: Vec::new(),
        }
    }

    pub fn side(&self) -> PaddleSide {
        self.side
    }

    pub fn local_paddle(&self) -> &Paddle {
        &self.local
    }

    /// Applies an input action to the local intent immediately, without
    /// waiting for the server round-trip.
    pub fn apply_action(&mut self, action: InputAction) {
        self.local.intent.apply(action);
    }

    /// Advances the local paddle by `dt` reference frames using the same
    /// rules the server runs, then blends it toward the last authoritative
    /// pose so visible divergence stays bounded without teleporting.
    pub fn predict(&mut self, dt: f32) {
        step_paddle(&mut self.local, &self.court, &self.config, dt);

        if let Some(target) = self.target {
            let rate = self.tuning.correction_rate;
            self.local.pos.x += (target.x - self.local.pos.x) * rate;
            self.local.pos.y += (target.y - self.local.pos.y) * rate;
        }
    }

    /// Appends an authoritative snapshot stamped with its receipt time and
    /// refreshes the correction target for the local paddle. Append-only;
    /// already-buffered entries are never rewritten.
    pub fn accept_snapshot(&mut self, snapshot: Snapshot, received_at: u64) {
        self.target = Some(snapshot.paddle(self.side));
        self.buffer.push(TimedSnapshot {
            received_at,
            snapshot,
        });
        if self.buffer.len() > self.tuning.buffer_capacity {
            self.buffer.remove(0);
        }
    }

    /// Resolves the remote paddle and ball for rendering at `now_ms`.
    ///
    /// The render time trails `now_ms` by the interpolation delay; the
    /// newest adjacent pair of snapshots straddling it is linearly
    /// interpolated. With no straddling pair the newest snapshot is used
    /// verbatim — the view freezes rather than guessing ahead, so positions
    /// never extrapolate past the newest received state.
    pub fn remote_view(&self, now_ms: u64) -> Option<RemoteView> {
        let latest = self.buffer.last()?;
        let render_time = now_ms.saturating_sub(self.tuning.interpolation_delay_ms);
        let remote = self.side.other();

        // Receipt times are not assumed sorted, so scan adjacent pairs from
        // the newest end instead of binary searching.
        for i in (1..self.buffer.len()).rev() {
            let a = &self.buffer[i - 1];
            let b = &self.buffer[i];
            if a.received_at <= render_time && render_time <= b.received_at {
                let span = b.received_at - a.received_at;
                let alpha = if span > 0 {
                    (render_time - a.received_at) as f32 / span as f32
                } else {
                    0.0
                }
                .clamp(0.0, 1.0);

                let pa = a.snapshot.paddle(remote);
                let pb = b.snapshot.paddle(remote);
                return Some(RemoteView {
                    remote_paddle: Vec2::new(
                        lerp(pa.x, pb.x, alpha),
                        lerp(pa.y, pb.y, alpha),
                    ),
                    ball: BallView {
                        x: lerp(a.snapshot.ball.x, b.snapshot.ball.x, alpha),
                        y: lerp(a.snapshot.ball.y, b.snapshot.ball.y, alpha),
                        // Visibility is a boolean; it comes from the later
                        // snapshot, never from interpolation.
                        visible: b.snapshot.ball.visible,
                    },
                    serving: b.snapshot.serving,
                });
            }
        }

        Some(RemoteView {
            remote_paddle: latest.snapshot.paddle(remote),
            ball: latest.snapshot.ball,
            serving: latest.snapshot.serving,
        })
    }

    pub fn buffered_snapshots(&self) -> usize {
        self.buffer.len()
    }
}

fn lerp(start: f32, end: f32, alpha: f32) -> f32 {
    start + (end - start) * alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use shared::Direction;

    fn snapshot(ball_x: f32, paddle2_x: f32) -> Snapshot {
        Snapshot {
            paddle1: Vec2::new(50.0, 360.0),
            paddle2: Vec2::new(paddle2_x, 360.0),
            ball: BallView {
                x: ball_x,
                y: 100.0,
                visible: true,
            },
            serving: false,
            server_timestamp: 0,
        }
    }

    fn state_with_delay(delay_ms: u64) -> ClientMatchState {
        let tuning = PredictionTuning {
            interpolation_delay_ms: delay_ms,
            ..PredictionTuning::default()
        };
        ClientMatchState::new(
            PaddleSide::One,
            Court::default(),
            MatchConfig::default(),
            tuning,
        )
    }

    #[test]
    fn midpoint_interpolation_is_exact() {
        let mut state = state_with_delay(50);
        state.accept_snapshot(snapshot(100.0, 500.0), 0);
        state.accept_snapshot(snapshot(200.0, 600.0), 100);

        // now = 100, delay = 50 => render time 50, halfway between samples.
        let view = state.remote_view(100).unwrap();
        assert_approx_eq!(view.ball.x, 150.0, 1e-4);
        assert_approx_eq!(view.remote_paddle.x, 550.0, 1e-4);
    }

    #[test]
    fn single_snapshot_renders_verbatim() {
        let mut state = state_with_delay(50);
        state.accept_snapshot(snapshot(123.0, 456.0), 0);

        let view = state.remote_view(10).unwrap();
        assert_approx_eq!(view.ball.x, 123.0, 1e-6);
        assert_approx_eq!(view.remote_paddle.x, 456.0, 1e-6);
    }

    #[test]
    fn never_extrapolates_past_the_newest_snapshot() {
        let mut state = state_with_delay(50);
        state.accept_snapshot(snapshot(100.0, 500.0), 0);
        state.accept_snapshot(snapshot(200.0, 600.0), 100);

        // Render time way past the buffer: freeze at the newest sample.
        let view = state.remote_view(10_000).unwrap();
        assert_approx_eq!(view.ball.x, 200.0, 1e-6);
        assert_approx_eq!(view.remote_paddle.x, 600.0, 1e-6);
    }

    #[test]
    fn empty_buffer_yields_no_view() {
        let state = state_with_delay(50);
        assert!(state.remote_view(1_000).is_none());
    }

    #[test]
    fn buffer_evicts_the_oldest_past_capacity() {
        let tuning = PredictionTuning {
            buffer_capacity: 3,
            ..PredictionTuning::default()
        };
        let mut state = ClientMatchState::new(
            PaddleSide::One,
            Court::default(),
            MatchConfig::default(),
            tuning,
        );

        for i in 0..5u64 {
            state.accept_snapshot(snapshot(i as f32, 500.0), i * 10);
        }

        assert_eq!(state.buffered_snapshots(), 3);
        // With delay 100 everything is in the past; the newest wins.
        let view = state.remote_view(0).unwrap();
        assert_approx_eq!(view.ball.x, 4.0, 1e-6);
    }

    #[test]
    fn visibility_comes_from_the_later_snapshot() {
        let mut state = state_with_delay(0);
        let mut hidden = snapshot(100.0, 500.0);
        hidden.ball.visible = false;

        state.accept_snapshot(snapshot(0.0, 500.0), 0);
        state.accept_snapshot(hidden, 100);

        let view = state.remote_view(25).unwrap();
        assert!(!view.ball.visible, "boolean must not be interpolated");
    }

    #[test]
    fn prediction_moves_immediately_on_input() {
        let mut state = state_with_delay(100);
        let before = state.local_paddle().pos.x;

        state.apply_action(InputAction::Move(Direction::Left));
        state.predict(1.0);

        assert!(state.local_paddle().pos.x < before);
    }

    #[test]
    fn correction_blends_toward_the_authoritative_pose() {
        let tuning = PredictionTuning {
            correction_rate: 0.5,
            ..PredictionTuning::default()
        };
        let mut state = ClientMatchState::new(
            PaddleSide::One,
            Court::default(),
            MatchConfig::default(),
            tuning,
        );

        // Authoritative pose 100 px to the right of the local paddle.
        let mut authoritative = snapshot(0.0, 500.0);
        authoritative.paddle1 = Vec2::new(
            state.local_paddle().pos.x + 100.0,
            state.local_paddle().pos.y,
        );
        state.accept_snapshot(authoritative, 0);

        let start = state.local_paddle().pos.x;
        state.predict(0.0);
        let after_one = state.local_paddle().pos.x;
        state.predict(0.0);
        let after_two = state.local_paddle().pos.x;

        // Half the remaining error closes per step; never a hard snap.
        assert_approx_eq!(after_one - start, 50.0, 1e-3);
        assert!(after_two - after_one < 50.0);
        assert!(after_two < start + 100.0);
    }

    #[test]
    fn serving_flag_follows_the_pair() {
        let mut state = state_with_delay(0);
        let mut serving = snapshot(0.0, 500.0);
        serving.serving = true;

        state.accept_snapshot(snapshot(0.0, 500.0), 0);
        state.accept_snapshot(serving, 100);

        let view = state.remote_view(50).unwrap();
        assert!(view.serving);
    }
}
