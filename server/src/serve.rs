use shared::PaddleSide;

/// Whether the ball is pinned to the serving side or in free flight.
///
/// The machine has exactly two transitions: `Locked -> Live` through a
/// qualifying hit (the serving paddle, ascending, after the lock window has
/// expired) and `Live -> Locked` through scoring. Nothing else moves it, so
/// every rally gets a deterministic start: the server must actively hit the
/// ball to put it in play, and the ball cannot drift into play on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServeState {
    Locked { server: PaddleSide, timer_ms: f32 },
    Live,
}

impl ServeState {
    pub fn locked(server: PaddleSide, delay_ms: f32) -> Self {
        ServeState::Locked {
            server,
            timer_ms: delay_ms,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, ServeState::Locked { .. })
    }

    pub fn serving_side(&self) -> Option<PaddleSide> {
        match self {
            ServeState::Locked { server, .. } => Some(*server),
            ServeState::Live => None,
        }
    }

    /// Counts the lock window down. No-op while live.
    pub fn advance(&mut self, elapsed_ms: f32) {
        if let ServeState::Locked { timer_ms, .. } = self {
            *timer_ms -= elapsed_ms;
        }
    }

    /// True when `side` may put the ball in play: the state is locked, that
    /// side is serving, the lock window has expired, and the paddle is
    /// ascending.
    pub fn allows_serve(&self, side: PaddleSide, ascending: bool) -> bool {
        match self {
            ServeState::Locked { server, timer_ms } => {
                *server == side && *timer_ms <= 0.0 && ascending
            }
            ServeState::Live => false,
        }
    }
}
