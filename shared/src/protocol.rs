use serde::{Deserialize, Serialize};

use crate::entities::PaddleSide;
use crate::physics::Vec2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// The three input events a participant may send. The presentation layer is
/// expected to emit these on key edges only, never once per frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InputAction {
    Move(Direction),
    Jump,
    Stop,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BallView {
    pub x: f32,
    pub y: f32,
    pub visible: bool,
}

/// One tick's worth of replicated match state. Immutable once emitted;
/// clients buffer these and interpolate between them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub paddle1: Vec2,
    pub paddle2: Vec2,
    pub ball: BallView,
    pub serving: bool,
    pub server_timestamp: u64,
}

impl Snapshot {
    pub fn paddle(&self, side: PaddleSide) -> Vec2 {
        match side {
            PaddleSide::One => self.paddle1,
            PaddleSide::Two => self.paddle2,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    // client -> server
    Connect {
        client_version: u32,
    },
    FindMatch,
    Input {
        action: InputAction,
    },
    Disconnect,

    // server -> client
    Connected {
        participant_id: u32,
    },
    MatchFound {
        match_id: u64,
        side: PaddleSide,
    },
    StateUpdate(Snapshot),
    ScoreUpdate {
        scores: [u8; 2],
    },
    MatchOver {
        winner: PaddleSide,
        final_score: [u8; 2],
    },
    OpponentLeft {
        reason: String,
    },
    Disconnected {
        reason: String,
    },
}
