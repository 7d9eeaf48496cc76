//! Types shared between the authoritative server and the display client:
//! wire protocol, entities, court geometry, match configuration, and the
//! paddle kinematics both sides must run identically for prediction to hold.

pub mod config;
pub mod entities;
pub mod physics;
pub mod protocol;

pub use config::{Court, MatchConfig, REFERENCE_FRAME_MS};
pub use entities::{Ball, InputIntent, Paddle, PaddleSide};
pub use physics::{aabb_overlap, normalize_step, step_paddle, Vec2};
pub use protocol::{BallView, Direction, InputAction, Packet, Snapshot};
