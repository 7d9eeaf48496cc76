//! # Match Server Library
//!
//! Authoritative side of the volley match. The server owns the only real
//! copy of every match's state: clients send intent, the server simulates,
//! and timestamped snapshots flow back for the clients to render.
//!
//! ## Module organization
//!
//! - [`sim`] — per-match physics, collision, scoring, and the snapshot
//!   encoder. One `MatchSim` per match, owned by that match's task.
//! - [`serve`] — the two-state serve machine that gives every rally a
//!   deterministic start.
//! - [`matchmaker`] — FIFO pairing, input routing, and lifecycle teardown.
//!   Spawns one fixed-rate tick task per match; matches share nothing.
//! - [`registry`] — connected-participant table: id assignment, address
//!   routing, and timeout sweeps.
//! - [`network`] — UDP transport: receiver task, addressed outbound queue,
//!   and the main routing loop.
//!
//! Ticks never overlap themselves: a match task is the single writer of its
//! simulation, and a missed tick is skipped rather than queued. Broadcast is
//! fire-and-forget, so a slow or vanished peer cannot stall a match.

pub mod matchmaker;
pub mod network;
pub mod registry;
pub mod serve;
pub mod sim;
