//! # Match Client Library
//!
//! Display side of the volley match. The client never decides anything about
//! the world; it sends intent edges to the server and renders a view built
//! from two sources with different clocks:
//!
//! - the **locally controlled paddle** is predicted every frame from raw
//!   input using the same movement rules as the server, with a continuous
//!   exponential correction toward the last authoritative pose;
//! - the **remote paddle and ball** are replayed a fixed delay behind real
//!   time by interpolating between the two buffered snapshots that straddle
//!   the render time, falling back to the newest snapshot when the buffer
//!   cannot provide a straddling pair.
//!
//! Modules: [`game`] (prediction + interpolation buffer), [`input`]
//! (edge-triggered action emission), [`network`] (non-blocking UDP polled
//! once per frame), [`rendering`] (macroquad presentation).

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
