//! # Fadeline
//!
//! Real-time multiplayer 3-piece tic-tac-toe server: each side keeps at
//! most 3 live pieces and a 4th placement fades the oldest. Browsers
//! connect over WebSocket with JSON messages; one authoritative room
//! actor holds the match, the two seats, a spectator queue, an AI
//! fallback opponent, the turn clock, and a chat side-channel.
//!
//! This crate is the outer shell: the WebSocket accept loop, the
//! per-connection handler, and the file-backed log sinks. The rules
//! live in `fadeline-engine`, the actor in `fadeline-room`, the wire
//! types in `fadeline-protocol`.

mod error;
mod handler;
mod server;
mod sink;

pub use error::ServerError;
pub use server::{Server, ServerBuilder};
pub use sink::FileSink;
