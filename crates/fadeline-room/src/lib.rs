//! The authoritative Fadeline room.
//!
//! One room actor owns the match, the two seats, and the spectator
//! queue, and runs as an isolated Tokio task (actor model) — no shared
//! mutable state, just message passing. A monitor clock inside the
//! actor's `select!` loop drives AI auto-moves and turn-timeout
//! evictions.
//!
//! # Key types
//!
//! - [`RoomHandle`] / [`spawn_room`] — talk to the running actor
//! - [`MatchState`] — board, turn, pause, timer, scores
//! - [`Roster`] — seat occupancy and the FIFO queue
//! - [`RoomConfig`] — timeouts, tick interval, limits
//! - [`LogSink`] — boundary to the external chat/history log

mod config;
mod error;
mod match_state;
mod room;
mod roster;
mod sink;

pub use config::RoomConfig;
pub use error::RoomError;
pub use match_state::{MatchState, MoveOutcome, MoveRejected};
pub use room::{spawn_room, EventSender, RoomHandle};
pub use roster::{
    JoinOutcome, Occupant, QueueEntry, RemoveOutcome, Roster, AI_NAME,
};
pub use sink::{LogSink, MemorySink, NullSink, RoomLogs};
