//! Core protocol types for Fadeline's wire format.
//!
//! Every mutation of the game produces a fresh [`Snapshot`] broadcast to all
//! connected clients; there are no partial or diffed updates. The remaining
//! [`ServerEvent`] variants are one-shot notifications layered on top.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for one client connection.
///
/// Assigned by the accept loop when a socket is opened and never reused for
/// the process lifetime. This is the only identity a client has — there is
/// no authentication layer — so every roster and queue entry keys on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Seat
// ---------------------------------------------------------------------------

/// One of the two playing roles. Also the mark a placed piece carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    X,
    O,
}

impl Seat {
    /// The other seat.
    pub fn opponent(self) -> Seat {
        match self {
            Seat::X => Seat::O,
            Seat::O => Seat::X,
        }
    }

    /// Stable array index (X = 0, O = 1) for per-seat storage.
    pub fn index(self) -> usize {
        match self {
            Seat::X => 0,
            Seat::O => 1,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::X => write!(f, "X"),
            Seat::O => write!(f, "O"),
        }
    }
}

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Process-wide AI difficulty. Applies to the next AI decision only —
/// changing it never re-evaluates a move already in flight.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// What one seat looks like from the outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    /// Display name of the occupant, `None` when vacant.
    pub name: Option<String>,
    /// Whether the seat is held by the built-in AI.
    pub is_ai: bool,
}

/// Win tally per seat, carried across resets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
pub struct Scores {
    pub x: u32,
    pub o: u32,
}

/// The full game state sent to every client after each mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The 9 cells in row-major order; `None` is empty.
    pub board: [Option<Seat>; 9],
    /// Whose turn it is.
    pub next_turn: Seat,
    /// Winner of the line currently on the board, evaluated only while the
    /// game is active (the end-of-game announcement carries it otherwise).
    pub winner: Option<Seat>,
    /// Index of the piece that will fade if the current side places now.
    pub next_to_fade: Option<usize>,
    pub seat_x: SeatView,
    pub seat_o: SeatView,
    pub scores: Scores,
    /// Spectator queue display names, FIFO order.
    pub queue: Vec<String>,
    pub game_active: bool,
    pub paused: bool,
}

// ---------------------------------------------------------------------------
// ClientEvent — inbound
// ---------------------------------------------------------------------------

/// Messages a client can send.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "PlaceMove", "index": 4 }` — easy to build from a browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Take a seat if one is free (or AI-held), otherwise queue.
    Join { name: String },
    /// Place a piece at a cell (0–8).
    PlaceMove { index: usize },
    /// Toggle the pause state. Seat occupants only.
    TogglePause,
    /// Vacate the opposing seat. Seat occupants only; rejected against AI.
    KickOpponent,
    /// Unconditional reset request.
    ResetGame,
    /// Chat line, truncated server-side to the configured maximum.
    Chat { message: String },
    /// Change the process-wide AI difficulty.
    SetDifficulty { level: Difficulty },
    /// Ask for the remaining turn time.
    Heartbeat,
}

// ---------------------------------------------------------------------------
// ServerEvent — outbound
// ---------------------------------------------------------------------------

/// Messages the server sends.
///
/// `Update` goes to everyone; the rest are addressed to one recipient unless
/// noted. Uses the same internally tagged JSON shape as [`ClientEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Full-state broadcast (all clients).
    Update { state: Snapshot },
    /// Answer to a Join: the seat taken, or `None` when spectating/queued.
    RoleAssigned { seat: Option<Seat>, state: Snapshot },
    /// A game just ended (all clients).
    GameOver {
        winner: Seat,
        winner_name: Option<String>,
    },
    /// The recipient was promoted from the queue into a seat.
    Promoted { seat: Seat, state: Snapshot },
    /// The recipient was kicked from their seat.
    Kicked { message: String },
    /// Operator/system notice (all clients unless sent as a rejection).
    Notice { message: String },
    /// Chat rebroadcast (all clients).
    Chat { sender: String, message: String },
    /// Answer to a Heartbeat, requester only. Clamped to zero.
    HeartbeatAck { remaining_secs: u64 },
}

// =========================================================================
// Tests
// =========================================================================
