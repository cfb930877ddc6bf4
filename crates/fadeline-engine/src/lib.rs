//! Pure game logic for Fadeline's 3-piece tic-tac-toe variant.
//!
//! Each side keeps at most [`MAX_PIECES`] live pieces; a 4th placement
//! evicts that side's oldest piece before the new one lands (the "fade"
//! rule). Everything here is synchronous and side-effect free — the room
//! actor owns the live state and calls into this crate for evaluation,
//! simulation, and AI move selection.
//!
//! # Key items
//!
//! - [`Board`], [`evaluate`] — win-line evaluation over the 9 cells
//! - [`Position`] — board + per-side placement histories; [`Position::apply`]
//!   is the one fade-and-place implementation shared by real moves and
//!   AI lookahead
//! - [`choose_move`] — difficulty-selected AI policy

mod board;
mod position;
mod strategy;

pub use board::{evaluate, Board, BOARD_CELLS, WINNING_LINES};
pub use position::{Position, MAX_PIECES};
pub use strategy::{choose_move, find_forks, immediate_win};
