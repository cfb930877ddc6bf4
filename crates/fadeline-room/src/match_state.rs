//! The match state machine: board, turn, pause, timer, scores.
//!
//! Every method that depends on time takes an explicit `now` so the
//! rules are fully deterministic under test. The room actor passes
//! `Instant::now()`; tests pass fabricated instants.

use std::time::{Duration, Instant};

use fadeline_engine::{evaluate, Position, BOARD_CELLS};
use fadeline_protocol::{Scores, Seat};

/// Why a placement was rejected. All of these are silent no-ops at the
/// wire level; the match is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejected {
    /// Between a win and the next reset.
    Inactive,
    Paused,
    NotYourTurn,
    OutOfRange,
    CellOccupied,
}

/// What a committed placement did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Play continues; it is now `next_turn`'s move.
    Continued { next_turn: Seat },
    /// The placement completed a line. The match is now inactive until
    /// the next reset; the winner's score has been incremented.
    Won {
        winner: Seat,
        total_moves: u32,
        duration: Duration,
    },
}

/// The authoritative match. Owned by the room actor; never shared.
///
/// Human and AI moves both commit through [`place`](MatchState::place),
/// so the fade rule, win detection, and turn bookkeeping cannot diverge
/// between the two.
#[derive(Debug, Clone)]
pub struct MatchState {
    position: Position,
    turn: Seat,
    game_active: bool,
    paused: bool,
    total_moves: u32,
    turn_start: Instant,
    game_start: Instant,
    pause_start: Option<Instant>,
    scores: Scores,
    /// Bumped on every reset. Deferred work (auto-reset, AI results)
    /// captures the round it was scheduled in and is dropped if the
    /// round has moved on.
    round: u64,
    turn_timeout: Duration,
}

impl MatchState {
    /// A fresh match: empty board, X to move, active and unpaused.
    pub fn new(turn_timeout: Duration, now: Instant) -> Self {
        Self {
            position: Position::new(),
            turn: Seat::X,
            game_active: true,
            paused: false,
            total_moves: 0,
            turn_start: now,
            game_start: now,
            pause_start: None,
            scores: Scores::default(),
            round: 0,
            turn_timeout,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn turn(&self) -> Seat {
        self.turn
    }

    pub fn is_active(&self) -> bool {
        self.game_active
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn total_moves(&self) -> u32 {
        self.total_moves
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Commits a placement for `seat` at `index`.
    ///
    /// On a win the match goes inactive and stays that way until
    /// [`reset`](Self::reset); otherwise the turn flips and the turn
    /// timer restarts.
    pub fn place(
        &mut self,
        seat: Seat,
        index: usize,
        now: Instant,
    ) -> Result<MoveOutcome, MoveRejected> {
        if !self.game_active {
            return Err(MoveRejected::Inactive);
        }
        if self.paused {
            return Err(MoveRejected::Paused);
        }
        if seat != self.turn {
            return Err(MoveRejected::NotYourTurn);
        }
        if index >= BOARD_CELLS {
            return Err(MoveRejected::OutOfRange);
        }
        if self.position.board[index].is_some() {
            return Err(MoveRejected::CellOccupied);
        }

        self.position = self.position.apply(index, seat);
        self.total_moves += 1;

        if let Some(winner) = evaluate(&self.position.board) {
            self.game_active = false;
            match winner {
                Seat::X => self.scores.x += 1,
                Seat::O => self.scores.o += 1,
            }
            Ok(MoveOutcome::Won {
                winner,
                total_moves: self.total_moves,
                duration: now.saturating_duration_since(self.game_start),
            })
        } else {
            self.turn = self.turn.opponent();
            self.turn_start = now;
            Ok(MoveOutcome::Continued {
                next_turn: self.turn,
            })
        }
    }

    /// Toggles the pause flag and returns the new value.
    ///
    /// On resume the turn timer is shifted forward by the pause duration
    /// so remaining time is preserved exactly, not reset.
    pub fn toggle_pause(&mut self, now: Instant) -> bool {
        if self.paused {
            if let Some(start) = self.pause_start.take() {
                self.turn_start += now.saturating_duration_since(start);
            }
            self.paused = false;
        } else {
            self.paused = true;
            self.pause_start = Some(now);
        }
        self.paused
    }

    /// Clears the board, histories, move count, and timers. Turn goes
    /// back to X, the match becomes active and unpaused. Scores are
    /// untouched; the round counter advances.
    pub fn reset(&mut self, now: Instant) {
        self.position = Position::new();
        self.turn = Seat::X;
        self.game_active = true;
        self.paused = false;
        self.total_moves = 0;
        self.turn_start = now;
        self.game_start = now;
        self.pause_start = None;
        self.round += 1;
    }

    /// Time left on the current turn, clamped to zero.
    ///
    /// While paused this reports the frozen remaining time as of the
    /// pause, which is exactly what resume will restore.
    pub fn remaining(&self, now: Instant) -> Duration {
        let elapsed = match self.pause_start {
            Some(pause_start) if self.paused => {
                pause_start.saturating_duration_since(self.turn_start)
            }
            _ => now.saturating_duration_since(self.turn_start),
        };
        self.turn_timeout.saturating_sub(elapsed)
    }

    /// Whether the current turn has exceeded the timeout. Never true
    /// while paused or inactive.
    pub fn timed_out(&self, now: Instant) -> bool {
        self.game_active
            && !self.paused
            && now.saturating_duration_since(self.turn_start) > self.turn_timeout
    }
}
