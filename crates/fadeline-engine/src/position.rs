//! Position snapshots and the fade-and-place move simulator.

use fadeline_protocol::Seat;

use crate::board::Board;

/// Maximum live pieces per side. A placement beyond this fades the oldest.
pub const MAX_PIECES: usize = 3;

/// A board plus both sides' placement histories.
///
/// The history for each seat lists the cell indices that seat currently
/// occupies, oldest first. Its length always equals the count of that
/// seat's marks on the board and never exceeds [`MAX_PIECES`].
///
/// [`apply`](Position::apply) returns a new `Position` and never mutates
/// the original, so the same code drives both committed moves and AI
/// lookahead — the fade rule behaves identically in hypothetical and
/// real play.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    pub board: Board,
    histories: [Vec<usize>; 2],
}

impl Position {
    /// An empty board with empty histories.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell indices `seat` occupies, oldest first.
    pub fn history(&self, seat: Seat) -> &[usize] {
        &self.histories[seat.index()]
    }

    /// The cell that fades if `seat` places now, or `None` while the
    /// side still has room.
    pub fn fade_candidate(&self, seat: Seat) -> Option<usize> {
        let history = &self.histories[seat.index()];
        if history.len() >= MAX_PIECES {
            history.first().copied()
        } else {
            None
        }
    }

    /// Applies a placement for `seat` at `index`, fading the side's oldest
    /// piece first when it already holds [`MAX_PIECES`].
    ///
    /// The caller is responsible for choosing an empty `index`; applying
    /// onto an occupied cell would corrupt the history invariant, so the
    /// room validates before committing and the AI only generates moves
    /// from empty cells.
    #[must_use]
    pub fn apply(&self, index: usize, seat: Seat) -> Position {
        let mut next = self.clone();
        let history = &mut next.histories[seat.index()];
        if history.len() >= MAX_PIECES {
            let faded = history.remove(0);
            next.board[faded] = None;
        }
        next.histories[seat.index()].push(index);
        next.board[index] = Some(seat);
        next
    }
}
