//! The 9-cell board and win-line evaluation.

use fadeline_protocol::Seat;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// The 8 winning triples: 3 rows, 3 columns, 2 diagonals.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// The board: 9 cells in row-major order, `None` is empty.
pub type Board = [Option<Seat>; BOARD_CELLS];

/// Returns the winner if any winning line is fully owned by one seat.
pub fn evaluate(board: &Board) -> Option<Seat> {
    for [i, j, k] in WINNING_LINES {
        if let Some(seat) = board[i] {
            if board[j] == Some(seat) && board[k] == Some(seat) {
                return Some(seat);
            }
        }
    }
    None
}

/// Indices of all empty cells, ascending.
pub(crate) fn empty_cells(board: &Board) -> Vec<usize> {
    (0..BOARD_CELLS).filter(|&i| board[i].is_none()).collect()
}
