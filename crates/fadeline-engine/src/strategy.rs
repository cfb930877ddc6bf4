//! AI move selection: three difficulty tiers over position snapshots.
//!
//! Every policy works on an owned [`Position`] snapshot, never on live
//! state, so the caller can run it anywhere (the room runs the hard
//! search on a blocking worker and re-validates the result before
//! committing).
//!
//! - **easy** — 50% uniform random, otherwise the basic heuristic
//!   (win, block, center, corner, random).
//! - **medium** — 20% uniform random, otherwise the fork-aware heuristic.
//! - **hard** — minimax with alpha-beta pruning. The fade rule makes the
//!   game graph cyclic, so the search is capped at 2 plies beyond the
//!   candidate move instead of being played to termination.

use fadeline_protocol::{Difficulty, Seat};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::board::{empty_cells, evaluate};
use crate::position::Position;

const CENTER: usize = 4;
const CORNERS: [usize; 4] = [0, 2, 6, 8];
const EDGES: [usize; 4] = [1, 3, 5, 7];

/// Plies searched beyond the candidate move in the hard policy.
const SEARCH_DEPTH: i32 = 2;

/// Picks a move for `seat` at the given difficulty.
///
/// Returns `None` only when the board has no empty cell.
pub fn choose_move(
    pos: &Position,
    seat: Seat,
    difficulty: Difficulty,
    rng: &mut impl Rng,
) -> Option<usize> {
    let empty = empty_cells(&pos.board);
    if empty.is_empty() {
        return None;
    }

    let index = match difficulty {
        Difficulty::Easy => {
            if rng.random_bool(0.5) {
                random_cell(&empty, rng)
            } else {
                basic_move(pos, seat, &empty, rng)
            }
        }
        Difficulty::Medium => {
            if rng.random_bool(0.2) {
                random_cell(&empty, rng)
            } else {
                advanced_move(pos, seat, &empty, rng)
            }
        }
        Difficulty::Hard => search_move(pos, seat, &empty)
            .unwrap_or_else(|| random_cell(&empty, rng)),
    };
    tracing::debug!(%seat, %difficulty, index, "AI selected move");
    Some(index)
}

/// The cell that completes a line for `seat` right now, if one exists.
/// Scans in ascending cell order.
pub fn immediate_win(pos: &Position, seat: Seat) -> Option<usize> {
    empty_cells(&pos.board)
        .into_iter()
        .find(|&i| evaluate(&pos.apply(i, seat).board) == Some(seat))
}

/// All cells where placing `seat` creates a fork: a position with at
/// least 2 distinct follow-up cells that would each win outright.
pub fn find_forks(pos: &Position, seat: Seat) -> Vec<usize> {
    let mut forks = Vec::new();
    for i in empty_cells(&pos.board) {
        let next = pos.apply(i, seat);
        let winning_moves = empty_cells(&next.board)
            .into_iter()
            .filter(|&j| evaluate(&next.apply(j, seat).board) == Some(seat))
            .count();
        if winning_moves >= 2 {
            forks.push(i);
        }
    }
    forks
}

/// Uniform pick from a non-empty cell list.
fn random_cell(cells: &[usize], rng: &mut impl Rng) -> usize {
    cells[rng.random_range(0..cells.len())]
}

/// Win, block, center, corner, anything.
fn basic_move(
    pos: &Position,
    seat: Seat,
    empty: &[usize],
    rng: &mut impl Rng,
) -> usize {
    if let Some(i) = immediate_win(pos, seat) {
        return i;
    }
    if let Some(i) = immediate_win(pos, seat.opponent()) {
        return i;
    }
    if empty.contains(&CENTER) {
        return CENTER;
    }
    let corners: Vec<usize> =
        CORNERS.iter().copied().filter(|c| empty.contains(c)).collect();
    if let Some(&c) = corners.choose(rng) {
        return c;
    }
    random_cell(empty, rng)
}

/// Fork-aware variant: win, block, take a fork, spoil the opponent's
/// fork, then positional preference (center, corner, edge, anything).
///
/// When the opponent has forks and no self-move both threatens a win and
/// spoils them, this falls back to occupying one of the opponent's fork
/// cells at random without checking what that concedes elsewhere — a
/// known non-optimal fallback, kept as designed.
fn advanced_move(
    pos: &Position,
    seat: Seat,
    empty: &[usize],
    rng: &mut impl Rng,
) -> usize {
    if let Some(i) = immediate_win(pos, seat) {
        return i;
    }
    if let Some(i) = immediate_win(pos, seat.opponent()) {
        return i;
    }

    let my_forks = find_forks(pos, seat);
    if let Some(&i) = my_forks.choose(rng) {
        return i;
    }

    let opp_forks = find_forks(pos, seat.opponent());
    if !opp_forks.is_empty() {
        // Prefer a move that leaves us an immediate winning threat, which
        // forces the opponent to answer instead of cashing in the fork.
        for &i in empty {
            let next = pos.apply(i, seat);
            if immediate_win(&next, seat).is_some() {
                return i;
            }
        }
        return random_cell(&opp_forks, rng);
    }

    if empty.contains(&CENTER) {
        return CENTER;
    }
    let corners: Vec<usize> =
        CORNERS.iter().copied().filter(|c| empty.contains(c)).collect();
    if let Some(&c) = corners.choose(rng) {
        return c;
    }
    let edges: Vec<usize> =
        EDGES.iter().copied().filter(|e| empty.contains(e)).collect();
    if let Some(&e) = edges.choose(rng) {
        return e;
    }
    random_cell(empty, rng)
}

/// Depth-capped minimax with alpha-beta over the fade-rule game.
///
/// `depth` counts plies after the candidate move already applied by the
/// caller. Terminal scores: own win `100 - depth`, opponent win
/// `depth - 100`, full board or depth cutoff `0`.
fn minimax(
    pos: &Position,
    depth: i32,
    maximizing: bool,
    seat: Seat,
    mut alpha: i32,
    mut beta: i32,
) -> i32 {
    match evaluate(&pos.board) {
        Some(w) if w == seat => return 100 - depth,
        Some(_) => return depth - 100,
        None => {}
    }
    let empty = empty_cells(&pos.board);
    if empty.is_empty() || depth >= SEARCH_DEPTH {
        return 0;
    }

    if maximizing {
        let mut best = i32::MIN;
        for i in empty {
            let score = minimax(
                &pos.apply(i, seat),
                depth + 1,
                false,
                seat,
                alpha,
                beta,
            );
            best = best.max(score);
            alpha = alpha.max(score);
            if beta <= alpha {
                break;
            }
        }
        best
    } else {
        let mut best = i32::MAX;
        for i in empty {
            let score = minimax(
                &pos.apply(i, seat.opponent()),
                depth + 1,
                true,
                seat,
                alpha,
                beta,
            );
            best = best.min(score);
            beta = beta.min(score);
            if beta <= alpha {
                break;
            }
        }
        best
    }
}

/// Maximizes the search value over all empty cells. Ties keep the first
/// candidate in ascending cell order.
fn search_move(pos: &Position, seat: Seat, empty: &[usize]) -> Option<usize> {
    let mut best_score = i32::MIN;
    let mut best_move = None;
    for &i in empty {
        let score = minimax(
            &pos.apply(i, seat),
            0,
            false,
            seat,
            i32::MIN,
            i32::MAX,
        );
        if score > best_score {
            best_score = score;
            best_move = Some(i);
        }
    }
    tracing::trace!(%seat, ?best_move, best_score, "search complete");
    best_move
}
