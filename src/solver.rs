//! Logical-deduction solver.
//!
//! The solver drives a [`Board`] through its public interface only. Each
//! deduction pass applies the two counting rules to every revealed number:
//! if a number is already satisfied by its flagged neighbors, the remaining
//! hidden neighbors are safe; if the hidden neighbors are exactly as many as
//! the mines still owed, they are all mines. Repeating the pass to a fixed
//! point extracts everything these rules can prove; anything beyond that is
//! a uniform random guess.

use itertools::iproduct;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::collections::BTreeSet;

use crate::board::{Board, GameState, Point};

/// Move counters and outcome, for benchmarking solver runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverStats {
    pub total_moves: u64,
    pub logical_moves: u64,
    pub guess_moves: u64,
    /// Fraction of moves that were deduced rather than guessed.
    pub success_rate: f64,
    pub game_state: GameState,
}

/// A solver bound to a single game for its whole run.
///
/// It keeps no copy of the grid: hidden and flagged neighbor sets are
/// re-derived from the live board on every call.
pub struct AiSolver<'a> {
    board: &'a mut Board,
    moves_made: u64,
    logical_moves: u64,
    guess_moves: u64,
    rng: StdRng,
}

impl<'a> AiSolver<'a> {
    pub fn new(board: &'a mut Board) -> Self {
        Self::with_rng(board, StdRng::from_os_rng())
    }

    /// A solver with seeded guesses, so whole runs are reproducible.
    pub fn with_seed(board: &'a mut Board, seed: u64) -> Self {
        Self::with_rng(board, StdRng::seed_from_u64(seed))
    }

    fn with_rng(board: &'a mut Board, rng: StdRng) -> Self {
        AiSolver {
            board,
            moves_made: 0,
            logical_moves: 0,
            guess_moves: 0,
            rng,
        }
    }

    pub fn board(&self) -> &Board {
        self.board
    }

    /// Applies the counting rules to one revealed numbered cell.
    ///
    /// Returns the neighbors proven safe and the neighbors proven to be
    /// mines. Hidden, mine, and zero cells carry no constraint and yield
    /// two empty lists.
    pub fn analyze_cell(&self, at: Point) -> (Vec<Point>, Vec<Point>) {
        let Some(number) = self.board.cell_number(at) else {
            return (Vec::new(), Vec::new());
        };
        if number == 0 {
            return (Vec::new(), Vec::new());
        }

        let mut hidden = Vec::new();
        let mut flagged = 0u8;
        for n in self.board.neighbors(at) {
            if self.board.is_flagged(n) {
                flagged += 1;
            } else if !self.board.is_revealed(n) {
                hidden.push(n);
            }
        }

        let remaining = number.saturating_sub(flagged);
        if remaining == 0 {
            // The number is satisfied: whatever is still hidden is safe.
            return (hidden, Vec::new());
        }
        if hidden.len() == remaining as usize {
            // Every hidden neighbor is needed as a mine.
            return (Vec::new(), hidden);
        }
        (Vec::new(), Vec::new())
    }

    /// One fixed-point pass: scans every revealed number once, then acts on
    /// all deductions found. Returns whether anything was done; callers loop
    /// until it returns `false` to reach saturation.
    pub fn make_logical_move(&mut self) -> bool {
        let mut safe_cells = BTreeSet::new();
        let mut mine_cells = BTreeSet::new();

        for (row, col) in iproduct!(0..self.board.rows(), 0..self.board.cols()) {
            let (safe, mines) = self.analyze_cell(Point::new(row, col));
            safe_cells.extend(safe);
            mine_cells.extend(mines);
        }

        let mut acted = false;

        for &p in &mine_cells {
            if self.board.state() != GameState::Playing {
                break;
            }
            if !self.board.is_flagged(p) && self.board.toggle_flag(p) {
                self.moves_made += 1;
                self.logical_moves += 1;
                acted = true;
            }
        }

        for &p in &safe_cells {
            if self.board.state() != GameState::Playing {
                break;
            }
            // A cell can already be revealed here by an earlier cascade in
            // the same pass; skip it without counting a move.
            if self.board.is_revealed(p) || self.board.is_flagged(p) {
                continue;
            }
            self.board.reveal_cell(p);
            self.moves_made += 1;
            self.logical_moves += 1;
            acted = true;
        }

        acted
    }

    /// Reveals a uniformly random hidden, unflagged cell. Returns the
    /// reveal's success flag, or `false` when no candidates remain.
    pub fn make_educated_guess(&mut self) -> bool {
        let candidates: Vec<Point> = self
            .hidden_unflagged_cells()
            .collect();
        let Some(&pick) = candidates.choose(&mut self.rng) else {
            return false;
        };
        self.moves_made += 1;
        self.guess_moves += 1;
        self.board.reveal_cell(pick)
    }

    /// One solver step: a deduction pass if it yields anything, a random
    /// guess otherwise. `false` on a finished board.
    pub fn solve_step(&mut self) -> bool {
        if self.board.state() != GameState::Playing {
            return false;
        }
        if self.make_logical_move() {
            return true;
        }
        self.make_educated_guess()
    }

    /// Plays the game out, opening the board with one random reveal if
    /// nothing has been revealed yet (the opening is not counted in the move
    /// statistics). Stops at a terminal state or after `max_steps` steps,
    /// whichever comes first, and reports whether the game was won.
    pub fn solve_complete(&mut self, max_steps: usize) -> bool {
        if !self.board.started() {
            self.open_randomly();
        }

        let mut steps = 0;
        while self.board.state() == GameState::Playing && steps < max_steps {
            steps += 1;
            self.solve_step();
        }

        self.board.state() == GameState::Won
    }

    pub fn statistics(&self) -> SolverStats {
        let success_rate = if self.moves_made == 0 {
            0.0
        } else {
            self.logical_moves as f64 / self.moves_made as f64
        };
        SolverStats {
            total_moves: self.moves_made,
            logical_moves: self.logical_moves,
            guess_moves: self.guess_moves,
            success_rate,
            game_state: self.board.state(),
        }
    }

    fn open_randomly(&mut self) {
        let all: Vec<Point> = iproduct!(0..self.board.rows(), 0..self.board.cols())
            .map(|(row, col)| Point::new(row, col))
            .collect();
        if let Some(&p) = all.choose(&mut self.rng) {
            self.board.reveal_cell(p);
        }
    }

    fn hidden_unflagged_cells(&self) -> impl Iterator<Item = Point> {
        let board = &*self.board;
        iproduct!(0..board.rows(), 0..board.cols())
            .map(|(row, col)| Point::new(row, col))
            .filter(move |&p| !board.is_revealed(p) && !board.is_flagged(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_needs_a_revealed_number() {
        let mut board = Board::with_mines(5, 5, &[Point::new(0, 0)], 0);
        board.reveal_cell(Point::new(4, 4));
        let solver = AiSolver::with_seed(&mut board, 1);

        // Hidden cell: no constraint.
        let (safe, mines) = solver.analyze_cell(Point::new(0, 0));
        assert!(safe.is_empty() && mines.is_empty());

        // Zero cell: no constraint either.
        let (safe, mines) = solver.analyze_cell(Point::new(4, 4));
        assert!(safe.is_empty() && mines.is_empty());
    }

    #[test]
    fn test_analyze_deduces_mine() {
        // A "1" whose only hidden, unflagged neighbor must be the mine.
        let mut board = Board::with_mines(5, 5, &[Point::new(0, 0)], 0);
        board.reveal_cell(Point::new(4, 4));
        let solver = AiSolver::with_seed(&mut board, 1);

        let (safe, mines) = solver.analyze_cell(Point::new(1, 1));
        assert!(safe.is_empty());
        assert_eq!(mines, vec![Point::new(0, 0)]);
    }

    #[test]
    fn test_analyze_deduces_safe() {
        // A "1" with its mine already flagged: every other hidden neighbor
        // is safe.
        let mut board = Board::with_mines(5, 5, &[Point::new(0, 0)], 0);
        board.reveal_cell(Point::new(1, 1));
        board.toggle_flag(Point::new(0, 0));
        let solver = AiSolver::with_seed(&mut board, 1);

        let (safe, mines) = solver.analyze_cell(Point::new(1, 1));
        assert!(mines.is_empty());
        assert_eq!(safe.len(), 7);
        assert!(safe.contains(&Point::new(2, 2)));
        assert!(!safe.contains(&Point::new(0, 0)));
    }

    #[test]
    fn test_logical_move_flags_and_reveals() {
        // Two mines at (1,0) and (1,1). After opening the bottom, the "2"s
        // below pin both mines, and the satisfied "1" at (0,2) then clears
        // the top-left corner pass by pass.
        let mines = [Point::new(1, 0), Point::new(1, 1)];
        let mut board = Board::with_mines(5, 5, &mines, 0);
        board.reveal_cell(Point::new(4, 4));

        let mut solver = AiSolver::with_seed(&mut board, 1);
        assert!(solver.make_logical_move());
        assert!(solver.board().is_flagged(Point::new(1, 0)));
        assert!(solver.board().is_flagged(Point::new(1, 1)));

        // Saturate.
        while solver.make_logical_move() {}
        assert_eq!(solver.board().state(), GameState::Won);
        assert_eq!(solver.statistics().guess_moves, 0);
    }

    #[test]
    fn test_solve_complete_without_guessing() {
        // Same fully-inferable layout, driven through the public loop.
        let mines = [Point::new(1, 0), Point::new(1, 1)];
        let mut board = Board::with_mines(5, 5, &mines, 0);
        board.reveal_cell(Point::new(4, 4));

        let mut solver = AiSolver::with_seed(&mut board, 1);
        assert!(solver.solve_complete(100));

        let stats = solver.statistics();
        assert_eq!(stats.game_state, GameState::Won);
        assert_eq!(stats.guess_moves, 0);
        assert!(stats.logical_moves > 0);
        assert_eq!(stats.success_rate, 1.0);
    }

    #[test]
    fn test_solve_complete_opens_unstarted_board() {
        let mut board = Board::new(9, 9, 10, 0, Some(42));
        let mut solver = AiSolver::with_seed(&mut board, 7);
        solver.solve_complete(500);
        assert!(board.started());
        assert_ne!(board.state(), GameState::Playing);
    }

    #[test]
    fn test_guess_skips_flagged_cells() {
        // Everything flagged except (2, 2): the guess has one candidate.
        let mut board = Board::new(5, 5, 1, 0, Some(3));
        for (r, c) in iproduct!(0..5, 0..5) {
            if !(r == 2 && c == 2) {
                board.toggle_flag(Point::new(r, c));
            }
        }

        let mut solver = AiSolver::with_seed(&mut board, 1);
        assert!(solver.make_educated_guess());
        assert!(solver.board().is_revealed(Point::new(2, 2)));
        assert_eq!(solver.statistics().guess_moves, 1);
    }

    #[test]
    fn test_guess_with_no_candidates() {
        let mut board = Board::new(5, 5, 1, 0, Some(3));
        for (r, c) in iproduct!(0..5, 0..5) {
            board.toggle_flag(Point::new(r, c));
        }
        let mut solver = AiSolver::with_seed(&mut board, 1);
        assert!(!solver.make_educated_guess());
        assert_eq!(solver.statistics().total_moves, 0);
    }

    #[test]
    fn test_solve_step_on_finished_board() {
        let mut board = Board::with_mines(5, 5, &[Point::new(0, 0)], 0);
        board.reveal_cell(Point::new(4, 4));
        assert_eq!(board.state(), GameState::Won);

        let mut solver = AiSolver::with_seed(&mut board, 1);
        assert!(!solver.solve_step());
        assert_eq!(solver.statistics().total_moves, 0);
    }

    #[test]
    fn test_statistics_start_empty() {
        let mut board = Board::new(9, 9, 10, 0, Some(1));
        let solver = AiSolver::with_seed(&mut board, 1);
        let stats = solver.statistics();
        assert_eq!(stats.total_moves, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.game_state, GameState::Playing);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = || {
            let mut board = Board::new(9, 9, 10, 1, Some(11));
            let mut solver = AiSolver::with_seed(&mut board, 5);
            let won = solver.solve_complete(500);
            let stats = solver.statistics();
            (won, stats.total_moves, stats.guess_moves)
        };
        assert_eq!(run(), run());
    }
}
