//! The game engine: grid state, the reveal/flag state machine, and the
//! serializable snapshot consumed by renderers.

use itertools::iproduct;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use crate::difficulty::Difficulty;

/// Represents a 2D coordinate on the minesweeper board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }
}

/// Tracks the current status of the game.
///
/// Both variants other than `Playing` are terminal: every mutator on a
/// finished board is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// What a renderer should draw for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDisplay {
    Flagged,
    Hidden,
    Mine,
    Blank,
    Number(u8),
}

/// A plain-data snapshot of the full board state.
///
/// `board` is the mine layout, `numbers` the adjacency grid. Elapsed time is
/// whole seconds (bcs has no float encoding).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoardSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub total_mines: usize,
    pub remaining_mines: usize,
    pub state: GameState,
    pub current_lives: u32,
    pub max_lives: u32,
    pub game_time: u64,
    pub board: Vec<Vec<bool>>,
    pub revealed: Vec<Vec<bool>>,
    pub flagged: Vec<Vec<bool>>,
    pub numbers: Vec<Vec<u8>>,
}

impl BoardSnapshot {
    /// Serializes the snapshot to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        bcs::to_bytes(self).unwrap()
    }

    /// Deserializes a snapshot from bytes.
    pub fn deserialize(bts: &[u8]) -> Self {
        bcs::from_bytes(bts).unwrap()
    }
}

/// The main game struct, holding all grid state and the win/loss state machine.
///
/// Mines are placed lazily on the first reveal so that the clicked cell and
/// its eight neighbors are never mines. A fixed `seed` makes the layout (and
/// therefore the whole game, given the same call sequence) reproducible.
///
/// The constructor deliberately does not validate its arguments; only the
/// [`Difficulty`] factory enforces the `mines <= rows*cols - 9` bound. A board
/// built directly with too many mines silently places as many as fit outside
/// the safe opening.
pub struct Board {
    rows: usize,
    cols: usize,
    total_mines: usize,
    mines: Vec<Vec<bool>>,
    revealed: Vec<Vec<bool>>,
    flagged: Vec<Vec<bool>>,
    numbers: Vec<Vec<u8>>,
    max_lives: u32,
    current_lives: u32,
    state: GameState,
    mines_placed: bool,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    seed: Option<u64>,
}

impl Board {
    pub fn new(rows: usize, cols: usize, mines: usize, lives: u32, seed: Option<u64>) -> Self {
        Board {
            rows,
            cols,
            total_mines: mines,
            mines: vec![vec![false; cols]; rows],
            revealed: vec![vec![false; cols]; rows],
            flagged: vec![vec![false; cols]; rows],
            numbers: vec![vec![0; cols]; rows],
            max_lives: lives,
            current_lives: lives,
            state: GameState::Playing,
            mines_placed: false,
            start_time: None,
            end_time: None,
            seed,
        }
    }

    pub fn from_difficulty(difficulty: &Difficulty, seed: Option<u64>) -> Self {
        Board::new(
            difficulty.rows,
            difficulty.cols,
            difficulty.mines,
            difficulty.lives,
            seed,
        )
    }

    /// Builds a board with an explicit mine layout, placed immediately.
    ///
    /// The first-click safe opening does not apply here; this exists for
    /// puzzle setups and deterministic tests.
    pub fn with_mines(rows: usize, cols: usize, mine_points: &[Point], lives: u32) -> Self {
        let mut board = Board::new(rows, cols, mine_points.len(), lives, None);
        for p in mine_points {
            board.mines[p.row][p.col] = true;
        }
        board.compute_numbers();
        board.mines_placed = true;
        board
    }

    // --- Queries ---

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn total_mines(&self) -> usize {
        self.total_mines
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    pub fn current_lives(&self) -> u32 {
        self.current_lives
    }

    /// True once the first cell has been revealed.
    pub fn started(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn in_bounds(&self, at: Point) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    pub fn is_revealed(&self, at: Point) -> bool {
        self.in_bounds(at) && self.revealed[at.row][at.col]
    }

    pub fn is_flagged(&self, at: Point) -> bool {
        self.in_bounds(at) && self.flagged[at.row][at.col]
    }

    /// The adjacency number of a revealed non-mine cell, `None` otherwise.
    pub fn cell_number(&self, at: Point) -> Option<u8> {
        if self.is_revealed(at) && !self.mines[at.row][at.col] {
            Some(self.numbers[at.row][at.col])
        } else {
            None
        }
    }

    /// Mines still unaccounted for: total minus flag count, floored at zero.
    pub fn remaining_mines(&self) -> usize {
        let flagged = self.flagged.iter().flatten().filter(|&&f| f).count();
        self.total_mines.saturating_sub(flagged)
    }

    /// Elapsed whole seconds since the first reveal. Zero before the game
    /// starts, frozen once it reaches a terminal state.
    pub fn game_time(&self) -> u64 {
        match (self.start_time, self.end_time) {
            (None, _) => 0,
            (Some(start), Some(end)) => end.duration_since(start).as_secs(),
            (Some(start), None) => start.elapsed().as_secs(),
        }
    }

    pub fn cell_display(&self, at: Point) -> CellDisplay {
        if !self.in_bounds(at) {
            return CellDisplay::Hidden;
        }
        if self.flagged[at.row][at.col] {
            return CellDisplay::Flagged;
        }
        if !self.revealed[at.row][at.col] {
            return CellDisplay::Hidden;
        }
        if self.mines[at.row][at.col] {
            return CellDisplay::Mine;
        }
        match self.numbers[at.row][at.col] {
            0 => CellDisplay::Blank,
            n => CellDisplay::Number(n),
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            rows: self.rows,
            cols: self.cols,
            total_mines: self.total_mines,
            remaining_mines: self.remaining_mines(),
            state: self.state,
            current_lives: self.current_lives,
            max_lives: self.max_lives,
            game_time: self.game_time(),
            board: self.mines.clone(),
            revealed: self.revealed.clone(),
            flagged: self.flagged.clone(),
            numbers: self.numbers.clone(),
        }
    }

    /// A helper function to get all valid neighbor coordinates for a given
    /// point. It correctly handles board edges and corners.
    pub fn neighbors(&self, at: Point) -> impl Iterator<Item = Point> {
        let rows = self.rows;
        let cols = self.cols;

        (-1..=1).flat_map(move |dr: isize| {
            (-1..=1).filter_map(move |dc: isize| {
                if dr == 0 && dc == 0 {
                    return None;
                }
                let nr = at.row as isize + dr;
                let nc = at.col as isize + dc;
                if nr >= 0 && nr < rows as isize && nc >= 0 && nc < cols as isize {
                    Some(Point {
                        row: nr as usize,
                        col: nc as usize,
                    })
                } else {
                    None
                }
            })
        })
    }

    // --- Mutators ---

    /// Reveals a cell.
    ///
    /// Returns `false` if a mine was hit, the coordinates are out of bounds,
    /// or the game is already over. Revealing a cell that is already revealed
    /// or flagged is harmless and returns `true`. A revealed zero cascades
    /// through its whole zero-connected region.
    pub fn reveal_cell(&mut self, at: Point) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        if !self.in_bounds(at) {
            return false;
        }
        if self.revealed[at.row][at.col] || self.flagged[at.row][at.col] {
            return true;
        }

        if !self.mines_placed {
            self.place_mines(at);
        }
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }

        if self.mines[at.row][at.col] {
            self.revealed[at.row][at.col] = true;
            return self.hit_mine();
        }

        self.flood_fill_reveal(at);
        self.check_win();
        true
    }

    /// Toggles a flag on a hidden cell. Rejected (returns `false`) for
    /// revealed cells, out-of-bounds coordinates, and finished games.
    pub fn toggle_flag(&mut self, at: Point) -> bool {
        if self.state != GameState::Playing {
            return false;
        }
        if !self.in_bounds(at) {
            return false;
        }
        if self.revealed[at.row][at.col] {
            return false;
        }
        self.flagged[at.row][at.col] = !self.flagged[at.row][at.col];
        // Flag flips cannot reveal anything, so this check never fires here;
        // kept so every mutator re-evaluates the win condition.
        self.check_win();
        true
    }

    /// Marks every mine cell as revealed, for end-of-game display. Works in
    /// any state.
    pub fn reveal_all_mines(&mut self) {
        for (row, col) in iproduct!(0..self.rows, 0..self.cols) {
            if self.mines[row][col] {
                self.revealed[row][col] = true;
            }
        }
    }

    // --- Internals ---

    /// Places mines everywhere except the clicked cell and its neighbors,
    /// then fills in the adjacency numbers. Runs once, on the first reveal.
    ///
    /// If the requested mine count exceeds the candidate pool, fewer mines
    /// are placed; see the type-level docs.
    fn place_mines(&mut self, first: Point) {
        let mut forbidden = HashSet::from([first]);
        for n in self.neighbors(first) {
            forbidden.insert(n);
        }

        let candidates: Vec<Point> = iproduct!(0..self.rows, 0..self.cols)
            .map(|(row, col)| Point { row, col })
            .filter(|p| !forbidden.contains(p))
            .collect();

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let count = self.total_mines.min(candidates.len());
        for p in candidates.choose_multiple(&mut rng, count) {
            self.mines[p.row][p.col] = true;
        }

        self.compute_numbers();
        self.mines_placed = true;
    }

    fn compute_numbers(&mut self) {
        for (row, col) in iproduct!(0..self.rows, 0..self.cols) {
            if self.mines[row][col] {
                continue;
            }
            let at = Point { row, col };
            let count = self
                .neighbors(at)
                .filter(|n| self.mines[n.row][n.col])
                .count();
            self.numbers[row][col] = count as u8;
        }
    }

    /// Performs the cascading reveal for zero-adjacency regions, iteratively
    /// so large boards cannot exhaust the call stack. Flagged cells block the
    /// cascade; mines are never enqueued because a zero cell has no mine
    /// neighbors.
    fn flood_fill_reveal(&mut self, start: Point) {
        let mut queue = VecDeque::from([start]);
        let mut visited = HashSet::from([start]);

        while let Some(point) = queue.pop_front() {
            if self.revealed[point.row][point.col] || self.flagged[point.row][point.col] {
                continue;
            }
            self.revealed[point.row][point.col] = true;

            if self.numbers[point.row][point.col] == 0 {
                let next: Vec<Point> = self
                    .neighbors(point)
                    .filter(|n| !self.revealed[n.row][n.col] && !visited.contains(n))
                    .collect();
                for n in next {
                    visited.insert(n);
                    queue.push_back(n);
                }
            }
        }
    }

    fn hit_mine(&mut self) -> bool {
        if self.max_lives > 0 {
            self.current_lives -= 1;
            if self.current_lives == 0 {
                self.finish(GameState::Lost);
            }
        } else {
            // Hardcore: any mine hit ends the game.
            self.finish(GameState::Lost);
        }
        false
    }

    /// The game is won exactly when every non-mine cell is revealed.
    fn check_win(&mut self) {
        let all_safe_revealed = iproduct!(0..self.rows, 0..self.cols)
            .filter(|&(r, c)| !self.mines[r][c])
            .all(|(r, c)| self.revealed[r][c]);
        if all_safe_revealed {
            self.finish(GameState::Won);
        }
    }

    fn finish(&mut self, state: GameState) {
        self.state = state;
        self.end_time = Some(Instant::now());
    }
}
