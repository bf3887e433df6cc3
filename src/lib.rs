//! A Minesweeper game engine with a logical-deduction AI solver.
//!
//! The engine owns all grid state and the win/loss state machine; it performs
//! no I/O and exposes the board to renderers through per-cell display codes
//! and a serializable snapshot. Mines are placed lazily on the first reveal
//! so the opening click and its neighbors are always safe, and a fixed seed
//! reproduces the exact same layout and outcome for the same call sequence.
//!
//! The solver drives a board purely through its public interface: one
//! counting-rule deduction pass per step, with a uniform random guess as the
//! fallback, and move statistics for benchmarking.

pub mod board;
pub mod difficulty;
pub mod solver;

pub use board::{Board, BoardSnapshot, CellDisplay, GameState, Point};
pub use difficulty::{Difficulty, derive_default_lives};
pub use solver::{AiSolver, SolverStats};
