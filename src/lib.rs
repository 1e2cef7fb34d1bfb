//! # Sokoban Solver Library
//!
//! Finds push-optimal solutions to Sokoban levels: the returned move string
//! uses the fewest box pushes possible, with shortest walks between pushes.
//!
//! The search is A* over states made of the box set plus a canonical player
//! cell for the region the player can reach. The heuristic is a minimum-cost
//! matching of boxes to goals over lone-box push distances; states containing
//! a box that can never move again off goal are pruned, as are pushes onto
//! cells from which no goal can be reached.
//!
//! ## Modules
//! - `map`: cells, directions, the static `Map` and validated `PuzzleInstance`.
//! - `level`: XSB text parsing of single levels and collections.
//! - `reach`: player flood fill, shortest walks and player normalization.
//! - `precompute`: dead squares and the goal push-distance table.
//! - `assignment`: Hungarian matching and the search heuristic.
//! - `deadlock`: freeze-deadlock detection.
//! - `search`: the A* engine and `solve` entry points.
//! - `moves`: move-string reconstruction and replay.
//! - `config`: search budget.
//!
//! ```no_run
//! use sokoban_solver::{parse_level, solve, SolveResult};
//!
//! let instance = parse_level("#####\n#@$.#\n#####")?;
//! if let SolveResult::Solved(solution) = solve(&instance)? {
//!     println!("{}", solution.moves);
//! }
//! # Ok::<(), sokoban_solver::SolverError>(())
//! ```

pub mod assignment;
pub mod config;
pub mod deadlock;
pub mod error;
pub mod level;
pub mod map;
pub mod moves;
pub mod precompute;
pub mod reach;
pub mod search;

pub use config::SolverConfig;
pub use error::{Result, SolverError};
pub use level::{parse_collection, parse_level, Level};
pub use map::{Cell, Direction, Map, PuzzleInstance};
pub use moves::{replay, ReplayOutcome};
pub use search::{solve, solve_with, SearchStats, SolveResult, Solution, SokobanSolver};
