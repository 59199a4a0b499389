//! Core game logic - the Minesweeper grid
//!
//! Everything here is synchronous and free of networking, so it can be
//! driven directly from tests, benches, or the TCP server.
//!
//! # Module Structure
//!
//! - [`grid`]: cell storage, dig with flood fill, flag/unflag, rendering
//! - [`board`]: [`Board`], the mutex-guarded grid shared by all connections
//! - [`mines`]: mine placement policies for random boards
//! - [`error`]: [`BoardError`] for malformed layouts
//!
//! # Example
//!
//! ```
//! use minesweeper_core::Grid;
//!
//! // 3x1 board with one mine on the left.
//! let mut grid = Grid::from_layout(3, 1, "1 0 0\n").unwrap();
//!
//! // Digging the right edge floods into the middle cell and stops there.
//! assert!(!grid.reveal(2, 0));
//! assert_eq!(grid.render(), "- 1  ");
//!
//! grid.mark(0, 0);
//! assert_eq!(grid.render(), "F 1  ");
//! ```

pub mod board;
pub mod error;
pub mod grid;
mod layout;
pub mod mines;

pub use minesweeper_types as types;

pub use board::Board;
pub use error::{BoardError, Result};
pub use grid::Grid;
pub use mines::{MinePolicy, NoMines, RandomMines};
