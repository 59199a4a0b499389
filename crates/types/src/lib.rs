//! Shared types module - cell data and protocol constants
//!
//! Pure data structures with no external dependencies, usable from the grid
//! logic, the TCP server and the command-line runner alike.
//!
//! # Coordinates
//!
//! `(x, y)` with `(0, 0)` in the top-left corner; `x` grows to the right and
//! `y` grows downwards. A coordinate is in bounds iff `0 <= x < width` and
//! `0 <= y < height`.
//!
//! # Rendering
//!
//! | State | Token |
//! |-------|-------|
//! | Hidden | `-` |
//! | Marked | `F` |
//! | Revealed, no mined neighbors | ` ` (a single space) |
//! | Revealed, N mined neighbors | `N` (1-8) |
//!
//! # Examples
//!
//! ```
//! use minesweeper_types::{Cell, CellState};
//!
//! let mut cell = Cell::mined();
//! assert_eq!(cell.state, CellState::Hidden);
//! assert_eq!(cell.state.token(0), '-');
//!
//! cell.state = CellState::Revealed;
//! assert_eq!(cell.state.token(3), '3');
//! assert_eq!(cell.state.token(0), ' ');
//! ```

/// Coordinate type used on the wire and by the grid API.
///
/// Signed so that negative (always out of bounds) coordinates sent by
/// clients can be represented and rejected as no-ops.
pub type Coord = i32;

/// Default TCP port the server listens on.
pub const DEFAULT_PORT: u16 = 4444;

/// Default side length of a randomly generated board.
pub const DEFAULT_SIZE: u32 = 10;

/// Default probability that a random board places a mine on a cell.
pub const DEFAULT_MINE_PROBABILITY: f64 = 0.25;

/// Fixed explosion token sent for a `dig` that hit a mine.
pub const BOOM_MESSAGE: &str = "BOOM!";

/// Fixed usage text sent for `help` and for any unparseable line.
pub const HELP_MESSAGE: &str =
    "Usage: 'look' | 'help' | 'bye' | '(dig | flag | deflag) X Y' where X Y are integers";

/// Greeting sent once per connection, before any command is read.
///
/// `players` includes the connection being greeted.
pub fn hello_message(width: u32, height: u32, players: usize) -> String {
    format!(
        "Welcome to Minesweeper. Board: {} columns by {} rows. Players: {} including you. Type 'help' for help.",
        width, height, players
    )
}


/// Player-visible state of a single cell.
///
/// `Revealed` is only ever entered from `Hidden`; a cell is never both
/// marked and revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    /// Untouched.
    #[default]
    Hidden,
    /// Flagged by a player as a suspected mine.
    Marked,
    /// Dug.
    Revealed,
}

impl CellState {
    /// Render token for this state.
    ///
    /// `adjacent_mines` is only consulted for `Revealed` cells.
    pub fn token(self, adjacent_mines: u8) -> char {
        match self {
            CellState::Hidden => '-',
            CellState::Marked => 'F',
            CellState::Revealed if adjacent_mines == 0 => ' ',
            CellState::Revealed => char::from(b'0' + adjacent_mines.min(8)),
        }
    }

    pub fn is_hidden(self) -> bool {
        matches!(self, CellState::Hidden)
    }
}

/// One grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    /// Cleared only as a side effect of revealing the cell.
    pub has_mine: bool,
    pub state: CellState,
}

impl Cell {
    /// Untouched cell without a mine.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Untouched cell holding a mine.
    pub fn mined() -> Self {
        Self {
            has_mine: true,
            state: CellState::Hidden,
        }
    }
}
