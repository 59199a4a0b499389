//! Board module - the shared, thread-safe grid
//!
//! [`Board`] owns one [`Grid`] behind a single mutex. Each public call holds
//! the lock for exactly one grid operation, so no two operations interleave
//! and no caller ever sees a partially expanded flood fill. Consecutive calls
//! by the same caller (for example a dig followed by a render) are *not*
//! atomic as a pair; other callers may act in between.
//!
//! The lock is a blocking `std` mutex and is never held across I/O or an
//! `.await`; every critical section is a bounded, in-memory grid walk.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::grid::Grid;
use crate::types::Coord;

#[derive(Debug)]
pub struct Board {
    grid: Mutex<Grid>,
    width: u32,
    height: u32,
}

impl Board {
    pub fn new(grid: Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            grid: Mutex::new(grid),
        }
    }

    /// Every grid operation leaves the grid consistent before it can panic,
    /// so a poisoned lock still guards a valid grid.
    fn lock(&self) -> MutexGuard<'_, Grid> {
        self.grid.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// See [`Grid::reveal`].
    pub fn reveal(&self, x: Coord, y: Coord) -> bool {
        self.lock().reveal(x, y)
    }

    /// See [`Grid::mark`].
    pub fn mark(&self, x: Coord, y: Coord) {
        self.lock().mark(x, y)
    }

    /// See [`Grid::unmark`].
    pub fn unmark(&self, x: Coord, y: Coord) {
        self.lock().unmark(x, y)
    }

    /// See [`Grid::render`].
    pub fn render(&self) -> String {
        self.lock().render()
    }

    /// Copy of the current grid, taken atomically.
    pub fn snapshot(&self) -> Grid {
        self.lock().clone()
    }
}

impl From<Grid> for Board {
    fn from(grid: Grid) -> Self {
        Self::new(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn dimensions_are_cached() {
        let board = Board::new(Grid::from_layout(3, 2, "0 0 0\n0 1 0\n").unwrap());
        assert_eq!(board.width(), 3);
        assert_eq!(board.height(), 2);
    }

    #[test]
    fn concurrent_digs_reveal_each_cell_once() {
        // One mine in a corner of an otherwise empty 16x16 board: every
        // thread races to flood the same region, exactly one sees it hidden.
        let mut layout = String::new();
        for y in 0..16 {
            let row: Vec<&str> = (0..16)
                .map(|x| if x == 15 && y == 15 { "1" } else { "0" })
                .collect();
            layout.push_str(&row.join(" "));
            layout.push('\n');
        }
        let board = Arc::new(Board::new(Grid::from_layout(16, 16, &layout).unwrap()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let board = Arc::clone(&board);
                thread::spawn(move || board.reveal(i, 0))
            })
            .collect();
        for handle in handles {
            assert!(!handle.join().unwrap());
        }

        let grid = board.snapshot();
        assert_eq!(grid.mine_count(), 1);
        assert_eq!(grid.cell(15, 15).unwrap().state, crate::types::CellState::Hidden);
        assert_eq!(grid.cell(0, 0).unwrap().state, crate::types::CellState::Revealed);
    }

    #[test]
    fn dig_and_mark_race_has_two_outcomes() {
        for _ in 0..64 {
            let board = Arc::new(Board::new(Grid::from_layout(1, 1, "1").unwrap()));

            let digger = {
                let board = Arc::clone(&board);
                thread::spawn(move || board.reveal(0, 0))
            };
            let marker = {
                let board = Arc::clone(&board);
                thread::spawn(move || {
                    board.mark(0, 0);
                    board.render()
                })
            };

            let exploded = digger.join().unwrap();
            let marked_view = marker.join().unwrap();
            let final_view = board.render();

            if exploded {
                assert_eq!(final_view, " ");
                assert_eq!(marked_view, " ");
            } else {
                assert_eq!(final_view, "F");
                assert_eq!(marked_view, "F");
            }
        }
    }
}
