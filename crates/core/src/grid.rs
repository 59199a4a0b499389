//! Grid module - cell storage and the dig/flag/render rules
//!
//! The grid is a `width x height` array of [`Cell`]s stored in a flat vector,
//! row-major (`y * width + x`). Dimensions never change after construction.
//!
//! Every operation accepts any coordinate: out-of-range coordinates and
//! illegal state transitions are silent no-ops rather than errors, so a
//! client can never put the grid into an invalid state.
//!
//! A `Grid` is a plain single-owner value. Shared, concurrent access goes
//! through [`Board`](crate::board::Board), which serializes each call.

use std::fmt;
use std::path::Path;

use arrayvec::ArrayVec;

use crate::error::{BoardError, Result};
use crate::mines::MinePolicy;
use crate::types::{Cell, CellState, Coord};

/// Offsets of the 8 neighbors (orthogonal + diagonal).
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from explicit cells in row-major order.
    fn from_cells(width: u32, height: u32, cells: Vec<Cell>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyBoard);
        }
        debug_assert_eq!(cells.len(), width as usize * height as usize);
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Generate a `width x height` grid, asking `policy` about every cell.
    pub fn random(width: u32, height: u32, policy: &mut impl MinePolicy) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyBoard);
        }
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell {
                    has_mine: policy.is_mined(x, y),
                    state: CellState::Hidden,
                });
            }
        }
        let grid = Self::from_cells(width, height, cells)?;
        tracing::debug!(width, height, mines = grid.mine_count(), "generated random grid");
        Ok(grid)
    }

    /// Build a grid from a mine layout without a header.
    ///
    /// `layout` must hold exactly `height` lines of exactly `width`
    /// single-space separated `0`/`1` tokens.
    pub fn from_layout(width: u32, height: u32, layout: &str) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BoardError::EmptyBoard);
        }
        let rows = crate::layout::split_lines(layout);
        let cells = crate::layout::parse_rows(width as usize, height as usize, &rows)?;
        Self::from_cells(width, height, cells)
    }

    /// Build a grid from the persisted board format: a `WIDTH HEIGHT`
    /// header line followed by the mine layout.
    pub fn parse(text: &str) -> Result<Self> {
        let rows = crate::layout::split_lines(text);
        let Some((header, body)) = rows.split_first() else {
            return Err(BoardError::MalformedHeader(String::new()));
        };
        let (width, height) = crate::layout::parse_header(header)?;
        let cells = crate::layout::parse_rows(width as usize, height as usize, body)?;
        Self::from_cells(width, height, cells)
    }

    /// Read and [`parse`](Self::parse) a board file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: Coord, y: Coord) -> Option<usize> {
        if x < 0 || y < 0 || x as i64 >= self.width as i64 || y as i64 >= self.height as i64 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// In-bounds neighbor indices of the cell at `idx`.
    fn neighbors(&self, idx: usize) -> ArrayVec<usize, 8> {
        let width = self.width as i64;
        let height = self.height as i64;
        let x = (idx % self.width as usize) as i64;
        let y = (idx / self.width as usize) as i64;

        let mut out = ArrayVec::new();
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let nx = x + dx;
            let ny = y + dy;
            if nx >= 0 && nx < width && ny >= 0 && ny < height {
                out.push((ny * width + nx) as usize);
            }
        }
        out
    }

    fn adjacent_mines_at(&self, idx: usize) -> u8 {
        self.neighbors(idx)
            .into_iter()
            .filter(|&n| self.cells[n].has_mine)
            .count() as u8
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cell at (x, y), or `None` if out of bounds.
    pub fn cell(&self, x: Coord, y: Coord) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Number of the 8 neighbors of (x, y) currently holding a mine.
    ///
    /// Returns 0 for out-of-bounds coordinates.
    pub fn neighbor_mine_count(&self, x: Coord, y: Coord) -> u8 {
        self.index(x, y)
            .map(|idx| self.adjacent_mines_at(idx))
            .unwrap_or(0)
    }

    /// Mines still present on the grid.
    pub fn mine_count(&self) -> usize {
        self.cells.iter().filter(|c| c.has_mine).count()
    }

    /// Dig the cell at (x, y).
    ///
    /// No-op returning `false` unless the cell is in bounds and hidden.
    /// Otherwise the cell becomes revealed and, if it held a mine, the mine is
    /// consumed and `true` is returned. If the dug cell ends up with no mined
    /// neighbors, all of its neighbors are dug too, transitively, stopping at
    /// cells that border a mine or are not hidden.
    ///
    /// Only the originally dug cell contributes to the return value.
    pub fn reveal(&mut self, x: Coord, y: Coord) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        if !self.cells[idx].state.is_hidden() {
            return false;
        }
        let exploded = self.cells[idx].has_mine;
        self.flood_reveal(idx);
        exploded
    }

    /// Reveal `start` and expand through zero-count cells.
    ///
    /// Uses an explicit work list instead of call recursion. Mine flags only
    /// change for `start` itself: every other cell enters the list as the
    /// neighbor of a cell with no mined neighbors, so it holds no mine.
    fn flood_reveal(&mut self, start: usize) {
        let mut pending = vec![start];
        while let Some(idx) = pending.pop() {
            let cell = &mut self.cells[idx];
            if !cell.state.is_hidden() {
                continue;
            }
            cell.state = CellState::Revealed;
            cell.has_mine = false;

            if self.adjacent_mines_at(idx) == 0 {
                pending.extend(
                    self.neighbors(idx)
                        .into_iter()
                        .filter(|&n| self.cells[n].state.is_hidden()),
                );
            }
        }
    }

    /// Flag the cell at (x, y) if it is in bounds and hidden.
    pub fn mark(&mut self, x: Coord, y: Coord) {
        if let Some(idx) = self.index(x, y) {
            let cell = &mut self.cells[idx];
            if cell.state == CellState::Hidden {
                cell.state = CellState::Marked;
            }
        }
    }

    /// Remove the flag at (x, y) if it is in bounds and marked.
    pub fn unmark(&mut self, x: Coord, y: Coord) {
        if let Some(idx) = self.index(x, y) {
            let cell = &mut self.cells[idx];
            if cell.state == CellState::Marked {
                cell.state = CellState::Hidden;
            }
        }
    }

    /// Text form of the grid: `height` rows separated by `\n` (no trailing
    /// newline), each holding `width` tokens separated by single spaces.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.width as usize;
        for (idx, cell) in self.cells.iter().enumerate() {
            if idx > 0 {
                f.write_str(if idx % width == 0 { "\n" } else { " " })?;
            }
            let adjacent = match cell.state {
                CellState::Revealed => self.adjacent_mines_at(idx),
                _ => 0,
            };
            write!(f, "{}", cell.state.token(adjacent))?;
        }
        Ok(())
    }
}
