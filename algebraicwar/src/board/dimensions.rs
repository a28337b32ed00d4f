// Copyright 2020 Zachary Stewart
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Implements the rectangular playing field.
use std::{fmt, ops::RangeInclusive};

use crate::board::Position;

/// Number of rows on a standard board.
pub const DEFAULT_ROWS: usize = 9;
/// Number of columns on a standard board.
pub const DEFAULT_COLS: usize = 8;
/// Each side starts with three full rows, so a board needs at least six.
pub const MIN_ROWS: usize = 6;

/// Size of the rectangular board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Dimensions {
    /// Height of the board. This cooresponds to [`Position::row`].
    rows: usize,
    /// Width of the board. This cooresponds to [`Position::col`].
    cols: usize,
}

impl Dimensions {
    /// Create new [`Dimensions`] with the specified number of rows and columns.
    /// Panics if `rows < MIN_ROWS`, `cols` is 0, or `rows * cols` exceeds
    /// `usize::max_value()`.
    pub fn new(rows: usize, cols: usize) -> Self {
        match Self::try_new(rows, cols) {
            Some(dim) => dim,
            None => {
                if rows < MIN_ROWS || cols == 0 {
                    panic!(
                        "Dimensions must have at least {} rows and 1 column, got {}x{}",
                        MIN_ROWS, rows, cols
                    );
                } else {
                    panic!(
                        "Dimensions too large: {} * {} > {}",
                        rows,
                        cols,
                        usize::max_value()
                    );
                }
            }
        }
    }

    /// Create new [`Dimensions`] with the specified number of rows and columns.
    /// Returns `None` if `rows < MIN_ROWS`, `cols` is 0, or `rows * cols` exceeds
    /// `usize::max_value()`.
    pub fn try_new(rows: usize, cols: usize) -> Option<Self> {
        if rows < MIN_ROWS || cols == 0 {
            None
        } else {
            rows.checked_mul(cols).map(|_| Self { rows, cols })
        }
    }

    /// Get the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells.
    pub fn total_size(&self) -> usize {
        self.rows * self.cols
    }

    /// Check if the given [`Position`] is in bounds.
    #[inline]
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Convert a position to a linear index. Returns `None` if the position is out of
    /// bounds.
    pub fn try_linearize(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.row * self.cols + pos.col)
        } else {
            None
        }
    }

    /// Convert a position to a linear index. Panics if the position is out of range.
    pub fn linearize(&self, pos: Position) -> usize {
        match self.try_linearize(pos) {
            Some(v) => v,
            None => panic!("{} is out of bounds for {}", pos, self),
        }
    }

    /// Convert a linear index back into a [`Position`].
    pub fn un_linearize(&self, idx: usize) -> Position {
        Position::new(idx / self.cols, idx % self.cols)
    }

    /// Step from `pos` by `(drow, dcol)`, returning `None` if the result leaves the
    /// board.
    pub fn offset(&self, pos: Position, drow: isize, dcol: isize) -> Option<Position> {
        pos.offset(drow, dcol).filter(|&next| self.contains(next))
    }

    /// Iterate over every position in row-major order.
    pub fn iter_positions(&self) -> impl Iterator<Item = Position> {
        let dim = *self;
        (0..self.total_size()).map(move |idx| dim.un_linearize(idx))
    }

    /// Get an iterator over rows of this board. Each row is an iterator over the
    /// positions of that row.
    pub fn iter_rows(&self) -> impl Iterator<Item = impl Iterator<Item = Position>> {
        let cols = self.cols;
        (0..self.rows).map(move |row| (0..cols).map(move |col| Position { row, col }))
    }

    /// The columns that count as the middle of the board: the two middle columns for
    /// an even width, the single middle column for an odd width.
    pub fn center_band(&self) -> RangeInclusive<usize> {
        (self.cols - 1) / 2..=self.cols / 2
    }
}

impl Default for Dimensions {
    /// The standard 9x8 board.
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
