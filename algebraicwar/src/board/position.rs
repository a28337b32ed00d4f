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

use std::fmt;

use serde::{Deserialize, Serialize};

/// The coordinates of a cell on the board. Ordering is row-major.
///
/// On the wire a position is written as `{"r": row, "c": col}`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[derive(Serialize, Deserialize)]
pub struct Position {
    /// Vertical position of the cell, counted from the first side's back rank.
    #[serde(rename = "r")]
    pub row: usize,
    /// Horizontal position of the cell.
    #[serde(rename = "c")]
    pub col: usize,
}

impl Position {
    /// Construct a [`Position`] from the given `row` and `col`.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Shift this position by a signed step. Returns `None` if either coordinate would
    /// become negative. Does not check the upper bounds of any board.
    pub fn offset(self, drow: isize, dcol: isize) -> Option<Self> {
        Some(Self {
            row: shift(self.row, drow)?,
            col: shift(self.col, dcol)?,
        })
    }
}

fn shift(value: usize, delta: isize) -> Option<usize> {
    if delta < 0 {
        value.checked_sub(delta.unsigned_abs())
    } else {
        value.checked_add(delta as usize)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl From<(usize, usize)> for Position {
    /// Construct a [`Position`] from the given `(row, col)` pair.
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl From<Position> for (usize, usize) {
    /// Convert the [`Position`] into a `(row, col)` pair.
    fn from(pos: Position) -> Self {
        (pos.row, pos.col)
    }
}

/// A single piece movement. Serialized as `{"start": .., "end": ..}`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[derive(Serialize, Deserialize)]
pub struct Move {
    /// Cell the piece leaves.
    #[serde(rename = "start")]
    pub from: Position,
    /// Cell the piece lands on.
    #[serde(rename = "end")]
    pub to: Position,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// Signed `(row, col)` displacement of this move.
    pub fn delta(&self) -> (isize, isize) {
        (
            self.to.row as isize - self.from.row as isize,
            self.to.col as isize - self.from.col as isize,
        )
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
