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

//! Initial piece layout.

use crate::{
    board::{Board, Dimensions, Piece, Position, Side},
    term::{Degree, Term},
};

/// Coefficients handed out along a camp row, indexed by column for [`Side::Second`]
/// and mirrored for [`Side::First`].
pub const LAYOUT_COEFFICIENTS: [i32; 8] = [-4, -3, -2, -1, 1, 2, 3, 4];

/// Degrees of a camp's rows, starting from the owner's back rank.
const CAMP_ROWS: [Degree; 3] = [Degree::Quadratic, Degree::Linear, Degree::Constant];

/// Build a standard 9x8 board with both camps in place.
pub fn new_game() -> Board {
    Board::new_game(Dimensions::default())
}

/// Get the term a side starts with in the given column of the row of the given degree.
pub fn layout_term(side: Side, degree: Degree, col: usize) -> Term {
    let len = LAYOUT_COEFFICIENTS.len();
    let idx = match side {
        Side::First => len - 1 - col % len,
        Side::Second => col % len,
    };
    match Term::new(degree, LAYOUT_COEFFICIENTS[idx]) {
        Ok(term) => term,
        // Every entry of the table is nonzero and within range.
        Err(_) => unreachable!(),
    }
}

impl Board {
    /// Create a board with the initial layout: three rows per side, quadratics on the
    /// back rank, then linears, then constants facing the middle.
    pub fn new_game(dim: Dimensions) -> Self {
        let mut board = Board::empty(dim);
        let last = dim.rows() - 1;
        for (depth, &degree) in CAMP_ROWS.iter().enumerate() {
            for col in 0..dim.cols() {
                board.place(
                    Position::new(depth, col),
                    Piece::new(Side::First, layout_term(Side::First, degree, col)),
                );
                board.place(
                    Position::new(last - depth, col),
                    Piece::new(Side::Second, layout_term(Side::Second, degree, col)),
                );
            }
        }
        board
    }
}
