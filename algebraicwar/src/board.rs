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

//! Types that make up the game board.

use std::fmt;

use rand::{
    distributions::{Distribution, Standard},
    Rng,
};

use crate::term::Term;

pub use self::{
    dimensions::{Dimensions, DEFAULT_COLS, DEFAULT_ROWS, MIN_ROWS},
    errors::{CannotRelocateReason, OutOfBounds, RelocateError},
    layout::{layout_term, new_game, LAYOUT_COEFFICIENTS},
    position::{Move, Position},
};

mod dimensions;
mod errors;
mod layout;
mod position;

/// One of the two armies. [`Side::Second`] always moves first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Side {
    /// Starts on the low rows; conventionally red.
    First,
    /// Starts on the high rows; conventionally blue.
    Second,
}

impl Side {
    /// Both sides, in index order.
    pub const ALL: [Side; 2] = [Side::First, Side::Second];

    /// The side that makes the opening move of every game.
    pub const OPENING: Side = Side::Second;

    /// Get the opponent of this side.
    pub fn opponent(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// Row step that moves toward the opposing back rank.
    pub fn forward(self) -> isize {
        match self {
            Side::First => 1,
            Side::Second => -1,
        }
    }

    /// Index of this side into per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self {
            Side::First => "first",
            Side::Second => "second",
        })
    }
}

impl Distribution<Side> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Side {
        if rng.gen() {
            Side::First
        } else {
            Side::Second
        }
    }
}

/// A piece on the board. Pieces are never changed after placement, only moved or
/// removed.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Piece {
    owner: Side,
    term: Term,
}

impl Piece {
    pub fn new(owner: Side, term: Term) -> Self {
        Self { owner, term }
    }

    /// Side that owns this piece.
    pub fn owner(&self) -> Side {
        self.owner
    }

    /// Term carried by this piece.
    pub fn term(&self) -> Term {
        self.term
    }
}

/// Dense grid of pieces. At most one piece occupies each cell. The board performs no
/// rule validation; callers are responsible for legality.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Board {
    /// Size of the grid.
    dim: Dimensions,
    /// Cells in row-major order.
    cells: Box<[Option<Piece>]>,
}

impl Board {
    /// Create a board with no pieces.
    pub fn empty(dim: Dimensions) -> Self {
        let cells = (0..dim.total_size()).map(|_| None).collect();
        Self { dim, cells }
    }

    /// Get the [`Dimensions`] of this board.
    pub fn dimensions(&self) -> &Dimensions {
        &self.dim
    }

    /// Get the piece at the given position. Returns `None` for empty cells and for
    /// positions off the board.
    pub fn get(&self, pos: Position) -> Option<&Piece> {
        self.dim
            .try_linearize(pos)
            .and_then(|i| self.cells[i].as_ref())
    }

    /// Put a piece at the given position, returning whatever piece was there before.
    pub fn set(&mut self, pos: Position, piece: Piece) -> Result<Option<Piece>, OutOfBounds> {
        match self.dim.try_linearize(pos) {
            Some(i) => Ok(self.cells[i].replace(piece)),
            None => Err(OutOfBounds::new(pos, self.dim)),
        }
    }

    /// Remove and return the piece at the given position. Removing from an empty cell
    /// or a position off the board does nothing.
    pub fn remove(&mut self, pos: Position) -> Option<Piece> {
        self.dim
            .try_linearize(pos)
            .and_then(|i| self.cells[i].take())
    }

    /// Returns true if the position is on the board and holds no piece.
    pub fn is_empty(&self, pos: Position) -> bool {
        match self.dim.try_linearize(pos) {
            Some(i) => self.cells[i].is_none(),
            None => false,
        }
    }

    /// Iterate over all pieces and their positions in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Piece)> {
        let dim = self.dim;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, cell)| cell.as_ref().map(|piece| (dim.un_linearize(i), piece)))
    }

    /// Iterate over the pieces owned by one side.
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = (Position, &Piece)> {
        self.iter().filter(move |(_, piece)| piece.owner() == side)
    }

    /// Count the pieces owned by one side.
    pub fn count(&self, side: Side) -> usize {
        self.pieces_of(side).count()
    }

    /// Move the piece at `from` to `to`. Whatever occupied `to` is replaced and
    /// returned alongside the moved piece.
    pub fn relocate(
        &mut self,
        from: Position,
        to: Position,
    ) -> Result<(Piece, Option<Piece>), RelocateError> {
        let (src, dst) = match (self.dim.try_linearize(from), self.dim.try_linearize(to)) {
            (Some(src), Some(dst)) => (src, dst),
            _ => return Err(RelocateError::new(CannotRelocateReason::OutOfBounds, from, to)),
        };
        let piece = self.cells[src]
            .take()
            .ok_or_else(|| RelocateError::new(CannotRelocateReason::EmptyOrigin, from, to))?;
        let displaced = self.cells[dst].replace(piece);
        Ok((piece, displaced))
    }

    /// Place a piece at a position known to be on the board.
    fn place(&mut self, pos: Position, piece: Piece) {
        let i = self.dim.linearize(pos);
        self.cells[i] = Some(piece);
    }
}

impl fmt::Display for Board {
    /// Compact snapshot, one line per row, `.` for empty cells and `F:`/`S:` prefixes
    /// for the owner.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.dim.iter_rows() {
            let cells: Vec<String> = row
                .map(|pos| match self.get(pos) {
                    None => ".".to_owned(),
                    Some(piece) => {
                        let tag = match piece.owner() {
                            Side::First => 'F',
                            Side::Second => 'S',
                        };
                        format!("{}:{}", tag, piece.term())
                    }
                })
                .collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Degree;

    fn piece(owner: Side, text: &str) -> Piece {
        Piece::new(owner, text.parse().unwrap())
    }

    #[test]
    fn test_set_get_remove() {
        let mut board = Board::empty(Dimensions::default());
        let pos = Position::new(4, 4);
        assert!(board.is_empty(pos));
        assert_eq!(board.set(pos, piece(Side::First, "2x")), Ok(None));
        assert_eq!(board.get(pos).unwrap().term().degree(), Degree::Linear);
        assert!(!board.is_empty(pos));
        assert_eq!(board.remove(pos), Some(piece(Side::First, "2x")));
        assert_eq!(board.remove(pos), None);
        assert!(board.is_empty(pos));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut board = Board::empty(Dimensions::default());
        let pos = Position::new(9, 0);
        let err = board.set(pos, piece(Side::First, "1")).unwrap_err();
        assert_eq!(err.pos(), pos);
        assert_eq!(board.get(pos), None);
        assert_eq!(board.remove(pos), None);
        assert!(!board.is_empty(pos));
    }

    #[test]
    fn test_relocate() {
        let mut board = Board::empty(Dimensions::default());
        let from = Position::new(6, 3);
        let to = Position::new(5, 3);
        board.set(from, piece(Side::Second, "-1")).unwrap();
        let (moved, displaced) = board.relocate(from, to).unwrap();
        assert_eq!(moved.owner(), Side::Second);
        assert_eq!(displaced, None);
        assert!(board.is_empty(from));
        assert_eq!(board.get(to), Some(&moved));

        let err = board.relocate(from, to).unwrap_err();
        assert_eq!(err.reason(), CannotRelocateReason::EmptyOrigin);
        let err = board.relocate(to, Position::new(0, 8)).unwrap_err();
        assert_eq!(err.reason(), CannotRelocateReason::OutOfBounds);
        assert_eq!(board.get(to), Some(&moved));
    }

    #[test]
    fn test_iteration_is_row_major() {
        let mut board = Board::empty(Dimensions::default());
        board
            .set(Position::new(3, 1), piece(Side::First, "x"))
            .unwrap();
        board
            .set(Position::new(0, 5), piece(Side::Second, "x^2"))
            .unwrap();
        board
            .set(Position::new(3, 0), piece(Side::First, "3"))
            .unwrap();
        let order: Vec<_> = board.iter().map(|(pos, _)| pos).collect();
        assert_eq!(
            order,
            vec![
                Position::new(0, 5),
                Position::new(3, 0),
                Position::new(3, 1)
            ]
        );
        assert_eq!(board.count(Side::First), 2);
        assert_eq!(board.count(Side::Second), 1);
    }

    #[test]
    fn test_side_rules() {
        assert_eq!(Side::First.opponent(), Side::Second);
        assert_eq!(Side::OPENING, Side::Second);
        assert_eq!(Side::First.forward(), 1);
        assert_eq!(Side::Second.forward(), -1);
    }
}
