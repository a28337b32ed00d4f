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

//! Movement rules.

use thiserror::Error;

use crate::{
    board::{Board, Move, Position, Side},
    term::Degree,
};

/// Reason a move is not allowed. Reported by [`check_move`] for the first rule that
/// fails.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum IllegalMove {
    /// The origin and destination are the same cell.
    #[error("piece must move to a different cell")]
    Stationary,
    /// The origin or destination is off the board.
    #[error("position is off the board")]
    OutOfBounds,
    /// There is no piece at the origin.
    #[error("no piece at the origin")]
    EmptyOrigin,
    /// The piece at the origin belongs to the other side.
    #[error("piece belongs to the other side")]
    NotOwned,
    /// The destination already holds a piece.
    #[error("destination is occupied")]
    Occupied,
    /// The destination is farther than the piece's degree allows.
    #[error("destination is out of range for a {0} term")]
    OutOfRange(Degree),
    /// The displacement does not follow a line the piece's degree allows.
    #[error("{0} terms cannot move in that direction")]
    WrongDirection(Degree),
    /// A piece stands between the origin and the destination.
    #[error("path is blocked at {0}")]
    Blocked(Position),
}

/// Check whether `side` may move the piece at `from` to `to`.
///
/// Pieces slide: every cell strictly between the two ends must be empty. Range is the
/// larger of the row and column distances. Constants step one cell straight toward the
/// opposing back rank, linears move along rows or columns, quadratics additionally
/// along perfect diagonals.
pub fn check_move(
    board: &Board,
    from: Position,
    to: Position,
    side: Side,
) -> Result<(), IllegalMove> {
    if from == to {
        return Err(IllegalMove::Stationary);
    }
    let dim = board.dimensions();
    if !dim.contains(from) || !dim.contains(to) {
        return Err(IllegalMove::OutOfBounds);
    }
    let piece = board.get(from).ok_or(IllegalMove::EmptyOrigin)?;
    if piece.owner() != side {
        return Err(IllegalMove::NotOwned);
    }
    if !board.is_empty(to) {
        return Err(IllegalMove::Occupied);
    }

    let degree = piece.term().degree();
    let (drow, dcol) = Move::new(from, to).delta();
    let (arow, acol) = (drow.unsigned_abs(), dcol.unsigned_abs());
    if arow.max(acol) > degree.range() {
        return Err(IllegalMove::OutOfRange(degree));
    }
    let shape_ok = match degree {
        Degree::Constant => dcol == 0 && drow == side.forward(),
        Degree::Linear => arow == 0 || acol == 0,
        Degree::Quadratic => arow == 0 || acol == 0 || arow == acol,
    };
    if !shape_ok {
        return Err(IllegalMove::WrongDirection(degree));
    }

    let (srow, scol) = (drow.signum(), dcol.signum());
    let mut cell = from;
    while let Some(next) = dim.offset(cell, srow, scol) {
        if next == to {
            break;
        }
        if !board.is_empty(next) {
            return Err(IllegalMove::Blocked(next));
        }
        cell = next;
    }
    Ok(())
}

/// Returns true if `side` may move the piece at `from` to `to`.
pub fn is_legal(board: &Board, from: Position, to: Position, side: Side) -> bool {
    check_move(board, from, to, side).is_ok()
}

/// Every cell the piece at `pos` may move to, in row-major order. Empty if the cell
/// does not hold a piece of `side`.
pub fn legal_destinations(board: &Board, pos: Position, side: Side) -> Vec<Position> {
    board
        .dimensions()
        .iter_positions()
        .filter(|&to| is_legal(board, pos, to, side))
        .collect()
}

/// Every legal move for `side`, ordered by origin then destination, both row-major.
pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    board
        .pieces_of(side)
        .flat_map(|(from, _)| {
            legal_destinations(board, from, side)
                .into_iter()
                .map(move |to| Move::new(from, to))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;
    use crate::board::{new_game, Dimensions, Piece};

    fn piece(owner: Side, text: &str) -> Piece {
        Piece::new(owner, text.parse().unwrap())
    }

    fn board_with(pieces: &[(usize, usize, Side, &str)]) -> Board {
        let mut board = Board::empty(Dimensions::default());
        for &(row, col, side, text) in pieces {
            board
                .set(Position::new(row, col), piece(side, text))
                .unwrap();
        }
        board
    }

    fn check(
        board: &Board,
        from: (usize, usize),
        to: (usize, usize),
        side: Side,
    ) -> Result<(), IllegalMove> {
        check_move(board, from.into(), to.into(), side)
    }

    fn dests(board: &Board, row: usize, col: usize, side: Side) -> HashSet<(usize, usize)> {
        legal_destinations(board, Position::new(row, col), side)
            .into_iter()
            .map(Into::into)
            .collect()
    }

    #[test]
    fn test_constant_steps_forward_only() {
        let board = board_with(&[(4, 4, Side::First, "3"), (4, 2, Side::Second, "-2")]);
        let forward: HashSet<_> = [(5, 4)].iter().copied().collect();
        assert_eq!(dests(&board, 4, 4, Side::First), forward);
        let forward: HashSet<_> = [(3, 2)].iter().copied().collect();
        assert_eq!(dests(&board, 4, 2, Side::Second), forward);
        assert_eq!(
            check(&board, (4, 4), (3, 4), Side::First),
            Err(IllegalMove::WrongDirection(Degree::Constant))
        );
        assert_eq!(
            check(&board, (4, 4), (6, 4), Side::First),
            Err(IllegalMove::OutOfRange(Degree::Constant))
        );
    }

    #[test]
    fn test_constant_blocked_by_piece_ahead() {
        let board = board_with(&[(4, 4, Side::First, "3"), (5, 4, Side::Second, "x")]);
        assert!(dests(&board, 4, 4, Side::First).is_empty());
    }

    #[test]
    fn test_linear_moves_cardinally_two_steps() {
        let board = board_with(&[(4, 4, Side::First, "2x")]);
        let expected: HashSet<_> = [
            (2, 4),
            (3, 4),
            (5, 4),
            (6, 4),
            (4, 2),
            (4, 3),
            (4, 5),
            (4, 6),
        ]
        .iter()
        .copied()
        .collect();
        assert_eq!(dests(&board, 4, 4, Side::First), expected);
        assert_eq!(
            check(&board, (4, 4), (5, 5), Side::First),
            Err(IllegalMove::WrongDirection(Degree::Linear))
        );
    }

    #[test]
    fn test_quadratic_cardinal_and_diagonal_with_blockers() {
        let board = board_with(&[
            (4, 4, Side::Second, "-x^2"),
            // Blocks the upward ray after one step.
            (2, 4, Side::First, "1"),
            // Blocks the down-right diagonal immediately.
            (5, 5, Side::Second, "x"),
        ]);
        let got = dests(&board, 4, 4, Side::Second);
        assert!(got.contains(&(3, 4)));
        assert!(!got.contains(&(2, 4)));
        assert!(!got.contains(&(1, 4)));
        assert!(!got.contains(&(5, 5)));
        assert!(!got.contains(&(6, 6)));
        assert!(got.contains(&(1, 1)));
        assert!(got.contains(&(7, 1)));
        assert!(got.contains(&(4, 7)));
        assert!(got.contains(&(4, 1)));
        assert!(!got.contains(&(4, 0)));
        // Knight-like jumps are never allowed.
        assert!(!got.contains(&(6, 5)));
        assert_eq!(
            check(&board, (4, 4), (1, 4), Side::Second),
            Err(IllegalMove::Blocked(Position::new(2, 4)))
        );
        // One cell upward, none down-right, three along each of the other six rays.
        assert_eq!(got.len(), 1 + 3 + 3 + 3 + 3 + 3 + 3);
    }

    #[test]
    fn test_ownership_and_occupancy() {
        let board = board_with(&[(4, 4, Side::First, "x"), (4, 5, Side::Second, "x")]);
        let from = Position::new(4, 4);
        assert_eq!(
            check_move(&board, from, from, Side::First),
            Err(IllegalMove::Stationary)
        );
        assert_eq!(
            check_move(&board, from, Position::new(4, 3), Side::Second),
            Err(IllegalMove::NotOwned)
        );
        assert_eq!(
            check_move(&board, from, Position::new(4, 5), Side::First),
            Err(IllegalMove::Occupied)
        );
        assert_eq!(
            check(&board, (0, 0), (0, 1), Side::First),
            Err(IllegalMove::EmptyOrigin)
        );
        assert_eq!(
            check_move(&board, from, Position::new(4, 8), Side::First),
            Err(IllegalMove::OutOfBounds)
        );
        let corner = legal_destinations(&board, Position::new(0, 0), Side::First);
        assert!(corner.is_empty());
    }

    #[test]
    fn test_opening_moves() {
        let board = new_game();
        // Only constants on the front row can move at the start, one step each.
        let moves = legal_moves(&board, Side::Second);
        assert_eq!(moves.len(), 8);
        assert!(moves
            .iter()
            .all(|mv| mv.from.row == 6 && mv.to.row == 5 && mv.from.col == mv.to.col));
        let ordered: Vec<_> = moves.iter().map(|mv| mv.from.col).collect();
        assert_eq!(ordered, (0..8).collect::<Vec<_>>());
    }

    fn arbitrary_board() -> impl Strategy<Value = Board> {
        let cell = prop::option::weighted(
            0.4,
            (
                any::<bool>(),
                prop::sample::select(vec![
                    "-4x^2", "-x^2", "3x^2", "-2x", "x", "4x", "-3", "-1", "2",
                ]),
            ),
        );
        prop::collection::vec(cell, 72).prop_map(|cells| {
            let mut board = Board::empty(Dimensions::default());
            for (i, cell) in cells.into_iter().enumerate() {
                if let Some((first, text)) = cell {
                    let side = if first { Side::First } else { Side::Second };
                    board
                        .set(Position::new(i / 8, i % 8), piece(side, text))
                        .unwrap();
                }
            }
            board
        })
    }

    proptest! {
        #[test]
        fn prop_destinations_are_empty_and_distinct_from_origin(
            board in arbitrary_board(),
            row in 0usize..9,
            col in 0usize..8,
        ) {
            let from = Position::new(row, col);
            if let Some(piece) = board.get(from).copied() {
                for to in legal_destinations(&board, from, piece.owner()) {
                    prop_assert_ne!(to, from);
                    prop_assert!(board.is_empty(to));
                }
            }
        }

        #[test]
        fn prop_destinations_respect_degree_shape(
            board in arbitrary_board(),
            row in 0usize..9,
            col in 0usize..8,
        ) {
            let from = Position::new(row, col);
            if let Some(piece) = board.get(from).copied() {
                let degree = piece.term().degree();
                for to in legal_destinations(&board, from, piece.owner()) {
                    let (drow, dcol) = Move::new(from, to).delta();
                    let (arow, acol) = (drow.abs(), dcol.abs());
                    prop_assert!(arow.max(acol) as usize <= degree.range());
                    match degree {
                        Degree::Constant => {
                            prop_assert_eq!(dcol, 0);
                            prop_assert_eq!(drow, piece.owner().forward());
                        }
                        Degree::Linear => prop_assert!(arow == 0 || acol == 0),
                        Degree::Quadratic => {
                            prop_assert!(arow == 0 || acol == 0 || arow == acol)
                        }
                    }
                }
            }
        }

        #[test]
        fn prop_other_side_has_no_destinations(
            board in arbitrary_board(),
            row in 0usize..9,
            col in 0usize..8,
        ) {
            let from = Position::new(row, col);
            if let Some(piece) = board.get(from).copied() {
                prop_assert!(legal_destinations(&board, from, piece.owner().opponent()).is_empty());
            }
        }
    }
}
