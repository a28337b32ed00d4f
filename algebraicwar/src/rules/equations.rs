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

//! Detection of equations formed by a line of pieces.

use std::fmt;

use crate::{
    board::{Board, Piece, Position, Side},
    term::{Degree, Term},
};

/// One of the four lines through a cell.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Axis {
    /// Along a row.
    Horizontal,
    /// Along a column.
    Vertical,
    /// Top-left to bottom-right.
    Diagonal,
    /// Top-right to bottom-left.
    AntiDiagonal,
}

impl Axis {
    /// All axes in scan order.
    pub const ALL: [Axis; 4] = [
        Axis::Horizontal,
        Axis::Vertical,
        Axis::Diagonal,
        Axis::AntiDiagonal,
    ];

    /// Step `(drow, dcol)` in the positive direction of this axis. The negative
    /// direction is the same step negated.
    pub fn step(self) -> (isize, isize) {
        match self {
            Axis::Horizontal => (0, 1),
            Axis::Vertical => (1, 0),
            Axis::Diagonal => (1, 1),
            Axis::AntiDiagonal => (1, -1),
        }
    }
}

/// Coefficients of `a*x^2 + b*x + c`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Polynomial {
    pub a: i32,
    pub b: i32,
    pub c: i32,
}

impl Polynomial {
    pub fn new(a: i32, b: i32, c: i32) -> Self {
        Self { a, b, c }
    }

    /// Sum terms by degree.
    pub fn from_terms<I: IntoIterator<Item = Term>>(terms: I) -> Self {
        let mut poly = Self::default();
        for term in terms {
            poly.add_term(term);
        }
        poly
    }

    /// Add a single term to the matching coefficient.
    pub fn add_term(&mut self, term: Term) {
        let slot = match term.degree() {
            Degree::Quadratic => &mut self.a,
            Degree::Linear => &mut self.b,
            Degree::Constant => &mut self.c,
        };
        *slot += term.coefficient();
    }

    /// `b^2 - 4ac`, computed wide enough that it cannot overflow.
    pub fn discriminant(&self) -> i64 {
        let (a, b, c) = (self.a as i64, self.b as i64, self.c as i64);
        b * b - 4 * a * c
    }

    /// Returns true if the equation `a*x^2 + b*x + c = 0` has real roots.
    pub fn has_real_roots(&self) -> bool {
        self.discriminant() >= 0
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x^2 + {}x + {}", self.a, self.b, self.c)
    }
}

/// Presentation phase of an equation awaiting resolution.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Phase {
    /// The equation is being shown; the board is untouched.
    Identify,
    /// The verdict is being shown; removals apply when this phase completes.
    Resolve,
}

/// An equation formed along one axis by a move.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EquationEvent {
    axis: Axis,
    mover: Side,
    chain: Vec<Position>,
    removals: Vec<Position>,
    solvable: bool,
    polynomial: Polynomial,
    phase: Phase,
}

impl EquationEvent {
    /// Axis along which the chain was found.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Side that made the move which formed this equation.
    pub fn mover(&self) -> Side {
        self.mover
    }

    /// Every cell of the chain, from the negative end of the axis to the positive end.
    pub fn chain(&self) -> &[Position] {
        &self.chain
    }

    /// Cells whose pieces are destroyed when this equation resolves. All of them belong
    /// to [`loser`][Self::loser].
    pub fn removals(&self) -> &[Position] {
        &self.removals
    }

    /// Returns true if the equation has real roots.
    pub fn is_solvable(&self) -> bool {
        self.solvable
    }

    /// Returns true if the equation turns against the side that formed it.
    pub fn is_backfire(&self) -> bool {
        !self.solvable
    }

    pub fn polynomial(&self) -> Polynomial {
        self.polynomial
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Side whose pieces in the chain are removed: the mover's opponent if the equation
    /// is solvable, otherwise the mover.
    pub fn loser(&self) -> Side {
        if self.solvable {
            self.mover.opponent()
        } else {
            self.mover
        }
    }
}

/// Find every equation formed through `origin`, where a piece of `active` just landed.
///
/// Each axis yields at most one event. All events are computed against the board as
/// given, so one event never sees removals from another. Chains shorter than two,
/// chains of a single side, and chains without a quadratic term do not form equations.
pub fn detect(board: &Board, origin: Position, active: Side) -> Vec<EquationEvent> {
    if board.get(origin).is_none() {
        return Vec::new();
    }
    Axis::ALL
        .iter()
        .filter_map(|&axis| detect_axis(board, origin, active, axis))
        .collect()
}

fn detect_axis(board: &Board, origin: Position, active: Side, axis: Axis) -> Option<EquationEvent> {
    let (drow, dcol) = axis.step();
    let mut chain = contiguous_run(board, origin, -drow, -dcol);
    chain.reverse();
    chain.push(origin);
    chain.extend(contiguous_run(board, origin, drow, dcol));
    if chain.len() < 2 {
        return None;
    }

    let pieces: Vec<Piece> = chain
        .iter()
        .filter_map(|&pos| board.get(pos).copied())
        .collect();
    let owner = pieces[0].owner();
    if pieces.iter().all(|piece| piece.owner() == owner) {
        return None;
    }
    let polynomial = Polynomial::from_terms(pieces.iter().map(Piece::term));
    if polynomial.a == 0 {
        return None;
    }

    let solvable = polynomial.has_real_roots();
    let loser = if solvable { active.opponent() } else { active };
    let removals = chain
        .iter()
        .zip(pieces.iter())
        .filter(|(_, piece)| piece.owner() == loser)
        .map(|(&pos, _)| pos)
        .collect();
    log::debug!(
        "{:?} equation {} = 0 through {} (discriminant {}), {} loses",
        axis,
        polynomial,
        origin,
        polynomial.discriminant(),
        loser
    );
    Some(EquationEvent {
        axis,
        mover: active,
        chain,
        removals,
        solvable,
        polynomial,
        phase: Phase::Identify,
    })
}

/// Occupied cells next to `origin` in one direction, nearest first, stopping at the
/// first empty cell or the edge of the board.
fn contiguous_run(board: &Board, origin: Position, drow: isize, dcol: isize) -> Vec<Position> {
    let dim = board.dimensions();
    let mut run = Vec::new();
    let mut cell = origin;
    while let Some(next) = dim.offset(cell, drow, dcol) {
        if board.is_empty(next) {
            break;
        }
        run.push(next);
        cell = next;
    }
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Dimensions;

    fn board_with(pieces: &[(usize, usize, Side, &str)]) -> Board {
        let mut board = Board::empty(Dimensions::default());
        for &(row, col, side, text) in pieces {
            board
                .set(
                    Position::new(row, col),
                    Piece::new(side, text.parse().unwrap()),
                )
                .unwrap();
        }
        board
    }

    #[test]
    fn test_solvable_chain_removes_opponent() {
        // Second just moved 3x into (4,4), between two of First's pieces.
        let board = board_with(&[
            (4, 3, Side::First, "-2x^2"),
            (4, 4, Side::Second, "3x"),
            (4, 5, Side::First, "-1"),
        ]);
        let events = detect(&board, Position::new(4, 4), Side::Second);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.axis(), Axis::Horizontal);
        assert_eq!(event.polynomial(), Polynomial::new(-2, 3, -1));
        assert_eq!(event.polynomial().discriminant(), 1);
        assert!(event.is_solvable());
        assert_eq!(event.loser(), Side::First);
        assert_eq!(
            event.chain(),
            &[
                Position::new(4, 3),
                Position::new(4, 4),
                Position::new(4, 5)
            ]
        );
        let first_terms = [Position::new(4, 3), Position::new(4, 5)];
        assert_eq!(event.removals(), &first_terms);
        assert_eq!(event.phase(), Phase::Identify);
    }

    #[test]
    fn test_same_chain_moved_into_by_other_side() {
        // First moved -1 into place instead: the solvable equation removes Second's 3x.
        let board = board_with(&[
            (4, 3, Side::First, "-2x^2"),
            (4, 4, Side::Second, "3x"),
            (4, 5, Side::First, "-1"),
        ]);
        let events = detect(&board, Position::new(4, 5), Side::First);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].removals(), &[Position::new(4, 4)]);
        assert_eq!(events[0].mover(), Side::First);
    }

    #[test]
    fn test_unsolvable_chain_backfires() {
        // x^2 + 1 has no real roots.
        let board = board_with(&[(2, 2, Side::First, "x^2"), (3, 2, Side::Second, "1")]);
        let events = detect(&board, Position::new(3, 2), Side::Second);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_backfire());
        assert_eq!(events[0].axis(), Axis::Vertical);
        assert_eq!(events[0].polynomial().discriminant(), -4);
        assert_eq!(events[0].loser(), Side::Second);
        assert_eq!(events[0].removals(), &[Position::new(3, 2)]);
    }

    #[test]
    fn test_single_side_chain_is_ignored() {
        let board = board_with(&[
            (4, 3, Side::First, "-2x^2"),
            (4, 4, Side::First, "3x"),
            (4, 5, Side::First, "-1"),
        ]);
        assert!(detect(&board, Position::new(4, 4), Side::First).is_empty());
    }

    #[test]
    fn test_lone_piece_is_ignored() {
        let board = board_with(&[(4, 4, Side::First, "x^2")]);
        assert!(detect(&board, Position::new(4, 4), Side::First).is_empty());
        assert!(detect(&board, Position::new(0, 0), Side::First).is_empty());
    }

    #[test]
    fn test_chain_without_quadratic_is_ignored() {
        let board = board_with(&[
            (4, 3, Side::First, "2x"),
            (4, 4, Side::Second, "3"),
            (4, 5, Side::First, "-x"),
        ]);
        assert!(detect(&board, Position::new(4, 4), Side::Second).is_empty());
    }

    #[test]
    fn test_cancelling_quadratics_are_ignored() {
        let board = board_with(&[(4, 3, Side::First, "2x^2"), (4, 4, Side::Second, "-2x^2")]);
        assert!(detect(&board, Position::new(4, 4), Side::Second).is_empty());
    }

    #[test]
    fn test_chain_stops_at_gap_and_edge() {
        let board = board_with(&[
            (0, 0, Side::First, "x^2"),
            (1, 1, Side::Second, "-x"),
            (3, 3, Side::First, "4"),
        ]);
        let events = detect(&board, Position::new(1, 1), Side::Second);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].axis(), Axis::Diagonal);
        let diagonal = [Position::new(0, 0), Position::new(1, 1)];
        assert_eq!(events[0].chain(), &diagonal);
    }

    #[test]
    fn test_multiple_axes_share_one_snapshot() {
        // The mover's piece at (4,4) sits in two equations; both remove First's pieces
        // independently and both list the same origin.
        let board = board_with(&[
            (4, 4, Side::Second, "-x^2"),
            (4, 5, Side::First, "4"),
            (5, 4, Side::First, "2x"),
            (3, 5, Side::First, "x"),
        ]);
        let events = detect(&board, Position::new(4, 4), Side::Second);
        let axes: Vec<_> = events.iter().map(EquationEvent::axis).collect();
        let expected = vec![Axis::Horizontal, Axis::Vertical, Axis::AntiDiagonal];
        assert_eq!(axes, expected);
        assert!(events.iter().all(EquationEvent::is_solvable));
        assert!(events
            .iter()
            .all(|event| event.chain().contains(&Position::new(4, 4))));
        for event in &events {
            for pos in event.removals() {
                assert!(event.chain().contains(pos));
                assert_eq!(board.get(*pos).unwrap().owner(), Side::First);
            }
        }
    }
}
