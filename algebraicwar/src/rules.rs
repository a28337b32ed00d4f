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

//! Game rules: which moves are legal, which equations a move forms, and when the game
//! is over.
//!
//! Everything in this module is a pure function of the board, apart from
//! [`commit_move`] and [`resolve_event`], which apply a move and an equation's removals
//! respectively.

use crate::board::{Board, Move, Piece, RelocateError, Side};

pub use self::{
    equations::{detect, Axis, EquationEvent, Phase, Polynomial},
    moves::{check_move, is_legal, legal_destinations, legal_moves, IllegalMove},
    outcome::{evaluate, EndReason, GameResult, Status},
};

mod equations;
mod moves;
mod outcome;

/// Move a piece without checking the movement rules and return the equations the move
/// forms. The owner of the moved piece is treated as the mover.
///
/// Equations are returned in axis order and are not applied; call [`resolve_event`]
/// for each of them.
pub fn commit_move(board: &mut Board, mv: Move) -> Result<Vec<EquationEvent>, RelocateError> {
    let piece = relocate(board, mv)?;
    Ok(detect(board, mv.to, piece.owner()))
}

/// Like [`commit_move`], but equations are credited to `mover` whatever the owner of the
/// moved piece.
pub fn commit_move_as(
    board: &mut Board,
    mv: Move,
    mover: Side,
) -> Result<Vec<EquationEvent>, RelocateError> {
    relocate(board, mv)?;
    Ok(detect(board, mv.to, mover))
}

fn relocate(board: &mut Board, mv: Move) -> Result<Piece, RelocateError> {
    let (piece, displaced) = board.relocate(mv.from, mv.to)?;
    if let Some(displaced) = displaced {
        log::warn!(
            "move {} replaced a {} piece at {}",
            mv,
            displaced.owner(),
            mv.to
        );
    }
    log::debug!("{} moved {} ({})", piece.owner(), piece.term(), mv);
    Ok(piece)
}

/// Remove the pieces an equation destroys. Cells already emptied, for example by an
/// earlier equation from the same move, are skipped. Returns the number of pieces
/// actually removed.
pub fn resolve_event(board: &mut Board, event: &EquationEvent) -> usize {
    event
        .removals()
        .iter()
        .filter(|&&pos| board.remove(pos).is_some())
        .count()
}
