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

use thiserror::Error;

use crate::{
    board::{CannotRelocateReason, Move},
    rules::IllegalMove,
};

/// Reason why the [`Game`][crate::game::Game] refused a move.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum CannotMoveReason {
    /// The game has already ended.
    #[error("the game is over")]
    GameOver,

    /// Equations from the previous move are still being resolved.
    #[error("equations are still being resolved")]
    ResolutionPending,

    /// The active side is not controlled by the computer.
    #[error("the active side is not computer-controlled")]
    NotComputerTurn,

    /// The move breaks the movement rules.
    #[error(transparent)]
    Illegal(IllegalMove),

    /// The move could not be carried out on the board at all.
    #[error(transparent)]
    Commit(CannotRelocateReason),
}

/// Error returned when the game could not play a move.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("move rejected: {reason}")]
pub struct MoveError {
    /// Reason why the move was refused.
    reason: CannotMoveReason,

    /// The move, if one was chosen before it was refused.
    mv: Option<Move>,
}

impl MoveError {
    /// Construct a move error with the given reason for the specified move.
    pub(super) fn new(reason: CannotMoveReason, mv: Option<Move>) -> Self {
        Self { reason, mv }
    }

    /// Get the reason the move was refused.
    pub fn reason(&self) -> CannotMoveReason {
        self.reason
    }

    /// Get the refused move. `None` when the game refused to plan a move at all.
    pub fn mv(&self) -> Option<Move> {
        self.mv
    }
}
