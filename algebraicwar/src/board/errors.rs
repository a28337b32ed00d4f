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

//! Errors used by the [`Board`][crate::board::Board].

use thiserror::Error;

use crate::board::{Dimensions, Position};

/// Error returned when a position lies outside the board.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("position {pos} is outside the {dim} board")]
pub struct OutOfBounds {
    /// The offending position.
    pos: Position,
    /// Dimensions of the board that was accessed.
    dim: Dimensions,
}

impl OutOfBounds {
    /// Create an [`OutOfBounds`] error for the given position and board size.
    pub(super) fn new(pos: Position, dim: Dimensions) -> Self {
        Self { pos, dim }
    }

    /// The position that was out of bounds.
    pub fn pos(&self) -> Position {
        self.pos
    }

    /// The dimensions of the board.
    pub fn dimensions(&self) -> Dimensions {
        self.dim
    }
}

/// Reason why a piece could not be relocated.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum CannotRelocateReason {
    /// One of the two positions was off the board.
    #[error("position is out of bounds")]
    OutOfBounds,
    /// There was no piece to move.
    #[error("no piece at the origin")]
    EmptyOrigin,
}

/// Error returned when moving a piece between two cells failed.
#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
#[error("could not move piece {from} -> {to}: {reason}")]
pub struct RelocateError {
    reason: CannotRelocateReason,
    from: Position,
    to: Position,
}

impl RelocateError {
    pub(super) fn new(reason: CannotRelocateReason, from: Position, to: Position) -> Self {
        Self { reason, from, to }
    }

    /// Get the reason the move was aborted.
    pub fn reason(&self) -> CannotRelocateReason {
        self.reason
    }

    /// The origin of the attempted move.
    pub fn from(&self) -> Position {
        self.from
    }

    /// The destination of the attempted move.
    pub fn to(&self) -> Position {
        self.to
    }
}
