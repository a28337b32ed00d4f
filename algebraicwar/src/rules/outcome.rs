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

//! End-of-game evaluation.

use std::fmt;

use enumflags2::BitFlags;

use crate::{
    board::{Board, Side},
    term::Degree,
};

/// Whether the game continues, and if not, how it ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Status {
    Playing,
    Win(Side),
    Draw,
}

/// Why a game ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EndReason {
    /// The given side has no pieces left.
    Eliminated(Side),
    /// No quadratic term remains, so no equation can ever form again.
    NoQuadratics,
    /// Only quadratic and constant terms of a single sign remain, so every equation
    /// that could form has a negative discriminant.
    NoRealSolutions,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EndReason::Eliminated(side) => write!(f, "all {} pieces eliminated", side),
            EndReason::NoQuadratics => {
                f.pad("no quadratic terms left, equations can no longer form")
            }
            EndReason::NoRealSolutions => {
                f.pad("only same-sign terms left, real solutions are impossible")
            }
        }
    }
}

/// Result of evaluating a board.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GameResult {
    status: Status,
    reason: Option<EndReason>,
}

impl GameResult {
    /// The game goes on.
    pub fn playing() -> Self {
        Self {
            status: Status::Playing,
            reason: None,
        }
    }

    fn over(status: Status, reason: EndReason) -> Self {
        Self {
            status,
            reason: Some(reason),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Why the game ended. `None` while it is still being played.
    pub fn reason(&self) -> Option<EndReason> {
        self.reason
    }

    /// Returns true if the game has ended.
    pub fn is_over(&self) -> bool {
        self.status != Status::Playing
    }

    /// The winning side, if any.
    pub fn winner(&self) -> Option<Side> {
        match self.status {
            Status::Win(side) => Some(side),
            _ => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.status, self.reason) {
            (Status::Win(side), Some(reason)) => write!(f, "{} side wins: {}", side, reason),
            (Status::Draw, Some(reason)) => write!(f, "draw: {}", reason),
            _ => f.pad("in progress"),
        }
    }
}

/// Sign of a nonzero coefficient.
#[derive(BitFlags, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
enum Sign {
    Negative = 0b01,
    Positive = 0b10,
}

impl Sign {
    fn of(value: i32) -> Self {
        if value < 0 {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }
}

/// Summary of which degrees and signs remain on the board.
#[derive(Debug, Default)]
struct Census {
    degrees: BitFlags<Degree>,
    /// Signs seen among quadratic and constant coefficients.
    even_signs: BitFlags<Sign>,
}

impl Census {
    fn of(board: &Board) -> Self {
        let mut census = Self::default();
        for (_, piece) in board.iter() {
            let term = piece.term();
            census.degrees |= term.degree();
            if term.degree() != Degree::Linear {
                census.even_signs |= Sign::of(term.coefficient());
            }
        }
        census
    }
}

/// Decide whether the game on `board` is over.
///
/// A side with no pieces loses. Without any quadratic term the game is drawn. Without
/// linear terms, the only equations left are `a*x^2 + c = 0`, whose discriminant
/// `-4ac` is negative whenever all quadratic and constant coefficients share a sign; the
/// game is then drawn as well.
pub fn evaluate(board: &Board) -> GameResult {
    for &side in Side::ALL.iter() {
        if board.count(side) == 0 {
            return GameResult::over(Status::Win(side.opponent()), EndReason::Eliminated(side));
        }
    }

    let census = Census::of(board);
    if !census.degrees.contains(Degree::Quadratic) {
        return GameResult::over(Status::Draw, EndReason::NoQuadratics);
    }
    if !census.degrees.contains(Degree::Linear)
        && !census.even_signs.contains(Sign::Negative | Sign::Positive)
    {
        return GameResult::over(Status::Draw, EndReason::NoRealSolutions);
    }
    GameResult::playing()
}
