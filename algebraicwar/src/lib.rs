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

//! Rule engine for Algebraic War, a two-player board game in which every piece carries a
//! monomial term.
//!
//! Each side starts with a camp of quadratic, linear and constant terms. When a move
//! lines up a contiguous chain of pieces from both sides that contains a quadratic term,
//! the chain forms the equation `a*x^2 + b*x + c = 0`. If the equation has real roots,
//! the opponent's pieces in the chain are destroyed; otherwise the equation backfires and
//! the mover loses its own pieces in the chain.
//!
//! The crate is split into the board model ([`board`]), the pure rules ([`rules`]), a
//! one-ply computer opponent ([`ai`]), the turn controller ([`game`]), and a line-based
//! message channel for networked play ([`net`]).
//!
//! ```
//! use algebraicwar::{commit_move, legal_destinations, new_game, resolve_event, Position, Side};
//!
//! let mut board = new_game();
//! let from = Position::new(6, 3);
//! let dests = legal_destinations(&board, from, Side::Second);
//! assert_eq!(dests, vec![Position::new(5, 3)]);
//!
//! let events = commit_move(&mut board, algebraicwar::Move::new(from, dests[0])).unwrap();
//! for event in &events {
//!     resolve_event(&mut board, event);
//! }
//! ```

pub mod ai;
pub mod board;
pub mod game;
pub mod net;
pub mod rules;
pub mod term;

pub use crate::{
    ai::{select_move, Planner, Scoring},
    board::{new_game, Board, Dimensions, Move, Piece, Position, Side},
    game::{Controller, Game, TurnState},
    rules::{
        commit_move, evaluate, legal_destinations, resolve_event, EquationEvent, GameResult,
        Status,
    },
    term::{Degree, Term},
};

/// Alias for [`select_move`].
pub use crate::ai::select_move as ai_select_move;
/// Alias for [`evaluate`].
pub use crate::rules::evaluate as evaluate_end;
