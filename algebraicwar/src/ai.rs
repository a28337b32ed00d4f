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

//! Heuristic move selection for a computer-controlled side.
//!
//! The planner looks one move ahead. Every legal move is played on a scratch copy of the
//! board, the equations it would form are scored, and one of the best-scoring moves is
//! picked at random. Moves that form no equation are scored by how far they advance and
//! whether they land in the middle columns, plus a random fraction so that quiet
//! positions do not always produce the same move.
//!
//! The random source is always supplied by the caller. Seeding it (for example with
//! [`rand::rngs::StdRng::seed_from_u64`][rand::SeedableRng::seed_from_u64]) makes the
//! planner fully reproducible.

use rand::{seq::SliceRandom, Rng};

use crate::{
    board::{Board, Move, Side},
    rules::{detect, legal_moves, EquationEvent},
};

/// Weights used to score candidate moves.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Scoring {
    /// Added for each equation that destroys opposing pieces.
    pub capture_bonus: f64,
    /// Added per opposing piece destroyed.
    pub per_removal: f64,
    /// Subtracted for each equation that backfires on the mover.
    pub backfire_penalty: f64,
    /// Multiplies the number of rows a quiet move advances.
    pub advance_weight: f64,
    /// Added when a quiet move lands in the middle columns.
    pub center_bonus: f64,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            capture_bonus: 100.0,
            per_removal: 10.0,
            backfire_penalty: 1000.0,
            advance_weight: 2.0,
            center_bonus: 1.0,
        }
    }
}

/// One-ply move planner.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Planner {
    scoring: Scoring,
}

impl Planner {
    /// Construct a planner with the default [`Scoring`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a planner with custom weights.
    pub fn with_scoring(scoring: Scoring) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> &Scoring {
        &self.scoring
    }

    /// Pick a move for `side`. Returns `None` if `side` has no legal move, in which
    /// case the turn should pass.
    ///
    /// `board` is only read; simulations run on a private copy.
    pub fn select_move<R: Rng + ?Sized>(
        &self,
        board: &Board,
        side: Side,
        rng: &mut R,
    ) -> Option<Move> {
        let moves = legal_moves(board, side);
        if moves.is_empty() {
            log::debug!("{} has no legal moves", side);
            return None;
        }

        let mut scratch = board.clone();
        let mut best = f64::NEG_INFINITY;
        let mut candidates = Vec::new();
        for mv in moves {
            let events = simulate(&mut scratch, side, mv);
            let score = self.score(&events, side, mv, board, rng);
            log::trace!("{} scores {:.3} ({} equations)", mv, score, events.len());
            if score > best {
                best = score;
                candidates.clear();
                candidates.push(mv);
            } else if score == best {
                candidates.push(mv);
            }
        }
        let choice = candidates.choose(rng).copied();
        if let Some(mv) = choice {
            log::debug!(
                "{} plays {} (score {:.3}, {} tied)",
                side,
                mv,
                best,
                candidates.len()
            );
        }
        choice
    }

    /// Score a single candidate move for `side`. The move is assumed to be legal.
    pub fn score_move<R: Rng + ?Sized>(
        &self,
        board: &Board,
        side: Side,
        mv: Move,
        rng: &mut R,
    ) -> f64 {
        let mut scratch = board.clone();
        let events = simulate(&mut scratch, side, mv);
        self.score(&events, side, mv, board, rng)
    }

    fn score<R: Rng + ?Sized>(
        &self,
        events: &[EquationEvent],
        side: Side,
        mv: Move,
        board: &Board,
        rng: &mut R,
    ) -> f64 {
        if events.is_empty() {
            let (drow, _) = mv.delta();
            let progress = (drow * side.forward()) as f64;
            let mut score = self.scoring.advance_weight * progress;
            if board.dimensions().center_band().contains(&mv.to.col) {
                score += self.scoring.center_bonus;
            }
            score + rng.gen::<f64>()
        } else {
            events
                .iter()
                .map(|event| {
                    if event.is_solvable() {
                        self.scoring.capture_bonus
                            + self.scoring.per_removal * event.removals().len() as f64
                    } else {
                        -self.scoring.backfire_penalty
                    }
                })
                .sum()
        }
    }
}

/// Play `mv` on `scratch`, collect the equations it forms, and take it back.
fn simulate(scratch: &mut Board, side: Side, mv: Move) -> Vec<EquationEvent> {
    match scratch.relocate(mv.from, mv.to) {
        Ok(_) => {
            let events = detect(scratch, mv.to, side);
            // Legal destinations are empty, so nothing was displaced and the reverse
            // move restores the board exactly.
            let reverted = scratch.relocate(mv.to, mv.from);
            debug_assert!(
                matches!(reverted, Ok((_, None))),
                "reverting {} did not restore the board",
                mv
            );
            events
        }
        Err(err) => {
            log::warn!("skipping unplayable candidate: {}", err);
            Vec::new()
        }
    }
}

/// Pick a move for `side` with the default weights. See [`Planner::select_move`].
pub fn select_move<R: Rng + ?Sized>(board: &Board, side: Side, rng: &mut R) -> Option<Move> {
    Planner::new().select_move(board, side, rng)
}
