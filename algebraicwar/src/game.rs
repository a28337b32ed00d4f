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

//! Turn sequencing for a single game.
//!
//! [`Game`] owns the board and walks it through each turn: a side selects and moves a
//! piece, any equations the move forms are shown and resolved one at a time, and then
//! either the game ends or the other side takes its turn. Each side is driven by a
//! [`Controller`] that decides where its moves come from; the game itself never blocks
//! or sleeps, so callers pace the resolution phases by calling [`Game::advance`].

use std::collections::VecDeque;

use rand::Rng;

use crate::{
    ai::Planner,
    board::{Board, Dimensions, Move, Position, Side},
    rules::{self, check_move, evaluate, legal_destinations, EquationEvent, GameResult, Phase},
};

pub use self::errors::{CannotMoveReason, MoveError};

mod errors;

/// Who supplies the moves for one side.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Controller {
    /// A player at this terminal, moving through [`Game::select`] or [`Game::try_move`].
    Local,
    /// The built-in planner, moving through [`Game::play_computer_turn`].
    Computer,
    /// A peer over a channel, moving through [`Game::apply_remote_move`].
    Remote,
}

/// Where the game stands between calls.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TurnState {
    /// The active side may move.
    AwaitingSelection,
    /// An equation is being shown in the given phase.
    Resolving(Phase),
    /// The game has ended.
    GameOver(GameResult),
}

/// Result of a move that the game accepted.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum MoveOutcome {
    /// No equation formed; play passed to `next`.
    Quiet { next: Side },
    /// These equations formed and are queued for resolution, in order.
    Equations(Vec<EquationEvent>),
}

/// Result of selecting a cell.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SelectOutcome {
    /// A piece of the active side is now selected.
    Selected {
        pos: Position,
        destinations: Vec<Position>,
    },
    /// The previous selection was dropped.
    Cleared,
    /// The cell was a destination of the selected piece, which moved there.
    Moved(MoveOutcome),
    /// Nothing happened.
    Ignored,
}

/// Result of completing a resolution phase.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Advance {
    /// The current equation moved from showing the polynomial to showing its verdict.
    Revealed,
    /// The current equation was applied and removed from the queue.
    Resolved {
        event: EquationEvent,
        removed: usize,
    },
}

/// A selected piece along with the cells it may move to.
#[derive(Debug, Clone)]
struct Selection {
    pos: Position,
    destinations: Vec<Position>,
}

/// A game in progress.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    /// Side whose turn it is. Unchanged while equations resolve.
    active: Side,
    /// Controllers indexed by [`Side::index`].
    controllers: [Controller; 2],
    selection: Option<Selection>,
    /// Equations from the last move that still have to be resolved, front first.
    queue: VecDeque<EquationEvent>,
    /// Set once the game has ended.
    result: Option<GameResult>,
    planner: Planner,
}

impl Game {
    /// Start a new game on the default board.
    pub fn new(first: Controller, second: Controller) -> Self {
        Self::with_dimensions(Dimensions::default(), first, second)
    }

    /// Start a new game on a board of the given size.
    pub fn with_dimensions(dim: Dimensions, first: Controller, second: Controller) -> Self {
        Self::from_position(Board::new_game(dim), Side::OPENING, first, second)
    }

    /// Continue play from an arbitrary position with `active` to move. A position that
    /// is already decided yields a game that is already over.
    pub fn from_position(
        board: Board,
        active: Side,
        first: Controller,
        second: Controller,
    ) -> Self {
        let result = evaluate(&board);
        Self {
            board,
            active,
            controllers: [first, second],
            selection: None,
            queue: VecDeque::new(),
            result: if result.is_over() { Some(result) } else { None },
            planner: Planner::default(),
        }
    }

    /// Replace the planner used for computer-controlled sides.
    pub fn with_planner(mut self, planner: Planner) -> Self {
        self.planner = planner;
        self
    }

    /// Reset to the opening position on a board of the same size, keeping the
    /// controllers.
    pub fn restart(&mut self) {
        self.board = Board::new_game(*self.board.dimensions());
        self.active = Side::OPENING;
        self.selection = None;
        self.queue.clear();
        self.result = None;
        log::info!("game restarted");
    }

    /// Get the current state of the turn.
    pub fn state(&self) -> TurnState {
        if let Some(result) = self.result {
            TurnState::GameOver(result)
        } else if let Some(event) = self.queue.front() {
            TurnState::Resolving(event.phase())
        } else {
            TurnState::AwaitingSelection
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side whose turn it is.
    pub fn active(&self) -> Side {
        self.active
    }

    /// Get the controller of the given side.
    pub fn controller(&self, side: Side) -> Controller {
        self.controllers[side.index()]
    }

    /// Equation currently being resolved.
    pub fn current_event(&self) -> Option<&EquationEvent> {
        self.queue.front()
    }

    /// Equations still to be resolved, starting with the current one.
    pub fn pending_events(&self) -> impl Iterator<Item = &EquationEvent> {
        self.queue.iter()
    }

    /// Position of the selected piece, if any.
    pub fn selection(&self) -> Option<Position> {
        self.selection.as_ref().map(|sel| sel.pos)
    }

    /// Cells the selected piece may move to. Empty without a selection.
    pub fn destinations(&self) -> &[Position] {
        match &self.selection {
            Some(sel) => &sel.destinations,
            None => &[],
        }
    }

    /// How the game ended, once it has.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Returns true if it is the computer's turn to move.
    pub fn awaiting_computer(&self) -> bool {
        self.state() == TurnState::AwaitingSelection
            && self.controller(self.active) == Controller::Computer
    }

    /// Select a cell on behalf of the active local player.
    ///
    /// Selecting one of the active side's pieces selects it. Selecting the selected
    /// piece again, or any cell that is neither a destination nor another own piece,
    /// clears the selection. Selecting a destination moves the selected piece there.
    /// Selections are ignored while equations resolve, after the game ends, and when the
    /// active side is not [`Controller::Local`].
    pub fn select(&mut self, pos: Position) -> Result<SelectOutcome, MoveError> {
        if self.state() != TurnState::AwaitingSelection
            || self.controller(self.active) != Controller::Local
        {
            return Ok(SelectOutcome::Ignored);
        }
        let previous = self.selection.take();
        match previous {
            Some(sel) if sel.pos == pos => Ok(SelectOutcome::Cleared),
            Some(sel) if sel.destinations.contains(&pos) => {
                let outcome = self.commit(Move::new(sel.pos, pos))?;
                Ok(SelectOutcome::Moved(outcome))
            }
            previous => match self.board.get(pos) {
                Some(piece) if piece.owner() == self.active => {
                    let destinations = legal_destinations(&self.board, pos, self.active);
                    self.selection = Some(Selection {
                        pos,
                        destinations: destinations.clone(),
                    });
                    Ok(SelectOutcome::Selected { pos, destinations })
                }
                _ if previous.is_some() => Ok(SelectOutcome::Cleared),
                _ => Ok(SelectOutcome::Ignored),
            },
        }
    }

    /// Play a move for the active side after checking it against the movement rules.
    pub fn try_move(&mut self, mv: Move) -> Result<MoveOutcome, MoveError> {
        self.ensure_awaiting(Some(mv))?;
        check_move(&self.board, mv.from, mv.to, self.active)
            .map_err(|reason| MoveError::new(CannotMoveReason::Illegal(reason), Some(mv)))?;
        self.commit(mv)
    }

    /// Play a move received from a remote peer for the active side.
    ///
    /// The peer is trusted: movement rules are not checked. Moves that cannot be carried
    /// out at all, because a position is off the board or the origin is empty, are still
    /// refused.
    pub fn apply_remote_move(&mut self, mv: Move) -> Result<MoveOutcome, MoveError> {
        self.ensure_awaiting(Some(mv))?;
        self.commit(mv).map_err(|err| {
            log::warn!("rejected remote move {}: {}", mv, err.reason());
            err
        })
    }

    /// Let the planner move for the active side. If it has no legal move, the turn
    /// passes to the other side and `None` is returned.
    pub fn play_computer_turn<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<Move>, MoveError> {
        self.ensure_awaiting(None)?;
        if self.controller(self.active) != Controller::Computer {
            return Err(MoveError::new(CannotMoveReason::NotComputerTurn, None));
        }
        match self.planner.select_move(&self.board, self.active, rng) {
            Some(mv) => {
                self.commit(mv)?;
                Ok(Some(mv))
            }
            None => {
                log::info!("{} cannot move and passes", self.active);
                self.flip();
                Ok(None)
            }
        }
    }

    /// Hand the turn to the other side without moving. Returns false if the turn could
    /// not pass because equations are resolving or the game is over.
    pub fn pass_turn(&mut self) -> bool {
        if self.state() == TurnState::AwaitingSelection {
            self.flip();
            true
        } else {
            false
        }
    }

    /// Complete the current resolution phase. Returns `None` when nothing is resolving.
    ///
    /// The first call for an equation only reveals its verdict. The second applies its
    /// removals and drops it from the queue. After the last equation the board is
    /// evaluated and either the game ends or the other side takes its turn.
    pub fn advance(&mut self) -> Option<Advance> {
        let phase = self.queue.front()?.phase();
        match phase {
            Phase::Identify => {
                if let Some(event) = self.queue.front_mut() {
                    event.set_phase(Phase::Resolve);
                }
                Some(Advance::Revealed)
            }
            Phase::Resolve => {
                let event = self.queue.pop_front()?;
                let removed = rules::resolve_event(&mut self.board, &event);
                log::debug!(
                    "{} = 0 removed {} {} piece(s)",
                    event.polynomial(),
                    removed,
                    event.loser()
                );
                if self.queue.is_empty() {
                    self.end_turn();
                }
                Some(Advance::Resolved { event, removed })
            }
        }
    }

    /// Refuse to move unless the active side may move.
    fn ensure_awaiting(&self, mv: Option<Move>) -> Result<(), MoveError> {
        match self.state() {
            TurnState::AwaitingSelection => Ok(()),
            TurnState::Resolving(_) => Err(MoveError::new(CannotMoveReason::ResolutionPending, mv)),
            TurnState::GameOver(_) => Err(MoveError::new(CannotMoveReason::GameOver, mv)),
        }
    }

    /// Carry out a move for the active side and queue the equations it forms.
    fn commit(&mut self, mv: Move) -> Result<MoveOutcome, MoveError> {
        // Equations are credited to the side whose turn it is.
        let events = rules::commit_move_as(&mut self.board, mv, self.active)
            .map_err(|err| MoveError::new(CannotMoveReason::Commit(err.reason()), Some(mv)))?;
        self.selection = None;
        if events.is_empty() {
            self.flip();
            Ok(MoveOutcome::Quiet { next: self.active })
        } else {
            self.queue.extend(events.iter().cloned());
            Ok(MoveOutcome::Equations(events))
        }
    }

    /// Check for the end of the game once all equations have resolved.
    fn end_turn(&mut self) {
        let result = evaluate(&self.board);
        if result.is_over() {
            log::info!("game over, {}", result);
            self.selection = None;
            self.result = Some(result);
        } else {
            self.flip();
        }
    }

    fn flip(&mut self) {
        self.selection = None;
        self.active = self.active.opponent();
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        board::{CannotRelocateReason, Piece},
        rules::{EndReason, IllegalMove, Status},
        term::Degree,
    };

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

    fn mv(from: (usize, usize), to: (usize, usize)) -> Move {
        Move::new(from.into(), to.into())
    }

    /// Second's 3x can drop between two First pieces to form -2x^2 + 3x - 1.
    fn capture_position(extra: &[(usize, usize, Side, &str)]) -> Game {
        let mut pieces = vec![
            (4, 3, Side::First, "-2x^2"),
            (3, 4, Side::Second, "3x"),
            (4, 5, Side::First, "-1"),
        ];
        pieces.extend_from_slice(extra);
        Game::from_position(
            board_with(&pieces),
            Side::Second,
            Controller::Local,
            Controller::Local,
        )
    }

    #[test]
    fn test_new_game() {
        let game = Game::new(Controller::Local, Controller::Computer);
        assert_eq!(game.active(), Side::Second);
        assert_eq!(game.state(), TurnState::AwaitingSelection);
        assert_eq!(game.controller(Side::First), Controller::Local);
        assert_eq!(game.controller(Side::Second), Controller::Computer);
        assert!(game.awaiting_computer());
        assert_eq!(game.board().count(Side::First), 24);
        assert_eq!(game.result(), None);
    }

    #[test]
    fn test_selection_transitions() {
        let mut game = Game::new(Controller::Local, Controller::Local);
        let own = Position::new(6, 3);
        let other = Position::new(6, 4);

        assert_eq!(
            game.select(own),
            Ok(SelectOutcome::Selected {
                pos: own,
                destinations: vec![Position::new(5, 3)],
            })
        );
        assert_eq!(game.selection(), Some(own));
        assert_eq!(game.destinations(), &[Position::new(5, 3)]);

        assert_eq!(game.select(own), Ok(SelectOutcome::Cleared));
        assert_eq!(game.selection(), None);
        assert!(game.destinations().is_empty());

        game.select(own).unwrap();
        assert!(matches!(
            game.select(other),
            Ok(SelectOutcome::Selected { pos, .. }) if pos == other
        ));

        // An opponent's piece is not a destination and cannot be selected.
        assert_eq!(game.select(Position::new(2, 3)), Ok(SelectOutcome::Cleared));
        assert_eq!(game.select(Position::new(2, 3)), Ok(SelectOutcome::Ignored));
        assert_eq!(game.select(Position::new(4, 4)), Ok(SelectOutcome::Ignored));
    }

    #[test]
    fn test_select_destination_moves() {
        let mut game = Game::new(Controller::Local, Controller::Local);
        game.select(Position::new(6, 3)).unwrap();
        assert_eq!(
            game.select(Position::new(5, 3)),
            Ok(SelectOutcome::Moved(MoveOutcome::Quiet { next: Side::First }))
        );
        assert_eq!(game.active(), Side::First);
        assert_eq!(game.selection(), None);
        assert!(game.board().is_empty(Position::new(6, 3)));
        assert_eq!(
            game.board().get(Position::new(5, 3)).unwrap().owner(),
            Side::Second
        );
    }

    #[test]
    fn test_select_ignored_for_non_local_side() {
        let mut game = Game::new(Controller::Local, Controller::Remote);
        assert_eq!(game.select(Position::new(6, 3)), Ok(SelectOutcome::Ignored));
        assert_eq!(game.selection(), None);
    }

    #[test]
    fn test_illegal_move_is_refused() {
        let mut game = Game::new(Controller::Local, Controller::Local);
        let before = game.board().clone();
        let err = game.try_move(mv((8, 0), (5, 0))).unwrap_err();
        assert_eq!(
            err.reason(),
            CannotMoveReason::Illegal(IllegalMove::Blocked(Position::new(7, 0)))
        );
        assert_eq!(err.mv(), Some(mv((8, 0), (5, 0))));
        let err = game.try_move(mv((2, 0), (3, 0))).unwrap_err();
        let not_owned = CannotMoveReason::Illegal(IllegalMove::NotOwned);
        assert_eq!(err.reason(), not_owned);
        assert_eq!(game.board(), &before);
        assert_eq!(game.active(), Side::Second);
    }

    #[test]
    fn test_equation_resolution_ends_game() {
        let mut game = capture_position(&[]);
        let outcome = game.try_move(mv((3, 4), (4, 4))).unwrap();
        let events = match outcome {
            MoveOutcome::Equations(events) => events,
            other => panic!("expected equations, got {:?}", other),
        };
        assert_eq!(events.len(), 1);
        assert_eq!(game.state(), TurnState::Resolving(Phase::Identify));
        assert_eq!(game.current_event(), Some(&events[0]));
        assert_eq!(game.pending_events().count(), 1);

        let err = game.try_move(mv((4, 4), (3, 4))).unwrap_err();
        assert_eq!(err.reason(), CannotMoveReason::ResolutionPending);
        assert!(!game.pass_turn());

        let before = game.board().clone();
        assert_eq!(game.advance(), Some(Advance::Revealed));
        assert_eq!(game.state(), TurnState::Resolving(Phase::Resolve));
        assert_eq!(game.board(), &before);

        match game.advance() {
            Some(Advance::Resolved { event, removed }) => {
                assert_eq!(removed, 2);
                assert!(event.is_solvable());
            }
            other => panic!("expected resolution, got {:?}", other),
        }
        let result = game.result().unwrap();
        assert_eq!(result.status(), Status::Win(Side::Second));
        assert_eq!(result.reason(), Some(EndReason::Eliminated(Side::First)));
        assert_eq!(game.state(), TurnState::GameOver(result));
        assert_eq!(game.advance(), None);

        let err = game.try_move(mv((4, 4), (3, 4))).unwrap_err();
        assert_eq!(err.reason(), CannotMoveReason::GameOver);
    }

    #[test]
    fn test_turn_passes_after_resolution() {
        let mut game = capture_position(&[(0, 0, Side::First, "x^2"), (8, 7, Side::Second, "-4")]);
        game.try_move(mv((3, 4), (4, 4))).unwrap();
        assert_eq!(game.active(), Side::Second);
        while game.advance().is_some() {}
        assert_eq!(game.state(), TurnState::AwaitingSelection);
        assert_eq!(game.active(), Side::First);
        assert_eq!(game.board().count(Side::First), 1);
    }

    #[test]
    fn test_remote_move_is_trusted() {
        let mut game = Game::new(Controller::Local, Controller::Remote);
        // A quadratic jumping over its own linear term would never pass validation.
        let jump = mv((8, 0), (5, 0));
        assert_eq!(
            game.apply_remote_move(jump),
            Ok(MoveOutcome::Quiet { next: Side::First })
        );
        let landed = game.board().get(Position::new(5, 0)).unwrap();
        assert_eq!(landed.term().degree(), Degree::Quadratic);

        let err = game.apply_remote_move(mv((4, 4), (4, 5))).unwrap_err();
        let empty = CannotMoveReason::Commit(CannotRelocateReason::EmptyOrigin);
        assert_eq!(err.reason(), empty);
        let err = game.apply_remote_move(mv((2, 0), (9, 0))).unwrap_err();
        let off_board = CannotMoveReason::Commit(CannotRelocateReason::OutOfBounds);
        assert_eq!(err.reason(), off_board);
        assert_eq!(game.active(), Side::First);
    }

    #[test]
    fn test_remote_move_of_opposing_piece_credits_active_side() {
        let board = board_with(&[
            (3, 3, Side::First, "x^2"),
            (4, 4, Side::Second, "3x"),
            (0, 0, Side::First, "2"),
        ]);
        let mut game = Game::from_position(
            board.clone(),
            Side::Second,
            Controller::Local,
            Controller::Remote,
        );
        let stray = mv((3, 3), (4, 3));
        let events = match game.apply_remote_move(stray).unwrap() {
            MoveOutcome::Equations(events) => events,
            other => panic!("expected an equation, got {:?}", other),
        };

        let mut expected = board;
        let direct = rules::commit_move_as(&mut expected, stray, Side::Second);
        assert_eq!(Ok(events.clone()), direct);
        assert_eq!(events[0].mover(), Side::Second);
        assert_eq!(events[0].removals(), &[Position::new(4, 3)]);
        assert_eq!(game.board(), &expected);
    }

    #[test]
    fn test_computer_turn() {
        let mut game = Game::new(Controller::Local, Controller::Computer);
        let mut rng = StdRng::seed_from_u64(42);
        let played = game.play_computer_turn(&mut rng).unwrap().unwrap();
        assert_eq!(played.from.row, 6);
        assert_eq!(game.active(), Side::First);
        assert!(!game.awaiting_computer());

        let err = game.play_computer_turn(&mut rng).unwrap_err();
        assert_eq!(err.reason(), CannotMoveReason::NotComputerTurn);
        assert_eq!(err.mv(), None);
    }

    #[test]
    fn test_computer_passes_when_stuck() {
        // Second's only piece is a constant on the far edge.
        let board = board_with(&[(0, 3, Side::Second, "2"), (8, 0, Side::First, "-x^2")]);
        let mut game =
            Game::from_position(board, Side::Second, Controller::Local, Controller::Computer);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(game.play_computer_turn(&mut rng), Ok(None));
        assert_eq!(game.active(), Side::First);
    }

    #[test]
    fn test_pass_turn_and_restart() {
        let mut game = Game::new(Controller::Local, Controller::Local);
        game.select(Position::new(6, 0)).unwrap();
        assert!(game.pass_turn());
        assert_eq!(game.active(), Side::First);
        assert_eq!(game.selection(), None);

        game.try_move(mv((2, 0), (3, 0))).unwrap();
        game.restart();
        assert_eq!(game.active(), Side::Second);
        assert_eq!(game.board(), &Board::new_game(Dimensions::default()));
        assert_eq!(game.state(), TurnState::AwaitingSelection);
    }

    #[test]
    fn test_decided_position_is_over() {
        let board = board_with(&[(0, 0, Side::First, "x")]);
        let game = Game::from_position(board, Side::Second, Controller::Local, Controller::Local);
        assert_eq!(
            game.result().map(|result| result.winner()),
            Some(Some(Side::First))
        );
    }
}
