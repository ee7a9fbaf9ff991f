//! The game engine consumed by a playing session.

use super::policy::{Policy, PolicyError, build_policy};
use super::typestate::{Finish, GameInProgress, GameResult, GameSetup};
use super::{Board, Cell, Mark, Move, MoveError, PlayerSpec, Seat};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Result of committing a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The game goes on.
    Continue,
    /// The seat completed a line.
    Win(Seat),
    /// Board full, no line.
    Draw,
}

impl Outcome {
    /// True once the game has ended.
    pub fn is_final(self) -> bool {
        !matches!(self, Outcome::Continue)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Continue => write!(f, "continue"),
            Outcome::Win(seat) => write!(f, "{seat} wins"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// Errors reported by a game engine.
#[derive(Debug, Display, Error, From)]
pub enum EngineError {
    /// The engine rejected the move.
    #[display("illegal move: {_0}")]
    Move(MoveError),

    /// An agent move was requested while a human holds the turn.
    #[display("{_0} is not an agent")]
    #[from(ignore)]
    NotAgentTurn(#[error(not(source))] Seat),

    /// The agent found no move on a board that is not finished.
    #[display("agent for {_0} produced no move")]
    #[from(ignore)]
    NoMove(#[error(not(source))] Seat),

    /// A seat's policy could not be built.
    #[display("{_0}")]
    Policy(PolicyError),
}

/// Board state, turn order and agent decisions for one game.
///
/// The session reads the board through this trait and mutates it only via
/// [`GameEngine::apply_move`].
pub trait GameEngine {
    /// Seat holding the turn, or `None` once the game is over.
    fn current_seat(&self) -> Option<Seat>;

    /// The player configured for a seat.
    fn player(&self, seat: Seat) -> &PlayerSpec;

    /// The player holding the turn.
    fn current_player(&self) -> Option<&PlayerSpec> {
        self.current_seat().map(|seat| self.player(seat))
    }

    /// Asks the current seat's policy for a move. Only valid on an agent's turn.
    fn agent_move(&mut self) -> Result<Cell, EngineError>;

    /// Commits a move for the current seat.
    fn apply_move(&mut self, cell: Cell) -> Result<Outcome, EngineError>;

    /// Current board.
    fn board(&self) -> &Board;

    /// Text rendering of the game for display surfaces.
    fn render(&self) -> String;
}

enum Phase {
    Playing(GameInProgress),
    Finished { board: Board, finish: Finish },
}

/// Built-in engine: typestate rules plus one policy per agent seat.
pub struct TicTacToeEngine {
    players: [PlayerSpec; 2],
    policies: [Option<Box<dyn Policy>>; 2],
    phase: Phase,
}

impl TicTacToeEngine {
    /// Creates an engine for the two players with `first` to move.
    ///
    /// `seed` makes agent randomness reproducible.
    #[instrument]
    pub fn new(
        players: [PlayerSpec; 2],
        first: Seat,
        seed: Option<u64>,
    ) -> Result<Self, EngineError> {
        let mut policies: [Option<Box<dyn Policy>>; 2] = [None, None];
        for (slot, player) in players.iter().enumerate() {
            if let PlayerSpec::Agent(strategy) = player {
                let seat_seed = seed.map(|s| s.wrapping_add(slot as u64 * 7919));
                policies[slot] = Some(build_policy(strategy, seat_seed)?);
            }
        }

        info!(player_1 = %players[0], player_2 = %players[1], %first, "Game engine initialized");
        Ok(Self {
            players,
            policies,
            phase: Phase::Playing(GameSetup::new().start(first.mark())),
        })
    }

    /// How the game ended, once it has.
    pub fn finish(&self) -> Option<Finish> {
        match &self.phase {
            Phase::Playing(_) => None,
            Phase::Finished { finish, .. } => Some(*finish),
        }
    }
}

impl GameEngine for TicTacToeEngine {
    fn current_seat(&self) -> Option<Seat> {
        match &self.phase {
            Phase::Playing(game) => Some(Seat::for_mark(game.to_move())),
            Phase::Finished { .. } => None,
        }
    }

    fn player(&self, seat: Seat) -> &PlayerSpec {
        &self.players[seat.slot()]
    }

    #[instrument(skip(self))]
    fn agent_move(&mut self) -> Result<Cell, EngineError> {
        let Phase::Playing(game) = &self.phase else {
            return Err(MoveError::GameOver.into());
        };
        let seat = Seat::for_mark(game.to_move());
        let Some(policy) = self.policies[seat.slot()].as_mut() else {
            warn!(%seat, "Agent move requested for a human seat");
            return Err(EngineError::NotAgentTurn(seat));
        };

        let cell = policy
            .choose(game.board(), game.to_move())
            .ok_or(EngineError::NoMove(seat))?;
        if !game.valid_moves().contains(&cell) {
            warn!(%seat, policy = policy.name(), %cell, "Agent chose an occupied cell");
            return Err(MoveError::CellOccupied(cell).into());
        }
        debug!(%seat, policy = policy.name(), %cell, "Agent chose cell");
        Ok(cell)
    }

    #[instrument(skip(self))]
    fn apply_move(&mut self, cell: Cell) -> Result<Outcome, EngineError> {
        let game = match &self.phase {
            Phase::Playing(game) => game.clone(),
            Phase::Finished { .. } => return Err(MoveError::GameOver.into()),
        };
        let mark: Mark = game.to_move();

        match game.make_move(Move::new(mark, cell))? {
            GameResult::InProgress(next) => {
                self.phase = Phase::Playing(next);
                Ok(Outcome::Continue)
            }
            GameResult::Finished(done) => {
                let finish = done.finish();
                info!(%finish, "Game finished");
                self.phase = Phase::Finished {
                    board: done.board().clone(),
                    finish,
                };
                Ok(match finish {
                    Finish::Winner(mark) => Outcome::Win(Seat::for_mark(mark)),
                    Finish::Draw => Outcome::Draw,
                })
            }
        }
    }

    fn board(&self) -> &Board {
        match &self.phase {
            Phase::Playing(game) => game.board(),
            Phase::Finished { board, .. } => board,
        }
    }

    fn render(&self) -> String {
        let status = match &self.phase {
            Phase::Playing(game) => {
                let seat = Seat::for_mark(game.to_move());
                format!("{seat} ({}) to move", self.players[seat.slot()])
            }
            Phase::Finished { finish, .. } => format!("Game over: {finish}"),
        };
        format!("{}\n{status}", self.board().display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Strategy;

    #[test]
    fn test_first_seat_respected() {
        let engine = TicTacToeEngine::new(
            [PlayerSpec::Human, PlayerSpec::Agent(Strategy::Rules)],
            Seat::PlayerTwo,
            Some(1),
        )
        .unwrap();
        assert_eq!(engine.current_seat(), Some(Seat::PlayerTwo));
        assert_eq!(engine.current_player(), Some(&PlayerSpec::Agent(Strategy::Rules)));
    }

    #[test]
    fn test_agent_move_rejected_for_human_seat() {
        let mut engine = TicTacToeEngine::new(
            [PlayerSpec::Human, PlayerSpec::Agent(Strategy::Best)],
            Seat::PlayerOne,
            None,
        )
        .unwrap();
        assert!(matches!(
            engine.agent_move(),
            Err(EngineError::NotAgentTurn(Seat::PlayerOne))
        ));
    }

    #[test]
    fn test_second_seat_draws_noughts_even_when_first() {
        let mut engine = TicTacToeEngine::new(
            [PlayerSpec::Human, PlayerSpec::Human],
            Seat::PlayerTwo,
            None,
        )
        .unwrap();
        engine.apply_move(Cell::Center).unwrap();
        assert_eq!(engine.board().key(), "....O....");
        assert_eq!(engine.current_seat(), Some(Seat::PlayerOne));
    }

    #[test]
    fn test_occupied_cell_rejected_and_turn_kept() {
        let mut engine = TicTacToeEngine::new(
            [PlayerSpec::Human, PlayerSpec::Human],
            Seat::PlayerOne,
            None,
        )
        .unwrap();
        engine.apply_move(Cell::Center).unwrap();
        assert!(matches!(
            engine.apply_move(Cell::Center),
            Err(EngineError::Move(MoveError::CellOccupied(Cell::Center)))
        ));
        assert_eq!(engine.current_seat(), Some(Seat::PlayerTwo));
    }

    #[test]
    fn test_model_policy_file_missing_fails_construction() {
        let result = TicTacToeEngine::new(
            [PlayerSpec::Agent(Strategy::Model("nope.zip".into())), PlayerSpec::Human],
            Seat::PlayerOne,
            None,
        );
        assert!(matches!(result, Err(EngineError::Policy(_))));
    }
}
