//! Tic-tac-toe game engine.
//!
//! Pure game logic for a two-seat tic-tac-toe match:
//!
//! - **Types**: [`Board`], [`Mark`], [`Square`], [`Cell`]
//! - **Rules**: win and draw detection ([`rules`])
//! - **Typestate game**: [`GameSetup`] → [`GameInProgress`] → [`GameFinished`]
//! - **Players**: [`PlayerSpec`], [`Strategy`], [`FirstPlayer`], [`Seat`]
//! - **Policies**: agent strategies behind the [`Policy`] trait
//! - **Engine**: the [`GameEngine`] trait and the built-in [`TicTacToeEngine`]
//!
//! # Example
//!
//! ```
//! use tictactoe_engine::{GameEngine, Outcome, PlayerSpec, Seat, Strategy, TicTacToeEngine};
//!
//! let mut engine = TicTacToeEngine::new(
//!     [PlayerSpec::Agent(Strategy::Best), PlayerSpec::Agent(Strategy::Rules)],
//!     Seat::PlayerOne,
//!     Some(42),
//! )?;
//! let cell = engine.agent_move()?;
//! assert_eq!(engine.apply_move(cell)?, Outcome::Continue);
//! # Ok::<(), tictactoe_engine::EngineError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod cell;
mod contracts;
mod engine;
mod player;
mod policy;
pub mod rules;
mod typestate;
mod types;

pub use action::{Move, MoveError};
pub use cell::Cell;
pub use contracts::{CellIsEmpty, LegalMove, MarksTurn};
pub use engine::{EngineError, GameEngine, Outcome, TicTacToeEngine};
pub use player::{FirstPlayer, PlayerSpec, Seat, SpecError, Strategy};
pub use policy::{
    BestPolicy, MostlyBestPolicy, Policy, PolicyError, PolicyTable, RandomPolicy, RulesPolicy,
    TablePolicy, build_policy,
};
pub use typestate::{Finish, GameFinished, GameInProgress, GameResult, GameSetup};
pub use types::{Board, Mark, Square};
