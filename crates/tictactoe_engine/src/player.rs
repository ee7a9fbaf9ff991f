//! Player configuration: seats, player kinds and agent strategies.

use super::Mark;
use derive_more::{Display, Error};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::instrument;

/// One of the two seats at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Seat {
    /// Player one, always crosses.
    #[display("player_1")]
    PlayerOne,
    /// Player two, always noughts.
    #[display("player_2")]
    PlayerTwo,
}

impl Seat {
    /// Returns the other seat.
    pub fn other(self) -> Self {
        match self {
            Seat::PlayerOne => Seat::PlayerTwo,
            Seat::PlayerTwo => Seat::PlayerOne,
        }
    }

    /// The mark this seat draws.
    pub fn mark(self) -> Mark {
        match self {
            Seat::PlayerOne => Mark::Cross,
            Seat::PlayerTwo => Mark::Nought,
        }
    }

    /// The seat that draws the given mark.
    pub fn for_mark(mark: Mark) -> Self {
        match mark {
            Mark::Cross => Seat::PlayerOne,
            Mark::Nought => Seat::PlayerTwo,
        }
    }

    /// Array slot for per-seat storage.
    pub fn slot(self) -> usize {
        match self {
            Seat::PlayerOne => 0,
            Seat::PlayerTwo => 1,
        }
    }
}

/// How an agent picks its moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Perfect play (full game-tree search).
    Best,
    /// Perfect play with occasional random exploration.
    MostlyBest,
    /// Uniformly random legal move.
    Random,
    /// Hand-written heuristics: win, block, center, corners, sides.
    Rules,
    /// Preference table loaded from a policy file.
    Model(PathBuf),
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Best => write!(f, "best"),
            Strategy::MostlyBest => write!(f, "mostly_best"),
            Strategy::Random => write!(f, "random"),
            Strategy::Rules => write!(f, "rules"),
            Strategy::Model(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Who occupies a seat. Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerSpec {
    /// A person choosing cells through an input device.
    Human,
    /// A policy-driven agent.
    Agent(Strategy),
}

impl PlayerSpec {
    /// True for [`PlayerSpec::Human`].
    pub fn is_human(&self) -> bool {
        matches!(self, PlayerSpec::Human)
    }
}

impl std::fmt::Display for PlayerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerSpec::Human => write!(f, "human"),
            PlayerSpec::Agent(strategy) => write!(f, "agent:{strategy}"),
        }
    }
}

/// Model files are recognised by extension.
const MODEL_EXTENSIONS: [&str; 2] = [".zip", ".json"];

impl FromStr for PlayerSpec {
    type Err = SpecError;

    #[instrument]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "human" => Ok(PlayerSpec::Human),
            "best" => Ok(PlayerSpec::Agent(Strategy::Best)),
            "mostly_best" => Ok(PlayerSpec::Agent(Strategy::MostlyBest)),
            "random" => Ok(PlayerSpec::Agent(Strategy::Random)),
            "rules" => Ok(PlayerSpec::Agent(Strategy::Rules)),
            lower if MODEL_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) => {
                Ok(PlayerSpec::Agent(Strategy::Model(PathBuf::from(trimmed))))
            }
            _ => Err(SpecError::new(format!(
                "unrecognized player type '{trimmed}' \
                 (expected human, best, mostly_best, random, rules or a model file)"
            ))),
        }
    }
}

/// Who moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstPlayer {
    /// Player one opens.
    #[default]
    PlayerOne,
    /// Player two opens.
    PlayerTwo,
    /// Coin flip at session start.
    Random,
}

impl FirstPlayer {
    /// Resolves to a concrete seat, flipping a coin for [`FirstPlayer::Random`].
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Seat {
        match self {
            FirstPlayer::PlayerOne => Seat::PlayerOne,
            FirstPlayer::PlayerTwo => Seat::PlayerTwo,
            FirstPlayer::Random => {
                if rng.random_bool(0.5) {
                    Seat::PlayerOne
                } else {
                    Seat::PlayerTwo
                }
            }
        }
    }
}

impl FromStr for FirstPlayer {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "player_1" => Ok(FirstPlayer::PlayerOne),
            "player_2" => Ok(FirstPlayer::PlayerTwo),
            "random" => Ok(FirstPlayer::Random),
            other => Err(SpecError::new(format!(
                "unrecognized first player '{other}' (expected player_1, player_2 or random)"
            ))),
        }
    }
}

/// A player or first-player string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("{}", message)]
pub struct SpecError {
    /// What was wrong.
    pub message: String,
}

impl SpecError {
    /// Creates a new parse error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_parse_player_types() {
        assert_eq!("human".parse::<PlayerSpec>(), Ok(PlayerSpec::Human));
        assert_eq!(
            "mostly_best".parse::<PlayerSpec>(),
            Ok(PlayerSpec::Agent(Strategy::MostlyBest))
        );
        assert_eq!(
            "policies/run7.zip".parse::<PlayerSpec>(),
            Ok(PlayerSpec::Agent(Strategy::Model(PathBuf::from("policies/run7.zip"))))
        );
        assert!("grandmaster".parse::<PlayerSpec>().is_err());
    }

    #[test]
    fn test_parse_first_player() {
        assert_eq!("player_2".parse::<FirstPlayer>(), Ok(FirstPlayer::PlayerTwo));
        assert!("player_3".parse::<FirstPlayer>().is_err());
    }

    #[test]
    fn test_random_first_player_resolves_to_a_seat() {
        let mut rng = StdRng::seed_from_u64(7);
        let seats: Vec<Seat> = (0..32).map(|_| FirstPlayer::Random.resolve(&mut rng)).collect();
        assert!(seats.contains(&Seat::PlayerOne));
        assert!(seats.contains(&Seat::PlayerTwo));
    }

    #[test]
    fn test_seat_marks() {
        assert_eq!(Seat::PlayerOne.mark(), Mark::Cross);
        assert_eq!(Seat::for_mark(Mark::Nought), Seat::PlayerTwo);
        assert_eq!(Seat::PlayerTwo.to_string(), "player_2");
    }
}
