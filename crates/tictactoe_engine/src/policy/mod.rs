//! Agent policies behind one `choose` capability.

mod minimax;
mod random;
mod rules;
mod table;

pub use minimax::{BestPolicy, MostlyBestPolicy};
pub use random::RandomPolicy;
pub use rules::RulesPolicy;
pub use table::{PolicyTable, TablePolicy};

use super::{Board, Cell, Mark, Strategy};
use derive_more::{Display, Error};
use tracing::{info, instrument};

/// Anything that can pick a cell for a mark.
pub trait Policy: Send {
    /// Picks a cell for `mark`, or `None` when the board has no empty cell.
    fn choose(&mut self, board: &Board, mark: Mark) -> Option<Cell>;

    /// Returns the policy's display name.
    fn name(&self) -> &str;
}

/// Builds the policy for a strategy.
///
/// Random components are seeded from `seed` when given, so sessions can be
/// replayed exactly.
#[instrument]
pub fn build_policy(
    strategy: &Strategy,
    seed: Option<u64>,
) -> Result<Box<dyn Policy>, PolicyError> {
    let policy: Box<dyn Policy> = match strategy {
        Strategy::Best => Box::new(BestPolicy::new()),
        Strategy::MostlyBest => Box::new(MostlyBestPolicy::new(seed)),
        Strategy::Random => Box::new(RandomPolicy::new(seed)),
        Strategy::Rules => Box::new(RulesPolicy::new()),
        Strategy::Model(path) => Box::new(TablePolicy::from_file(path)?),
    };
    info!(policy = policy.name(), "Policy ready");
    Ok(policy)
}

/// A policy could not be built.
#[derive(Debug, Clone, Display, Error)]
#[display("Policy error: {}", message)]
pub struct PolicyError {
    /// What went wrong.
    pub message: String,
}

impl PolicyError {
    /// Creates a new policy error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
