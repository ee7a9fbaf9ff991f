use super::Policy;
use crate::{Board, Cell, Mark};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// An agent that selects uniformly at random from the empty cells.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    /// Creates the policy, seeded when `seed` is given.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl Policy for RandomPolicy {
    fn choose(&mut self, board: &Board, _mark: Mark) -> Option<Cell> {
        let cells = board.empty_cells();
        if cells.is_empty() {
            return None;
        }
        Some(cells[self.rng.random_range(0..cells.len())])
    }

    fn name(&self) -> &str {
        "random"
    }
}
