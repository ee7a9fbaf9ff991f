use super::{Policy, RandomPolicy};
use crate::rules::{check_winner, is_full};
use crate::{Board, Cell, Mark, Square};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Probability that [`MostlyBestPolicy`] explores instead of playing perfectly.
pub const MOSTLY_BEST_EXPLORATION: f64 = 0.1;

/// Search order: center, corners, sides. Helps alpha-beta cut early.
const MOVE_ORDER: [Cell; 9] = [
    Cell::Center,
    Cell::TopLeft,
    Cell::TopRight,
    Cell::BottomLeft,
    Cell::BottomRight,
    Cell::TopCenter,
    Cell::MiddleLeft,
    Cell::MiddleRight,
    Cell::BottomCenter,
];

/// Score of a win found at depth 0; deeper wins score less so faster wins are preferred.
const WIN_SCORE: i32 = 100;

/// Perfect play via negamax with alpha-beta pruning over the full game tree.
#[derive(Debug, Default)]
pub struct BestPolicy;

impl BestPolicy {
    /// Creates the policy.
    pub fn new() -> Self {
        Self
    }

    /// Best cell for `mark`, ties broken by [`MOVE_ORDER`].
    pub fn best_move(board: &Board, mark: Mark) -> Option<Cell> {
        let mut scratch = board.clone();
        let mut best: Option<(Cell, i32)> = None;

        for cell in MOVE_ORDER {
            if !scratch.is_empty(cell) {
                continue;
            }
            scratch.set(cell, Square::Occupied(mark));
            let score = -negamax(&mut scratch, mark.opponent(), 1, -i32::MAX, i32::MAX);
            scratch.set(cell, Square::Empty);

            if best.is_none_or(|(_, s)| score > s) {
                best = Some((cell, score));
            }
        }

        debug!(?best, "Negamax search finished");
        best.map(|(cell, _)| cell)
    }
}

/// Score of `board` from the perspective of `to_move`.
fn negamax(board: &mut Board, to_move: Mark, depth: i32, mut alpha: i32, beta: i32) -> i32 {
    // The previous mover is the only one who can have just completed a line.
    if check_winner(board).is_some() {
        return -(WIN_SCORE - depth);
    }
    if is_full(board) {
        return 0;
    }

    let mut best = -i32::MAX;
    for cell in MOVE_ORDER {
        if !board.is_empty(cell) {
            continue;
        }
        board.set(cell, Square::Occupied(to_move));
        let score = -negamax(board, to_move.opponent(), depth + 1, -beta, -alpha);
        board.set(cell, Square::Empty);

        best = best.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }
    best
}

impl Policy for BestPolicy {
    fn choose(&mut self, board: &Board, mark: Mark) -> Option<Cell> {
        Self::best_move(board, mark)
    }

    fn name(&self) -> &str {
        "best"
    }
}

/// Perfect play, except for an occasional uniformly random move.
pub struct MostlyBestPolicy {
    rng: StdRng,
    explore: RandomPolicy,
}

impl MostlyBestPolicy {
    /// Creates the policy; `seed` makes exploration reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            explore: RandomPolicy::new(seed.map(|s| s.wrapping_add(1))),
        }
    }
}

impl Policy for MostlyBestPolicy {
    fn choose(&mut self, board: &Board, mark: Mark) -> Option<Cell> {
        if self.rng.random_bool(MOSTLY_BEST_EXPLORATION) {
            debug!("Exploring with a random move");
            self.explore.choose(board, mark)
        } else {
            BestPolicy::best_move(board, mark)
        }
    }

    fn name(&self) -> &str {
        "mostly_best"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::check_winner;

    fn board_from(key: &str) -> Board {
        let mut board = Board::new();
        for (cell, ch) in Cell::ALL.iter().zip(key.chars()) {
            match ch {
                'X' => board.set(*cell, Square::Occupied(Mark::Cross)),
                'O' => board.set(*cell, Square::Occupied(Mark::Nought)),
                _ => {}
            }
        }
        board
    }

    #[test]
    fn takes_winning_move() {
        // X X . / O O . / . . .  -> X completes the top row
        let board = board_from("XX.OO....");
        assert_eq!(BestPolicy::best_move(&board, Mark::Cross), Some(Cell::TopRight));
    }

    #[test]
    fn blocks_opponent() {
        // O O . / . X . / . . .  -> X must take the top-right corner
        let board = board_from("OO..X....");
        assert_eq!(BestPolicy::best_move(&board, Mark::Cross), Some(Cell::TopRight));
    }

    #[test]
    fn full_board_has_no_move() {
        let board = board_from("XOXOXXOXO");
        assert_eq!(BestPolicy::best_move(&board, Mark::Cross), None);
    }

    #[test]
    fn self_play_is_a_draw() {
        let mut board = Board::new();
        let mut mark = Mark::Cross;
        while let Some(cell) = BestPolicy::best_move(&board, mark) {
            board.set(cell, Square::Occupied(mark));
            if check_winner(&board).is_some() {
                break;
            }
            mark = mark.opponent();
        }
        assert_eq!(check_winner(&board), None);
        assert!(is_full(&board));
    }

    #[test]
    fn mostly_best_picks_empty_cells() {
        let mut policy = MostlyBestPolicy::new(Some(3));
        let board = board_from("XO.OX....");
        for _ in 0..50 {
            let cell = policy.choose(&board, Mark::Nought).unwrap();
            assert!(board.is_empty(cell));
        }
    }
}
