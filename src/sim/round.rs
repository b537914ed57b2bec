//! Round generation
//!
//! A round is one target plus a shuffled option set. Generation is pure given
//! the RNG, so a seeded session replays exactly.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::piece::{COMBINATIONS, Color, Piece, Shape};
use crate::consts::{MAX_LEVEL, MIN_LEVEL};
use crate::option_count_for_level;

/// One target plus its options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Monotonic round counter; intents and timers carry it to detect staleness
    pub generation: u64,
    pub target: Piece,
    /// Target included exactly once, no two equivalent pieces
    pub options: Vec<Piece>,
    /// Session clock (ms) when the round was created
    pub created_at_ms: u64,
}

impl Round {
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    pub fn option(&self, index: usize) -> Option<&Piece> {
        self.options.get(index)
    }

    /// Position of the correct answer
    pub fn target_index(&self) -> Option<usize> {
        self.options.iter().position(|p| p.matches(&self.target))
    }

    /// Target present once and no duplicate pieces
    pub fn is_well_formed(&self) -> bool {
        let target_copies = self.options.iter().filter(|p| p.matches(&self.target)).count();
        let distinct = self
            .options
            .iter()
            .enumerate()
            .all(|(i, a)| self.options[i + 1..].iter().all(|b| !a.matches(b)));
        target_copies == 1 && distinct
    }
}

fn random_pair<R: Rng + ?Sized>(rng: &mut R) -> (Shape, Color) {
    let shape = Shape::ALL[rng.random_range(0..Shape::ALL.len())];
    let color = Color::ALL[rng.random_range(0..Color::ALL.len())];
    (shape, color)
}

/// Generate a round for `level`
///
/// Draws a target, then rejection-samples distractors until the option set
/// holds `option_count_for_level(level)` distinct pieces, then shuffles.
/// The 24-combination space always exceeds the 6-option cap, so the loop
/// terminates.
pub fn generate_round<R: Rng + ?Sized>(
    rng: &mut R,
    level: u32,
    generation: u64,
    created_at_ms: u64,
) -> Round {
    debug_assert!(
        (MIN_LEVEL..=MAX_LEVEL).contains(&level),
        "level {level} out of range"
    );
    let level = level.clamp(MIN_LEVEL, MAX_LEVEL);
    let count = option_count_for_level(level);
    debug_assert!(count <= COMBINATIONS);

    let (shape, color) = random_pair(rng);
    let target = Piece::target(shape, color);

    let mut options = Vec::with_capacity(count);
    options.push(target.clone());

    while options.len() < count {
        let (shape, color) = random_pair(rng);
        if options.iter().any(|p| p.shape == shape && p.color == color) {
            continue;
        }
        let id = format!("option-{}", options.len());
        options.push(Piece::new(id, shape, color));
    }

    options.shuffle(rng);

    log::debug!(
        "Round {} (level {}): target {}, {} options",
        generation,
        level,
        target,
        options.len()
    );

    let round = Round {
        generation,
        target,
        options,
        created_at_ms,
    };
    debug_assert!(round.is_well_formed());
    round
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::piece::TARGET_ID;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    proptest! {
        #[test]
        fn prop_round_is_well_formed(level in 1u32..=5, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let round = generate_round(&mut rng, level, 1, 0);
            prop_assert_eq!(round.option_count(), (3 + level as usize).min(6));
            prop_assert!(round.is_well_formed());
            prop_assert!(round.target.id == TARGET_ID);
        }

        #[test]
        fn prop_distractor_ids_are_unique_and_not_target(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let round = generate_round(&mut rng, 5, 1, 0);
            let mut ids: Vec<&str> = round.options.iter().map(|p| p.id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), round.option_count());
            prop_assert_eq!(round.options.iter().filter(|p| p.id == TARGET_ID).count(), 1);
        }
    }

    #[test]
    fn test_same_seed_same_round() {
        let mut a = Pcg32::seed_from_u64(42);
        let mut b = Pcg32::seed_from_u64(42);
        for level in 1..=5 {
            assert_eq!(
                generate_round(&mut a, level, 7, 100),
                generate_round(&mut b, level, 7, 100)
            );
        }
    }

    #[test]
    fn test_target_position_roughly_uniform() {
        let mut rng = Pcg32::seed_from_u64(2024);
        let trials = 6000;
        let mut counts = [0usize; 6];
        for _ in 0..trials {
            let round = generate_round(&mut rng, 3, 1, 0);
            counts[round.target_index().unwrap()] += 1;
        }
        // Expect ~1000 per slot
        for (slot, &n) in counts.iter().enumerate() {
            assert!((800..=1200).contains(&n), "slot {slot} got {n}");
        }
    }

    #[test]
    fn test_well_formed_rejects_duplicates() {
        let target = Piece::target(Shape::Square, Color::Blue);
        let round = Round {
            generation: 1,
            target: target.clone(),
            options: vec![
                target.clone(),
                Piece::new("option-1", Shape::Square, Color::Blue),
                Piece::new("option-2", Shape::Circle, Color::Red),
            ],
            created_at_ms: 0,
        };
        assert!(!round.is_well_formed());
    }
}
