//! Deterministic producers of `story()` text, grounded on the corpus text
//! generators from the original implementation's `text_generation` package:
//! a generator walks a fixed corpus either sequentially or by shuffled
//! draw, seeded so that a benchmark run is fully reproducible.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// A source of `story()` text. Implementations must be deterministic given
/// their configured seed: the same seed and call sequence always produce
/// the same text, which is what makes benchmark resume idempotent.
pub trait TextGenerator: Send + Sync {
    /// Produce the next piece of text, truncated to `max_length` characters
    /// if given.
    fn generate_text(&self, max_length: Option<usize>) -> String;
}

/// How a `CorpusTextGenerator` walks its backing corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusMode {
    /// Walk the corpus in order, wrapping back to the start.
    Sequential,
    /// Draw a uniformly random entry from the corpus on each call, using
    /// the generator's seeded RNG.
    Shuffle,
}

/// A flat, in-memory text corpus drawn from either end-to-end in order or
/// by seeded random choice. Mirrors `CommunityArchiveTextGenerator`.
pub struct CorpusTextGenerator {
    corpus: Vec<String>,
    mode: CorpusMode,
    state: Mutex<CorpusState>,
}

struct CorpusState {
    next_index: usize,
    rng: StdRng,
}

impl CorpusTextGenerator {
    pub fn new(corpus: Vec<String>, mode: CorpusMode, seed: u64) -> Self {
        Self {
            corpus,
            mode,
            state: Mutex::new(CorpusState {
                next_index: 0,
                rng: StdRng::seed_from_u64(seed),
            }),
        }
    }

    fn next_entry(&self) -> String {
        assert!(!self.corpus.is_empty(), "corpus must contain at least one entry");
        let mut state = self.state.lock().expect("corpus generator mutex poisoned");
        match self.mode {
            CorpusMode::Sequential => {
                let entry = self.corpus[state.next_index % self.corpus.len()].clone();
                state.next_index += 1;
                entry
            },
            CorpusMode::Shuffle => {
                let idx = state.rng.random_range(0..self.corpus.len());
                self.corpus[idx].clone()
            },
        }
    }
}

impl TextGenerator for CorpusTextGenerator {
    fn generate_text(&self, max_length: Option<usize>) -> String {
        let text = self.next_entry();
        match max_length {
            Some(n) => text.chars().take(n).collect(),
            None => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec!["one".into(), "two".into(), "three".into()]
    }

    #[test]
    fn sequential_mode_wraps_around() {
        let r#gen = CorpusTextGenerator::new(corpus(), CorpusMode::Sequential, 0);
        let draws: Vec<_> = (0..4).map(|_| r#gen.generate_text(None)).collect();
        assert_eq!(draws, vec!["one", "two", "three", "one"]);
    }

    #[test]
    fn shuffle_mode_is_deterministic_given_the_same_seed() {
        let a = CorpusTextGenerator::new(corpus(), CorpusMode::Shuffle, 42);
        let b = CorpusTextGenerator::new(corpus(), CorpusMode::Shuffle, 42);
        let draws_a: Vec<_> = (0..10).map(|_| a.generate_text(None)).collect();
        let draws_b: Vec<_> = (0..10).map(|_| b.generate_text(None)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn max_length_truncates_by_character_count() {
        let r#gen = CorpusTextGenerator::new(vec!["abcdef".into()], CorpusMode::Sequential, 0);
        assert_eq!(r#gen.generate_text(Some(3)), "abc");
    }

    proptest::proptest! {
        #[test]
        fn same_seed_and_mode_always_draw_the_same_sequence(seed: u64, draws in 1usize..20) {
            let a = CorpusTextGenerator::new(corpus(), CorpusMode::Shuffle, seed);
            let b = CorpusTextGenerator::new(corpus(), CorpusMode::Shuffle, seed);
            let seq_a: Vec<_> = (0..draws).map(|_| a.generate_text(None)).collect();
            let seq_b: Vec<_> = (0..draws).map(|_| b.generate_text(None)).collect();
            proptest::prop_assert_eq!(seq_a, seq_b);
        }
    }
}
