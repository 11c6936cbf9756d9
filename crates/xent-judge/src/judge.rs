//! The `Judge` trait (spec.md §4.B) and a deterministic reference
//! implementation used for the built-in tests and for any deployment that
//! does not wire up a real model-backed judge.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use xent_core::TokenXentList;

use crate::tokenizer::{detokenize, tokenize};

/// Deterministic scoring of text under a fixed language model and
/// tokenizer. Implementations must be pure functions of their inputs: the
/// same `(context, target)` pair always produces the same `TokenXentList`.
pub trait Judge: Send + Sync {
    /// The human-readable name of the underlying model, used in stored
    /// result metadata.
    fn model_name(&self) -> &str;

    /// Returns the string reconstituted from the first `n` tokens of
    /// `text`, preserving whitespace. Returns `text` unchanged once `n`
    /// reaches or exceeds its token count, and returns empty text unchanged.
    fn first_n_tokens(&self, text: &str, n: usize) -> String;

    /// Split `text` into this judge's token vocabulary, losslessly.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// The inverse of `tokenize`.
    fn detokenize(&self, tokens: &[String]) -> String;

    /// Negative log-probability of each token of `target`, conditioned on
    /// `context` and all preceding target tokens. `xent(c | "")` is always
    /// empty; every pair's cross-entropy is non-negative.
    fn xent(&self, context: &str, target: &str) -> TokenXentList;
}

/// A dependency-free, deterministic stand-in for a real model-backed judge.
/// Cross-entropy values are derived from a hash of `(context, preceding
/// target tokens, token)` rather than an actual language model, which keeps
/// the reference implementation reproducible and network-free while still
/// satisfying every invariant in spec.md §8 (non-negativity, determinism,
/// emptiness on an empty target). A real deployment swaps this out for a
/// `Judge` backed by an actual model endpoint without touching call sites.
pub struct DeterministicJudge {
    model_name: String,
}

impl DeterministicJudge {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
        }
    }
}

impl Default for DeterministicJudge {
    fn default() -> Self {
        Self::new("deterministic-reference")
    }
}

fn hash_xent(seed: &str, token: &str) -> f64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    token.hash(&mut hasher);
    let h = hasher.finish();
    // Map to a small positive range; never exactly zero so that shared
    // tokens between context and target still register some cost.
    0.01 + (h % 1_000) as f64 / 100.0
}

impl Judge for DeterministicJudge {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn first_n_tokens(&self, text: &str, n: usize) -> String {
        tokenize(text).into_iter().take(n).collect()
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
    }

    fn detokenize(&self, tokens: &[String]) -> String {
        detokenize(tokens)
    }

    fn xent(&self, context: &str, target: &str) -> TokenXentList {
        if target.is_empty() {
            return TokenXentList::empty();
        }
        let target_tokens = tokenize(target);
        let mut pairs = Vec::with_capacity(target_tokens.len());
        let mut seed = context.to_string();
        for token in target_tokens {
            let xent = hash_xent(&seed, &token);
            seed.push_str(&token);
            pairs.push((token, xent));
        }
        TokenXentList::new(pairs)
    }
}
