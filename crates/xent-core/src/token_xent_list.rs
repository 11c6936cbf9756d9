//! `TokenXentList`: a token-aligned list of `(token, cross-entropy)` pairs,
//! the scored value produced by a judge and combined by `xed`/arithmetic
//! expressions. Mirrors `xent.common.token_xent_list`.

use std::fmt;
use std::ops::{Add, Mul, Neg};

use serde::{Deserialize, Serialize};

use crate::error::XentError;

/// A single `(token text, cross-entropy nats)` pair.
pub type XentPair = (String, f64);

/// Per spec.md §6, round-trips through JSON as a tagged object so readers of
/// result files can distinguish it from a plain string or number.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireForm {
    #[serde(rename = "__TokenXentList__")]
    marker: bool,
    pairs: Vec<(String, f64)>,
    scale: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenXentList {
    pairs: Vec<XentPair>,
    /// Multiplier applied to every pair's cross-entropy when computing
    /// `total_xent`. Kept separate from the pairs themselves so that scalar
    /// multiplication (`Neg`, reward scaling) is O(1) instead of rewriting
    /// every pair.
    scale: f64,
}

impl TokenXentList {
    pub fn new(pairs: Vec<XentPair>) -> Self {
        Self { pairs, scale: 1.0 }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, f64)> {
        self.pairs.iter().map(|(tok, x)| (tok.as_str(), x * self.scale))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sum of cross-entropy across every pair, with `scale` applied.
    pub fn total_xent(&self) -> f64 {
        self.scale * self.pairs.iter().map(|(_, x)| x).sum::<f64>()
    }

    fn tokens(&self) -> Vec<&str> {
        self.pairs.iter().map(|(tok, _)| tok.as_str()).collect()
    }

    /// Bake `scale` into the stored pairs, resetting `scale` to 1.0. Used
    /// before concatenation so that the additivity of `total_xent` across a
    /// `+` is preserved regardless of either operand's prior scaling.
    fn rescaled_pairs(&self) -> Vec<XentPair> {
        if self.scale == 1.0 {
            self.pairs.clone()
        } else {
            self.pairs.iter().map(|(tok, x)| (tok.clone(), x * self.scale)).collect()
        }
    }

    /// Strictly combine two lists element-wise, succeeding only when both
    /// sides agree on the underlying token sequence. This is the primitive
    /// behind spec.md §8's "combining lists that disagree on the underlying
    /// token sequence fails with a type-kind error" — plain `+` always
    /// succeeds (see the `Add` impl) because some games deliberately combine
    /// xent over two differently-tokenized texts (e.g. the dex game's
    /// `-xent(s1|x) + xent(s2|x)`), so the strict check is opt-in.
    pub fn combine_matching(&self, other: &TokenXentList, op: impl Fn(f64, f64) -> f64) -> Result<TokenXentList, XentError> {
        if self.tokens() != other.tokens() {
            return Err(XentError::Type(format!(
                "cannot combine token xent lists with differing token sequences ({} vs {} tokens)",
                self.len(),
                other.len()
            )));
        }
        let pairs = self
            .pairs
            .iter()
            .zip(other.pairs.iter())
            .map(|((tok, a), (_, b))| (tok.clone(), op(a * self.scale, b * other.scale)))
            .collect();
        Ok(TokenXentList::new(pairs))
    }
}

impl Add for TokenXentList {
    type Output = TokenXentList;

    fn add(self, rhs: TokenXentList) -> TokenXentList {
        let mut pairs = self.rescaled_pairs();
        pairs.extend(rhs.rescaled_pairs());
        TokenXentList::new(pairs)
    }
}

impl Add for &TokenXentList {
    type Output = TokenXentList;

    fn add(self, rhs: &TokenXentList) -> TokenXentList {
        let mut pairs = self.rescaled_pairs();
        pairs.extend(rhs.rescaled_pairs());
        TokenXentList::new(pairs)
    }
}

impl Mul<f64> for TokenXentList {
    type Output = TokenXentList;

    fn mul(self, rhs: f64) -> TokenXentList {
        TokenXentList {
            pairs: self.pairs,
            scale: self.scale * rhs,
        }
    }
}

impl Neg for TokenXentList {
    type Output = TokenXentList;

    fn neg(self) -> TokenXentList {
        self * -1.0
    }
}

impl fmt::Display for TokenXentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenXentList(total={:.4}, pairs=[", self.total_xent())?;
        for (i, (tok, x)) in self.pairs().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{tok:?}:{x:.4}")?;
        }
        write!(f, "])")
    }
}

impl Serialize for TokenXentList {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireForm {
            marker: true,
            pairs: self.pairs.clone(),
            scale: self.scale,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TokenXentList {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireForm::deserialize(deserializer)?;
        Ok(TokenXentList {
            pairs: wire.pairs,
            scale: wire.scale,
        })
    }
}
