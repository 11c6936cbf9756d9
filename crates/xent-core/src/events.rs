//! The event stream emitted while a round executes: the append-only history
//! that players' local views and stored interaction logs are built from.
//! Mirrors `xent.common.events`.

use std::collections::BTreeMap;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::config::PlayerName;
use crate::register::RegisterValue;
use crate::token_xent_list::TokenXentList;

/// Token accounting for a single model call, used to report usage in stored
/// interaction logs and to enforce provider-side budgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
        }
    }
}

/// One entry in a round's event history. Every event that touches a player
/// is addressed to `player`; `reveal` and `reward` events are broadcast and
/// recorded once with the acting player attached for provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum XentEvent {
    RoundStarted {
        round_index: u32,
        /// The best reward any scored player had reached in this unit
        /// before this round started, or `None` for the unit's first round.
        best_score: Option<f64>,
    },
    /// A player was asked to produce text: the prompt is the presentation
    /// built from the player's local view plus the requested token budget.
    ElicitRequest {
        line: usize,
        player: PlayerName,
        register: char,
        prompt: String,
        max_tokens: u32,
        public_registers: BTreeMap<char, RegisterValueSnapshot>,
    },
    /// The player's answer to an `ElicitRequest`, plus token accounting.
    ElicitResponse {
        player: PlayerName,
        register: char,
        text: String,
        usage: TokenUsage,
    },
    /// A register's value was broadcast to every player regardless of the
    /// register's own public flag.
    Reveal {
        register: char,
        value: RegisterValueSnapshot,
    },
    /// A reward was assigned to `player` for the current round. Does not
    /// itself end the round; a game may issue several before completing.
    Reward {
        player: PlayerName,
        xent: TokenXentList,
    },
    /// An `ensure` instruction's condition evaluated to false; the round is
    /// failed but the benchmark continues with the next unit. `outcomes`
    /// holds each condition's result in source order, so a player or
    /// presentation function can tell which one broke.
    FailedEnsure {
        line: usize,
        outcomes: Vec<bool>,
        beacon: String,
    },
    RoundFinished {
        round_index: u32,
        halted: bool,
        rewards: BTreeMap<PlayerName, f64>,
        /// The best reward any scored player has reached in this unit so
        /// far, including this round, or `None` if no player has been
        /// rewarded yet.
        best_score: Option<f64>,
    },
}

/// A JSON-serializable snapshot of a register's value for embedding in a
/// `Reveal` event, independent of whether the live value is a string or list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegisterValueSnapshot {
    Str(crate::xstring::XString),
    List(crate::xlist::XList),
}

impl From<&RegisterValue> for RegisterValueSnapshot {
    fn from(v: &RegisterValue) -> Self {
        match v {
            RegisterValue::Str(s) => Self::Str(s.clone()),
            RegisterValue::List(l) => Self::List(l.clone()),
        }
    }
}
