//! The player contract shared by every implementation: spec.md §4.E.

use std::collections::BTreeMap;

use xent_core::{RegisterValue, TokenUsage, XentError, XentEvent};

/// The outcome of a single `make_move` call.
#[derive(Debug, Clone)]
pub struct MoveResult {
    /// The textual move, already post-processed (envelope-stripped) by the
    /// calling player implementation.
    pub response: String,
    pub token_usage: TokenUsage,
    /// Every prompt sent to the underlying provider, in order. A single
    /// entry for most player types; may hold more for players that retry.
    pub prompts: Vec<String>,
    /// The provider's raw response text, before envelope stripping.
    pub full_response: String,
}

impl MoveResult {
    pub fn new(response: impl Into<String>) -> Self {
        let response = response.into();
        Self {
            full_response: response.clone(),
            response,
            token_usage: TokenUsage::default(),
            prompts: Vec::new(),
        }
    }
}

/// A sentinel response interpreted by the runtime as a request to halt the
/// round cleanly. Used by the `halting` player variant.
pub const HALT_SENTINEL: &str = "__xent_halt__";

#[async_trait::async_trait]
pub trait Player: Send + Sync {
    /// Request a move for register `var_name`, given the snapshot of
    /// registers this player is allowed to see. `max_tokens` bounds the
    /// provider's response length where the underlying implementation
    /// supports it.
    async fn make_move(
        &self,
        var_name: char,
        register_snapshot: BTreeMap<char, RegisterValue>,
        max_tokens: u32,
    ) -> Result<MoveResult, XentError>;

    /// Deliver an event from the round's history to this player's local
    /// view. Called for every event this player is entitled to see, in
    /// causal order, before the next `make_move` resolves for it.
    fn post(&self, event: XentEvent);

    /// The `player_type` string this implementation was registered under.
    fn player_type(&self) -> &'static str;
}
