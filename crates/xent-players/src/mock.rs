//! A deterministic test double: returns responses from a fixed list (or a
//! single fixed string) in order, reporting zero token usage unless
//! `with_usage` configures otherwise.

use std::collections::BTreeMap;
use std::sync::Mutex;

use xent_core::{RegisterValue, TokenUsage, XentError, XentEvent};

use crate::player::{MoveResult, Player};

pub struct MockPlayer {
    responses: Vec<String>,
    next: Mutex<usize>,
    usage: TokenUsage,
}

impl MockPlayer {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: if responses.is_empty() { vec!["zzzzz".to_string()] } else { responses },
            next: Mutex::new(0),
            usage: TokenUsage::default(),
        }
    }

    pub fn fixed(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Reports `usage` on every `make_move` call instead of the default
    /// zero, for tests that assert on token-usage aggregation.
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }
}

#[async_trait::async_trait]
impl Player for MockPlayer {
    async fn make_move(&self, _var_name: char, _snapshot: BTreeMap<char, RegisterValue>, _max_tokens: u32) -> Result<MoveResult, XentError> {
        let mut next = self.next.lock().expect("mock player mutex poisoned");
        let response = self.responses[*next % self.responses.len()].clone();
        *next += 1;
        let mut result = MoveResult::new(response);
        result.token_usage = self.usage;
        Ok(result)
    }

    fn post(&self, _event: XentEvent) {}

    fn player_type(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cycles_through_configured_responses() {
        let player = MockPlayer::new(vec!["a".into(), "b".into()]);
        let snap = BTreeMap::new();
        assert_eq!(player.make_move('x', snap.clone(), 10).await.unwrap().response, "a");
        assert_eq!(player.make_move('x', snap.clone(), 10).await.unwrap().response, "b");
        assert_eq!(player.make_move('x', snap, 10).await.unwrap().response, "a");
    }

    #[tokio::test]
    async fn default_response_is_zzzzz() {
        let player = MockPlayer::new(vec![]);
        let result = player.make_move('x', BTreeMap::new(), 10).await.unwrap();
        assert_eq!(result.response, "zzzzz");
        assert_eq!(result.token_usage.total(), 0);
    }
}
