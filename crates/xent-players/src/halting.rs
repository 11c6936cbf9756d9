//! A player that always concedes: used to drive games that need a
//! participant able to halt the round on demand (see spec.md §4.E).

use std::collections::BTreeMap;

use xent_core::{RegisterValue, XentError, XentEvent};

use crate::player::{MoveResult, Player, HALT_SENTINEL};

pub struct HaltingPlayer;

#[async_trait::async_trait]
impl Player for HaltingPlayer {
    async fn make_move(&self, _var_name: char, _snapshot: BTreeMap<char, RegisterValue>, _max_tokens: u32) -> Result<MoveResult, XentError> {
        Ok(MoveResult::new(HALT_SENTINEL))
    }

    fn post(&self, _event: XentEvent) {}

    fn player_type(&self) -> &'static str {
        "halting"
    }
}
