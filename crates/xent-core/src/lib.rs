//! Core data model for the Xent benchmark: the scored value types
//! (`XString`, `XList`, `TokenXentList`), the per-round register file,
//! control-flow flags, the event stream, configuration types, and the
//! error taxonomy shared by every other crate in the workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod flag;
pub mod register;
pub mod token_xent_list;
pub mod xlist;
pub mod xstring;

pub use config::{
    BenchmarkResult, CondensedXentBenchmarkConfig, ExecutableGameMap, ExpandedXentBenchmarkConfig, GameConfig,
    GameMapConfig, GameMapResults, GameMapRoundResult, PlayerConfig, PlayerName, XentMetadata,
};
pub use error::{ApiError, ApiErrorKind, XentError};
pub use events::{RegisterValueSnapshot, TokenUsage, XentEvent};
pub use flag::XFlag;
pub use register::{RegisterFile, RegisterValue};
pub use token_xent_list::TokenXentList;
pub use xlist::XList;
pub use xstring::XString;

/// Test-only builders kept out of the normal API surface. Enabled for this
/// crate's own tests and for downstream crates via the `test-helpers`
/// feature, matching how `breakpoint-core::test_helpers` is used across the
/// workspace.
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::config::{GameConfig, PlayerConfig, PlayerName};
    use crate::constants::SIMPLE_GAME_CODE;

    pub fn simple_game_config() -> GameConfig {
        GameConfig {
            name: "simple".to_string(),
            code: SIMPLE_GAME_CODE.to_string(),
            num_rounds: 1,
            presentation_function: "single".to_string(),
        }
    }

    pub fn mock_player(name: PlayerName) -> PlayerConfig {
        PlayerConfig {
            name,
            player_type: "mock".to_string(),
            options: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_game_config_parses_as_valid_code() {
        let cfg = test_helpers::simple_game_config();
        assert!(cfg.code.contains("reward(xed(s | x))"));
    }
}
