//! Benchmark configuration types: the JSON surface a user writes (§5 "condensed"
//! config), its Cartesian-product expansion into concrete runnable units, and
//! the result shapes a completed benchmark produces. Mirrors
//! `xent.common.xent_config` / `xent.common.config_expansion`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::events::{TokenUsage, XentEvent};
use crate::xstring::XString;

/// The named roles a game's register file and presentation may address.
/// `Black`/`White` are the canonical zero-sum adversarial pair; `Alice`,
/// `Bob`, and `Carol` are general-purpose named players for cooperative or
/// multi-party games; `Env` is the non-scored narrator role (reveals,
/// system-authored text) that never receives a reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerName {
    Black,
    White,
    Alice,
    Bob,
    Carol,
    Env,
}

impl PlayerName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
            Self::Alice => "alice",
            Self::Bob => "bob",
            Self::Carol => "carol",
            Self::Env => "env",
        }
    }
}

impl std::fmt::Display for PlayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single player slot: which role it fills, which implementation drives
/// it, and provider-specific options (model name, temperature, endpoint
/// overrides) passed through verbatim to that player type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub name: PlayerName,
    pub player_type: String,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// One DSL program plus the metadata needed to run it: display name, source
/// text, and how many independent rounds to play per player assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub name: String,
    pub code: String,
    #[serde(default = "default_num_rounds")]
    pub num_rounds: u32,
    /// Name resolved against a `PresentationRegistry` to build each
    /// player's prompt. Defaults to the simplest built-in presentation.
    #[serde(default = "default_presentation_function")]
    pub presentation_function: String,
}

fn default_num_rounds() -> u32 {
    1
}

fn default_presentation_function() -> String {
    "single".to_string()
}

/// Maps abstract role names used inside a game's DSL source (e.g. the
/// literal `black`/`white` tokens an `elicit` instruction names) to the
/// concrete `PlayerConfig` entries that will fill them for a given unit.
pub type GameMapConfig = BTreeMap<String, String>;

/// Free-form descriptive fields carried alongside a benchmark for reporting,
/// plus the benchmark seed that determines map derivation and round-level
/// text-generator cursors. `seed` is the only field here the runtime reads;
/// the rest are never interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XentMetadata {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Root seed this benchmark's map derivation and reproducible rounds
    /// are computed from. Two runs with the same seed and the same config
    /// produce byte-identical event sequences given deterministic players.
    #[serde(default)]
    pub seed: u64,
    /// Extra player instances present in every unit alongside the scored
    /// player(s): scripted collaborators or opponents that consume
    /// elicit/token budget and receive events like any other player, but
    /// never accrue score themselves.
    #[serde(default)]
    pub npcs: Vec<PlayerConfig>,
}

/// The user-authored benchmark definition: games, players, and a map of
/// which player fills which role in which game. Before execution this is
/// expanded into an `ExpandedXentBenchmarkConfig` (the Cartesian product of
/// games × player-role assignments × rounds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondensedXentBenchmarkConfig {
    pub benchmark_name: String,
    pub games: Vec<GameConfig>,
    pub players: Vec<PlayerConfig>,
    pub game_maps: Vec<GameMapConfig>,
    #[serde(default)]
    pub metadata: XentMetadata,
    /// When false (the default), only round-level summaries are persisted;
    /// when true, every player interaction (elicit request/response pairs)
    /// is retained in the stored result, at proportionally higher storage
    /// cost. See SPEC_FULL.md's ambient-stack supplement.
    #[serde(default)]
    pub store_full_player_interactions: bool,
}

/// One concrete, fully-resolved unit of work: a single game, a single
/// game-map (role → player-type assignment), run for `num_rounds` rounds.
/// The benchmark driver enumerates these from the condensed config's
/// Cartesian product and schedules each independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutableGameMap {
    pub unit_id: String,
    pub game: GameConfig,
    pub game_map: GameMapConfig,
    pub players: Vec<PlayerConfig>,
}

/// The fully expanded set of work units derived from a condensed config,
/// ready for the driver to schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandedXentBenchmarkConfig {
    pub benchmark_name: String,
    pub metadata: XentMetadata,
    pub store_full_player_interactions: bool,
    pub units: Vec<ExecutableGameMap>,
}

/// The outcome of a single round within a unit: final register snapshot
/// (public registers only, unless `store_full_player_interactions` is set),
/// rewards per player, token usage, and the full event history, plus
/// whether the round completed normally or halted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMapRoundResult {
    pub round_index: u32,
    pub halted: bool,
    pub rewards: BTreeMap<PlayerName, f64>,
    pub token_usage: TokenUsage,
    pub public_registers: BTreeMap<char, XString>,
    /// Every event broadcast while the round ran, in emission order.
    /// Results are write-once per unit in storage, so this is the
    /// authoritative record of what happened.
    pub history: Vec<XentEvent>,
    #[serde(default)]
    pub interactions: Vec<serde_json::Value>,
}

/// All rounds played for one `ExecutableGameMap`, plus the aggregate reward
/// and summed token usage across those rounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMapResults {
    pub unit_id: String,
    pub rounds: Vec<GameMapRoundResult>,
    pub total_rewards: BTreeMap<PlayerName, f64>,
    pub token_usage: TokenUsage,
}

/// The terminal artifact of a full benchmark run: the expanded config the
/// run was executed against, plus every unit's results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub benchmark_name: String,
    pub metadata: XentMetadata,
    pub expanded_config: ExpandedXentBenchmarkConfig,
    pub units: Vec<GameMapResults>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_name_serializes_lowercase() {
        let json = serde_json::to_string(&PlayerName::Black).unwrap();
        assert_eq!(json, "\"black\"");
    }

    #[test]
    fn game_config_defaults_num_rounds_to_one() {
        let json = r#"{"name":"g","code":"reward(0)"}"#;
        let cfg: GameConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.num_rounds, 1);
    }
}
