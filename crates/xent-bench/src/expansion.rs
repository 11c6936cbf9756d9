//! Condensed config → expanded config (spec §4.G). A pure function: the
//! same condensed config and benchmark seed always produce the same set of
//! work units in the same order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use xent_core::{CondensedXentBenchmarkConfig, ExecutableGameMap, ExpandedXentBenchmarkConfig, XentError};

/// Derives a map seed from the benchmark seed, game name, and map index.
/// Two calls with the same three inputs always return the same value.
fn derive_map_seed(benchmark_seed: u64, game_name: &str, index: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    benchmark_seed.hash(&mut hasher);
    game_name.hash(&mut hasher);
    index.hash(&mut hasher);
    hasher.finish()
}

/// The players addressable within a unit: the roster of every player named
/// in the unit's game map, resolved against the benchmark's full player
/// list. At least one non-`env` player must be present.
fn resolve_players(cfg: &CondensedXentBenchmarkConfig, role_assignment: &xent_core::GameMapConfig) -> Result<Vec<xent_core::PlayerConfig>, XentError> {
    let mut resolved = Vec::new();
    for player_id in role_assignment.values() {
        let player = cfg
            .players
            .iter()
            .find(|p| p.name.as_str() == player_id)
            .ok_or_else(|| XentError::Configuration(format!("game map references unknown player '{player_id}'")))?;
        if !resolved.iter().any(|p: &xent_core::PlayerConfig| p.name == player.name) {
            resolved.push(player.clone());
        }
    }
    if resolved.is_empty() {
        return Err(XentError::Configuration("a game map must assign at least one player role".into()));
    }
    Ok(resolved)
}

/// Formats the unit identity `(game_name, map_seed, player_id)` as the
/// string key used for storage and for the file-tree layout's result
/// filenames. When a unit addresses more than one non-`env` player (a
/// true two-model adversarial matchup), their names are joined with `+`.
fn unit_id(game_name: &str, map_seed: u64, players: &[xent_core::PlayerConfig]) -> String {
    let player_id = players
        .iter()
        .filter(|p| p.name != xent_core::PlayerName::Env)
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join("+");
    format!("{game_name}__{map_seed}__{player_id}")
}

/// Expands a condensed config into the Cartesian product of
/// `games × game_maps`, deriving each unit's `map_seed` from the benchmark
/// seed, game name, and the map's position in `cfg.game_maps`.
pub fn expand(cfg: &CondensedXentBenchmarkConfig) -> Result<ExpandedXentBenchmarkConfig, XentError> {
    let benchmark_seed = cfg.metadata.seed;
    let mut units = Vec::with_capacity(cfg.games.len() * cfg.game_maps.len());

    for game in &cfg.games {
        for (index, role_assignment) in cfg.game_maps.iter().enumerate() {
            let map_seed = derive_map_seed(benchmark_seed, &game.name, index);
            let players = resolve_players(cfg, role_assignment)?;
            units.push(ExecutableGameMap {
                unit_id: unit_id(&game.name, map_seed, &players),
                game: game.clone(),
                game_map: role_assignment.clone(),
                players,
            });
        }
    }

    Ok(ExpandedXentBenchmarkConfig {
        benchmark_name: cfg.benchmark_name.clone(),
        metadata: cfg.metadata.clone(),
        store_full_player_interactions: cfg.store_full_player_interactions,
        units,
    })
}
