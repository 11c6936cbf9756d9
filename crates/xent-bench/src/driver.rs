//! The benchmark driver (spec §4.H): enumerates work units from an expanded
//! config, runs each exactly once against a bounded worker pool, resumes
//! units already present in storage, and aggregates the final result.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{info, warn};
use xent_core::{BenchmarkResult, ExecutableGameMap, ExpandedXentBenchmarkConfig, GameMapResults, PlayerName, XentError};
use xent_judge::Judge;
use xent_players::{Player, PlayerRegistry};
use xent_runtime::GameRuntime;
use xent_storage::BenchmarkStorage;
use xent_textgen::TextGenerator;

/// Lifecycle events emitted to an optional sink, for monitoring UIs.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    BenchmarkStarted { benchmark_name: String, unit_count: usize },
    GameMapStarted { unit_id: String },
    GameMapFinished { unit_id: String, failed: bool },
    BenchmarkFinished { benchmark_name: String },
}

/// Tunables for one driver run.
pub struct DriverConfig {
    /// Maximum number of units executing concurrently.
    pub concurrency_limit: usize,
    /// Maximum wall-clock time allotted to a single unit before it is
    /// recorded as failed. `None` means no timeout.
    pub unit_timeout: Option<Duration>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 4,
            unit_timeout: None,
        }
    }
}

/// Everything the driver needs to actually execute a unit: builders for the
/// judge, text generator, and player instances a `GameRuntime` requires.
pub struct RuntimeFactory {
    pub judge: Arc<dyn Judge>,
    pub text_generator: Arc<dyn TextGenerator>,
    pub player_registry: Arc<PlayerRegistry>,
}

impl RuntimeFactory {
    /// Builds every player for `unit`, defaulting each one's `presentation`
    /// option to the game's own `presentation_function` when the player
    /// doesn't name one explicitly; an explicit per-player `presentation`
    /// option still wins.
    fn build_players(&self, unit: &ExecutableGameMap, npcs: &[xent_core::PlayerConfig]) -> Result<BTreeMap<PlayerName, Arc<dyn Player>>, XentError> {
        let mut players = BTreeMap::new();
        for player_config in unit.players.iter().chain(npcs) {
            let player = if player_config.options.contains_key("presentation") {
                self.player_registry.build(player_config)?
            } else {
                let mut with_default = player_config.clone();
                with_default.options.insert("presentation".to_string(), serde_json::Value::String(unit.game.presentation_function.clone()));
                self.player_registry.build(&with_default)?
            };
            players.insert(player_config.name, player);
        }
        Ok(players)
    }
}

async fn run_unit(unit: ExecutableGameMap, factory: Arc<RuntimeFactory>, store_full_player_interactions: bool, benchmark_seed: u64, npcs: Vec<xent_core::PlayerConfig>) -> Result<GameMapResults, XentError> {
    let _ = benchmark_seed; // carried for future round-seeding; current runtime derives its own per-round draws from the text generator's internal cursor.
    let program = xent_dsl::parse(&unit.game.code)?;
    let npc_names = npcs.iter().map(|p| p.name).collect();
    let players = factory.build_players(&unit, &npcs)?;
    let runtime = GameRuntime::new(program, factory.judge.clone(), factory.text_generator.clone(), players, store_full_player_interactions).with_npcs(npc_names);

    let mut rounds = Vec::with_capacity(unit.game.num_rounds as usize);
    let mut total_rewards: BTreeMap<PlayerName, f64> = BTreeMap::new();
    let mut token_usage = xent_core::TokenUsage::default();
    for round_index in 0..unit.game.num_rounds {
        let round = runtime.run_round(round_index).await?;
        for (player, reward) in &round.rewards {
            let slot = total_rewards.entry(*player).or_insert(f64::NEG_INFINITY);
            if *reward > *slot {
                *slot = *reward;
            }
        }
        token_usage = token_usage + round.token_usage;
        rounds.push(round);
    }

    Ok(GameMapResults {
        unit_id: unit.unit_id,
        rounds,
        total_rewards,
        token_usage,
    })
}

/// Runs every unit in `expanded` to completion, resuming any unit already
/// present in `storage`, and returns the aggregated result.
pub async fn run_benchmark(
    expanded: ExpandedXentBenchmarkConfig,
    storage: Arc<dyn BenchmarkStorage>,
    factory: Arc<RuntimeFactory>,
    driver_config: DriverConfig,
    cancel: watch::Receiver<bool>,
    sink: Option<mpsc::UnboundedSender<LifecycleEvent>>,
) -> Result<BenchmarkResult, XentError> {
    storage.initialize().await?;

    if let Some(existing) = storage.get_config().await? {
        let existing_bytes = serde_json::to_vec(&existing).map_err(|e| XentError::Internal(e.to_string()))?;
        let new_bytes = serde_json::to_vec(&expanded).map_err(|e| XentError::Internal(e.to_string()))?;
        if existing_bytes != new_bytes {
            return Err(XentError::Configuration("stored benchmark config differs from the config being run; configs are immutable once stored".into()));
        }
    } else {
        storage.store_config(&expanded).await?;
    }

    storage.set_running_state(true).await?;
    let outcome = run_units(&expanded, storage.clone(), factory, &driver_config, cancel, sink.clone()).await;
    storage.set_running_state(false).await?;
    outcome?;

    if let Some(tx) = &sink {
        let _ = tx.send(LifecycleEvent::BenchmarkFinished {
            benchmark_name: expanded.benchmark_name.clone(),
        });
    }

    storage
        .get_benchmark_results()
        .await?
        .ok_or_else(|| XentError::Internal("benchmark results missing immediately after a successful run".into()))
}

async fn run_units(
    expanded: &ExpandedXentBenchmarkConfig,
    storage: Arc<dyn BenchmarkStorage>,
    factory: Arc<RuntimeFactory>,
    driver_config: &DriverConfig,
    cancel: watch::Receiver<bool>,
    sink: Option<mpsc::UnboundedSender<LifecycleEvent>>,
) -> Result<(), XentError> {
    if let Some(tx) = &sink {
        let _ = tx.send(LifecycleEvent::BenchmarkStarted {
            benchmark_name: expanded.benchmark_name.clone(),
            unit_count: expanded.units.len(),
        });
    }

    let semaphore = Arc::new(Semaphore::new(driver_config.concurrency_limit.max(1)));
    let mut handles = Vec::with_capacity(expanded.units.len());
    let benchmark_seed = expanded.metadata.seed;
    let npcs = expanded.metadata.npcs.clone();

    for unit in &expanded.units {
        if cancel.borrow().to_owned() {
            break;
        }
        if storage.get_game_map_results(&unit.unit_id).await?.is_some() {
            continue;
        }

        let unit = unit.clone();
        let storage = storage.clone();
        let factory = factory.clone();
        let semaphore = semaphore.clone();
        let sink = sink.clone();
        let store_full_player_interactions = expanded.store_full_player_interactions;
        let unit_timeout = driver_config.unit_timeout;
        let mut cancel = cancel.clone();
        let npcs = npcs.clone();

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed while handles are outstanding");
            if *cancel.borrow_and_update() {
                return;
            }

            if let Some(tx) = &sink {
                let _ = tx.send(LifecycleEvent::GameMapStarted { unit_id: unit.unit_id.clone() });
            }

            let run = run_unit(unit.clone(), factory, store_full_player_interactions, benchmark_seed, npcs);
            let outcome = match unit_timeout {
                Some(timeout) => match tokio::time::timeout(timeout, run).await {
                    Ok(result) => result,
                    Err(_) => Err(XentError::Internal(format!("unit '{}' exceeded its timeout", unit.unit_id))),
                },
                None => run.await,
            };

            let failed = outcome.is_err();
            match outcome {
                Ok(results) => {
                    if let Err(e) = storage.store_game_map_results(&results).await {
                        warn!(unit_id = %unit.unit_id, error = %e, "failed to persist unit results");
                    }
                },
                Err(e) => warn!(unit_id = %unit.unit_id, error = %e, "unit failed"),
            }

            if let Some(tx) = &sink {
                let _ = tx.send(LifecycleEvent::GameMapFinished {
                    unit_id: unit.unit_id.clone(),
                    failed,
                });
            }
        }));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "a unit task panicked");
        }
    }

    info!("benchmark run complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use xent_core::{GameConfig, GameMapConfig, PlayerConfig, PlayerName};
    use xent_judge::DeterministicJudge;
    use xent_players::mock::MockPlayer;
    use xent_textgen::{CorpusMode, CorpusTextGenerator};

    use super::*;

    fn unit_with(game_presentation: &str, player_presentation: Option<&str>) -> ExecutableGameMap {
        let mut options = serde_json::Map::new();
        if let Some(p) = player_presentation {
            options.insert("presentation".to_string(), serde_json::Value::String(p.to_string()));
        }
        ExecutableGameMap {
            unit_id: "u".into(),
            game: GameConfig {
                name: "g".into(),
                code: xent_core::constants::SIMPLE_GAME_CODE.into(),
                num_rounds: 1,
                presentation_function: game_presentation.to_string(),
            },
            game_map: GameMapConfig::default(),
            players: vec![PlayerConfig {
                name: PlayerName::Black,
                player_type: "spy".into(),
                options,
            }],
        }
    }

    fn spy_factory(seen: Arc<Mutex<Option<String>>>) -> PlayerRegistry {
        let mut registry = PlayerRegistry::new();
        registry
            .register(
                "spy",
                Arc::new(move |cfg: &xent_core::PlayerConfig| {
                    let presentation = cfg.options.get("presentation").and_then(|v| v.as_str()).map(str::to_string);
                    *seen.lock().unwrap() = presentation;
                    Ok(Arc::new(MockPlayer::fixed("x")) as Arc<dyn Player>)
                }),
            )
            .unwrap();
        registry
    }

    fn factory_with(registry: PlayerRegistry) -> RuntimeFactory {
        RuntimeFactory {
            judge: Arc::new(DeterministicJudge::default()),
            text_generator: Arc::new(CorpusTextGenerator::new(vec!["unused".into()], CorpusMode::Sequential, 0)),
            player_registry: Arc::new(registry),
        }
    }

    #[test]
    fn a_players_presentation_defaults_to_the_games_presentation_function() {
        let seen = Arc::new(Mutex::new(None));
        let factory = factory_with(spy_factory(seen.clone()));
        let unit = unit_with("multi", None);

        factory.build_players(&unit, &[]).unwrap();

        assert_eq!(seen.lock().unwrap().as_deref(), Some("multi"));
    }

    #[test]
    fn an_explicit_player_presentation_option_overrides_the_games_default() {
        let seen = Arc::new(Mutex::new(None));
        let factory = factory_with(spy_factory(seen.clone()));
        let unit = unit_with("multi", Some("single"));

        factory.build_players(&unit, &[]).unwrap();

        assert_eq!(seen.lock().unwrap().as_deref(), Some("single"));
    }

    fn usage_factory(usage: xent_core::TokenUsage) -> RuntimeFactory {
        let mut registry = PlayerRegistry::new();
        registry
            .register(
                "mock",
                Arc::new(move |_cfg: &xent_core::PlayerConfig| Ok(Arc::new(MockPlayer::fixed("zzzzz").with_usage(usage)) as Arc<dyn Player>)),
            )
            .unwrap();
        factory_with(registry)
    }

    #[tokio::test]
    async fn run_unit_sums_token_usage_across_rounds() {
        let unit = ExecutableGameMap {
            unit_id: "u".into(),
            game: GameConfig {
                name: "g".into(),
                code: xent_core::constants::SIMPLE_GAME_CODE.into(),
                num_rounds: 3,
                presentation_function: "single".into(),
            },
            game_map: GameMapConfig::default(),
            players: vec![PlayerConfig {
                name: PlayerName::Black,
                player_type: "mock".into(),
                options: Default::default(),
            }],
        };
        let factory = Arc::new(usage_factory(xent_core::TokenUsage::new(2, 1)));

        let results = run_unit(unit, factory, false, 0, vec![]).await.unwrap();

        assert_eq!(results.rounds.len(), 3);
        assert_eq!(results.token_usage, xent_core::TokenUsage::new(6, 3));
    }
}
