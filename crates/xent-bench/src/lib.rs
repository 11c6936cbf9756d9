//! Expands a condensed benchmark config and runs it to completion: the
//! scheduling layer between a user-authored config and a `GameRuntime`.

pub mod driver;
pub mod expansion;

pub use driver::{run_benchmark, DriverConfig, LifecycleEvent, RuntimeFactory};
pub use expansion::expand;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::watch;
    use xent_core::{GameConfig, PlayerConfig, PlayerName, XentMetadata};
    use xent_judge::DeterministicJudge;
    use xent_players::PlayerRegistry;
    use xent_storage::FileBenchmarkStorage;
    use xent_textgen::{CorpusMode, CorpusTextGenerator};

    use super::*;

    fn unique_root() -> std::path::PathBuf {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("xent-bench-test-{}-{n}", std::process::id()))
    }

    fn condensed() -> xent_core::CondensedXentBenchmarkConfig {
        xent_core::CondensedXentBenchmarkConfig {
            benchmark_name: "demo".into(),
            games: vec![GameConfig {
                name: "single".into(),
                code: xent_core::constants::SIMPLE_GAME_CODE.into(),
                num_rounds: 1,
                presentation_function: "single".into(),
            }],
            players: vec![PlayerConfig {
                name: PlayerName::Black,
                player_type: "mock".into(),
                options: serde_json::json!({ "responses": ["a rewritten remainder"] }).as_object().unwrap().clone(),
            }],
            game_maps: vec![[("black".to_string(), "black".to_string())].into_iter().collect()],
            metadata: XentMetadata {
                seed: 11,
                ..Default::default()
            },
            store_full_player_interactions: false,
        }
    }

    fn factory() -> Arc<RuntimeFactory> {
        Arc::new(RuntimeFactory {
            judge: Arc::new(DeterministicJudge::default()),
            text_generator: Arc::new(CorpusTextGenerator::new(vec!["the quick brown fox jumps".into()], CorpusMode::Sequential, 0)),
            player_registry: Arc::new(PlayerRegistry::with_builtins()),
        })
    }

    #[tokio::test]
    async fn running_a_benchmark_end_to_end_produces_one_unit_result() {
        let expanded = expand(&condensed()).unwrap();
        let root = unique_root();
        let storage = Arc::new(FileBenchmarkStorage::new(&root, "bench-1"));
        let (_tx, rx) = watch::channel(false);

        let result = run_benchmark(expanded, storage, factory(), DriverConfig::default(), rx, None).await.unwrap();
        assert_eq!(result.units.len(), 1);
    }

    #[tokio::test]
    async fn resuming_a_completed_benchmark_reuses_stored_results() {
        let expanded = expand(&condensed()).unwrap();
        let root = unique_root();
        let storage = Arc::new(FileBenchmarkStorage::new(&root, "bench-1"));
        let (_tx, rx) = watch::channel(false);

        let first = run_benchmark(expanded.clone(), storage.clone(), factory(), DriverConfig::default(), rx.clone(), None).await.unwrap();
        let second = run_benchmark(expanded, storage, factory(), DriverConfig::default(), rx, None).await.unwrap();

        assert_eq!(first.units[0].unit_id, second.units[0].unit_id);
        assert_eq!(first.units[0].total_rewards, second.units[0].total_rewards);
    }

    #[tokio::test]
    async fn conflicting_stored_config_is_fatal() {
        let expanded = expand(&condensed()).unwrap();
        let root = unique_root();
        let storage = Arc::new(FileBenchmarkStorage::new(&root, "bench-1"));
        let (_tx, rx) = watch::channel(false);
        run_benchmark(expanded, storage.clone(), factory(), DriverConfig::default(), rx.clone(), None).await.unwrap();

        let mut other_condensed = condensed();
        other_condensed.benchmark_name = "different".into();
        let other_expanded = expand(&other_condensed).unwrap();

        let err = run_benchmark(other_expanded, storage, factory(), DriverConfig::default(), rx, None).await.unwrap_err();
        assert!(matches!(err, xent_core::XentError::Configuration(_)));
    }
}
