//! Reference file-tree `BenchmarkStorage` implementation (spec §4.I):
//!
//! ```text
//! <root>/<benchmark_id>/config.json
//! <root>/<benchmark_id>/results/<unit_id>.json
//! <root>/<benchmark_id>/running.flag
//! ```
//!
//! All writes go through a create-temp-then-rename so a reader never
//! observes a partial file, and a crash mid-write leaves the previous
//! content (or nothing) rather than a corrupt one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use xent_core::{BenchmarkResult, ExpandedXentBenchmarkConfig, GameMapResults, XentError};

use crate::traits::BenchmarkStorage;

fn io_err(context: &str, e: std::io::Error) -> XentError {
    XentError::Internal(format!("{context}: {e}"))
}

/// Writes `bytes` to `path` atomically: writes to a sibling `.tmp` file
/// first, then renames it into place. The rename is atomic on POSIX
/// filesystems as long as source and destination share a volume, which
/// holds here since the temp file is always a sibling of its target.
async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), XentError> {
    let parent = path.parent().ok_or_else(|| XentError::Internal(format!("path '{}' has no parent directory", path.display())))?;
    fs::create_dir_all(parent).await.map_err(|e| io_err("creating parent directory", e))?;
    let tmp_path = parent.join(format!(".{}.tmp", path.file_name().and_then(|n| n.to_str()).unwrap_or("write")));
    fs::write(&tmp_path, bytes).await.map_err(|e| io_err("writing temp file", e))?;
    fs::rename(&tmp_path, path).await.map_err(|e| io_err("renaming temp file into place", e))?;
    Ok(())
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, XentError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| XentError::Internal(format!("corrupt json at '{}': {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err("reading file", e)),
    }
}

/// A `BenchmarkStorage` rooted at `<root>/<benchmark_id>`.
pub struct FileBenchmarkStorage {
    benchmark_dir: PathBuf,
}

impl FileBenchmarkStorage {
    pub fn new(root: impl AsRef<Path>, benchmark_id: &str) -> Self {
        Self {
            benchmark_dir: root.as_ref().join(benchmark_id),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.benchmark_dir.join("config.json")
    }

    fn results_dir(&self) -> PathBuf {
        self.benchmark_dir.join("results")
    }

    fn result_path(&self, unit_id: &str) -> PathBuf {
        self.results_dir().join(format!("{unit_id}.json"))
    }

    fn running_flag_path(&self) -> PathBuf {
        self.benchmark_dir.join("running.flag")
    }
}

#[async_trait]
impl BenchmarkStorage for FileBenchmarkStorage {
    async fn initialize(&self) -> Result<(), XentError> {
        fs::create_dir_all(self.results_dir()).await.map_err(|e| io_err("initializing benchmark directory", e))
    }

    async fn clear(&self) -> Result<(), XentError> {
        match fs::remove_dir_all(&self.benchmark_dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err("clearing benchmark directory", e)),
        }
    }

    async fn store_config(&self, cfg: &ExpandedXentBenchmarkConfig) -> Result<(), XentError> {
        let new_bytes = serde_json::to_vec_pretty(cfg).map_err(|e| XentError::Internal(format!("serializing config: {e}")))?;
        if let Some(existing) = read_json::<ExpandedXentBenchmarkConfig>(&self.config_path()).await? {
            let existing_bytes = serde_json::to_vec_pretty(&existing).map_err(|e| XentError::Internal(format!("serializing existing config: {e}")))?;
            if existing_bytes != new_bytes {
                return Err(XentError::Configuration("benchmark config is already stored and differs from the config being stored; configs are immutable".into()));
            }
            return Ok(());
        }
        atomic_write(&self.config_path(), &new_bytes).await
    }

    async fn get_config(&self) -> Result<Option<ExpandedXentBenchmarkConfig>, XentError> {
        read_json(&self.config_path()).await
    }

    async fn store_game_map_results(&self, results: &GameMapResults) -> Result<(), XentError> {
        let new_bytes = serde_json::to_vec_pretty(results).map_err(|e| XentError::Internal(format!("serializing unit results: {e}")))?;
        let path = self.result_path(&results.unit_id);
        if let Some(existing) = read_json::<GameMapResults>(&path).await? {
            let existing_bytes = serde_json::to_vec_pretty(&existing).map_err(|e| XentError::Internal(format!("serializing existing unit results: {e}")))?;
            if existing_bytes != new_bytes {
                return Err(XentError::Game(format!("results for unit '{}' are already stored and differ from the results being stored", results.unit_id)));
            }
            return Ok(());
        }
        atomic_write(&path, &new_bytes).await
    }

    async fn get_game_map_results(&self, unit_id: &str) -> Result<Option<GameMapResults>, XentError> {
        read_json(&self.result_path(unit_id)).await
    }

    async fn list_result_ids(&self) -> Result<Vec<String>, XentError> {
        let mut entries = match fs::read_dir(self.results_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_err("listing results directory", e)),
        };
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_err("reading results directory entry", e))? {
            if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
                if entry.path().extension().and_then(|e| e.to_str()) == Some("json") && !stem.starts_with('.') {
                    ids.push(stem.to_string());
                }
            }
        }
        Ok(ids)
    }

    async fn get_benchmark_results(&self) -> Result<Option<BenchmarkResult>, XentError> {
        let Some(config) = self.get_config().await? else {
            return Ok(None);
        };
        let mut units = Vec::with_capacity(config.units.len());
        for unit in &config.units {
            match self.get_game_map_results(&unit.unit_id).await? {
                Some(result) => units.push(result),
                None => continue,
            }
        }
        units.sort_by(|a, b| a.unit_id.cmp(&b.unit_id));
        Ok(Some(BenchmarkResult {
            benchmark_name: config.benchmark_name.clone(),
            metadata: config.metadata.clone(),
            expanded_config: config,
            units,
        }))
    }

    async fn get_running_state(&self) -> Result<bool, XentError> {
        match fs::metadata(self.running_flag_path()).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err("reading running flag", e)),
        }
    }

    async fn set_running_state(&self, running: bool) -> Result<(), XentError> {
        let path = self.running_flag_path();
        if running {
            atomic_write(&path, b"running").await
        } else {
            match fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(io_err("clearing running flag", e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use xent_core::{GameMapRoundResult, XentMetadata};

    use super::*;

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    fn unique_root() -> PathBuf {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("xent-storage-test-{}-{n}", std::process::id()))
    }

    fn sample_config() -> ExpandedXentBenchmarkConfig {
        ExpandedXentBenchmarkConfig {
            benchmark_name: "demo".into(),
            metadata: XentMetadata::default(),
            store_full_player_interactions: false,
            units: vec![],
        }
    }

    fn sample_results(unit_id: &str) -> GameMapResults {
        GameMapResults {
            unit_id: unit_id.into(),
            rounds: vec![GameMapRoundResult {
                round_index: 0,
                halted: false,
                rewards: Default::default(),
                token_usage: Default::default(),
                public_registers: Default::default(),
                history: vec![],
                interactions: vec![],
            }],
            total_rewards: Default::default(),
            token_usage: Default::default(),
        }
    }

    #[tokio::test]
    async fn initialize_creates_results_directory() {
        let root = unique_root();
        let storage = FileBenchmarkStorage::new(&root, "bench-1");
        storage.initialize().await.unwrap();
        assert!(fs::metadata(root.join("bench-1/results")).await.unwrap().is_dir());
    }

    #[tokio::test]
    async fn store_config_is_write_once_and_idempotent_for_equal_config() {
        let root = unique_root();
        let storage = FileBenchmarkStorage::new(&root, "bench-1");
        let cfg = sample_config();
        storage.store_config(&cfg).await.unwrap();
        storage.store_config(&cfg).await.unwrap();
        assert!(storage.get_config().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn store_config_rejects_a_conflicting_config() {
        let root = unique_root();
        let storage = FileBenchmarkStorage::new(&root, "bench-1");
        storage.store_config(&sample_config()).await.unwrap();
        let mut other = sample_config();
        other.benchmark_name = "different".into();
        let err = storage.store_config(&other).await.unwrap_err();
        assert!(matches!(err, XentError::Configuration(_)));
    }

    #[tokio::test]
    async fn store_and_fetch_unit_results_round_trip() {
        let root = unique_root();
        let storage = FileBenchmarkStorage::new(&root, "bench-1");
        let results = sample_results("game__42__black");
        storage.store_game_map_results(&results).await.unwrap();
        let fetched = storage.get_game_map_results("game__42__black").await.unwrap().unwrap();
        assert_eq!(fetched.unit_id, "game__42__black");
        assert_eq!(storage.list_result_ids().await.unwrap(), vec!["game__42__black".to_string()]);
    }

    #[tokio::test]
    async fn conflicting_unit_results_overwrite_is_rejected() {
        let root = unique_root();
        let storage = FileBenchmarkStorage::new(&root, "bench-1");
        storage.store_game_map_results(&sample_results("unit-1")).await.unwrap();
        let mut other = sample_results("unit-1");
        other.rounds[0].halted = true;
        let err = storage.store_game_map_results(&other).await.unwrap_err();
        assert!(matches!(err, XentError::Game(_)));
    }

    #[tokio::test]
    async fn running_state_defaults_to_false_and_round_trips() {
        let root = unique_root();
        let storage = FileBenchmarkStorage::new(&root, "bench-1");
        assert!(!storage.get_running_state().await.unwrap());
        storage.set_running_state(true).await.unwrap();
        assert!(storage.get_running_state().await.unwrap());
        storage.set_running_state(false).await.unwrap();
        assert!(!storage.get_running_state().await.unwrap());
    }

    #[tokio::test]
    async fn get_benchmark_results_aggregates_stored_units_in_unit_id_order() {
        let root = unique_root();
        let storage = FileBenchmarkStorage::new(&root, "bench-1");
        let mut cfg = sample_config();
        cfg.units = vec![];
        storage.store_config(&cfg).await.unwrap();
        storage.store_game_map_results(&sample_results("b-unit")).await.unwrap();
        storage.store_game_map_results(&sample_results("a-unit")).await.unwrap();

        // get_benchmark_results only includes units listed in the stored
        // config's `units`, so seed a config that references both.
        let mut cfg_with_units = sample_config();
        cfg_with_units.units.push(xent_core::ExecutableGameMap {
            unit_id: "a-unit".into(),
            game: xent_core::GameConfig {
                name: "g".into(),
                code: String::new(),
                num_rounds: 1,
                presentation_function: "single".into(),
            },
            game_map: Default::default(),
            players: vec![],
        });
        cfg_with_units.units.push(xent_core::ExecutableGameMap {
            unit_id: "b-unit".into(),
            game: xent_core::GameConfig {
                name: "g".into(),
                code: String::new(),
                num_rounds: 1,
                presentation_function: "single".into(),
            },
            game_map: Default::default(),
            players: vec![],
        });
        storage.clear().await.unwrap();
        storage.initialize().await.unwrap();
        storage.store_config(&cfg_with_units).await.unwrap();
        storage.store_game_map_results(&sample_results("b-unit")).await.unwrap();
        storage.store_game_map_results(&sample_results("a-unit")).await.unwrap();

        let aggregated = storage.get_benchmark_results().await.unwrap().unwrap();
        let ids: Vec<_> = aggregated.units.iter().map(|u| u.unit_id.clone()).collect();
        assert_eq!(ids, vec!["a-unit".to_string(), "b-unit".to_string()]);
    }

    proptest::proptest! {
        #[test]
        fn atomic_write_then_read_json_round_trips_arbitrary_strings(values in proptest::collection::vec(".*", 0..5)) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let path = unique_root().with_extension("json");
            rt.block_on(async {
                let bytes = serde_json::to_vec(&values).unwrap();
                atomic_write(&path, &bytes).await.unwrap();
                let back: Option<Vec<String>> = read_json(&path).await.unwrap();
                proptest::prop_assert_eq!(back, Some(values));
                tokio::fs::remove_file(&path).await.unwrap();
                Ok(())
            })?;
        }
    }
}
