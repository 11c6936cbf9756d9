//! Process-level configuration for the `run` subcommand, loaded from
//! `xent.toml` with environment variable overrides. Mirrors the
//! file-then-env loading pattern used throughout this stack's server
//! binaries.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Root directory results are stored under; passed to `FileBenchmarkStorage`.
    /// Defaults to `xent_storage::paths::results_root()`, which already
    /// honors `XENT_DATA_DIR`/`XENT_RESULTS_DIR`, so this field only needs
    /// overriding when a run wants a root distinct from both.
    pub storage_root: PathBuf,
    /// Newline-delimited text file used to seed the corpus text generator.
    /// When absent, a small built-in placeholder corpus is used — real
    /// corpus loading (tweet archives, math datasets, etc.) is out of
    /// scope for this engine per its design boundary.
    pub corpus_path: Option<PathBuf>,
    /// Maximum number of work units executing concurrently.
    pub concurrency_limit: usize,
    /// Per-unit timeout in seconds. Zero means no timeout.
    pub unit_timeout_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            storage_root: xent_storage::paths::results_root(),
            corpus_path: None,
            concurrency_limit: 4,
            unit_timeout_secs: 0,
        }
    }
}

impl OrchestratorConfig {
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("xent.toml") {
            Ok(content) => match toml::from_str::<Self>(&content) {
                Ok(cfg) => {
                    tracing::info!("loaded configuration from xent.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("failed to parse xent.toml: {e}, using defaults");
                    Self::default()
                },
            },
            Err(_) => {
                tracing::info!("no xent.toml found, using defaults");
                Self::default()
            },
        };

        // XENT_DATA_DIR / XENT_RESULTS_DIR are read directly by
        // `xent_storage::paths`; re-resolving here picks up an override
        // made only after this process started without requiring a
        // separate env var.
        if std::env::var("XENT_RESULTS_DIR").is_ok() || std::env::var("XENT_DATA_DIR").is_ok() {
            config.storage_root = xent_storage::paths::results_root();
        }
        if let Ok(corpus) = std::env::var("XENT_CORPUS_PATH") {
            if !corpus.is_empty() {
                config.corpus_path = Some(PathBuf::from(corpus));
            }
        }
        if let Ok(limit) = std::env::var("XENT_MAX_CONCURRENCY") {
            if let Ok(parsed) = limit.parse() {
                config.concurrency_limit = parsed;
            }
        }
        if let Ok(secs) = std::env::var("XENT_UNIT_TIMEOUT_SECS") {
            if let Ok(parsed) = secs.parse() {
                config.unit_timeout_secs = parsed;
            }
        }

        config
    }

    pub fn load_corpus(&self) -> Vec<String> {
        match &self.corpus_path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(content) => content.lines().map(str::to_string).filter(|l| !l.is_empty()).collect(),
                Err(e) => {
                    tracing::warn!("failed to read corpus file '{}': {e}, using placeholder corpus", path.display());
                    placeholder_corpus()
                },
            },
            None => placeholder_corpus(),
        }
    }
}

fn placeholder_corpus() -> Vec<String> {
    vec![
        "the quick brown fox jumps over the lazy dog".to_string(),
        "a journey of a thousand miles begins with a single step".to_string(),
        "all that glitters is not gold".to_string(),
    ]
}
