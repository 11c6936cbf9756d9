//! Storage contracts. Mirrors `xent.storage.storage_interface`: a
//! benchmark-scoped store for the expanded config, per-unit results, and an
//! advisory running flag.

use async_trait::async_trait;
use xent_core::{BenchmarkResult, ExpandedXentBenchmarkConfig, GameMapResults, XentError};

/// Durable, idempotent storage for exactly one benchmark run.
///
/// `unit_id` is the composite key `"{game_name}__{map_seed}__{player_id}"`
/// used throughout (see `ExecutableGameMap::unit_id`); callers needing the
/// individual components can split on `__`.
#[async_trait]
pub trait BenchmarkStorage: Send + Sync {
    /// Create any directories/files this implementation needs. Safe to call
    /// more than once.
    async fn initialize(&self) -> Result<(), XentError>;

    /// Remove all persisted state for this benchmark. Used by tests and by
    /// an explicit user request to start over; never called by the driver
    /// itself.
    async fn clear(&self) -> Result<(), XentError>;

    /// Write-once: a first call persists `cfg`. A later call with an equal
    /// config is a no-op; a later call with a different config fails with a
    /// configuration-kind error, since configs are immutable once stored.
    async fn store_config(&self, cfg: &ExpandedXentBenchmarkConfig) -> Result<(), XentError>;

    async fn get_config(&self) -> Result<Option<ExpandedXentBenchmarkConfig>, XentError>;

    /// Atomic write keyed by `unit_id`. Overwrites are permitted only when
    /// the new bytes are identical to what is already stored; any other
    /// conflicting overwrite fails with a game-kind error.
    async fn store_game_map_results(&self, results: &GameMapResults) -> Result<(), XentError>;

    async fn get_game_map_results(&self, unit_id: &str) -> Result<Option<GameMapResults>, XentError>;

    /// All unit ids with stored results, in no particular order.
    async fn list_result_ids(&self) -> Result<Vec<String>, XentError>;

    /// Aggregates everything currently stored into a `BenchmarkResult`.
    /// Returns `Ok(None)` if no config has been stored yet.
    async fn get_benchmark_results(&self) -> Result<Option<BenchmarkResult>, XentError>;

    /// Advisory flag for UIs/monitoring; never consulted as a lock by the
    /// driver itself.
    async fn get_running_state(&self) -> Result<bool, XentError>;

    async fn set_running_state(&self, running: bool) -> Result<(), XentError>;
}
