//! Durable, idempotent storage for a benchmark run: its expanded config,
//! per-unit results, and an advisory running flag. See spec.md §4.I.

pub mod file_storage;
pub mod paths;
pub mod traits;

pub use file_storage::FileBenchmarkStorage;
pub use traits::BenchmarkStorage;
