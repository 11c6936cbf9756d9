//! Resolves where benchmark data lives on disk. Mirrors
//! `xent.common.paths`: an environment variable override layered over a
//! platform-specific user data directory.

use std::env;
use std::path::PathBuf;

const APP_NAME: &str = "xent";

fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name).map(PathBuf::from)
}

/// The base directory for all Xent user data: `XENT_DATA_DIR` if set,
/// otherwise the platform's user data directory for this application.
pub fn data_root() -> PathBuf {
    env_path("XENT_DATA_DIR").unwrap_or_else(|| dirs::data_dir().unwrap_or_else(env::temp_dir).join(APP_NAME))
}

/// The root directory for benchmark results: `XENT_RESULTS_DIR` if set,
/// otherwise `<data_root>/benchmarks`.
pub fn results_root() -> PathBuf {
    env_path("XENT_RESULTS_DIR").unwrap_or_else(|| data_root().join("benchmarks"))
}

/// The directory holding one benchmark's artifacts.
pub fn benchmark_dir(benchmark_id: &str) -> PathBuf {
    results_root().join(benchmark_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_root_falls_back_to_data_root_subdirectory() {
        unsafe {
            env::remove_var("XENT_RESULTS_DIR");
            env::set_var("XENT_DATA_DIR", "/tmp/xent-test-data-root");
        }
        assert_eq!(results_root(), PathBuf::from("/tmp/xent-test-data-root/benchmarks"));
        unsafe {
            env::remove_var("XENT_DATA_DIR");
        }
    }

    #[test]
    fn results_root_env_override_wins() {
        unsafe {
            env::set_var("XENT_RESULTS_DIR", "/tmp/xent-test-results-root");
        }
        assert_eq!(results_root(), PathBuf::from("/tmp/xent-test-results-root"));
        unsafe {
            env::remove_var("XENT_RESULTS_DIR");
        }
    }
}
