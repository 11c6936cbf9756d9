//! Orchestrator binary: wires the expansion, runtime, and storage crates
//! together behind a small CLI surface (spec.md §6 "CLI surface").
//!
//! Subcommands: `run` is fully implemented; `configure`, `analyze`, and
//! `serve` are acknowledged but out of this engine's scope (config
//! authoring UX, report rendering, and the web/monitoring surface are all
//! explicitly external collaborators per spec.md §1) and exit with a
//! diagnostic instead of pretending to do the work.

mod config;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;
use xent_bench::{run_benchmark, DriverConfig, LifecycleEvent, RuntimeFactory};
use xent_core::{CondensedXentBenchmarkConfig, ExpandedXentBenchmarkConfig};
use xent_judge::DeterministicJudge;
use xent_players::PlayerRegistry;
use xent_storage::FileBenchmarkStorage;
use xent_textgen::{CorpusMode, CorpusTextGenerator};

use crate::config::OrchestratorConfig;

const NOT_IN_SCOPE_EXIT_CODE: i32 = 2;

fn not_in_scope(subcommand: &str, collaborator: &str) -> ! {
    eprintln!("xentd {subcommand}: not part of this engine; implemented by {collaborator}");
    std::process::exit(NOT_IN_SCOPE_EXIT_CODE);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut args = std::env::args().skip(1);
    let subcommand = args.next();

    match subcommand.as_deref() {
        Some("run") => run_command(args.collect()).await,
        Some("configure") => not_in_scope("configure", "the interactive configuration builder"),
        Some("analyze") => not_in_scope("analyze", "report rendering"),
        Some("serve") => not_in_scope("serve", "the web/monitoring surface"),
        Some(other) => {
            eprintln!("xentd: unknown subcommand '{other}' (expected configure | run | analyze | serve)");
            std::process::exit(1);
        },
        None => {
            eprintln!("xentd: usage: xentd run <config.json> [--benchmark-id=ID]");
            std::process::exit(1);
        },
    }
}

async fn run_command(args: Vec<String>) {
    let Some(config_path) = args.first() else {
        eprintln!("xentd run: missing required <config.json> argument");
        std::process::exit(1);
    };

    let benchmark_id = args
        .iter()
        .find_map(|a| a.strip_prefix("--benchmark-id="))
        .map(str::to_string)
        .unwrap_or_else(|| "default".to_string());

    let orchestrator_config = OrchestratorConfig::load();

    let raw = match std::fs::read_to_string(config_path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("xentd run: failed to read '{config_path}': {e}");
            std::process::exit(1);
        },
    };

    let expanded = match load_expanded(&raw) {
        Ok(expanded) => expanded,
        Err(e) => {
            eprintln!("xentd run: {e}");
            std::process::exit(1);
        },
    };

    let corpus = orchestrator_config.load_corpus();
    let mut player_registry = PlayerRegistry::with_builtins();
    register_default_player(&mut player_registry);

    let factory = Arc::new(RuntimeFactory {
        judge: Arc::new(DeterministicJudge::default()),
        text_generator: Arc::new(CorpusTextGenerator::new(corpus, CorpusMode::Shuffle, expanded.metadata.seed)),
        player_registry: Arc::new(player_registry),
    });

    let storage = Arc::new(FileBenchmarkStorage::new(&orchestrator_config.storage_root, &benchmark_id));
    let driver_config = DriverConfig {
        concurrency_limit: orchestrator_config.concurrency_limit,
        unit_timeout: (orchestrator_config.unit_timeout_secs > 0).then(|| std::time::Duration::from_secs(orchestrator_config.unit_timeout_secs)),
    };

    let (_cancel_tx, cancel_rx) = watch::channel(false);
    let (sink_tx, mut sink_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(event) = sink_rx.recv().await {
            log_lifecycle_event(&event);
        }
    });

    match run_benchmark(expanded, storage, factory, driver_config, cancel_rx, Some(sink_tx)).await {
        Ok(result) => {
            let json = serde_json::to_string_pretty(&result).expect("BenchmarkResult always serializes");
            println!("{json}");
        },
        Err(e) => {
            eprintln!("xentd run: {e}");
            std::process::exit(1);
        },
    }
}

fn load_expanded(raw: &str) -> Result<ExpandedXentBenchmarkConfig, String> {
    if let Ok(expanded) = serde_json::from_str::<ExpandedXentBenchmarkConfig>(raw) {
        return Ok(expanded);
    }
    let condensed: CondensedXentBenchmarkConfig = serde_json::from_str(raw).map_err(|e| format!("config is neither a valid expanded nor condensed benchmark config: {e}"))?;
    xent_bench::expand(&condensed).map_err(|e| e.to_string())
}

fn register_default_player(registry: &mut PlayerRegistry) {
    use xent_players::default_player::{DefaultPlayer, Provider, ProviderClient};

    registry
        .register(
            "default",
            std::sync::Arc::new(|cfg: &xent_core::PlayerConfig| {
                let provider_name = cfg.options.get("provider").and_then(|v| v.as_str()).unwrap_or("openai");
                let provider = Provider::from_str_opt(provider_name).ok_or_else(|| xent_core::XentError::Configuration(format!("unknown provider '{provider_name}'")))?;
                let model = cfg.options.get("model").and_then(|v| v.as_str()).unwrap_or("gpt-4o-mini").to_string();
                let api_key_env = cfg.options.get("api_key_env").and_then(|v| v.as_str());
                let api_key = api_key_env.and_then(|name| std::env::var(name).ok());
                let presentation_name = cfg.options.get("presentation").and_then(|v| v.as_str()).unwrap_or("single");
                let presentation = xent_presentation::PresentationRegistry::with_builtins().resolve(presentation_name)?;

                let client = ProviderClient::new(provider, model, api_key);
                Ok(std::sync::Arc::new(DefaultPlayer::new(client, presentation)) as std::sync::Arc<dyn xent_players::Player>)
            }),
        )
        .expect("default player type is not already registered by with_builtins");
}

fn log_lifecycle_event(event: &LifecycleEvent) {
    match event {
        LifecycleEvent::BenchmarkStarted { benchmark_name, unit_count } => {
            tracing::info!(benchmark_name, unit_count, "benchmark started");
        },
        LifecycleEvent::GameMapStarted { unit_id } => tracing::info!(unit_id, "unit started"),
        LifecycleEvent::GameMapFinished { unit_id, failed } => tracing::info!(unit_id, failed, "unit finished"),
        LifecycleEvent::BenchmarkFinished { benchmark_name } => tracing::info!(benchmark_name, "benchmark finished"),
    }
}
