//! FaaS controller process.
//!
//! # Architecture Overview
//!
//! ```text
//!   faas.toml ──▶ loader ──▶ validation ──▶ Supervisor::reconcile
//!       ▲                                         │
//!       │ notify / SIGHUP                         ▼
//!   ConfigWatcher                    ┌──────────────────────────┐
//!                                    │ FaaSController (gen N)   │
//!                                    │   └─ Worker              │
//!   client ──▶ httpServer listener ──┼──▶ dispatch ──▶ Knative  │
//!                                    └──────────────────────────┘
//!   operator ──▶ admin API ──▶ statuses, kinds, default specs
//! ```

use clap::Parser;
use std::path::PathBuf;

use faas_controller::config::watcher::ConfigWatcher;
use faas_controller::config::load_config;
use faas_controller::lifecycle::signals::{next_signal, ProcessSignal};
use faas_controller::lifecycle::startup::build_registry;
use faas_controller::observability::logging::init_logging;
use faas_controller::Runtime;

#[derive(Parser)]
#[command(name = "faas-controller")]
#[command(about = "Supervises FaaS provider integrations", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "faas.toml")]
    config: PathBuf,

    /// Do not reload when the configuration file changes.
    #[arg(long)]
    no_watch: bool,

    /// Print the default spec of a kind (kind, name or alias) and exit.
    #[arg(long, value_name = "KIND")]
    default_spec: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let registry = build_registry();

    if let Some(kind) = args.default_spec {
        let entry = registry.lookup(&kind)?;
        println!("{}", toml::to_string_pretty(&entry.default_spec())?);
        return Ok(());
    }

    let config = load_config(&args.config)?;
    init_logging(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        objects = config.objects.len(),
        "faas-controller starting"
    );

    let runtime = Runtime::start(&config, registry).await?;

    let (watcher, mut updates) = ConfigWatcher::new(&args.config);
    let _watcher = if args.no_watch {
        None
    } else {
        match watcher.run() {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::warn!(error = %e, "Config watcher unavailable, reload on SIGHUP only");
                None
            }
        }
    };

    loop {
        tokio::select! {
            Some(new_config) = updates.recv() => {
                runtime.apply(new_config).await;
            }
            signal = next_signal() => match signal? {
                ProcessSignal::Shutdown => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
                ProcessSignal::Reload => match load_config(&args.config) {
                    Ok(new_config) => {
                        runtime.apply(new_config).await;
                    }
                    Err(e) => tracing::error!(
                        "Failed to reload config: {}. Keeping current configuration.",
                        e
                    ),
                },
            },
        }
    }

    runtime.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
