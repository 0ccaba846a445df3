// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Main entry point for the egress guard
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use egress_guard::config::Config;
use egress_guard::engine::decision::{DecisionEngine, SimulatedDeliverer};
use egress_guard::engine::dlp::DlpScanner;
use egress_guard::engine_core::audit::JsonlSink;
use egress_guard::engine_core::models::PolicyDefinition;
use egress_guard::engine_core::store::ChunkStore;
use egress_guard::server;
use egress_guard::utils::policy_validator::PolicyValidator;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to policy YAML file
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Listen address (host:port)
    #[arg(long)]
    listen: Option<String>,

    /// Path to the durable audit JSONL file
    #[arg(long)]
    audit_log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config and init tracing
    let mut config = Config::from_env().unwrap_or_else(|e| {
        eprintln!(
            "Warning: Failed to load config from env, using defaults: {}",
            e
        );
        Config::default()
    });

    // CLI flags override environment
    if let Some(p) = cli.policy {
        config.policy_path = Some(p);
    }
    if let Some(addr) = cli.listen {
        config.listen_addr = addr;
    }
    if let Some(p) = cli.audit_log {
        config.audit_log_path = p;
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Failed to init tracing: {}", e);
    }

    let policy = match &config.policy_path {
        Some(path) => {
            let policy = PolicyDefinition::load(path)?;
            info!(path = %path.display(), "loaded policy");
            policy
        }
        None => {
            warn!("no policy configured, running with permissive defaults");
            PolicyDefinition::default()
        }
    };
    PolicyValidator::validate(&policy)?;

    let mut store = ChunkStore::new(config.max_chunks_per_session);
    match JsonlSink::open(&config.audit_log_path) {
        Ok(sink) => {
            info!(path = %config.audit_log_path.display(), "durable audit log enabled");
            store = store.with_sink(Box::new(sink));
        }
        Err(e) => {
            warn!(
                path = %config.audit_log_path.display(),
                error = %e,
                "cannot open durable audit log, continuing in-memory only"
            );
        }
    }

    let engine = Arc::new(DecisionEngine::new(
        Arc::new(store),
        Arc::new(policy),
        DlpScanner::new()?,
        Arc::new(SimulatedDeliverer),
    ));

    info!("Starting egress guard");
    server::serve(engine, &config.listen_addr).await
}

fn init_tracing(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("egress_guard=debug,info"));

    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);

    if config.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
