mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use lookout_client::RespStatusClient;
use lookout_spectator::Spectator;
use tracing::info;

use crate::config::LookoutConfig;

#[derive(Parser)]
#[command(name = "lookout", about = "cluster topology spectator")]
struct Args {
    /// path to TOML configuration file
    #[arg(short = 'c', long, env = "LOOKOUT_CONFIG")]
    config: Option<PathBuf>,

    /// print default configuration as TOML and exit
    #[arg(long)]
    config_template: bool,

    /// comma-separated seed addresses (host:port)
    #[arg(long, env = "LOOKOUT_SEEDS", value_delimiter = ',')]
    seeds: Vec<String>,

    /// region whose nodes vote on failures
    #[arg(long, env = "LOOKOUT_LOCAL_REGION")]
    local_region: Option<String>,

    /// milliseconds between reconciliation passes
    #[arg(long, env = "LOOKOUT_INTERVAL_MS")]
    interval_ms: Option<u64>,

    /// milliseconds any single node query may take
    #[arg(long, env = "LOOKOUT_CALL_TIMEOUT_MS")]
    call_timeout_ms: Option<u64>,

    /// password for nodes that require AUTH
    #[arg(long, env = "LOOKOUT_AUTH_PASS")]
    auth_pass: Option<String>,
}

/// Applies CLI overrides to a `LookoutConfig`. Only values actually given
/// on the command line or in the environment take effect.
fn apply_args(cfg: &mut LookoutConfig, args: &Args) {
    if !args.seeds.is_empty() {
        cfg.seeds = args.seeds.clone();
    }
    if let Some(ref region) = args.local_region {
        cfg.local_region = region.clone();
    }
    if let Some(v) = args.interval_ms {
        cfg.interval_ms = v;
    }
    if let Some(v) = args.call_timeout_ms {
        cfg.call_timeout_ms = v;
    }
    if let Some(ref pass) = args.auth_pass {
        cfg.auth_pass = pass.clone();
    }
}

/// Prints `msg` to stderr and exits with code 1.
fn exit_err(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lookout=info".into()),
        )
        .init();

    let args = Args::parse();

    if args.config_template {
        match LookoutConfig::default().to_toml() {
            Ok(toml) => {
                println!("{toml}");
                std::process::exit(0);
            }
            Err(e) => exit_err(format!("failed to generate config template: {e}")),
        }
    }

    let mut cfg = match &args.config {
        Some(path) => LookoutConfig::from_file(path).unwrap_or_else(|e| exit_err(e)),
        None => LookoutConfig::default(),
    };
    apply_args(&mut cfg, &args);
    if let Err(e) = cfg.validate() {
        exit_err(format!("error: {e}"));
    }

    let client = match cfg.auth_pass() {
        Some(pass) => RespStatusClient::with_password(pass),
        None => RespStatusClient::new(),
    };

    info!(
        seeds = cfg.seeds.len(),
        region = %cfg.local_region,
        interval_ms = cfg.interval_ms,
        "lookout starting"
    );

    let spectator = Spectator::new(Arc::new(client), cfg.seeds.clone(), cfg.spectator_config());
    spectator
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await;
}
