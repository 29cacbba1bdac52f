//! tx-submitter command line.
//!
//! # Commands
//!
//! ```text
//! submit  --message <FILE> --keypair <FILE>...   sign, submit, confirm
//! status  <SIGNATURE>...                         print raw signature statuses
//! ```
//!
//! Settings come from `--config` (TOML) with command line flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use tx_submitter::config::{load_config, EngineConfig};
use tx_submitter::engine::{Confirmation, Engine, ExecuteOptions, ExecutionOutcome};
use tx_submitter::ledger::{
    Keypair, LedgerClient, LedgerConnector, RpcConnector, Signature, Transaction,
};
use tx_submitter::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "tx-submitter")]
#[command(about = "Submit and confirm ledger transactions", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint (overrides ledger.rpc_url)
    #[arg(short = 'u', long, global = true)]
    rpc_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign, submit and optionally confirm a transaction
    Submit {
        /// File holding the base64 serialized message
        #[arg(short, long)]
        message: PathBuf,

        /// Keypair file (JSON byte array or base58 secret); repeatable
        #[arg(short, long = "keypair", required = true)]
        keypairs: Vec<PathBuf>,

        #[arg(long)]
        max_retries: Option<u32>,

        #[arg(long)]
        skip_confirmation: bool,

        /// Confirmation deadline in seconds
        #[arg(long)]
        max_timeout: Option<u64>,

        /// Confirmation count accepted with --no-finalized
        #[arg(long)]
        target: Option<u64>,

        /// Accept a confirmation count instead of finality
        #[arg(long)]
        no_finalized: bool,
    },
    /// Print signature statuses
    Status {
        #[arg(required = true)]
        signatures: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(url) = &cli.rpc_url {
        config.ledger.rpc_url = url.clone();
    }

    logging::init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let connector = RpcConnector::new(Duration::from_secs(config.ledger.request_timeout_secs));

    match cli.command {
        Commands::Submit {
            message,
            keypairs,
            max_retries,
            skip_confirmation,
            max_timeout,
            target,
            no_finalized,
        } => {
            let mut options = ExecuteOptions::from(&config);
            if let Some(max_retries) = max_retries {
                options = options.with_max_retries(max_retries);
            }
            if skip_confirmation {
                options = options.with_skip_confirmation(true);
            }
            if let Some(secs) = max_timeout {
                options = options.with_max_timeout(Duration::from_secs(secs));
            }
            if let Some(target) = target {
                options = options.with_target(target);
            }
            if no_finalized {
                options = options.with_finalized(false);
            }

            let encoded = std::fs::read_to_string(&message)?;
            let mut tx = Transaction::from_base64_message(encoded.trim())?;
            let signers = keypairs
                .iter()
                .map(|path| read_keypair(path))
                .collect::<Result<Vec<_>, _>>()?;

            let engine = Engine::new(connector);
            let outcome = engine
                .execute(&config.ledger.rpc_url, &mut tx, &signers, &options)
                .await?;

            println!("{}", serde_json::to_string_pretty(&summary(&outcome))?);
        }
        Commands::Status { signatures } => {
            let signatures = signatures
                .iter()
                .map(|s| s.parse::<Signature>())
                .collect::<Result<Vec<_>, _>>()?;

            let client = connector.connect(&config.ledger.rpc_url).await?;
            let statuses = client.query_statuses(&signatures).await;
            client.close().await;

            let rows: Vec<Value> = signatures
                .iter()
                .zip(statuses?)
                .map(|(sig, status)| json!({ "signature": sig.to_string(), "status": status }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}

/// Read a keypair stored as a JSON byte array or a base58 string.
fn read_keypair(path: &Path) -> Result<Keypair, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let content = content.trim();

    let keypair = if content.starts_with('[') {
        let bytes: Vec<u8> = serde_json::from_str(content)?;
        Keypair::from_secret_bytes(&bytes)?
    } else {
        Keypair::from_base58_string(content)?
    };
    Ok(keypair)
}

fn summary(outcome: &ExecutionOutcome) -> Value {
    let confirmation = match &outcome.confirmation {
        Confirmation::Skipped => json!({ "state": "skipped" }),
        Confirmation::Confirmed { elapsed, status } => json!({
            "state": "confirmed",
            "elapsed_secs": elapsed.as_secs_f64(),
            "status": status,
        }),
        Confirmation::TimedOut {
            elapsed,
            last_status,
        } => json!({
            "state": "timed_out",
            "elapsed_secs": elapsed.as_secs_f64(),
            "last_status": last_status,
        }),
    };

    json!({
        "signature": outcome.response.signature,
        "signatures": outcome.signatures.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        "attempts": outcome.attempts.len(),
        "confirmation": confirmation,
        "response": outcome.response.raw,
    })
}
