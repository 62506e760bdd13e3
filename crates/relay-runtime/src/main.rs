//! # ledger-relay
//!
//! Operator CLI over the persistent actor ledgers.
//!
//! ```text
//! ledger-relay history --actor 0xabc [--status pending] [--limit 10]
//! ledger-relay status  --actor 0xabc --local-id <ID>
//! ledger-relay resume  [--actor 0xabc]
//! ledger-relay clear   --actor 0xabc
//! ```
//!
//! Configuration comes from `RELAY_*` environment variables; logging from
//! `RUST_LOG` (default `info`), written to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lr_02_transaction_ledger::TransactionLedger;
use lr_03_submission_gateway::{AuthorizeError, Authorizer, LedgerCall, SignedSubmission};
use relay_runtime::adapters::{JsonRpcLedgerClient, RocksDbConfig, RocksDbStore};
use relay_runtime::{load_config, HistoryEntry, OperationTracker, RelayConfig};
use shared_types::{ActorId, LocalId, OperationStatus};

#[derive(Debug, Parser)]
#[command(name = "ledger-relay", version, about = "Submission and confirmation tracking for an external ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print an actor's operation history, newest first.
    History {
        /// Actor identity (account address).
        #[arg(long)]
        actor: String,
        /// Only show this status.
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Maximum rows.
        #[arg(long)]
        limit: Option<usize>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Print one operation record.
    Status {
        /// Actor identity.
        #[arg(long)]
        actor: String,
        /// Local id of the operation.
        #[arg(long)]
        local_id: String,
    },
    /// Re-poll every operation left pending. All actors when none is given.
    Resume {
        /// Actor identity.
        #[arg(long)]
        actor: Option<String>,
    },
    /// Delete an actor's history.
    Clear {
        /// Actor identity.
        #[arg(long)]
        actor: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Submitting,
    Pending,
    Confirmed,
    Failed,
}

impl From<StatusArg> for OperationStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Submitting => OperationStatus::PendingSubmit,
            StatusArg::Pending => OperationStatus::PendingConfirm,
            StatusArg::Confirmed => OperationStatus::Confirmed,
            StatusArg::Failed => OperationStatus::Failed,
        }
    }
}

/// The CLI never submits; signing lives with the wallet.
struct NoSigner;

#[async_trait]
impl Authorizer for NoSigner {
    async fn authorize(
        &self,
        _actor: &ActorId,
        _call: &LedgerCall,
    ) -> Result<SignedSubmission, AuthorizeError> {
        Err(AuthorizeError::Unavailable("no signer attached to the CLI".into()))
    }
}

fn build_tracker(config: RelayConfig, store: RocksDbStore) -> OperationTracker {
    let ledger = Arc::new(TransactionLedger::new(store, config.ledger.clone()));
    let rpc = Arc::new(
        JsonRpcLedgerClient::new(config.rpc_url.clone(), config.rpc_timeout)
            .with_retry(config.retry),
    );
    OperationTracker::new(ledger, Arc::new(NoSigner), rpc.clone(), rpc, config)
}

fn print_entry(entry: &HistoryEntry) {
    println!(
        "{:<36}  {:<18}  {:<10}  {:<14}  {}",
        entry.local_id.as_str(),
        entry.kind_label,
        entry.status_label,
        entry.short_hash.as_deref().unwrap_or("-"),
        entry
            .error
            .as_ref()
            .map(|e| format!("{}: {}", e.title, e.message))
            .or_else(|| entry.explorer_url.clone())
            .unwrap_or_default(),
    );
}

async fn resume(tracker: &OperationTracker, actors: Vec<ActorId>) -> Result<()> {
    let mut resumed = Vec::new();
    for actor in actors {
        let ids = tracker
            .resume(&actor)
            .await
            .with_context(|| format!("Failed to resume {}", actor))?;
        resumed.extend(ids.into_iter().map(|id| (actor.clone(), id)));
    }
    if resumed.is_empty() {
        println!("Nothing pending.");
        return Ok(());
    }
    info!(count = resumed.len(), "Waiting for pending operations");

    for (actor, local_id) in resumed {
        let session = tracker.monitor().wait(&local_id).await;
        let record = tracker.get(&actor, &local_id)?;
        println!(
            "{}  {}  monitor={:?}  status={}",
            actor,
            local_id,
            session.map(|s| s.state),
            record.map(|r| r.status.label()).unwrap_or("missing"),
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config();
    config.validate().context("Invalid configuration")?;

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;
    let store = RocksDbStore::open(RocksDbConfig {
        path: config.data_dir.clone(),
        ..Default::default()
    })
    .context("Failed to open ledger store")?;
    let known_actors = store.actors().context("Failed to list actors")?;

    let tracker = build_tracker(config, store);

    match cli.command {
        Command::History {
            actor,
            status,
            limit,
            json,
        } => {
            let actor = ActorId::new(actor);
            let mut entries = tracker.get_history(&actor, status.map(Into::into))?;
            if let Some(limit) = limit {
                entries.truncate(limit);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                entries.iter().for_each(print_entry);
            }
        }
        Command::Status { actor, local_id } => {
            let actor = ActorId::new(actor);
            let local_id = LocalId::from(local_id);
            match tracker.get(&actor, &local_id)? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => anyhow::bail!("No operation {} for {}", local_id, actor),
            }
        }
        Command::Resume { actor } => {
            let actors = match actor {
                Some(actor) => vec![ActorId::new(actor)],
                None => known_actors,
            };
            tokio::select! {
                result = resume(&tracker, actors) => result?,
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted; pending operations stay pending");
                }
            }
            tracker.shutdown();
        }
        Command::Clear { actor } => {
            let actor = ActorId::new(actor);
            tracker.clear(&actor)?;
            println!("Cleared history for {}", actor);
        }
    }

    Ok(())
}
