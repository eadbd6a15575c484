//! stakesync daemon: reconcile a wallet's staking state from the command line.

mod config;

use anyhow::Context;
use bigdecimal::BigDecimal;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use stakesync_manager::{
    InMemoryStateRepository, JsonFileStateRepository, StakingManager, StateRepository,
};
use stakesync_provider::HttpStakingProvider;
use stakesync_types::{PendingActionType, StakingAction, StakingActionType};
use stakesync_utils::{init_tracing, LogFormat};

use crate::config::DaemonConfig;

#[derive(Parser)]
#[command(name = "stakesync", about = "Staking state reconciliation daemon")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "STAKESYNC_CONFIG", default_value = "stakesync.toml")]
    config: PathBuf,

    /// Provider API key (overrides the config file).
    #[arg(long, env = "STAKESYNC_API_KEY")]
    api_key: Option<String>,

    /// Provider base URL (overrides the config file).
    #[arg(long, env = "STAKESYNC_BASE_URL")]
    base_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "STAKESYNC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "STAKESYNC_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Snapshot file kept between runs (overrides the config file).
    #[arg(long, env = "STAKESYNC_STATE_FILE")]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Reconcile once and print the resulting state.
    State {
        /// Skip fetching the wallet's pending actions.
        #[arg(long)]
        skip_actions: bool,
    },
    /// Reconcile periodically and print every state change until interrupted.
    Watch,
    /// Estimate the network fee of an action.
    EstimateFee {
        #[command(flatten)]
        action: ActionArgs,
    },
    /// Build the unsigned transactions of an action and print them as JSON.
    Build {
        #[command(flatten)]
        action: ActionArgs,
    },
}

#[derive(clap::Args)]
struct ActionArgs {
    /// Action kind: "stake", "unstake", or a pending kind such as "claim-rewards" or "withdraw".
    #[arg(long)]
    kind: String,

    /// Amount in whole token units.
    #[arg(long)]
    amount: String,

    /// Validator address.
    #[arg(long)]
    target: Option<String>,

    /// Provider passthrough of the balance the pending action applies to. Repeatable.
    #[arg(long = "passthrough")]
    passthroughs: Vec<String>,
}

impl ActionArgs {
    fn to_action(&self) -> anyhow::Result<StakingAction> {
        let amount = BigDecimal::from_str(&self.amount)
            .with_context(|| format!("invalid amount {:?}", self.amount))?;
        Ok(StakingAction {
            amount,
            target_address: self.target.clone(),
            action_type: parse_action_type(&self.kind, &self.passthroughs)?,
        })
    }
}

fn parse_action_type(kind: &str, passthroughs: &[String]) -> anyhow::Result<StakingActionType> {
    let single = || -> anyhow::Result<String> {
        match passthroughs {
            [passthrough] => Ok(passthrough.clone()),
            _ => anyhow::bail!("{kind} takes exactly one --passthrough"),
        }
    };
    let multiple = || -> anyhow::Result<Vec<String>> {
        if passthroughs.is_empty() {
            anyhow::bail!("{kind} takes at least one --passthrough");
        }
        Ok(passthroughs.to_vec())
    };

    let pending = match kind {
        "stake" if passthroughs.is_empty() => return Ok(StakingActionType::Stake),
        "unstake" => return Ok(StakingActionType::Unstake),
        "stake" => PendingActionType::Stake { passthrough: single()? },
        "claim-rewards" => PendingActionType::ClaimRewards { passthrough: single()? },
        "restake-rewards" => PendingActionType::RestakeRewards { passthrough: single()? },
        "vote" => PendingActionType::Vote { passthrough: single()? },
        "vote-locked" => PendingActionType::VoteLocked { passthrough: single()? },
        "unlock-locked" => PendingActionType::UnlockLocked { passthrough: single()? },
        "rebond" => PendingActionType::Rebond { passthrough: single()? },
        "restake" => PendingActionType::Restake { passthrough: single()? },
        "withdraw" => PendingActionType::Withdraw { passthroughs: multiple()? },
        "claim-unstaked" => PendingActionType::ClaimUnstaked { passthroughs: multiple()? },
        other => anyhow::bail!("unknown action kind {other:?}"),
    };
    Ok(StakingActionType::Pending(pending))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DaemonConfig::from_toml_file(&cli.config)?;
    if let Some(api_key) = cli.api_key {
        config.provider.api_key = api_key;
    }
    if let Some(base_url) = cli.base_url {
        config.provider.base_url = base_url;
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
    if cli.state_file.is_some() {
        config.state_file = cli.state_file;
    }

    init_tracing(config.log.format, &config.log.level);
    tracing::info!(
        "Loaded config from {} (wallet {} on {})",
        cli.config.display(),
        config.wallet.address,
        config.wallet.item.network,
    );

    let provider = Arc::new(HttpStakingProvider::new(config.provider.clone())?);
    let repository: Arc<dyn StateRepository> = match &config.state_file {
        Some(path) => Arc::new(JsonFileStateRepository::new(path)),
        None => Arc::new(InMemoryStateRepository::new()),
    };
    let interval = config.manager.status_update_interval().max(Duration::from_secs(1));
    let manager = StakingManager::new(
        config.wallet.clone(),
        provider,
        repository,
        config.manager.clone(),
    );

    match cli.command {
        Command::State { skip_actions } => {
            let state = manager.reconcile_with(!skip_actions).await;
            println!("{state}");
            if !state.balances().is_empty() {
                println!("{}", serde_json::to_string_pretty(state.balances())?);
            }
        }
        Command::Watch => {
            let mut states = manager.subscribe_state();
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        manager.reconcile().await;
                    }
                    changed = states.changed() => {
                        changed?;
                        let state = states.borrow_and_update().clone();
                        println!("{state}");
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received, stopping watch");
                        break;
                    }
                }
            }
        }
        Command::EstimateFee { action } => {
            let action = action.to_action()?;
            manager.reconcile().await;
            let fee = manager.estimate_fee(&action).await?;
            println!("{fee}");
        }
        Command::Build { action } => {
            let action = action.to_action()?;
            manager.reconcile().await;
            if let Some(spender) = manager.allowance_address() {
                tracing::warn!("token requires an ERC-20 allowance for {spender} before staking");
            }
            let payload = manager.build_transaction(&action).await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}
