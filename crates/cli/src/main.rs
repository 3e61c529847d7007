use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use tendersim_config::Config;
use tendersim_consensus::{TimeoutConfig, Validator};
use tendersim_gossip::FabricBuilder;

#[derive(Parser, Debug)]
#[command(name = "tsim", about = "A Tendermint-family consensus simulator")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Launch a validator set and run consensus for a bounded interval.
    Run {
        /// Path to a TOML config file describing the validator set and
        /// timing; the built-in four-validator demo is used if omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the run duration, in seconds.
        #[arg(long)]
        duration: Option<u64>,

        /// Increase log verbosity (-v, -vv). Honors RUST_LOG if set.
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    match args.command {
        Command::Run {
            config,
            duration,
            verbose,
        } => {
            init_logging(verbose);
            run(config, duration).await
        }
    }
}

async fn run(config_path: Option<PathBuf>, duration_override: Option<u64>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => Config::from_file(&path)
            .wrap_err_with(|| format!("loading config from {}", path.display()))?,
        None => Config::demo(),
    };

    if let Some(secs) = duration_override {
        config.run_duration = Duration::from_secs(secs);
    }

    let timeouts = TimeoutConfig {
        propose_base_ms: config.timing.propose_base_ms,
        prevote_base_ms: config.timing.prevote_base_ms,
        precommit_base_ms: config.timing.precommit_base_ms,
        delta_ms: config.timing.delta_ms,
    };

    let mut builder = FabricBuilder::new()
        .delay_range(config.timing.gossip_min_delay_ms, config.timing.gossip_max_delay_ms);

    let mut inboxes = HashMap::new();
    for v in &config.validators {
        let inbox = builder.register(v.id.clone(), v.voting_power)?;
        inboxes.insert(v.id.clone(), inbox);
    }
    let fabric = builder.build()?;

    let (stop_tx, stop_rx) = watch::channel(false);

    let mut handles = Vec::with_capacity(config.validators.len());
    for v in &config.validators {
        let id = v.id.clone();
        let inbox = inboxes.remove(&id).expect("every validator was registered above");
        let mut validator = Validator::new(id, fabric.clone(), timeouts);
        let stop_rx = stop_rx.clone();
        handles.push(tokio::spawn(async move {
            validator.run(inbox, stop_rx).await;
        }));
    }

    tracing::info!(
        validators = config.validators.len(),
        duration = ?config.run_duration,
        "simulator started"
    );

    tokio::time::sleep(config.run_duration).await;
    let _ = stop_tx.send(true);

    for handle in handles {
        let _ = handle.await;
    }

    tracing::info!("simulator stopped");
    Ok(())
}
