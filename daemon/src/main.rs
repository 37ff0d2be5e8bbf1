//! quorum daemon: deploys a governance pipeline and runs a proposal through it.

use anyhow::Context;
use clap::Parser;
use quorum_governor::VoteChoice;
use quorum_node::{DeployConfig, Deployment};
use quorum_types::{Account, NetworkId};
use quorum_utils::{format_duration, init_tracing, LogFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quorum-daemon", about = "Token-weighted governance with a timelock")]
struct Cli {
    /// Network to deploy on: "live", "test", or "dev".
    /// When a config file is provided, defaults to the file's network value.
    #[arg(long, env = "QUORUM_NETWORK")]
    network: Option<String>,

    /// Quorum as a percentage of total supply at the snapshot.
    #[arg(long, env = "QUORUM_PERCENTAGE")]
    quorum_percentage: Option<u8>,

    /// Blocks between proposing and the vote snapshot.
    #[arg(long, env = "QUORUM_VOTING_DELAY")]
    voting_delay: Option<u64>,

    /// Blocks the vote stays open.
    #[arg(long, env = "QUORUM_VOTING_PERIOD")]
    voting_period: Option<u64>,

    /// Seconds a queued batch waits in the timelock.
    #[arg(long, env = "QUORUM_MIN_DELAY")]
    min_delay: Option<u64>,

    /// Restrict execution to these accounts (comma-separated labels or 0x addresses).
    #[arg(long, env = "QUORUM_EXECUTORS", value_delimiter = ',')]
    executors: Vec<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "QUORUM_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "QUORUM_LOG_FORMAT")]
    log_format: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Deploy, propose storing a value, vote it through, queue and execute.
    Run {
        /// Value the proposal stores in the governed box.
        #[arg(long, default_value_t = 5)]
        value: u128,

        /// Proposal description; part of the proposal id.
        #[arg(long, default_value = "Proposal #1: Store 1 in the Box!")]
        description: String,

        /// How the deployer votes: "for", "against" or "abstain".
        #[arg(long, default_value = "for")]
        support: String,

        /// Print a JSON summary instead of the step-by-step log.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match cli.config {
        Some(ref path) => {
            let path_str = path.to_str().context("config path is not valid UTF-8")?;
            DeployConfig::from_toml_file(path_str)
                .with_context(|| format!("loading {}", path.display()))?
        }
        None => DeployConfig::default(),
    };
    let config = merge(base, &cli);

    init_tracing(config.log_format, &config.log_level);
    if let Some(ref path) = cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }
    config.validate()?;

    match cli.command {
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run {
            value,
            description,
            support,
            json,
        } => {
            let choice = VoteChoice::parse(&support)
                .with_context(|| format!("unknown vote choice {support:?}"))?;
            let summary = run(config, value, &description, choice, !json)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
    }
    Ok(())
}

/// CLI flags and env vars override file values.
fn merge(file_cfg: DeployConfig, cli: &Cli) -> DeployConfig {
    DeployConfig {
        network: cli
            .network
            .as_deref()
            .map(NetworkId::parse)
            .unwrap_or(file_cfg.network),
        quorum_percentage: cli.quorum_percentage.unwrap_or(file_cfg.quorum_percentage),
        voting_delay: cli.voting_delay.unwrap_or(file_cfg.voting_delay),
        voting_period: cli.voting_period.unwrap_or(file_cfg.voting_period),
        min_delay: cli.min_delay.unwrap_or(file_cfg.min_delay),
        open_executor: file_cfg.open_executor && cli.executors.is_empty(),
        executors: if cli.executors.is_empty() {
            file_cfg.executors.clone()
        } else {
            cli.executors.clone()
        },
        log_format: cli
            .log_format
            .as_deref()
            .map(LogFormat::parse)
            .unwrap_or(file_cfg.log_format),
        log_level: cli.log_level.clone().unwrap_or(file_cfg.log_level.clone()),
        ..file_cfg
    }
}

/// Run the scripted scenario and return a summary of the outcome.
fn run(
    config: DeployConfig,
    value: u128,
    description: &str,
    choice: VoteChoice,
    verbose: bool,
) -> anyhow::Result<serde_json::Value> {
    macro_rules! step {
        ($($arg:tt)*) => {
            if verbose {
                println!($($arg)*);
            }
        };
    }

    tracing::info!(
        network = config.network.as_str(),
        quorum_percentage = config.quorum_percentage,
        voting_delay = config.voting_delay,
        voting_period = config.voting_period,
        min_delay = %format_duration(config.min_delay),
        "deploying governance pipeline"
    );
    let executor = match config.executor_accounts()?.first() {
        Some(account) => *account,
        None => Account::from_label("executor"),
    };
    let mut d = Deployment::bootstrap(config)?;
    let deployer = d.deployer();

    step!("token      {}", d.token().address());
    step!("timelock   {}", d.timelock().address());
    step!("governor   {}", d.governor().address());
    step!("box        {}", d.value_store());
    step!(
        "checkpoints for deployer: {}",
        d.token().num_checkpoints(&deployer)
    );

    let id = d.propose_store(&deployer, value, description)?;
    step!("proposal   {id}");
    step!("state      {}", d.proposal_state(&id)?);
    step!("snapshot   {}", d.governor().proposal_snapshot(&id)?);
    step!("deadline   {}", d.governor().proposal_deadline(&id)?);

    let delay = d.config().voting_delay + 1;
    d.mine(delay);
    step!("state      {}", d.proposal_state(&id)?);

    let weight = d.cast_vote_with_reason(&deployer, &id, choice, Some("scripted vote".into()))?;
    step!("voted      {choice} with {weight}");

    let period = d.config().voting_period;
    d.mine(period);
    let state = d.proposal_state(&id)?;
    step!("state      {state}");
    if state != quorum_governor::ProposalState::Succeeded {
        step!("proposal did not pass; box still holds {}", d.stored_value());
        return Ok(summary(&d, &id, state));
    }

    d.queue(&id)?;
    step!("state      {}", d.proposal_state(&id)?);
    if let Some(eta) = d.governor().proposal_eta(&id)? {
        let wait = eta.as_secs().saturating_sub(d.context().timestamp.as_secs());
        d.warp(wait);
    }
    d.execute(&executor, &id)?;
    let state = d.proposal_state(&id)?;
    step!("state      {state}");
    step!("box value  {}", d.stored_value());
    Ok(summary(&d, &id, state))
}

fn summary(
    d: &Deployment,
    id: &quorum_types::ProposalId,
    state: quorum_governor::ProposalState,
) -> serde_json::Value {
    let tally = d.governor().proposal_votes(id).unwrap_or_default();
    serde_json::json!({
        "network": d.config().network.as_str(),
        "proposal": id.to_string(),
        "state": state.as_str(),
        "votes": {
            "for": tally.for_votes.to_string(),
            "against": tally.against.to_string(),
            "abstain": tally.abstain.to_string(),
        },
        "box_value": d.stored_value().to_string(),
        "height": d.context().height.get(),
    })
}
