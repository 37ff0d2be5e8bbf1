//! Deployment configuration with TOML file support.

use serde::{Deserialize, Serialize};

use quorum_governor::GovernorSettings;
use quorum_types::{Account, NetworkId};
use quorum_utils::LogFormat;

use crate::NodeError;

/// Parameters for one governance deployment.
///
/// Can be loaded from a TOML file via [`DeployConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Token amounts are in whole
/// tokens and scaled by the token's decimals at deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Which network the deployment targets.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Account that deploys and receives the initial supply. A `0x` address
    /// or a label.
    #[serde(default = "default_deployer")]
    pub deployer: String,

    #[serde(default = "default_token_name")]
    pub token_name: String,

    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,

    /// Whole tokens minted to the deployer.
    #[serde(default = "default_initial_supply")]
    pub initial_supply: u64,

    /// Share of total supply that must vote (0-100).
    #[serde(default = "default_quorum_percentage")]
    pub quorum_percentage: u8,

    /// Blocks between proposing and the vote snapshot.
    #[serde(default = "default_voting_delay")]
    pub voting_delay: u64,

    /// Blocks the vote stays open.
    #[serde(default = "default_voting_period")]
    pub voting_period: u64,

    /// Whole tokens of voting power needed to propose.
    #[serde(default)]
    pub proposal_threshold: u64,

    /// Seconds a queued batch waits in the timelock.
    #[serde(default = "default_min_delay")]
    pub min_delay: u64,

    /// Seconds after the eta a queued batch may still be executed. 0 = no limit.
    #[serde(default = "default_grace_period")]
    pub grace_period: u64,

    /// Blocks after the deadline a succeeded proposal may still be queued.
    #[serde(default = "default_queue_window")]
    pub queue_window: u64,

    /// Seconds between mined blocks on the local chain.
    #[serde(default = "default_block_time_secs")]
    pub block_time_secs: u64,

    /// Let any account execute ready operations.
    #[serde(default = "default_true")]
    pub open_executor: bool,

    /// Accounts granted the executor role.
    #[serde(default)]
    pub executors: Vec<String>,

    /// Account allowed to cancel any proposal that is not final.
    #[serde(default)]
    pub guardian: Option<String>,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_network() -> NetworkId {
    NetworkId::Dev
}

fn default_deployer() -> String {
    "deployer".to_string()
}

fn default_token_name() -> String {
    "GovernanceToken".to_string()
}

fn default_token_symbol() -> String {
    "GT".to_string()
}

fn default_initial_supply() -> u64 {
    1_000_000
}

fn default_quorum_percentage() -> u8 {
    4
}

fn default_voting_delay() -> u64 {
    1
}

fn default_voting_period() -> u64 {
    5
}

fn default_min_delay() -> u64 {
    1
}

fn default_grace_period() -> u64 {
    1_209_600
}

fn default_queue_window() -> u64 {
    50_400
}

fn default_block_time_secs() -> u64 {
    12
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DeployConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Reject parameter combinations no deployment should run with.
    pub fn validate(&self) -> Result<(), NodeError> {
        if self.quorum_percentage > 100 {
            return Err(NodeError::Config(format!(
                "quorum_percentage must be 0-100, got {}",
                self.quorum_percentage
            )));
        }
        if self.voting_period == 0 {
            return Err(NodeError::Config("voting_period must be greater than zero".into()));
        }
        if self.min_delay == 0 && !self.network.allows_zero_delay() {
            return Err(NodeError::Config(format!(
                "min_delay must be greater than zero on the {} network",
                self.network.as_str()
            )));
        }
        if self.block_time_secs == 0 {
            return Err(NodeError::Config("block_time_secs must be greater than zero".into()));
        }
        if !self.open_executor && self.executors.is_empty() {
            return Err(NodeError::Config(
                "executor role is closed and no executors are configured".into(),
            ));
        }
        self.deployer_account()?;
        self.executor_accounts()?;
        self.guardian_account()?;
        Ok(())
    }

    pub fn deployer_account(&self) -> Result<Account, NodeError> {
        resolve_account(&self.deployer)
    }

    pub fn executor_accounts(&self) -> Result<Vec<Account>, NodeError> {
        self.executors.iter().map(|s| resolve_account(s)).collect()
    }

    pub fn guardian_account(&self) -> Result<Option<Account>, NodeError> {
        self.guardian.as_deref().map(resolve_account).transpose()
    }

    /// Governor parameters, with token amounts scaled by `unit`.
    pub fn governor_settings(&self, unit: u128) -> Result<GovernorSettings, NodeError> {
        Ok(GovernorSettings {
            voting_delay: self.voting_delay,
            voting_period: self.voting_period,
            quorum_percentage: self.quorum_percentage,
            proposal_threshold: u128::from(self.proposal_threshold).saturating_mul(unit),
            queue_window: self.queue_window,
            guardian: self.guardian_account()?,
        })
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            deployer: default_deployer(),
            token_name: default_token_name(),
            token_symbol: default_token_symbol(),
            initial_supply: default_initial_supply(),
            quorum_percentage: default_quorum_percentage(),
            voting_delay: default_voting_delay(),
            voting_period: default_voting_period(),
            proposal_threshold: 0,
            min_delay: default_min_delay(),
            grace_period: default_grace_period(),
            queue_window: default_queue_window(),
            block_time_secs: default_block_time_secs(),
            open_executor: default_true(),
            executors: Vec::new(),
            guardian: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}

/// A `0x`-prefixed address, or a label hashed into an account.
pub fn resolve_account(s: &str) -> Result<Account, NodeError> {
    if s.starts_with("0x") {
        s.parse()
            .map_err(|e| NodeError::Config(format!("bad account {s}: {e}")))
    } else if s.is_empty() {
        Err(NodeError::Config("empty account label".into()))
    } else {
        Ok(Account::from_label(s))
    }
}
