use std::{fmt, fs, path::Path, path::PathBuf, time::Duration};

use envconfig::Envconfig;
use ethers::signers::LocalWallet;
use serde::Deserialize;
use url::Url;

use crate::error::Error;

fn default_rpc_url() -> Url {
    Url::parse("http://127.0.0.1:8545").expect("valid url literal; qed")
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_contract_name() -> String {
    "LoanStreamChain".to_string()
}

fn default_confirmations() -> usize {
    1
}

fn default_poll_interval_ms() -> u64 {
    1000
}

/// Network, account and deployment settings.
#[derive(Deserialize, Envconfig)]
pub(crate) struct Config {
    /// JSON-RPC endpoint of the node to deploy to.
    #[envconfig(from = "DEPLOYER_RPC_URL", default = "http://127.0.0.1:8545")]
    #[serde(default = "default_rpc_url")]
    pub rpc_url: Url,

    /// Hex encoded key to sign with, the node's unlocked account is used if unset.
    #[envconfig(from = "DEPLOYER_PRIVATE_KEY")]
    pub private_key: Option<String>,

    #[envconfig(from = "DEPLOYER_ARTIFACTS_DIR", default = "artifacts")]
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,

    #[envconfig(from = "DEPLOYER_CONTRACT_NAME", default = "LoanStreamChain")]
    #[serde(default = "default_contract_name")]
    pub contract_name: String,

    #[envconfig(from = "DEPLOYER_CONFIRMATIONS", default = "1")]
    #[serde(default = "default_confirmations")]
    pub confirmations: usize,

    #[envconfig(from = "DEPLOYER_POLL_INTERVAL_MS", default = "1000")]
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Unset waits for the deployment to be mined for as long as it takes.
    #[envconfig(from = "DEPLOYER_CONFIRMATION_TIMEOUT_SECS")]
    pub confirmation_timeout_secs: Option<u64>,

    /// Fixed gas limit for the deployment, estimated by the node if unset.
    #[envconfig(from = "DEPLOYER_GAS_LIMIT")]
    pub gas_limit: Option<u64>,

    /// Reported as the Sentry environment.
    #[envconfig(from = "DEPLOYER_NETWORK_NAME")]
    pub network_name: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("artifacts_dir", &self.artifacts_dir)
            .field("contract_name", &self.contract_name)
            .field("confirmations", &self.confirmations)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("confirmation_timeout_secs", &self.confirmation_timeout_secs)
            .field("gas_limit", &self.gas_limit)
            .field("network_name", &self.network_name)
            .finish()
    }
}

impl Config {
    pub(crate) fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(config_path)?;

        let config: Config = toml::from_str(&contents)?;

        Ok(config)
    }

    pub(crate) fn wallet(&self) -> Result<Option<LocalWallet>, Error> {
        let Some(key) = self.private_key.as_deref() else {
            return Ok(None);
        };

        let key = key.trim();
        let wallet = key.strip_prefix("0x").unwrap_or(key).parse::<LocalWallet>()?;

        Ok(Some(wallet))
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub(crate) fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }
}
