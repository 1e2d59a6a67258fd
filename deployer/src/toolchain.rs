//! The operations a deployment is made of and their implementation on top of `ethers`.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use auto_impl::auto_impl;
use ethers::{
    prelude::SignerMiddleware,
    providers::{JsonRpcClient, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, H256, U256},
};

use crate::{artifacts::ArtifactStore, factory::ContractFactory, Error, Result};

const DEFAULT_CONFIRMATIONS: usize = 1;
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A deployment transaction the node has accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeployment {
    /// Name of the contract being deployed.
    pub contract_name: String,

    /// Hash of the creation transaction.
    pub tx_hash: H256,
}

/// A contract that is deployed and has code on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    /// Name of the contract.
    pub contract_name: String,

    /// Address the contract lives at.
    pub address: Address,

    /// Hash of the creation transaction.
    pub tx_hash: H256,

    /// Block the creation transaction was included in.
    pub block_number: Option<u64>,
}

/// Everything a deployment needs from the outside world.
#[async_trait]
#[auto_impl(&, Arc, Box)]
pub trait DeploymentToolchain: Send + Sync {
    /// Resolve a compiled contract by name and prepare it for deployment.
    ///
    /// # Arguments
    ///
    /// * `name`: bare or fully qualified contract name
    async fn contract_factory(&self, name: &str) -> Result<ContractFactory>;

    /// Send the creation transaction, returning once the node has accepted it.
    async fn submit_deployment(&self, factory: &ContractFactory) -> Result<PendingDeployment>;

    /// Wait for a submitted creation transaction to be confirmed.
    async fn wait_deployed(&self, pending: PendingDeployment) -> Result<DeployedContract>;
}

/// [`DeploymentToolchain`] talking to a node over JSON-RPC.
///
/// Transactions are signed locally if a wallet is configured, otherwise they are sent
/// from the first account the node has unlocked.
#[derive(Debug)]
pub struct EthersToolchain<P> {
    provider: Arc<Provider<P>>,
    artifacts: ArtifactStore,
    wallet: Option<LocalWallet>,
    confirmations: usize,
    poll_interval: Duration,
    confirmation_timeout: Option<Duration>,
    gas_limit: Option<U256>,
}

impl<P: JsonRpcClient> EthersToolchain<P> {
    /// Create a new `EthersToolchain`.
    pub fn new(provider: Arc<Provider<P>>, artifacts: ArtifactStore) -> Self {
        Self {
            provider,
            artifacts,
            wallet: None,
            confirmations: DEFAULT_CONFIRMATIONS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirmation_timeout: None,
            gas_limit: None,
        }
    }

    /// Sign deployment transactions with `wallet`.
    pub fn with_wallet(mut self, wallet: LocalWallet) -> Self {
        self.wallet = Some(wallet);
        self
    }

    /// Number of confirmations to wait for.
    pub fn confirmations(mut self, confirmations: usize) -> Self {
        self.confirmations = confirmations;
        self
    }

    /// How often to poll for the receipt.
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Give up waiting for the receipt after `timeout`, `None` waits forever.
    pub fn confirmation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    /// Send deployments with a fixed gas limit instead of estimating it.
    ///
    /// Estimation simulates the constructor and rejects a reverting deployment before
    /// it is sent; with a fixed limit the transaction is mined and fails on chain.
    pub fn gas_limit(mut self, gas_limit: Option<U256>) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    async fn unlocked_account(&self) -> Result<Address> {
        self.provider
            .get_accounts()
            .await?
            .first()
            .copied()
            .ok_or(Error::NoSenderAccount)
    }
}

#[async_trait]
impl<P: JsonRpcClient + 'static> DeploymentToolchain for EthersToolchain<P> {
    async fn contract_factory(&self, name: &str) -> Result<ContractFactory> {
        let artifact = self.artifacts.find(name)?;

        vlog::debug!(
            "found artifact {} under {}",
            artifact.fully_qualified_name(),
            self.artifacts.root().display()
        );

        ContractFactory::from_artifact(artifact)
    }

    async fn submit_deployment(&self, factory: &ContractFactory) -> Result<PendingDeployment> {
        let mut tx = factory.deployment_tx()?;

        if let Some(gas_limit) = self.gas_limit {
            tx.set_gas(gas_limit);
        }

        let tx_hash = match &self.wallet {
            Some(wallet) => {
                let chain_id = self.provider.get_chainid().await?;
                let wallet = wallet.clone().with_chain_id(chain_id.as_u64());

                vlog::info!("deploying {} from {:?}", factory.name(), wallet.address());

                let signer = SignerMiddleware::new(self.provider.clone(), wallet);
                tx_sender::submit_tx(&signer, tx).await?
            }
            None => {
                let from = self.unlocked_account().await?;

                vlog::info!("deploying {} from unlocked account {from:?}", factory.name());

                tx.set_from(from);
                tx_sender::submit_tx(self.provider.as_ref(), tx).await?
            }
        };

        Ok(PendingDeployment {
            contract_name: factory.name().to_string(),
            tx_hash,
        })
    }

    async fn wait_deployed(&self, pending: PendingDeployment) -> Result<DeployedContract> {
        let tx_hash = pending.tx_hash;

        let receipt = tx_sender::wait_for_receipt(
            self.provider.as_ref(),
            tx_hash,
            self.confirmations,
            self.poll_interval,
            self.confirmation_timeout,
        )
        .await?;

        let address = receipt
            .contract_address
            .ok_or(Error::MissingContractAddress { tx_hash })?;

        let code = self.provider.get_code(address, None).await?;

        if code.is_empty() {
            return Err(Error::NoCodeAtAddress { address, tx_hash });
        }

        Ok(DeployedContract {
            contract_name: pending.contract_name,
            address,
            tx_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
        })
    }
}
