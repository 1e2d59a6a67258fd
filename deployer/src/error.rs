use std::{path::PathBuf, time::Duration};

use ethers::{
    providers::{Middleware, ProviderError},
    types::{Address, H256},
};

#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("artifact for contract {name} not found under {}", .root.display())]
    ArtifactNotFound { name: String, root: PathBuf },

    #[error(
        "there are multiple artifacts for contract {name}, use one of the fully qualified names: {}",
        .candidates.join(", ")
    )]
    AmbiguousArtifact {
        name: String,
        candidates: Vec<String>,
    },

    #[error("malformed artifact {}", .path.display())]
    InvalidArtifact {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("contract {name} bytecode is not valid hex: {reason}")]
    InvalidBytecode { name: String, reason: String },

    #[error("contract {name} has unlinked library references")]
    UnlinkedLibraries { name: String },

    #[error("contract {name} has no creation bytecode, it is abstract or an interface")]
    NotDeployable { name: String },

    #[error("contract {name} constructor expects {expected} argument(s) but none are provided")]
    ConstructorArguments { name: String, expected: usize },

    #[error(transparent)]
    Abi(#[from] ethers::abi::Error),

    #[error("no private key configured and the node has no unlocked accounts")]
    NoSenderAccount,

    #[error(
        "deployment transaction {tx_hash:?} was not confirmed within {timeout:?}, \
         the contract may still be deployed once it is mined"
    )]
    DeploymentTimeout { tx_hash: H256, timeout: Duration },

    #[error("deployment transaction {tx_hash:?} reverted in block {block_number:?}")]
    TransactionReverted {
        tx_hash: H256,
        block_number: Option<u64>,
    },

    #[error("deployment transaction {tx_hash:?} was dropped from the mempool")]
    TransactionDropped { tx_hash: H256 },

    #[error("receipt of deployment transaction {tx_hash:?} has no contract address")]
    MissingContractAddress { tx_hash: H256 },

    #[error("no code at {address:?} after deployment transaction {tx_hash:?}")]
    NoCodeAtAddress { address: Address, tx_hash: H256 },

    #[error(transparent)]
    ProviderError(#[from] ProviderError),

    #[error("Middleware error")]
    Middleware(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl<M> From<tx_sender::Error<M>> for Error
where
    M: Middleware,
    <M as Middleware>::Error: 'static,
{
    fn from(value: tx_sender::Error<M>) -> Self {
        match value {
            tx_sender::Error::ProviderError(e) => Self::ProviderError(e),
            tx_sender::Error::Middleware { e } => Self::Middleware(Box::new(e)),
            tx_sender::Error::Timedout { tx_hash, timeout } => {
                Self::DeploymentTimeout { tx_hash, timeout }
            }
            tx_sender::Error::Dropped { tx_hash } => Self::TransactionDropped { tx_hash },
            tx_sender::Error::Reverted {
                tx_hash,
                block_number,
            } => Self::TransactionReverted {
                tx_hash,
                block_number,
            },
        }
    }
}

/// The deployer result type.
pub type Result<T> = std::result::Result<T, Error>;
