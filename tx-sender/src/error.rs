use std::{fmt::Debug, time::Duration};

use ethers::{
    providers::{Middleware, ProviderError},
    types::H256,
};

#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error<M>
where
    M: Middleware,
{
    #[error(transparent)]
    ProviderError(#[from] ProviderError),

    #[error("Middleware error {e}")]
    Middleware { e: <M as Middleware>::Error },

    #[error("transaction {tx_hash:?} was not mined within {timeout:?}")]
    Timedout { tx_hash: H256, timeout: Duration },

    #[error("transaction {tx_hash:?} was dropped from the mempool")]
    Dropped { tx_hash: H256 },

    #[error("transaction {tx_hash:?} reverted in block {block_number:?}")]
    Reverted {
        tx_hash: H256,
        block_number: Option<u64>,
    },
}

/// The crate result type.
pub type Result<T, M> = std::result::Result<T, Error<M>>;
