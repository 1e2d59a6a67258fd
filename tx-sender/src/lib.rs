#![deny(unused_crate_dependencies)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![warn(unused_imports)]

//! Sending a transaction and waiting for it to be mined.
//!
//! Submission and the receipt wait are separate steps so that callers can log or
//! persist the transaction hash in between. Neither step retries.

use std::time::Duration;

use ethers::{
    providers::{Middleware, PendingTransaction},
    types::{transaction::eip2718::TypedTransaction, TransactionReceipt, H256, U64},
};

mod error;

pub use error::{Error, Result};

/// Fill and send a transaction, returning its hash as soon as the node accepts it.
///
/// # Arguments
///
/// * `m`: [`Middleware`] to perform requests with
/// * `tx`: Transaction to be sent
pub async fn submit_tx<M, T>(m: &M, tx: T) -> Result<H256, M>
where
    M: Middleware,
    T: Into<TypedTransaction> + Send + Sync,
{
    let mut submit_tx = tx.into();

    m.fill_transaction(&mut submit_tx, None)
        .await
        .map_err(|e| Error::Middleware { e })?;

    let sent_tx = m
        .send_transaction(submit_tx, None)
        .await
        .map_err(|e| Error::Middleware { e })?;

    let tx_hash = sent_tx.tx_hash();

    vlog::debug!("transaction {tx_hash:?} accepted by the node");

    Ok(tx_hash)
}

/// Wait until a sent transaction is mined and has enough confirmations.
///
/// # Arguments
///
/// * `m`: [`Middleware`] whose provider is polled for the receipt
/// * `tx_hash`: Hash of the transaction
/// * `confirmations`: Number of blocks, including the inclusion block, to wait for
/// * `interval`: Receipt polling interval
/// * `timeout`: Give up after this long; `None` waits for as long as it takes
pub async fn wait_for_receipt<M>(
    m: &M,
    tx_hash: H256,
    confirmations: usize,
    interval: Duration,
    timeout: Option<Duration>,
) -> Result<TransactionReceipt, M>
where
    M: Middleware,
{
    let pending = PendingTransaction::new(tx_hash, m.provider())
        .confirmations(confirmations)
        .interval(interval);

    let receipt = match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, pending).await {
            Ok(res) => res?,
            Err(_e) => {
                vlog::info!("waiting for mined transaction {tx_hash:?} timed out");
                return Err(Error::Timedout { tx_hash, timeout });
            }
        },
        None => pending.await?,
    };

    let receipt = receipt.ok_or(Error::Dropped { tx_hash })?;

    if receipt.status == Some(U64::zero()) {
        return Err(Error::Reverted {
            tx_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
        });
    }

    Ok(receipt)
}
