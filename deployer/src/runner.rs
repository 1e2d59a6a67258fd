//! One-shot deployment of a single contract.
//!
//! Factory lookup, submission and confirmation happen strictly in this order and the
//! first error ends the run. On success exactly one line with the contract address is
//! written to `out`, on failure the error report is written to `err`.

use std::{io::Write, process::ExitCode};

use ethers::utils::to_checksum;

use crate::{toolchain::DeployedContract, DeploymentToolchain, Result};

/// How a deployment run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Contract deployed and its address printed.
    Success,
    /// Something failed, the error was printed.
    Failure,
}

impl Outcome {
    /// Process exit status for this outcome.
    pub fn code(self) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::Failure => 1,
        }
    }
}

impl From<Outcome> for ExitCode {
    fn from(value: Outcome) -> Self {
        ExitCode::from(value.code())
    }
}

/// Deploy `contract_name` and wait until it is confirmed.
pub async fn deploy<T>(toolchain: &T, contract_name: &str) -> Result<DeployedContract>
where
    T: DeploymentToolchain,
{
    vlog::info!("requesting contract factory for {contract_name}");

    let factory = toolchain.contract_factory(contract_name).await?;

    let pending = toolchain.submit_deployment(&factory).await?;

    vlog::info!(
        "deployment transaction {:?} submitted, waiting for confirmation",
        pending.tx_hash
    );

    let deployed = toolchain.wait_deployed(pending).await?;

    vlog::info!(
        "{} deployed in block {:?}",
        deployed.contract_name,
        deployed.block_number
    );

    Ok(deployed)
}

/// Run a deployment, print its result and map it to an [`Outcome`].
pub async fn run<T, O, E>(toolchain: &T, contract_name: &str, out: &mut O, err: &mut E) -> Outcome
where
    T: DeploymentToolchain,
    O: Write,
    E: Write,
{
    let res = match deploy(toolchain, contract_name).await {
        Ok(deployed) => writeln!(
            out,
            "{} contract deployed to: {}",
            deployed.contract_name,
            to_checksum(&deployed.address, None)
        )
        .map_err(eyre::Report::from),
        Err(e) => Err(eyre::Report::from(e)),
    };

    match res {
        Ok(()) => Outcome::Success,
        Err(report) => {
            // nothing left to report to if stderr is gone
            let _ = writeln!(err, "{report:?}");
            Outcome::Failure
        }
    }
}
