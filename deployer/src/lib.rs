#![deny(unused_crate_dependencies)]
#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![warn(unused_imports)]

//! Deployment of precompiled contracts.
//!
//! [`runner::run`] drives a deployment through a [`DeploymentToolchain`]:
//! the artifact is looked up and validated, the creation transaction is submitted
//! and the runner waits for it to be confirmed. [`EthersToolchain`] implements the
//! toolchain over a JSON-RPC node.

mod error;

pub mod artifacts;
pub mod factory;
pub mod runner;
pub mod toolchain;

pub use artifacts::{Artifact, ArtifactStore};
pub use error::{Error, Result};
pub use factory::ContractFactory;
pub use runner::Outcome;
pub use toolchain::{DeployedContract, DeploymentToolchain, EthersToolchain, PendingDeployment};
