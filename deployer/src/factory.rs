//! Deployable contracts built from artifacts.

use ethers::{
    abi::Abi,
    types::{transaction::eip2718::TypedTransaction, Bytes, Eip1559TransactionRequest},
};

use crate::{artifacts::Artifact, Error, Result};

// Solidity marks unresolved library addresses with `__$<hash>$__`.
const LIBRARY_PLACEHOLDER: &str = "__$";

/// A contract that is ready to be deployed without constructor arguments.
#[derive(Debug, Clone)]
pub struct ContractFactory {
    name: String,
    abi: Abi,
    bytecode: Bytes,
}

impl ContractFactory {
    /// Check that the artifact can be deployed as is and build a factory for it.
    pub fn from_artifact(artifact: Artifact) -> Result<Self> {
        let name = artifact.contract_name;

        if !artifact.link_references.is_empty() || artifact.bytecode.contains(LIBRARY_PLACEHOLDER)
        {
            return Err(Error::UnlinkedLibraries { name });
        }

        let bytecode = match artifact.bytecode.parse::<Bytes>() {
            Ok(bytecode) => bytecode,
            Err(e) => {
                return Err(Error::InvalidBytecode {
                    name,
                    reason: e.to_string(),
                })
            }
        };

        if bytecode.is_empty() {
            return Err(Error::NotDeployable { name });
        }

        if let Some(constructor) = artifact.abi.constructor() {
            if !constructor.inputs.is_empty() {
                return Err(Error::ConstructorArguments {
                    name,
                    expected: constructor.inputs.len(),
                });
            }
        }

        Ok(Self {
            name,
            abi: artifact.abi,
            bytecode,
        })
    }

    /// Name of the contract.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Contract ABI.
    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Creation code.
    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Contract creation transaction. Sender, nonce, gas and fees are left for the
    /// middleware to fill.
    pub fn deployment_tx(&self) -> Result<TypedTransaction> {
        let data: Bytes = match self.abi.constructor() {
            Some(constructor) => constructor.encode_input(self.bytecode.to_vec(), &[])?.into(),
            None => self.bytecode.clone(),
        };

        Ok(Eip1559TransactionRequest::new().data(data).into())
    }
}
