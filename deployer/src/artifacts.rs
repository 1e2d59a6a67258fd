//! Lookup of compiled contract artifacts in a Hardhat-style artifacts tree.
//!
//! Artifacts live at `<root>/<sourceName>/<ContractName>.json`, e.g.
//! `artifacts/contracts/LoanStreamChain.sol/LoanStreamChain.json`. A contract is
//! requested either by its bare name or by its fully qualified name
//! `contracts/LoanStreamChain.sol:LoanStreamChain`.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use ethers::abi::Abi;
use serde::Deserialize;

use crate::{Error, Result};

const BUILD_INFO_DIR: &str = "build-info";

/// A compiled contract as emitted by the compiler toolchain.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Name of the contract.
    pub contract_name: String,

    /// Path of the source file the contract is defined in.
    pub source_name: String,

    /// Contract ABI.
    pub abi: Abi,

    /// Hex encoded creation code, may contain library placeholders.
    pub bytecode: String,

    /// Libraries that have to be linked into `bytecode` before deployment.
    #[serde(default)]
    pub link_references: BTreeMap<String, serde_json::Value>,
}

impl Artifact {
    /// `<sourceName>:<contractName>`
    pub fn fully_qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }
}

/// Artifacts directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store over the artifacts tree at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root of the artifacts tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the artifact of a contract by bare or fully qualified name.
    pub fn find(&self, name: &str) -> Result<Artifact> {
        match name.rsplit_once(':') {
            Some((source_name, contract_name)) => {
                self.find_qualified(name, source_name, contract_name)
            }
            None => self.find_by_name(name),
        }
    }

    fn find_qualified(
        &self,
        name: &str,
        source_name: &str,
        contract_name: &str,
    ) -> Result<Artifact> {
        let path = self
            .root
            .join(source_name)
            .join(format!("{contract_name}.json"));

        if !path.is_file() {
            return Err(self.not_found(name));
        }

        let artifact = read_artifact(&path)?;

        if artifact.contract_name != contract_name || artifact.source_name != source_name {
            return Err(self.not_found(name));
        }

        Ok(artifact)
    }

    fn find_by_name(&self, name: &str) -> Result<Artifact> {
        let file_name = format!("{name}.json");
        let mut paths = vec![];

        collect_files(&self.root, &file_name, &mut paths)?;

        let mut artifacts = vec![];
        for path in paths {
            let artifact = read_artifact(&path)?;
            if artifact.contract_name == name {
                artifacts.push(artifact);
            }
        }

        match artifacts.len() {
            0 => Err(self.not_found(name)),
            1 => Ok(artifacts.remove(0)),
            _ => {
                let mut candidates: Vec<_> = artifacts
                    .iter()
                    .map(Artifact::fully_qualified_name)
                    .collect();
                candidates.sort();

                Err(Error::AmbiguousArtifact {
                    name: name.to_string(),
                    candidates,
                })
            }
        }
    }

    fn not_found(&self, name: &str) -> Error {
        Error::ArtifactNotFound {
            name: name.to_string(),
            root: self.root.clone(),
        }
    }
}

// `<Name>.dbg.json` files never match `file_name`, so only real artifacts are collected.
fn collect_files(dir: &Path, file_name: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type()?.is_dir() {
            if entry.file_name() != BUILD_INFO_DIR {
                collect_files(&path, file_name, out)?;
            }
        } else if entry.file_name().to_str() == Some(file_name) {
            out.push(path);
        }
    }

    Ok(())
}

fn read_artifact(path: &Path) -> Result<Artifact> {
    let contents = fs::read_to_string(path)?;

    serde_json::from_str(&contents).map_err(|source| Error::InvalidArtifact {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{fs, path::Path};

    use pretty_assertions::assert_eq;

    use super::ArtifactStore;
    use crate::Error;

    // Creation code of a contract whose runtime code returns 42.
    pub(crate) const ANSWER_BYTECODE: &str = "0x600a600c600039600a6000f3602a60005260206000f3";

    pub(crate) fn write_artifact(root: &Path, source_name: &str, contract_name: &str, json: &str) {
        let dir = root.join(source_name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{contract_name}.json")), json).unwrap();
    }

    pub(crate) fn artifact_json(source_name: &str, contract_name: &str) -> String {
        serde_json::json!({
            "_format": "hh-sol-artifact-1",
            "contractName": contract_name,
            "sourceName": source_name,
            "abi": [],
            "bytecode": ANSWER_BYTECODE,
            "deployedBytecode": "0x602a60005260206000f3",
            "linkReferences": {},
            "deployedLinkReferences": {}
        })
        .to_string()
    }

    #[test]
    fn finds_artifact_by_bare_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = "contracts/LoanStreamChain.sol";
        write_artifact(
            dir.path(),
            source,
            "LoanStreamChain",
            &artifact_json(source, "LoanStreamChain"),
        );
        fs::write(
            dir.path().join(source).join("LoanStreamChain.dbg.json"),
            r#"{"_format": "hh-sol-dbg-1", "buildInfo": "../../build-info/abc.json"}"#,
        )
        .unwrap();

        let artifact = ArtifactStore::new(dir.path())
            .find("LoanStreamChain")
            .unwrap();

        assert_eq!(artifact.contract_name, "LoanStreamChain");
        assert_eq!(
            artifact.fully_qualified_name(),
            "contracts/LoanStreamChain.sol:LoanStreamChain"
        );
        assert_eq!(artifact.bytecode, ANSWER_BYTECODE);
    }

    #[test]
    fn finds_artifact_by_qualified_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = "contracts/Loans.sol";
        write_artifact(dir.path(), source, "Stream", &artifact_json(source, "Stream"));

        let artifact = ArtifactStore::new(dir.path())
            .find("contracts/Loans.sol:Stream")
            .unwrap();

        assert_eq!(artifact.source_name, source);
    }

    #[test]
    fn missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("artifacts"));

        match store.find("LoanStreamChain").unwrap_err() {
            Error::ArtifactNotFound { name, root } => {
                assert_eq!(name, "LoanStreamChain");
                assert_eq!(root, dir.path().join("artifacts"));
            }
            e => panic!("Expected ArtifactNotFound error {e:?}"),
        }

        assert!(matches!(
            store.find("contracts/Missing.sol:Missing"),
            Err(Error::ArtifactNotFound { .. })
        ));
    }

    #[test]
    fn same_name_in_two_sources_is_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        for source in ["contracts/b/Token.sol", "contracts/a/Token.sol"] {
            write_artifact(dir.path(), source, "Token", &artifact_json(source, "Token"));
        }

        match ArtifactStore::new(dir.path()).find("Token").unwrap_err() {
            Error::AmbiguousArtifact { name, candidates } => {
                assert_eq!(name, "Token");
                assert_eq!(
                    candidates,
                    vec![
                        "contracts/a/Token.sol:Token".to_string(),
                        "contracts/b/Token.sol:Token".to_string(),
                    ]
                );
            }
            e => panic!("Expected AmbiguousArtifact error {e:?}"),
        }
    }

    #[test]
    fn build_info_is_not_searched() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "build-info", "Token", "not json");

        assert!(matches!(
            ArtifactStore::new(dir.path()).find("Token"),
            Err(Error::ArtifactNotFound { .. })
        ));
    }

    #[test]
    fn malformed_artifact() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "contracts/Token.sol", "Token", "{\"abi\": 1}");

        assert!(matches!(
            ArtifactStore::new(dir.path()).find("Token"),
            Err(Error::InvalidArtifact { .. })
        ));
    }
}
