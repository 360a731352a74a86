//! Loading of compiled contract artifacts

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy::{
    json_abi::JsonAbi,
    primitives::{keccak256, Bytes, B256},
};
use serde::Deserialize;

use crate::{constants::JSON_EXTENSION, errors::ScriptError};

/// A compiled contract, as emitted by the build into `<ContractName>.json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// The name of the contract
    pub contract_name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode
    pub bytecode: Bytes,
    /// The runtime bytecode
    pub deployed_bytecode: Bytes,
}

impl Artifact {
    /// The keccak256 hash of the runtime bytecode
    pub fn code_hash(&self) -> B256 {
        keccak256(&self.deployed_bytecode)
    }

    /// Whether the artifact can be deployed, i.e. it is not an interface
    /// or an abstract contract
    pub fn is_deployable(&self) -> bool {
        !self.bytecode.is_empty()
    }
}

/// A directory of compiled artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// The directory holding the artifacts
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store over the given directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The path of the named artifact
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name).with_extension(JSON_EXTENSION)
    }

    /// Load the named artifact
    pub fn load(&self, name: &str) -> Result<Artifact, ScriptError> {
        let path = self.path_of(name);
        let artifact = read_artifact(&path)?;

        if artifact.contract_name != name {
            return Err(ScriptError::ArtifactParsing(format!(
                "{} holds contract `{}`, expected `{name}`",
                path.display(),
                artifact.contract_name
            )));
        }

        Ok(artifact)
    }
}

/// Read and parse an artifact file
fn read_artifact(path: &Path) -> Result<Artifact, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))?;

    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {e}", path.display())))
}
