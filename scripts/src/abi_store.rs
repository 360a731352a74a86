//! Upload of contract ABIs to the store read by the backend

use std::path::PathBuf;

use alloy::{json_abi::JsonAbi, primitives::Address};
use async_trait::async_trait;
use serde::Serialize;
use tokio::fs;
use tracing::info;

use crate::{constants::JSON_EXTENSION, errors::ScriptError};

/// The document uploaded for each contract
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiUpload {
    /// The name of the contract
    pub contract_name: String,
    /// The deployed address
    pub address: Address,
    /// The contract ABI
    pub abi: JsonAbi,
}

/// A store of contract ABIs
#[async_trait]
pub trait AbiStore: Send + Sync {
    /// Upload the ABI of a deployed contract under the given prefix
    async fn upload(&self, upload: &AbiUpload, prefix: &str) -> Result<(), ScriptError>;
}

/// An ABI store backed by a local directory, laid out as
/// `<root>/<prefix>/<ContractName>.json`
#[derive(Debug, Clone)]
pub struct LocalAbiStore {
    root: PathBuf,
}

impl LocalAbiStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The path an upload is written to
    pub fn path_of(&self, contract_name: &str, prefix: &str) -> PathBuf {
        self.root
            .join(prefix)
            .join(contract_name)
            .with_extension(JSON_EXTENSION)
    }
}

#[async_trait]
impl AbiStore for LocalAbiStore {
    async fn upload(&self, upload: &AbiUpload, prefix: &str) -> Result<(), ScriptError> {
        let path = self.path_of(&upload.contract_name, prefix);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| ScriptError::AbiUpload(format!("{}: {e}", dir.display())))?;
        }

        let contents = serde_json::to_string_pretty(upload)
            .map_err(|e| ScriptError::AbiUpload(e.to_string()))?;
        fs::write(&path, contents)
            .await
            .map_err(|e| ScriptError::AbiUpload(format!("{}: {e}", path.display())))?;

        info!("Uploaded {} ABI to {}", upload.contract_name, path.display());
        Ok(())
    }
}
