//! Definitions of errors that can occur during the execution of the deploy scripts

use thiserror::Error;

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Error reading the deployment config
    #[error("error reading config: {0}")]
    ReadConfig(String),
    /// Error writing the deployment config
    #[error("error writing config: {0}")]
    WriteConfig(String),
    /// The deployment config is missing a value required by the run
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// Error parsing a compilation artifact
    #[error("error parsing artifact: {0}")]
    ArtifactParsing(String),
    /// Error initializing the RPC client
    #[error("error initializing client: {0}")]
    ClientInitialization(String),
    /// Error constructing calldata or constructor arguments
    #[error("error constructing calldata: {0}")]
    CalldataConstruction(String),
    /// Error deploying a contract
    #[error("error deploying contract: {0}")]
    ContractDeployment(String),
    /// Error calling a contract method
    #[error("error interacting with contract: {0}")]
    ContractInteraction(String),
    /// Error collecting or producing multisig signatures
    #[error("error signing multisig transaction: {0}")]
    MultisigSigning(String),
    /// Error uploading a contract ABI
    #[error("error uploading ABI: {0}")]
    AbiUpload(String),
    /// Error running an external command
    #[error("error running command: {0}")]
    ExternalCommand(String),
}
