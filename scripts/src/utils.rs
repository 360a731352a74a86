//! Utilities for the deploy scripts.

use std::{process::Command, str::FromStr};

use alloy::{
    dyn_abi::DynSolValue,
    network::Ethereum,
    primitives::Bytes,
    providers::{DynProvider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use tool_utils::run_command_output;

use crate::{
    artifacts::Artifact,
    client::AlloyClient,
    constants::{GIT_COMMAND, GIT_HEAD_ARGS},
    errors::ScriptError,
};

/// The provider type used by the scripts, signing with the deployer's key
pub type Wallet = DynProvider<Ethereum>;

/// Sets up the signer and the client with which to deploy and call contracts
pub fn setup_client(
    priv_key: &str,
    rpc_url: &str,
) -> Result<(AlloyClient, PrivateKeySigner), ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    let provider = ProviderBuilder::new().wallet(signer.clone()).connect_http(url);

    Ok((AlloyClient::new(DynProvider::new(provider)), signer))
}

/// ABI-encode constructor arguments, empty if the constructor takes none
pub fn encode_constructor_args(args: Vec<DynSolValue>) -> Vec<u8> {
    if args.is_empty() {
        return Vec::new();
    }

    DynSolValue::Tuple(args).abi_encode_params()
}

/// The creation code of the artifact followed by its encoded constructor
/// arguments
pub fn creation_code(artifact: &Artifact, args: Vec<DynSolValue>) -> Result<Bytes, ScriptError> {
    if !artifact.is_deployable() {
        return Err(ScriptError::ContractDeployment(format!(
            "`{}` has no creation bytecode",
            artifact.contract_name
        )));
    }

    let mut code = artifact.bytecode.to_vec();
    code.extend(encode_constructor_args(args));
    Ok(code.into())
}

/// The commit hash of the working tree the scripts are run from
pub fn current_git_hash() -> Result<String, ScriptError> {
    let mut cmd = Command::new(GIT_COMMAND);
    cmd.args(GIT_HEAD_ARGS);

    run_command_output(cmd).map_err(|e| ScriptError::ExternalCommand(e.to_string()))
}
