//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use alloy::signers::Signer;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::{
    abi_store::LocalAbiStore,
    artifacts::ArtifactStore,
    client::AlloyClient,
    commands::{deploy_infrastructure, show_plan, upload_abis, DeployContext},
    config::Configurator,
    constants::{DEFAULT_ABI_DIR, DEFAULT_ARTIFACTS_DIR, DEFAULT_RPC_URL},
    errors::ScriptError,
    utils::{current_git_hash, setup_client},
};

/// Deploy and wire the wallet infrastructure contracts
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Arguments shared by every command
#[derive(Args, Clone)]
pub struct GlobalArgs {
    /// Private key of the deployer, required by commands that send transactions
    #[arg(short, long, env = "PKEY")]
    pub priv_key: Option<String>,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Network name. Integrations missing from the test network are skipped on `test`
    #[arg(short, long, env = "NETWORK")]
    pub network: String,

    /// Path to the JSON deployment config
    #[arg(short, long, env = "DEPLOY_CONFIG")]
    pub config: PathBuf,

    /// Directory holding the compiled contract artifacts
    #[arg(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// Root directory of the ABI store
    #[arg(long, env = "ABI_DIR", default_value = DEFAULT_ABI_DIR)]
    pub abi_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deploy the infrastructure contracts and filters, then hand them over
    /// to the multisig
    DeployInfrastructure,
    /// Print the filter plan for the network without sending transactions
    ShowPlan,
    /// Upload the ABIs of the infrastructure contracts in the config
    UploadAbis,
}

impl Command {
    pub async fn run(self, args: GlobalArgs) -> Result<(), ScriptError> {
        let configurator = Configurator::load(&args.config)?;

        match self {
            Command::ShowPlan => show_plan(&configurator, &args.network),
            Command::DeployInfrastructure => {
                let mut ctx = setup_context(args, configurator)?;
                deploy_infrastructure(&mut ctx).await
            }
            Command::UploadAbis => {
                let artifacts = ArtifactStore::new(args.artifacts);
                let abi_store = LocalAbiStore::new(args.abi_dir);
                upload_abis(&configurator, &artifacts, &abi_store).await
            }
        }
    }
}

/// Build the context for commands that send transactions
fn setup_context(
    args: GlobalArgs,
    configurator: Configurator,
) -> Result<DeployContext<AlloyClient, LocalAbiStore>, ScriptError> {
    let priv_key = args.priv_key.as_deref().ok_or_else(|| {
        ScriptError::ClientInitialization("a deployer private key is required".to_string())
    })?;
    let (client, signer) = setup_client(priv_key, &args.rpc_url)?;
    info!(
        "Deploying from {} to network `{}`",
        signer.address(),
        args.network
    );

    Ok(DeployContext {
        client,
        signer,
        configurator,
        artifacts: ArtifactStore::new(args.artifacts),
        abi_store: LocalAbiStore::new(args.abi_dir),
        network: args.network,
        git_commit: current_git_hash()?,
    })
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;
    use clap::CommandFactory;
    use temp_dir::TempDir;

    use super::*;
    use crate::{
        test_utils::{write_deployment_artifacts, write_sample_config},
        types::InfrastructureContract,
    };

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_show_plan_without_key() {
        let cli = Cli::try_parse_from([
            "deploy-infrastructure",
            "--network",
            "test",
            "--config",
            "config/test.json",
            "show-plan",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::ShowPlan));
        assert_eq!(cli.global.network, "test");
        assert_eq!(cli.global.artifacts, PathBuf::from(DEFAULT_ARTIFACTS_DIR));
    }

    #[tokio::test]
    async fn test_upload_abis_without_key() {
        let dir = TempDir::new().unwrap();
        let config_path = write_sample_config(dir.path());
        let artifacts_dir = dir.child("artifacts");
        std::fs::create_dir_all(&artifacts_dir).unwrap();
        write_deployment_artifacts(&artifacts_dir);

        let mut configurator = Configurator::load(&config_path).unwrap();
        let deployed = InfrastructureContract::ALL.map(|c| (c, Address::with_last_byte(0x42)));
        configurator.update_infrastructure_addresses(&deployed).unwrap();
        configurator.save().unwrap();

        let abi_dir = dir.child("abi");
        let cli = Cli::try_parse_from([
            "deploy-infrastructure",
            "--network",
            "mainnet",
            "--config",
            config_path.to_str().unwrap(),
            "--artifacts",
            artifacts_dir.to_str().unwrap(),
            "--abi-dir",
            abi_dir.to_str().unwrap(),
            "upload-abis",
        ])
        .unwrap();

        cli.command.run(cli.global).await.unwrap();
        for contract in InfrastructureContract::ALL {
            let path = LocalAbiStore::new(&abi_dir).path_of(contract.artifact_name(), "contracts");
            assert!(path.exists(), "missing {}", path.display());
        }
    }
}
