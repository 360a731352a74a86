//! Implementations of the various deploy scripts

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
};
use futures::future::try_join_all;
use tracing::info;

use crate::{
    abi_store::{AbiStore, AbiUpload},
    artifacts::ArtifactStore,
    client::{read_call, send_call, ChainClient},
    config::Configurator,
    constants::{
        ABI_UPLOAD_PREFIX, DEFAULT_REGISTRY_ID, INITIAL_DAPP_REGISTRY_TIMELOCK, PROXY_ARTIFACT,
    },
    errors::ScriptError,
    filters::{
        build_filter_plan, AddressBook, AddressRef, FilterDeployment, OnChainLookup, PlanStep,
        Registration,
    },
    multisig::MultisigExecutor,
    solidity::{IArgentWalletDetector, IAugustusSwapper, IDappRegistry, IManaged, IScdMcdMigration},
    types::InfrastructureContract,
    utils::creation_code,
};

/// Everything a deployment run needs: the chain client, the config and the
/// stores
pub struct DeployContext<C: ChainClient, S: AbiStore> {
    /// The client, sending from the deployer's account
    pub client: C,
    /// The deployer's key
    pub signer: PrivateKeySigner,
    /// The deployment config
    pub configurator: Configurator,
    /// The compiled artifacts
    pub artifacts: ArtifactStore,
    /// Where ABIs are uploaded
    pub abi_store: S,
    /// The network name
    pub network: String,
    /// The commit recorded in the saved config
    pub git_commit: String,
}

impl<C: ChainClient, S: AbiStore> DeployContext<C, S> {
    /// Deploy the artifact with the given name
    async fn deploy(&self, name: &str, args: Vec<DynSolValue>) -> Result<Address, ScriptError> {
        let artifact = self.artifacts.load(name)?;
        let code = creation_code(&artifact, args)?;
        self.client.deploy(name, code).await
    }
}

// -------------------------
// | Deploy Infrastructure |
// -------------------------

/// Deploy the wallet infrastructure, register the dapp filters, hand the
/// contracts over to the multisig and persist the result
pub async fn deploy_infrastructure<C: ChainClient, S: AbiStore>(
    ctx: &mut DeployContext<C, S>,
) -> Result<(), ScriptError> {
    let config = ctx.configurator.config().clone();
    // Fail before sending anything if the plan cannot be built
    let plan = build_filter_plan(&config, &ctx.network)?;
    let proxy_code = ctx.artifacts.load(PROXY_ARTIFACT)?.code_hash();

    let detector = config.contracts.argent_wallet_detector;
    let multisig = MultisigExecutor::new(
        &ctx.client,
        config.contracts.multi_sig_wallet,
        ctx.signer.clone(),
        config.multisig.autosign,
    );

    // --- Infrastructure --- //

    let base_wallet = ctx
        .deploy(InfrastructureContract::BaseWallet.artifact_name(), vec![])
        .await?;

    info!("Adding wallet code");
    multisig
        .execute_call(detector, IArgentWalletDetector::addCodeCall { code: proxy_code })
        .await?;
    info!("Adding wallet implementation");
    multisig
        .execute_call(
            detector,
            IArgentWalletDetector::addImplementationCall {
                implementation: base_wallet,
            },
        )
        .await?;

    let wallet_factory = ctx
        .deploy(
            InfrastructureContract::WalletFactory.artifact_name(),
            vec![
                DynSolValue::Address(base_wallet),
                DynSolValue::Address(config.modules.guardian_storage),
                DynSolValue::Address(config.backend.refund_collector),
            ],
        )
        .await?;

    let dapp_registry = ctx
        .deploy(
            InfrastructureContract::DappRegistry.artifact_name(),
            vec![DynSolValue::Uint(
                U256::from(INITIAL_DAPP_REGISTRY_TIMELOCK),
                64,
            )],
        )
        .await?;

    let multicall_helper = ctx
        .deploy(
            InfrastructureContract::MultiCallHelper.artifact_name(),
            vec![
                DynSolValue::Address(config.modules.transfer_storage),
                DynSolValue::Address(dapp_registry),
            ],
        )
        .await?;

    let token_registry = ctx
        .deploy(InfrastructureContract::TokenRegistry.artifact_name(), vec![])
        .await?;

    let deployed = [
        (InfrastructureContract::BaseWallet, base_wallet),
        (InfrastructureContract::WalletFactory, wallet_factory),
        (InfrastructureContract::DappRegistry, dapp_registry),
        (InfrastructureContract::MultiCallHelper, multicall_helper),
        (InfrastructureContract::TokenRegistry, token_registry),
    ];

    // --- Filters --- //

    let mut book = AddressBook::default();
    for (contract, address) in deployed {
        book.record_deployment(contract.to_string(), address);
    }

    for step in &plan.steps {
        execute_plan_step(ctx, dapp_registry, &mut book, step).await?;
    }

    let timelock = config.settings.timelock_period;
    info!("Setting Timelock to {timelock}");
    send_call(
        &ctx.client,
        dapp_registry,
        IDappRegistry::requestTimelockChangeCall {
            newTimelockPeriod: timelock,
        },
    )
    .await?;
    send_call(
        &ctx.client,
        dapp_registry,
        IDappRegistry::confirmTimelockChangeCall {},
    )
    .await?;
    info!("Timelock changed.");

    // --- Managers and owners --- //

    for account in &config.backend.accounts {
        info!("Setting {account} as the manager of the WalletFactory");
        send_call(
            &ctx.client,
            wallet_factory,
            IManaged::addManagerCall { manager: *account },
        )
        .await?;
        info!("Setting {account} as the manager of the TokenRegistry");
        send_call(
            &ctx.client,
            token_registry,
            IManaged::addManagerCall { manager: *account },
        )
        .await?;
    }

    let owner = multisig.address();
    info!("Setting the MultiSig as the owner of the WalletFactory");
    send_call(
        &ctx.client,
        wallet_factory,
        IManaged::changeOwnerCall { newOwner: owner },
    )
    .await?;
    info!("Setting the MultiSig as the owner of the TokenRegistry");
    send_call(
        &ctx.client,
        token_registry,
        IManaged::changeOwnerCall { newOwner: owner },
    )
    .await?;
    info!("Setting the MultiSig as the owner of the default registry");
    send_call(
        &ctx.client,
        dapp_registry,
        IDappRegistry::changeOwnerCall {
            registryId: DEFAULT_REGISTRY_ID,
            newRegistryOwner: owner,
        },
    )
    .await?;

    // --- Persist --- //

    ctx.configurator.update_infrastructure_addresses(&deployed)?;
    ctx.configurator.update_git_hash(&ctx.git_commit)?;
    info!("Saving new config");
    ctx.configurator.save()?;

    info!("Uploading ABIs");
    upload_infrastructure_abis(&ctx.artifacts, &ctx.abi_store, &deployed).await
}

/// Execute a single step of the filter plan
async fn execute_plan_step<C: ChainClient, S: AbiStore>(
    ctx: &DeployContext<C, S>,
    dapp_registry: Address,
    book: &mut AddressBook,
    step: &PlanStep,
) -> Result<(), ScriptError> {
    match step {
        PlanStep::Deploy(FilterDeployment {
            label,
            artifact,
            args,
        }) => {
            info!("Deploying {label}");
            for r in args.iter().filter_map(|a| a.address_ref()) {
                ensure_resolved(&ctx.client, book, r).await?;
            }
            let values = args
                .iter()
                .map(|a| a.to_sol_value(book))
                .collect::<Result<Vec<_>, _>>()?;

            let address = ctx.deploy(artifact, values).await?;
            book.record_deployment(label.clone(), address);
        }
        PlanStep::Register(Registration {
            description,
            dapp,
            filter,
        }) => {
            ensure_resolved(&ctx.client, book, dapp).await?;
            let dapp = book.get(dapp)?;
            let filter = book.get(filter)?;

            info!("Adding filter {filter} for {description} at {dapp}");
            send_call(
                &ctx.client,
                dapp_registry,
                IDappRegistry::addDappCall {
                    registryId: DEFAULT_REGISTRY_ID,
                    dapp,
                    filter,
                },
            )
            .await?;
        }
    }

    Ok(())
}

/// Perform the on-chain lookup behind a reference, if it has not been done yet
async fn ensure_resolved<C: ChainClient>(
    client: &C,
    book: &mut AddressBook,
    r: &AddressRef,
) -> Result<(), ScriptError> {
    let AddressRef::Lookup(lookup) = r else {
        return Ok(());
    };
    if book.has_lookup(lookup) {
        return Ok(());
    }

    let address = match *lookup {
        OnChainLookup::ParaswapTokenTransferProxy(augustus) => {
            read_call(
                client,
                augustus,
                IAugustusSwapper::getTokenTransferProxyCall {},
            )
            .await?
        }
        OnChainLookup::MakerDaiJoin(migration) => {
            read_call(client, migration, IScdMcdMigration::daiJoinCall {}).await?
        }
        OnChainLookup::MakerVat(migration) => {
            read_call(client, migration, IScdMcdMigration::vatCall {}).await?
        }
    };

    info!("Resolved {lookup} to {address}");
    book.record_lookup(*lookup, address);
    Ok(())
}

// ---------------
// | Upload ABIs |
// ---------------

/// Upload the ABIs of the infrastructure contracts already in the config
pub async fn upload_abis<S: AbiStore>(
    configurator: &Configurator,
    artifacts: &ArtifactStore,
    abi_store: &S,
) -> Result<(), ScriptError> {
    let contracts = &configurator.config().contracts;
    let deployed = InfrastructureContract::ALL
        .into_iter()
        .map(|contract| {
            contracts
                .infrastructure_address(contract)
                .map(|address| (contract, address))
                .ok_or_else(|| {
                    ScriptError::InvalidConfig(format!("`contracts.{contract}` is not set"))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    upload_infrastructure_abis(artifacts, abi_store, &deployed).await
}

/// Upload the ABIs of the given infrastructure contracts concurrently
async fn upload_infrastructure_abis<S: AbiStore>(
    artifacts: &ArtifactStore,
    abi_store: &S,
    deployed: &[(InfrastructureContract, Address)],
) -> Result<(), ScriptError> {
    let uploads = deployed
        .iter()
        .map(|(contract, address)| {
            let artifact = artifacts.load(contract.artifact_name())?;
            Ok(AbiUpload {
                contract_name: artifact.contract_name,
                address: *address,
                abi: artifact.abi,
            })
        })
        .collect::<Result<Vec<_>, ScriptError>>()?;

    try_join_all(
        uploads
            .iter()
            .map(|upload| abi_store.upload(upload, ABI_UPLOAD_PREFIX)),
    )
    .await?;

    Ok(())
}

// -------------
// | Show Plan |
// -------------

/// Log the filter plan for the network without touching the chain
pub fn show_plan(configurator: &Configurator, network: &str) -> Result<(), ScriptError> {
    let plan = build_filter_plan(configurator.config(), network)?;

    info!("Filter plan for network `{network}`:");
    for (i, step) in plan.steps.iter().enumerate() {
        info!("{:>3}. {step}", i + 1);
    }
    info!(
        "{} filter deployments, {} registrations",
        plan.deployments().count(),
        plan.registrations().count()
    );

    Ok(())
}
