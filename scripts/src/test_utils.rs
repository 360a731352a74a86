//! Helpers shared by the unit tests

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use alloy::{
    primitives::{address, Address, Bytes, U256},
    sol_types::{SolCall, SolValue},
};
use async_trait::async_trait;
use serde_json::json;

use crate::{
    abi_store::{AbiStore, AbiUpload},
    client::ChainClient,
    constants::*,
    errors::ScriptError,
    solidity::{
        IArgentWalletDetector, IAugustusSwapper, IDappRegistry, IManaged, IMultiSigWallet,
        IScdMcdMigration,
    },
    types::InfrastructureContract,
};

/// The token transfer proxy reported by the mocked Augustus swapper
pub(crate) const MOCK_TRANSFER_PROXY: Address =
    address!("0000000000000000000000000000000000000f01");
/// The `daiJoin` reported by the mocked Maker migration
pub(crate) const MOCK_DAI_JOIN: Address = address!("0000000000000000000000000000000000000f02");
/// The `vat` reported by the mocked Maker migration
pub(crate) const MOCK_VAT: Address = address!("0000000000000000000000000000000000000f03");
/// The runtime bytecode written for the `Proxy` artifact
pub(crate) const PROXY_RUNTIME_CODE: &str = "0x363d3d37";

/// Write a minimal artifact with a single `owner()` function
pub(crate) fn write_artifact(dir: &Path, name: &str, bytecode: &str, deployed_bytecode: &str) {
    let artifact = json!({
        "contractName": name,
        "abi": [{
            "type": "function",
            "name": "owner",
            "inputs": [],
            "outputs": [{ "name": "", "type": "address", "internalType": "address" }],
            "stateMutability": "view"
        }],
        "bytecode": bytecode,
        "deployedBytecode": deployed_bytecode,
    });
    fs::write(
        dir.join(format!("{name}.json")),
        serde_json::to_string_pretty(&artifact).unwrap(),
    )
    .unwrap();
}

/// Write deployable artifacts for every contract a run deploys
pub(crate) fn write_deployment_artifacts(dir: &Path) {
    let filters = [
        COMPOUND_FILTER_ARTIFACT,
        PARASWAP_FILTER_ARTIFACT,
        ONLY_APPROVE_FILTER_ARTIFACT,
        AAVE_V2_FILTER_ARTIFACT,
        BALANCER_FILTER_ARTIFACT,
        YEARN_FILTER_ARTIFACT,
        LIDO_FILTER_ARTIFACT,
        CURVE_FILTER_ARTIFACT,
        POT_FILTER_ARTIFACT,
        DAI_JOIN_FILTER_ARTIFACT,
        VAT_FILTER_ARTIFACT,
        UNISWAP_V2_FILTER_ARTIFACT,
        AAVE_V1_LENDING_POOL_FILTER_ARTIFACT,
        AAVE_V1_ATOKEN_FILTER_ARTIFACT,
    ];

    let infrastructure = InfrastructureContract::ALL.map(|c| c.artifact_name());
    for name in infrastructure.into_iter().chain(filters) {
        write_artifact(dir, name, "0x6080", "0x60806040");
    }
    write_artifact(dir, PROXY_ARTIFACT, "0x6080", PROXY_RUNTIME_CODE);
}

/// Write the sample config into the directory, returning its path
pub(crate) fn write_sample_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, sample_config_json()).unwrap();
    path
}

/// A full deployment config, with mainnet-like integrations
pub(crate) fn sample_config_json() -> String {
    let config = json!({
        "env": "staging",
        "contracts": {
            "MultiSigWallet": "0x00000000000000000000000000000000000000a1",
            "ArgentWalletDetector": "0x00000000000000000000000000000000000000a2",
            "KyberNetwork": "0x0000000000000000000000000000000000000099"
        },
        "modules": {
            "GuardianStorage": "0x00000000000000000000000000000000000000b1",
            "TransferStorage": "0x00000000000000000000000000000000000000b2",
            "TokenRegistry": "0x00000000000000000000000000000000000000b3"
        },
        "backend": {
            "refundCollector": "0x00000000000000000000000000000000000000c1",
            "accounts": [
                "0x00000000000000000000000000000000000000c2",
                "0x00000000000000000000000000000000000000c3"
            ]
        },
        "multisig": { "autosign": true },
        "settings": { "timelockPeriod": 604800 },
        "defi": {
            "weth": "0x00000000000000000000000000000000000000d1",
            "compound": {
                "markets": {
                    "0x00000000000000000000000000000000000000e2": "0x00000000000000000000000000000000000000f2",
                    "0x00000000000000000000000000000000000000e1": "0x00000000000000000000000000000000000000f1"
                }
            },
            "paraswap": {
                "contract": "0x0000000000000000000000000000000000000101",
                "uniswapProxy": "0x0000000000000000000000000000000000000102",
                "uniswapForks": [
                    {
                        "factory": "0x0000000000000000000000000000000000000103",
                        "initCode": "0x1111111111111111111111111111111111111111111111111111111111111111"
                    },
                    {
                        "factory": "0x0000000000000000000000000000000000000104",
                        "initCode": "0x2222222222222222222222222222222222222222222222222222222222222222"
                    }
                ],
                "authorisedExchanges": {
                    "Uniswap": "0x0000000000000000000000000000000000000105",
                    "Kyber": "0x0000000000000000000000000000000000000106"
                }
            },
            "aave": {
                "contract": "0x0000000000000000000000000000000000000201",
                "lendingPool": "0x0000000000000000000000000000000000000202",
                "lendingPoolCore": "0x0000000000000000000000000000000000000203",
                "aTokens": [
                    "0x0000000000000000000000000000000000000204",
                    "0x0000000000000000000000000000000000000205"
                ]
            },
            "balancer": {
                "pools": ["0x0000000000000000000000000000000000000301"]
            },
            "yearn": {
                "pools": ["0x0000000000000000000000000000000000000401"],
                "wethPools": ["0x0000000000000000000000000000000000000402"]
            },
            "lido": {
                "contract": "0x0000000000000000000000000000000000000501",
                "stETHCurvePool": "0x0000000000000000000000000000000000000502"
            },
            "maker": {
                "pot": "0x0000000000000000000000000000000000000601",
                "migration": "0x0000000000000000000000000000000000000602"
            },
            "uniswap": {
                "factoryV2": "0x0000000000000000000000000000000000000701",
                "initCodeV2": "0x3333333333333333333333333333333333333333333333333333333333333333",
                "unizap": "0x0000000000000000000000000000000000000702"
            }
        }
    });

    serde_json::to_string_pretty(&config).unwrap()
}

// --------------
// | Mock chain |
// --------------

/// An operation seen by the [`MockChain`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChainOp {
    Deploy {
        name: String,
        address: Address,
        code: Bytes,
    },
    Send { to: Address, data: Bytes },
    Call { to: Address, data: Bytes },
}

/// A chain client recording every operation and answering the reads the
/// scripts perform
pub(crate) struct MockChain {
    ops: Mutex<Vec<ChainOp>>,
    nonce: U256,
    threshold: U256,
    owners: Vec<Address>,
    fail_on: Option<[u8; 4]>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            ops: Mutex::new(Vec::new()),
            nonce: U256::from(7),
            threshold: U256::from(1),
            owners: Vec::new(),
            fail_on: None,
        }
    }
}

impl MockChain {
    /// A chain whose multisig has the given owners and threshold
    pub(crate) fn with_owners(threshold: usize, owners: Vec<Address>) -> Self {
        Self {
            threshold: U256::from(threshold),
            owners,
            ..Default::default()
        }
    }

    /// A chain on which every transaction calling `C` reverts
    pub(crate) fn failing_on<C: SolCall>() -> Self {
        Self {
            fail_on: Some(C::SELECTOR),
            ..Default::default()
        }
    }

    /// The nonce reported by the multisig
    pub(crate) fn nonce(&self) -> U256 {
        self.nonce
    }

    /// Every operation, in order
    pub(crate) fn ops(&self) -> Vec<ChainOp> {
        self.ops.lock().unwrap().clone()
    }

    /// The transactions sent, in order
    pub(crate) fn sends(&self) -> Vec<(Address, Bytes)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                ChainOp::Send { to, data } => Some((to, data)),
                _ => None,
            })
            .collect()
    }

    /// The address the named contract was deployed at
    pub(crate) fn deployed(&self, contract: &str) -> Address {
        self.ops()
            .into_iter()
            .find_map(|op| match op {
                ChainOp::Deploy { name, address, .. } if name == contract => Some(address),
                _ => None,
            })
            .unwrap()
    }

    /// The number of reads of `C`
    pub(crate) fn reads_of<C: SolCall>(&self) -> usize {
        self.ops()
            .iter()
            .filter(|op| match op {
                ChainOp::Call { data, .. } => data.starts_with(&C::SELECTOR),
                _ => false,
            })
            .count()
    }

    fn record(&self, op: ChainOp) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn deploy(&self, name: &str, code: Bytes) -> Result<Address, ScriptError> {
        let mut ops = self.ops.lock().unwrap();
        let n = ops.iter().filter(|op| matches!(op, ChainOp::Deploy { .. })).count();
        let word = U256::from(0xd000 + n).to_be_bytes::<32>();
        let address = Address::from_slice(&word[12..]);

        ops.push(ChainOp::Deploy {
            name: name.to_string(),
            address,
            code,
        });
        Ok(address)
    }

    async fn send(&self, to: Address, data: Bytes) -> Result<(), ScriptError> {
        if self.fail_on.is_some_and(|selector| data.starts_with(&selector)) {
            return Err(ScriptError::ContractInteraction(format!("{to}: reverted")));
        }

        self.record(ChainOp::Send { to, data });
        Ok(())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, ScriptError> {
        self.record(ChainOp::Call {
            to,
            data: data.clone(),
        });

        let ret = if data.starts_with(&IMultiSigWallet::nonceCall::SELECTOR) {
            self.nonce.abi_encode()
        } else if data.starts_with(&IMultiSigWallet::thresholdCall::SELECTOR) {
            self.threshold.abi_encode()
        } else if data.starts_with(&IMultiSigWallet::isOwnerCall::SELECTOR) {
            let call = IMultiSigWallet::isOwnerCall::abi_decode(&data).unwrap();
            self.owners.contains(&call.owner).abi_encode()
        } else if data.starts_with(&IAugustusSwapper::getTokenTransferProxyCall::SELECTOR) {
            MOCK_TRANSFER_PROXY.abi_encode()
        } else if data.starts_with(&IScdMcdMigration::daiJoinCall::SELECTOR) {
            MOCK_DAI_JOIN.abi_encode()
        } else if data.starts_with(&IScdMcdMigration::vatCall::SELECTOR) {
            MOCK_VAT.abi_encode()
        } else {
            return Err(ScriptError::ContractInteraction(format!("unexpected call to {to}")));
        };

        Ok(ret.into())
    }
}

/// The name of the function a transaction calls, for asserting on call order
pub(crate) fn function_name(data: &[u8]) -> &'static str {
    let selectors = [
        (IMultiSigWallet::executeCall::SELECTOR, "execute"),
        (IArgentWalletDetector::addCodeCall::SELECTOR, "addCode"),
        (IArgentWalletDetector::addImplementationCall::SELECTOR, "addImplementation"),
        (IDappRegistry::addDappCall::SELECTOR, "addDapp"),
        (IDappRegistry::requestTimelockChangeCall::SELECTOR, "requestTimelockChange"),
        (IDappRegistry::confirmTimelockChangeCall::SELECTOR, "confirmTimelockChange"),
        (IDappRegistry::changeOwnerCall::SELECTOR, "changeOwner"),
        (IManaged::addManagerCall::SELECTOR, "addManager"),
        (IManaged::changeOwnerCall::SELECTOR, "changeOwner"),
    ];

    selectors
        .into_iter()
        .find(|(selector, _)| data.starts_with(selector))
        .map(|(_, name)| name)
        .unwrap_or("unknown")
}

// ------------------
// | Mock ABI store |
// ------------------

/// An ABI store keeping uploads in memory, optionally failing for one contract
#[derive(Default)]
pub(crate) struct RecordingAbiStore {
    uploads: Mutex<Vec<(String, AbiUpload)>>,
    fail_for: Option<String>,
}

impl RecordingAbiStore {
    /// A store failing the upload of the named contract
    pub(crate) fn failing_for(contract_name: &str) -> Self {
        Self {
            fail_for: Some(contract_name.to_string()),
            ..Default::default()
        }
    }

    /// The uploads received, as `(prefix, upload)`
    pub(crate) fn uploads(&self) -> Vec<(String, AbiUpload)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl AbiStore for RecordingAbiStore {
    async fn upload(&self, upload: &AbiUpload, prefix: &str) -> Result<(), ScriptError> {
        if self.fail_for.as_deref() == Some(upload.contract_name.as_str()) {
            return Err(ScriptError::AbiUpload(format!("{}: refused", upload.contract_name)));
        }

        self.uploads
            .lock()
            .unwrap()
            .push((prefix.to_string(), upload.clone()));
        Ok(())
    }
}
