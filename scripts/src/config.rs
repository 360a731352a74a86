//! The deployment config, read at the start of a run and updated with the
//! addresses of the contracts deployed during it.
//!
//! The raw JSON document is kept alongside the typed view so that saving
//! preserves every entry, including those the scripts never read.

use std::{
    fmt,
    fs,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use alloy::primitives::{Address, B256};
use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer,
};
use serde_json::Value;
use tracing::debug;

use crate::{
    constants::{CONTRACTS_KEY, GIT_COMMIT_KEY},
    errors::ScriptError,
    types::InfrastructureContract,
};

// ---------------
// | Typed Views |
// ---------------

/// The sections of the deployment config read by the scripts
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentConfig {
    /// Previously deployed contracts
    pub contracts: ContractsConfig,
    /// Deployed wallet modules and storages
    pub modules: ModulesConfig,
    /// Backend accounts
    pub backend: BackendConfig,
    /// Multisig executor settings
    pub multisig: MultisigConfig,
    /// Protocol settings
    pub settings: SettingsConfig,
    /// Addresses of the DeFi integrations
    pub defi: DefiConfig,
}

/// The `contracts` section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContractsConfig {
    /// The multisig owning the infrastructure
    pub multi_sig_wallet: Address,
    /// The registry of wallet code and implementations
    pub argent_wallet_detector: Address,
    /// The wallet implementation, once deployed
    #[serde(default)]
    pub base_wallet: Option<Address>,
    /// The wallet factory, once deployed
    #[serde(default)]
    pub wallet_factory: Option<Address>,
    /// The dapp registry, once deployed
    #[serde(default)]
    pub dapp_registry: Option<Address>,
    /// The multicall helper, once deployed
    #[serde(default)]
    pub multi_call_helper: Option<Address>,
    /// The token registry, once deployed
    #[serde(default)]
    pub token_registry: Option<Address>,
}

impl ContractsConfig {
    /// The configured address of an infrastructure contract, if any
    pub fn infrastructure_address(&self, contract: InfrastructureContract) -> Option<Address> {
        match contract {
            InfrastructureContract::BaseWallet => self.base_wallet,
            InfrastructureContract::WalletFactory => self.wallet_factory,
            InfrastructureContract::DappRegistry => self.dapp_registry,
            InfrastructureContract::MultiCallHelper => self.multi_call_helper,
            InfrastructureContract::TokenRegistry => self.token_registry,
        }
    }
}

/// The `modules` section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModulesConfig {
    pub guardian_storage: Address,
    pub transfer_storage: Address,
    /// The token registry used by the Paraswap filter
    pub token_registry: Address,
}

/// The `backend` section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Receives the refunds paid by wallets
    pub refund_collector: Address,
    /// Accounts made managers of the factory and the token registry
    #[serde(default)]
    pub accounts: Vec<Address>,
}

/// The `multisig` section
#[derive(Debug, Clone, Deserialize)]
pub struct MultisigConfig {
    /// Whether the deployer signs multisig transactions itself
    #[serde(default)]
    pub autosign: bool,
}

/// The `settings` section
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsConfig {
    /// The `DappRegistry` timelock set at the end of the run, in seconds
    pub timelock_period: u64,
}

/// The `defi` section
#[derive(Debug, Clone, Deserialize)]
pub struct DefiConfig {
    pub weth: Address,
    pub compound: CompoundConfig,
    pub paraswap: ParaswapConfig,
    pub aave: AaveConfig,
    pub maker: MakerConfig,
    pub uniswap: UniswapConfig,
    /// Absent on networks without a Balancer deployment
    #[serde(default)]
    pub balancer: Option<BalancerConfig>,
    /// Absent on networks without a Yearn deployment
    #[serde(default)]
    pub yearn: Option<YearnConfig>,
    /// Absent on networks without a Lido deployment
    #[serde(default)]
    pub lido: Option<LidoConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompoundConfig {
    /// Underlying token address to cToken address, in file order
    pub markets: OrderedMap<Address>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaswapConfig {
    /// The Augustus swapper
    pub contract: Address,
    pub uniswap_proxy: Address,
    #[serde(default)]
    pub uniswap_forks: Vec<UniswapFork>,
    /// Exchange name to adapter address, in file order
    #[serde(default)]
    pub authorised_exchanges: OrderedMap<Address>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniswapFork {
    pub factory: Address,
    pub init_code: B256,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AaveConfig {
    /// The Aave V2 lending pool, absent on the test network
    #[serde(default)]
    pub contract: Option<Address>,
    pub lending_pool: Address,
    pub lending_pool_core: Address,
    #[serde(default)]
    pub a_tokens: Vec<Address>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalancerConfig {
    #[serde(default)]
    pub pools: Vec<Address>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearnConfig {
    #[serde(default)]
    pub pools: Vec<Address>,
    #[serde(default)]
    pub weth_pools: Vec<Address>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LidoConfig {
    pub contract: Address,
    #[serde(rename = "stETHCurvePool")]
    pub steth_curve_pool: Address,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MakerConfig {
    pub pot: Address,
    /// The SCD to MCD migration contract, used to look up `daiJoin` and `vat`
    pub migration: Address,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniswapConfig {
    #[serde(rename = "factoryV2")]
    pub factory_v2: Address,
    #[serde(rename = "initCodeV2")]
    pub init_code_v2: B256,
    pub unizap: Address,
}

// ----------------
// | Ordered Maps |
// ----------------

/// A JSON object whose entries keep the order in which they appear in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    /// Iterate over the entries in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over the values in file order
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.0.iter().map(|(_, v)| v)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or_default());
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

// ----------------
// | Configurator |
// ----------------

/// Loads, updates and saves the deployment config
#[derive(Debug)]
pub struct Configurator {
    /// The file the config was loaded from, and is saved to
    path: PathBuf,
    /// The raw config document
    document: Value,
    /// The typed view of `document`
    config: DeploymentConfig,
}

impl Configurator {
    /// Load the deployment config from the given file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref().to_path_buf();
        let contents = fs::read_to_string(&path)
            .map_err(|e| ScriptError::ReadConfig(format!("{}: {e}", path.display())))?;
        let document: Value = serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ReadConfig(format!("{}: {e}", path.display())))?;

        Self::from_document(path, document)
    }

    /// Build a configurator over an already parsed document
    pub fn from_document(path: PathBuf, document: Value) -> Result<Self, ScriptError> {
        if !document.is_object() {
            return Err(ScriptError::InvalidConfig(
                "config root must be a JSON object".to_string(),
            ));
        }

        let config = parse_view(&document)?;
        Ok(Self {
            path,
            document,
            config,
        })
    }

    /// The typed view of the config
    pub fn config(&self) -> &DeploymentConfig {
        &self.config
    }

    /// The raw config document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Write the given infrastructure addresses into the `contracts` section
    pub fn update_infrastructure_addresses(
        &mut self,
        addresses: &[(InfrastructureContract, Address)],
    ) -> Result<(), ScriptError> {
        let contracts = self
            .document
            .get_mut(CONTRACTS_KEY)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| {
                ScriptError::InvalidConfig(format!("`{CONTRACTS_KEY}` must be a JSON object"))
            })?;

        for (contract, address) in addresses {
            debug!("Recording {contract} at {address}");
            contracts.insert(
                contract.artifact_name().to_string(),
                Value::String(address.to_checksum(None)),
            );
        }

        self.config = parse_view(&self.document)?;
        Ok(())
    }

    /// Record the commit the deployment was made from
    pub fn update_git_hash(&mut self, git_hash: &str) -> Result<(), ScriptError> {
        let root = self.document.as_object_mut().ok_or_else(|| {
            ScriptError::InvalidConfig("config root must be a JSON object".to_string())
        })?;
        root.insert(
            GIT_COMMIT_KEY.to_string(),
            Value::String(git_hash.to_string()),
        );
        Ok(())
    }

    /// Write the config back to the file it was loaded from
    pub fn save(&self) -> Result<(), ScriptError> {
        let contents = serde_json::to_string_pretty(&self.document)
            .map_err(|e| ScriptError::WriteConfig(e.to_string()))?;
        fs::write(&self.path, contents)
            .map_err(|e| ScriptError::WriteConfig(format!("{}: {e}", self.path.display())))
    }
}

/// Parse the typed view out of the raw document
fn parse_view(document: &Value) -> Result<DeploymentConfig, ScriptError> {
    DeploymentConfig::deserialize(document).map_err(|e| ScriptError::InvalidConfig(e.to_string()))
}
