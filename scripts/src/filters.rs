//! The plan of filter deployments and dapp registrations
//!
//! Building the plan is pure: addresses that are only known once the run is
//! underway (contracts deployed earlier in the run, values read from other
//! contracts) appear as [`AddressRef`]s and are resolved against an
//! [`AddressBook`] when the plan is executed.

use std::{
    collections::HashMap,
    fmt::{self, Display},
};

use alloy::{dyn_abi::DynSolValue, primitives::{Address, B256}};

use crate::{
    config::DeploymentConfig,
    constants::{
        AAVE_V1_ATOKEN_FILTER_ARTIFACT, AAVE_V1_LENDING_POOL_FILTER_ARTIFACT,
        AAVE_V2_FILTER_ARTIFACT, BALANCER_FILTER_ARTIFACT, COMPOUND_FILTER_ARTIFACT,
        CURVE_FILTER_ARTIFACT, DAI_JOIN_FILTER_ARTIFACT, LIDO_FILTER_ARTIFACT,
        ONLY_APPROVE_FILTER_ARTIFACT, PARASWAP_FILTER_ARTIFACT, POT_FILTER_ARTIFACT,
        TEST_NETWORK, UNISWAP_V2_FILTER_ARTIFACT, VAT_FILTER_ARTIFACT, YEARN_FILTER_ARTIFACT,
    },
    errors::ScriptError,
    types::InfrastructureContract,
};

// ---------
// | Types |
// ---------

/// A value read from an integration contract during the run
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OnChainLookup {
    /// `getTokenTransferProxy()` on the Augustus swapper at the given address
    ParaswapTokenTransferProxy(Address),
    /// `daiJoin()` on the Maker migration contract at the given address
    MakerDaiJoin(Address),
    /// `vat()` on the Maker migration contract at the given address
    MakerVat(Address),
}

impl Display for OnChainLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnChainLookup::ParaswapTokenTransferProxy(a) => {
                write!(f, "getTokenTransferProxy() of {a}")
            }
            OnChainLookup::MakerDaiJoin(a) => write!(f, "daiJoin() of {a}"),
            OnChainLookup::MakerVat(a) => write!(f, "vat() of {a}"),
        }
    }
}

/// An address appearing in the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressRef {
    /// An address known from the config
    Fixed(Address),
    /// A contract deployed earlier in the run, by label
    Deployed(String),
    /// A value read from another contract
    Lookup(OnChainLookup),
}

impl AddressRef {
    /// A reference to an infrastructure contract deployed earlier in the run
    pub fn infrastructure(contract: InfrastructureContract) -> Self {
        AddressRef::Deployed(contract.to_string())
    }

    /// A reference to a filter deployed earlier in the run
    pub fn filter(label: &str) -> Self {
        AddressRef::Deployed(label.to_string())
    }
}

impl Display for AddressRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressRef::Fixed(a) => write!(f, "{a}"),
            AddressRef::Deployed(label) => write!(f, "<{label}>"),
            AddressRef::Lookup(lookup) => write!(f, "<{lookup}>"),
        }
    }
}

/// A filter constructor argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArg {
    Address(AddressRef),
    Bool(bool),
    Bytes32(B256),
    AddressArray(Vec<Address>),
    Bytes32Array(Vec<B256>),
}

impl ConstructorArg {
    /// The ABI value of the argument, resolving addresses against the book
    pub fn to_sol_value(&self, book: &AddressBook) -> Result<DynSolValue, ScriptError> {
        Ok(match self {
            ConstructorArg::Address(r) => DynSolValue::Address(book.get(r)?),
            ConstructorArg::Bool(b) => DynSolValue::Bool(*b),
            ConstructorArg::Bytes32(word) => DynSolValue::FixedBytes(*word, 32),
            ConstructorArg::AddressArray(addrs) => {
                DynSolValue::Array(addrs.iter().copied().map(DynSolValue::Address).collect())
            }
            ConstructorArg::Bytes32Array(words) => DynSolValue::Array(
                words
                    .iter()
                    .map(|word| DynSolValue::FixedBytes(*word, 32))
                    .collect(),
            ),
        })
    }

    /// The address references the argument depends on
    pub fn address_ref(&self) -> Option<&AddressRef> {
        match self {
            ConstructorArg::Address(r) => Some(r),
            _ => None,
        }
    }
}

/// The deployment of a filter contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDeployment {
    /// The label under which the deployed address is recorded
    pub label: String,
    /// The artifact to deploy
    pub artifact: &'static str,
    /// The constructor arguments
    pub args: Vec<ConstructorArg>,
}

/// An `addDapp` call on the default registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// A human readable description of the dapp
    pub description: String,
    /// The dapp address
    pub dapp: AddressRef,
    /// The filter guarding calls to the dapp
    pub filter: AddressRef,
}

/// A single step of the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Deploy a filter
    Deploy(FilterDeployment),
    /// Register a dapp with its filter
    Register(Registration),
}

impl Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStep::Deploy(d) => {
                write!(f, "deploy {} as <{}>", d.artifact, d.label)?;
                if !d.args.is_empty() {
                    write!(f, " with {} constructor argument(s)", d.args.len())?;
                }
                Ok(())
            }
            PlanStep::Register(r) => {
                write!(f, "register {} ({}) -> {}", r.description, r.dapp, r.filter)
            }
        }
    }
}

/// The ordered filter plan for a network
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPlan {
    /// The steps, in execution order
    pub steps: Vec<PlanStep>,
}

impl FilterPlan {
    /// The filter deployments of the plan, in order
    pub fn deployments(&self) -> impl Iterator<Item = &FilterDeployment> {
        self.steps.iter().filter_map(|s| match s {
            PlanStep::Deploy(d) => Some(d),
            PlanStep::Register(_) => None,
        })
    }

    /// The registrations of the plan, in order
    pub fn registrations(&self) -> impl Iterator<Item = &Registration> {
        self.steps.iter().filter_map(|s| match s {
            PlanStep::Register(r) => Some(r),
            PlanStep::Deploy(_) => None,
        })
    }

    /// Append a filter deployment
    fn deploy(&mut self, label: &str, artifact: &'static str, args: Vec<ConstructorArg>) {
        self.steps.push(PlanStep::Deploy(FilterDeployment {
            label: label.to_string(),
            artifact,
            args,
        }));
    }

    /// Append a registration
    fn register(&mut self, description: impl Into<String>, dapp: AddressRef, filter: AddressRef) {
        self.steps.push(PlanStep::Register(Registration {
            description: description.into(),
            dapp,
            filter,
        }));
    }
}

// ----------------
// | Address Book |
// ----------------

/// The addresses known so far in a run
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    /// Deployed contracts by label
    deployed: HashMap<String, Address>,
    /// Values read from integration contracts
    lookups: HashMap<OnChainLookup, Address>,
}

impl AddressBook {
    /// Record a deployed contract
    pub fn record_deployment(&mut self, label: impl Into<String>, address: Address) {
        self.deployed.insert(label.into(), address);
    }

    /// Record the result of an on-chain lookup
    pub fn record_lookup(&mut self, lookup: OnChainLookup, address: Address) {
        self.lookups.insert(lookup, address);
    }

    /// Whether the lookup has already been performed
    pub fn has_lookup(&self, lookup: &OnChainLookup) -> bool {
        self.lookups.contains_key(lookup)
    }

    /// Resolve a reference
    pub fn get(&self, r: &AddressRef) -> Result<Address, ScriptError> {
        let resolved = match r {
            AddressRef::Fixed(a) => Some(*a),
            AddressRef::Deployed(label) => self.deployed.get(label).copied(),
            AddressRef::Lookup(lookup) => self.lookups.get(lookup).copied(),
        };

        resolved.ok_or_else(|| ScriptError::CalldataConstruction(format!("unresolved address {r}")))
    }
}

// ------------
// | Planning |
// ------------

/// Labels of filters that are referenced after their deployment step
const ONLY_APPROVE_FILTER: &str = "OnlyApproveFilter";
const BALANCER_FILTER: &str = "BalancerFilter";
const YEARN_FILTER: &str = "YearnFilter";
const WETH_YEARN_FILTER: &str = "WethYearnFilter";
const AAVE_V1_ATOKEN_FILTER: &str = "AaveV1ATokenFilter";

/// Build the filter plan for the given network
pub fn build_filter_plan(
    config: &DeploymentConfig,
    network: &str,
) -> Result<FilterPlan, ScriptError> {
    let defi = &config.defi;
    let dapp_registry = AddressRef::infrastructure(InfrastructureContract::DappRegistry);
    let token_registry = AddressRef::infrastructure(InfrastructureContract::TokenRegistry);
    let mut plan = FilterPlan::default();

    // Refund collector, callable without a filter
    plan.register(
        "refund collector",
        AddressRef::Fixed(config.backend.refund_collector),
        AddressRef::Fixed(Address::ZERO),
    );

    // Compound
    for (underlying, ctoken) in defi.compound.markets.iter() {
        let underlying: Address = underlying.parse().map_err(|e| {
            ScriptError::InvalidConfig(format!("compound market `{underlying}`: {e}"))
        })?;
        let label = format!("CompoundCTokenFilter({underlying})");
        plan.deploy(
            &label,
            COMPOUND_FILTER_ARTIFACT,
            vec![ConstructorArg::Address(AddressRef::Fixed(underlying))],
        );
        plan.register(
            format!("Compound cToken for underlying {underlying}"),
            AddressRef::Fixed(*ctoken),
            AddressRef::filter(&label),
        );
    }

    // Paraswap
    let paraswap = &defi.paraswap;
    plan.deploy(
        "ParaswapFilter",
        PARASWAP_FILTER_ARTIFACT,
        vec![
            ConstructorArg::Address(AddressRef::Fixed(config.modules.token_registry)),
            ConstructorArg::Address(dapp_registry),
            ConstructorArg::Address(AddressRef::Fixed(paraswap.uniswap_proxy)),
            ConstructorArg::AddressArray(
                paraswap.uniswap_forks.iter().map(|f| f.factory).collect(),
            ),
            ConstructorArg::Bytes32Array(
                paraswap.uniswap_forks.iter().map(|f| f.init_code).collect(),
            ),
            ConstructorArg::AddressArray(paraswap.authorised_exchanges.values().copied().collect()),
        ],
    );
    plan.register(
        "Paraswap Augustus swapper",
        AddressRef::Fixed(paraswap.contract),
        AddressRef::filter("ParaswapFilter"),
    );

    // Paraswap token transfer proxy
    plan.deploy(ONLY_APPROVE_FILTER, ONLY_APPROVE_FILTER_ARTIFACT, vec![]);
    plan.register(
        "Paraswap token transfer proxy",
        AddressRef::Lookup(OnChainLookup::ParaswapTokenTransferProxy(paraswap.contract)),
        AddressRef::filter(ONLY_APPROVE_FILTER),
    );

    if network != TEST_NETWORK {
        plan_mainnet_only_filters(config, &mut plan)?;
    }

    // Maker DSR
    let maker = &defi.maker;
    let dai_join = AddressRef::Lookup(OnChainLookup::MakerDaiJoin(maker.migration));
    let vat = AddressRef::Lookup(OnChainLookup::MakerVat(maker.migration));
    plan.deploy("PotFilter", POT_FILTER_ARTIFACT, vec![]);
    plan.register(
        "Maker pot",
        AddressRef::Fixed(maker.pot),
        AddressRef::filter("PotFilter"),
    );
    plan.deploy("DaiJoinFilter", DAI_JOIN_FILTER_ARTIFACT, vec![]);
    plan.register(
        "Maker DaiJoin",
        dai_join.clone(),
        AddressRef::filter("DaiJoinFilter"),
    );
    plan.deploy(
        "VatFilter",
        VAT_FILTER_ARTIFACT,
        vec![
            ConstructorArg::Address(dai_join),
            ConstructorArg::Address(AddressRef::Fixed(maker.pot)),
        ],
    );
    plan.register("Maker vat", vat, AddressRef::filter("VatFilter"));

    // Uniswap V2
    let uniswap = &defi.uniswap;
    plan.deploy(
        "UniswapV2Filter",
        UNISWAP_V2_FILTER_ARTIFACT,
        vec![
            ConstructorArg::Address(token_registry),
            ConstructorArg::Address(AddressRef::Fixed(uniswap.factory_v2)),
            ConstructorArg::Bytes32(uniswap.init_code_v2),
            ConstructorArg::Address(AddressRef::Fixed(defi.weth)),
        ],
    );
    plan.register(
        "Uniswap V2 UniZap",
        AddressRef::Fixed(uniswap.unizap),
        AddressRef::filter("UniswapV2Filter"),
    );

    // Aave V1
    let aave = &defi.aave;
    plan.deploy(
        "AaveV1LendingPoolFilter",
        AAVE_V1_LENDING_POOL_FILTER_ARTIFACT,
        vec![],
    );
    plan.register(
        "Aave V1 lending pool",
        AddressRef::Fixed(aave.lending_pool),
        AddressRef::filter("AaveV1LendingPoolFilter"),
    );
    plan.register(
        "Aave V1 lending pool core",
        AddressRef::Fixed(aave.lending_pool_core),
        AddressRef::filter(ONLY_APPROVE_FILTER),
    );
    plan.deploy(AAVE_V1_ATOKEN_FILTER, AAVE_V1_ATOKEN_FILTER_ARTIFACT, vec![]);
    for atoken in &aave.a_tokens {
        plan.register(
            format!("Aave V1 aToken {atoken}"),
            AddressRef::Fixed(*atoken),
            AddressRef::filter(AAVE_V1_ATOKEN_FILTER),
        );
    }

    Ok(plan)
}

/// Plan the filters of integrations that are not deployed on the test network
fn plan_mainnet_only_filters(
    config: &DeploymentConfig,
    plan: &mut FilterPlan,
) -> Result<(), ScriptError> {
    let defi = &config.defi;

    // Aave V2
    let aave_v2 = defi.aave.contract.ok_or_else(|| missing("defi.aave.contract"))?;
    plan.deploy("AaveV2Filter", AAVE_V2_FILTER_ARTIFACT, vec![]);
    plan.register(
        "Aave V2 lending pool",
        AddressRef::Fixed(aave_v2),
        AddressRef::filter("AaveV2Filter"),
    );

    // Balancer
    let balancer = defi.balancer.as_ref().ok_or_else(|| missing("defi.balancer"))?;
    plan.deploy(BALANCER_FILTER, BALANCER_FILTER_ARTIFACT, vec![]);
    for pool in &balancer.pools {
        plan.register(
            format!("Balancer pool {pool}"),
            AddressRef::Fixed(*pool),
            AddressRef::filter(BALANCER_FILTER),
        );
    }

    // Yearn
    let yearn = defi.yearn.as_ref().ok_or_else(|| missing("defi.yearn"))?;
    plan.deploy(
        YEARN_FILTER,
        YEARN_FILTER_ARTIFACT,
        vec![ConstructorArg::Bool(false)],
    );
    plan.deploy(
        WETH_YEARN_FILTER,
        YEARN_FILTER_ARTIFACT,
        vec![ConstructorArg::Bool(true)],
    );
    for pool in &yearn.pools {
        plan.register(
            format!("Yearn pool {pool}"),
            AddressRef::Fixed(*pool),
            AddressRef::filter(YEARN_FILTER),
        );
    }
    for pool in &yearn.weth_pools {
        plan.register(
            format!("WETH Yearn pool {pool}"),
            AddressRef::Fixed(*pool),
            AddressRef::filter(WETH_YEARN_FILTER),
        );
    }

    // Lido, and the Curve pool used to exit stETH
    let lido = defi.lido.as_ref().ok_or_else(|| missing("defi.lido"))?;
    plan.deploy("LidoFilter", LIDO_FILTER_ARTIFACT, vec![]);
    plan.register(
        "Lido",
        AddressRef::Fixed(lido.contract),
        AddressRef::filter("LidoFilter"),
    );
    plan.deploy("CurveFilter", CURVE_FILTER_ARTIFACT, vec![]);
    plan.register(
        "Curve stETH pool",
        AddressRef::Fixed(lido.steth_curve_pool),
        AddressRef::filter("CurveFilter"),
    );

    Ok(())
}

/// The error for a config entry required on this network
fn missing(key: &str) -> ScriptError {
    ScriptError::InvalidConfig(format!("`{key}` is required on this network"))
}
