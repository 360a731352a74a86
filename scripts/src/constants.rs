//! Constants used in the deploy scripts

/// The default JSON-RPC endpoint
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default directory holding the compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

/// The default root directory of the local ABI store
pub const DEFAULT_ABI_DIR: &str = "abi";

/// The name of the test network, on which several integrations are unavailable
pub const TEST_NETWORK: &str = "test";

/// The id of the default registry in the `DappRegistry`
pub const DEFAULT_REGISTRY_ID: u8 = 0;

/// The timelock the `DappRegistry` is deployed with, zero so that the
/// filters registered during deployment take effect immediately
pub const INITIAL_DAPP_REGISTRY_TIMELOCK: u64 = 0;

/// The prefix under which infrastructure ABIs are uploaded
pub const ABI_UPLOAD_PREFIX: &str = "contracts";

/// The file extension of compiled artifacts and uploaded ABIs
pub const JSON_EXTENSION: &str = "json";

// --- Config keys --- //

/// The key of the contract addresses section in the deployment config
pub const CONTRACTS_KEY: &str = "contracts";

/// The key of the git commit hash in the deployment config
pub const GIT_COMMIT_KEY: &str = "gitCommit";

// --- Multisig --- //

/// The bytes prepended to the multisig sign hash preimage, `0x19 || 0x00`
pub const MULTISIG_HASH_PREFIX: [u8; 2] = [0x19, 0x00];

/// The number of bytes in a `r || s || v` signature
pub const SIGNATURE_LEN: usize = 65;

// --- External commands --- //

/// The name of the git command
pub const GIT_COMMAND: &str = "git";

/// The arguments passed to git to read the current commit hash
pub const GIT_HEAD_ARGS: [&str; 2] = ["rev-parse", "HEAD"];

// --- Artifact names --- //

/// The wallet proxy, whose runtime code hash is registered in the detector
pub const PROXY_ARTIFACT: &str = "Proxy";

/// The Compound cToken filter
pub const COMPOUND_FILTER_ARTIFACT: &str = "CompoundCTokenFilter";

/// The Paraswap filter
pub const PARASWAP_FILTER_ARTIFACT: &str = "ParaswapFilter";

/// The filter that only allows ERC20 approvals
pub const ONLY_APPROVE_FILTER_ARTIFACT: &str = "OnlyApproveFilter";

/// The Aave V2 lending pool filter
pub const AAVE_V2_FILTER_ARTIFACT: &str = "AaveV2Filter";

/// The Balancer pool filter
pub const BALANCER_FILTER_ARTIFACT: &str = "BalancerFilter";

/// The Yearn vault filter
pub const YEARN_FILTER_ARTIFACT: &str = "YearnFilter";

/// The Lido filter
pub const LIDO_FILTER_ARTIFACT: &str = "LidoFilter";

/// The Curve pool filter
pub const CURVE_FILTER_ARTIFACT: &str = "CurveFilter";

/// The Maker DSR pot filter
pub const POT_FILTER_ARTIFACT: &str = "PotFilter";

/// The Maker DaiJoin filter
pub const DAI_JOIN_FILTER_ARTIFACT: &str = "DaiJoinFilter";

/// The Maker Vat filter
pub const VAT_FILTER_ARTIFACT: &str = "VatFilter";

/// The Uniswap V2 UniZap filter
pub const UNISWAP_V2_FILTER_ARTIFACT: &str = "UniswapV2UniZapFilter";

/// The Aave V1 lending pool filter
pub const AAVE_V1_LENDING_POOL_FILTER_ARTIFACT: &str = "AaveV1LendingPoolFilter";

/// The Aave V1 aToken filter
pub const AAVE_V1_ATOKEN_FILTER_ARTIFACT: &str = "AaveV1ATokenFilter";
