//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

/// The infrastructure contracts deployed by the scripts
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InfrastructureContract {
    /// The wallet implementation behind every wallet proxy
    BaseWallet,
    /// The factory creating wallet proxies
    WalletFactory,
    /// The registry of authorised dapps and their filters
    DappRegistry,
    /// The helper used to check multicalls against the registries
    MultiCallHelper,
    /// The registry of tradable tokens
    TokenRegistry,
}

impl InfrastructureContract {
    /// All infrastructure contracts, in deployment order
    pub const ALL: [InfrastructureContract; 5] = [
        InfrastructureContract::BaseWallet,
        InfrastructureContract::WalletFactory,
        InfrastructureContract::DappRegistry,
        InfrastructureContract::MultiCallHelper,
        InfrastructureContract::TokenRegistry,
    ];

    /// The name of the contract's compilation artifact, which is also the
    /// key of its address in the deployment config
    pub fn artifact_name(&self) -> &'static str {
        match self {
            InfrastructureContract::BaseWallet => "BaseWallet",
            InfrastructureContract::WalletFactory => "WalletFactory",
            InfrastructureContract::DappRegistry => "DappRegistry",
            InfrastructureContract::MultiCallHelper => "MultiCallHelper",
            InfrastructureContract::TokenRegistry => "TokenRegistry",
        }
    }
}

impl Display for InfrastructureContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.artifact_name())
    }
}
