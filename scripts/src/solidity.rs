//! Definitions of Solidity functions called during deployment

use alloy::sol;

sol! {
    interface IArgentWalletDetector {
        function addCode(bytes32 code) external;
        function addImplementation(address implementation) external;
    }

    interface IMultiSigWallet {
        function nonce() external view returns (uint256);
        function threshold() external view returns (uint256);
        function isOwner(address owner) external view returns (bool);
        function execute(address to, uint256 value, bytes data, bytes signatures) external;
    }

    interface IDappRegistry {
        function addDapp(uint8 registryId, address dapp, address filter) external;
        function requestTimelockChange(uint64 newTimelockPeriod) external;
        function confirmTimelockChange() external;
        function changeOwner(uint8 registryId, address newRegistryOwner) external;
    }

    /// Implemented by the `WalletFactory` and the `TokenRegistry`
    interface IManaged {
        function addManager(address manager) external;
        function changeOwner(address newOwner) external;
    }

    interface IAugustusSwapper {
        function getTokenTransferProxy() external view returns (address);
    }

    interface IScdMcdMigration {
        function daiJoin() external view returns (address);
        function vat() external view returns (address);
    }
}
