//! Scripts for deploying the wallet infrastructure contracts, registering
//! the dapp filters and handing ownership over to the multisig.

pub mod abi_store;
pub mod artifacts;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filters;
pub mod multisig;
mod solidity;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
