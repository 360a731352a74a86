//! Execution of calls through the multisig wallet owning the infrastructure

use std::io::{self, BufRead};

use alloy::{
    primitives::{keccak256, Address, Bytes, Signature, B256, U256},
    signers::{local::PrivateKeySigner, Signer},
    sol_types::SolCall,
};
use itertools::Itertools;
use tool_utils::prompt_for_signature;
use tracing::{info, warn};

use crate::{
    client::{read_call, send_call, ChainClient},
    constants::{MULTISIG_HASH_PREFIX, SIGNATURE_LEN},
    errors::ScriptError,
    solidity::IMultiSigWallet,
};

/// The hash the multisig owners sign to authorise a call.
///
/// This is `keccak256(0x19 || 0x00 || multisig || to || value || data || nonce)`
/// with `value` and `nonce` as 32-byte big-endian words.
pub fn multisig_sign_hash(
    multisig: Address,
    to: Address,
    value: U256,
    data: &[u8],
    nonce: U256,
) -> B256 {
    let mut preimage = Vec::with_capacity(2 + 20 + 20 + 32 + data.len() + 32);
    preimage.extend_from_slice(&MULTISIG_HASH_PREFIX);
    preimage.extend_from_slice(multisig.as_slice());
    preimage.extend_from_slice(to.as_slice());
    preimage.extend_from_slice(&value.to_be_bytes::<32>());
    preimage.extend_from_slice(data);
    preimage.extend_from_slice(&nonce.to_be_bytes::<32>());

    keccak256(preimage)
}

/// Concatenate signatures in ascending order of signer, as the multisig
/// requires
pub fn encode_signatures(signatures: Vec<(Address, Signature)>) -> Bytes {
    signatures
        .into_iter()
        .sorted_by_key(|(signer, _)| *signer)
        .flat_map(|(_, sig)| sig.as_bytes())
        .collect::<Vec<u8>>()
        .into()
}

/// Routes calls through the multisig wallet
pub struct MultisigExecutor<'a, Ch: ChainClient + ?Sized> {
    /// The client sending the `execute` transaction from the deployer
    client: &'a Ch,
    /// The multisig wallet
    multisig: Address,
    /// The deployer's key
    signer: PrivateKeySigner,
    /// Whether the deployer signs on behalf of the owners
    autosign: bool,
}

impl<'a, Ch: ChainClient + ?Sized> MultisigExecutor<'a, Ch> {
    /// Create an executor for the multisig at the given address
    pub fn new(
        client: &'a Ch,
        multisig: Address,
        signer: PrivateKeySigner,
        autosign: bool,
    ) -> Self {
        Self {
            client,
            multisig,
            signer,
            autosign,
        }
    }

    /// The address of the multisig
    pub fn address(&self) -> Address {
        self.multisig
    }

    /// Execute `call` on `target` through the multisig, reading owner
    /// signatures from stdin unless autosigning
    pub async fn execute_call<C: SolCall>(
        &self,
        target: Address,
        call: C,
    ) -> Result<(), ScriptError> {
        self.execute_call_with_input(target, call, &mut io::stdin().lock()).await
    }

    /// Execute `call` on `target` through the multisig, reading owner
    /// signatures from `input` unless autosigning
    pub async fn execute_call_with_input<C: SolCall, R: BufRead>(
        &self,
        target: Address,
        call: C,
        input: &mut R,
    ) -> Result<(), ScriptError> {
        let data = Bytes::from(call.abi_encode());
        let nonce = read_call(self.client, self.multisig, IMultiSigWallet::nonceCall {}).await?;
        let hash = multisig_sign_hash(self.multisig, target, U256::ZERO, &data, nonce);

        let signatures = if self.autosign {
            self.sign_with_deployer(hash).await?
        } else {
            self.collect_signatures(target, &data, nonce, hash, input).await?
        };

        info!(
            "Executing {} on {target} through multisig {}",
            C::SIGNATURE,
            self.multisig
        );
        send_call(
            self.client,
            self.multisig,
            IMultiSigWallet::executeCall {
                to: target,
                value: U256::ZERO,
                data,
                signatures: encode_signatures(signatures),
            },
        )
        .await
    }

    /// Sign the hash with the deployer's key
    async fn sign_with_deployer(
        &self,
        hash: B256,
    ) -> Result<Vec<(Address, Signature)>, ScriptError> {
        let signature = self
            .signer
            .sign_message(hash.as_slice())
            .await
            .map_err(|e| ScriptError::MultisigSigning(e.to_string()))?;

        Ok(vec![(self.signer.address(), signature)])
    }

    /// Prompt the owners for as many signatures as the multisig threshold
    async fn collect_signatures<R: BufRead>(
        &self,
        target: Address,
        data: &Bytes,
        nonce: U256,
        hash: B256,
        input: &mut R,
    ) -> Result<Vec<(Address, Signature)>, ScriptError> {
        let threshold = read_call(
            self.client,
            self.multisig,
            IMultiSigWallet::thresholdCall {},
        )
        .await?;
        let threshold: usize = threshold
            .try_into()
            .map_err(|_| ScriptError::MultisigSigning(format!("invalid threshold {threshold}")))?;

        println!("******* MultisigExecutor *******");
        println!("multisig: {}", self.multisig);
        println!("to: {target}");
        println!("value: 0");
        println!("data: {data}");
        println!("nonce: {nonce}");
        println!("hash: {hash}");
        println!("Sign the hash as a personal message ({SIGNATURE_LEN} bytes, r || s || v)");

        let mut signatures: Vec<(Address, Signature)> = Vec::with_capacity(threshold);
        while signatures.len() < threshold {
            let prompt = format!("Signature {}/{threshold}", signatures.len() + 1);
            let signature = prompt_for_signature(&prompt, input)
                .map_err(|e| ScriptError::MultisigSigning(e.to_string()))?;

            let signer = match signature.recover_address_from_msg(hash.as_slice()) {
                Ok(signer) => signer,
                Err(e) => {
                    warn!("Could not recover signer: {e}");
                    continue;
                }
            };

            if signatures.iter().any(|(s, _)| *s == signer) {
                warn!("Already have a signature from {signer}");
                continue;
            }

            let is_owner = read_call(
                self.client,
                self.multisig,
                IMultiSigWallet::isOwnerCall { owner: signer },
            )
            .await?;
            if !is_owner {
                warn!("{signer} is not an owner of the multisig");
                continue;
            }

            signatures.push((signer, signature));
        }

        Ok(signatures)
    }
}
