//! The seam between the executor and the contract state it dispatches into.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{abi::AbiDecoderConfig, SolInterface};
use thiserror::Error;

/// Who is calling and which contract is being called, for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// Effective caller. For meta-transactions this is the signer, never the relayer.
    pub sender: Address,
    pub contract: Address,
}

/// A failed precondition inside a dispatched call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Revert {
    pub reason: String,
}

impl Revert {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Contract state an executor can dispatch ABI-encoded calls into.
///
/// `Clone` is the checkpoint: the executor dispatches into a copy and only
/// commits it when the call returns `Ok`.
pub trait MetaTxTarget: Clone + Send {
    /// EIP-712 domain name of this contract.
    fn name(&self) -> &str;

    fn dispatch(&mut self, ctx: &CallContext, calldata: &[u8]) -> Result<Bytes, Revert>;
}

/// Resolve `calldata` against the closed call set `I` by its 4-byte selector.
///
/// Arguments must be strictly encoded: dirty padding, non-canonical offsets
/// and trailing bytes all revert.
pub fn decode_call<I: SolInterface>(calldata: &[u8]) -> Result<I, Revert> {
    if calldata.len() < 4 {
        return Err(Revert::new("calldata shorter than a selector"));
    }
    let config = AbiDecoderConfig::new().strict(true);
    I::abi_decode_with_config(calldata, config).map_err(|err| match err {
        alloy_sol_types::Error::UnknownSelector { selector, .. } => {
            Revert::new(format!("unrecognized function selector {selector}"))
        }
        other => Revert::new(format!("invalid arguments for {}: {other}", I::NAME)),
    })
}
