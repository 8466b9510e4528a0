//! Errors surfaced by the gateway.

use alloy_primitives::Address;
use thiserror::Error;

/// Why a raw signature was rejected before any state was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("signature must be 65 bytes, got {0}")]
    InvalidLength(usize),

    #[error("recovery id {0} does not normalize to 27 or 28")]
    InvalidRecoveryId(u8),

    /// `s` lies in the upper half of the curve order.
    #[error("non-canonical signature: s is greater than n/2")]
    NonCanonicalS,

    #[error("signature scalar r or s is zero")]
    ZeroScalar,
}

/// Errors produced while verifying or dispatching a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("malformed signature: {0}")]
    MalformedSignature(#[from] SignatureError),

    /// Also covers stale nonces: a replayed message hashes to a different
    /// digest once the ledger has moved on.
    #[error("signer and signature do not match: expected {expected:#x}, recovered {recovered:?}")]
    InvalidSigner {
        expected: Address,
        recovered: Option<Address>,
    },

    #[error("dispatched call reverted: {reason}")]
    DispatchReverted { reason: String },

    #[error("nonce space exhausted for {0:#x}")]
    NonceExhausted(Address),

    #[error("a contract is already deployed at {0:#x}")]
    AddressInUse(Address),

    #[error("no contract deployed at {0:#x}")]
    UnknownContract(Address),
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
