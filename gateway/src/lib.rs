//! Meta-transaction gateway: EIP-712 verification, replay protection and
//! delegated dispatch in front of in-memory contract state.

pub mod error;
pub mod executor;
pub mod network;
pub mod nonce;
pub mod signature;
pub mod signer;
pub mod struct_hash;
pub mod target;
pub mod targets;
pub mod typed_data;

pub use error::{GatewayError, Result, SignatureError};
pub use executor::{ExecutionReceipt, MetaTxExecutor};
pub use network::{Endpoint, Network, Outcome};
pub use nonce::NonceLedger;
pub use signature::SignatureParts;
pub use signer::sign_meta_transaction;
pub use target::{CallContext, MetaTxTarget, Revert};
