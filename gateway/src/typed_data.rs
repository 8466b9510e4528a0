use alloy_dyn_abi::TypedData;
use alloy_primitives::{hex, keccak256, B256};
use anyhow::{anyhow, Result};
use gateway_types::{Domain, MetaTransaction};
use serde_json::{json, Value};

use crate::struct_hash::{domain_separator, message_hash, EIP712_DOMAIN, META_TRANSACTION};

/// keccak256("\x19\x01" || domainSeparator || messageHash).
///
/// The `0x19 0x01` prefix keeps this digest disjoint from EIP-191 personal
/// message digests.
pub fn signing_digest(domain_separator: B256, message_hash: B256) -> B256 {
    let mut buf = Vec::with_capacity(2 + 32 + 32);
    buf.extend_from_slice(b"\x19\x01");
    buf.extend_from_slice(domain_separator.as_slice());
    buf.extend_from_slice(message_hash.as_slice());
    keccak256(buf)
}

pub fn meta_transaction_digest(domain: &Domain, message: &MetaTransaction) -> B256 {
    signing_digest(domain_separator(domain), message_hash(message))
}

/// The `eth_signTypedData_v4` payload a wallet signs for `message`.
pub fn typed_data_json(domain: &Domain, message: &MetaTransaction) -> Value {
    let fields = |schema: &crate::struct_hash::TypeSchema| -> Vec<Value> {
        schema
            .fields
            .iter()
            .map(|(name, ty)| json!({ "name": name, "type": ty }))
            .collect()
    };
    json!({
        "types": {
            (EIP712_DOMAIN.primary_type): fields(&EIP712_DOMAIN),
            (META_TRANSACTION.primary_type): fields(&META_TRANSACTION),
        },
        "primaryType": META_TRANSACTION.primary_type,
        "domain": {
            "name": domain.name,
            "version": domain.version,
            "chainId": domain.chain_id,
            "verifyingContract": domain.verifying_contract.to_checksum(None),
        },
        "message": {
            "nonce": message.nonce.to_string(),
            "from": message.from.to_checksum(None),
            "functionSignature": hex::encode_prefixed(&message.function_signature),
        },
    })
}

/// Compute a generic EIP-712 digest for any compliant typed-data JSON.
/// Input is a JSON string with `types`, `primaryType`, `domain`, and `message`.
pub fn digest_from_json(typed_data_json: &str) -> Result<B256> {
    let typed: TypedData = serde_json::from_str(typed_data_json)
        .map_err(|e| anyhow!("Invalid EIP-712 typed data JSON: {e}"))?;
    typed
        .eip712_signing_hash()
        .map_err(|e| anyhow!("Failed computing EIP-712 digest: {e}"))
}
