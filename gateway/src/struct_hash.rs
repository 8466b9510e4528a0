//! EIP-712 struct encoding for the domain and the meta-transaction message.
//!
//! Every field used here is an atomic or dynamic primitive, so `encodeType`
//! never has to append referenced struct types.

use alloy_primitives::{keccak256, B256, U256};
use gateway_types::{Domain, MetaTransaction};

/// Ordered `(name, type)` field list of a struct type.
#[derive(Debug, Clone, Copy)]
pub struct TypeSchema {
    pub primary_type: &'static str,
    pub fields: &'static [(&'static str, &'static str)],
}

impl TypeSchema {
    /// `Primary(type1 name1,type2 name2,...)`
    pub fn encode_type(&self) -> String {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|(name, ty)| format!("{ty} {name}"))
            .collect();
        format!("{}({})", self.primary_type, fields.join(","))
    }

    pub fn type_hash(&self) -> B256 {
        keccak256(self.encode_type().as_bytes())
    }
}

pub const EIP712_DOMAIN: TypeSchema = TypeSchema {
    primary_type: "EIP712Domain",
    fields: &[
        ("name", "string"),
        ("version", "string"),
        ("chainId", "uint256"),
        ("verifyingContract", "address"),
    ],
};

pub const META_TRANSACTION: TypeSchema = TypeSchema {
    primary_type: "MetaTransaction",
    fields: &[
        ("nonce", "uint256"),
        ("from", "address"),
        ("functionSignature", "bytes"),
    ],
};

/// `hashStruct(EIP712Domain)` for `domain`.
pub fn domain_separator(domain: &Domain) -> B256 {
    let mut buf = Vec::with_capacity(32 * 5);
    buf.extend_from_slice(EIP712_DOMAIN.type_hash().as_slice());
    buf.extend_from_slice(keccak256(domain.name.as_bytes()).as_slice());
    buf.extend_from_slice(keccak256(domain.version.as_bytes()).as_slice());
    buf.extend_from_slice(&U256::from(domain.chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(domain.verifying_contract.into_word().as_slice());
    keccak256(buf)
}

/// `hashStruct(MetaTransaction)`; the dynamic `functionSignature` is hashed, not embedded.
pub fn message_hash(message: &MetaTransaction) -> B256 {
    let mut buf = Vec::with_capacity(32 * 4);
    buf.extend_from_slice(META_TRANSACTION.type_hash().as_slice());
    buf.extend_from_slice(&message.nonce.to_be_bytes::<32>());
    buf.extend_from_slice(message.from.into_word().as_slice());
    buf.extend_from_slice(keccak256(&message.function_signature).as_slice());
    keccak256(buf)
}
