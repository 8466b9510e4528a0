//! Splitting, normalizing and recovering 65-byte ECDSA signatures.

use alloy_primitives::{b256, Address, Signature, B256, U256};

use crate::error::SignatureError;

/// secp256k1n / 2. Signatures with a larger `s` are the malleable twin of a
/// canonical one and are rejected.
const SECP256K1N_HALF: B256 =
    b256!("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0");

/// Wire length of `r || s || v`.
pub const SIGNATURE_LENGTH: usize = 65;

/// A validated `(r, s, v)` triple with `v` in {27, 28} and a low `s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureParts {
    r: B256,
    s: B256,
    v: u8,
}

impl SignatureParts {
    /// Validate the scalars and normalize `v`. A raw `v` other than 27 or 28
    /// is treated as a 0-based recovery id and offset by 27.
    pub fn new(r: B256, s: B256, v: u8) -> Result<Self, SignatureError> {
        let normalized = match v {
            27 | 28 => v,
            raw => raw.wrapping_add(27),
        };
        if normalized != 27 && normalized != 28 {
            return Err(SignatureError::InvalidRecoveryId(v));
        }
        if r.is_zero() || s.is_zero() {
            return Err(SignatureError::ZeroScalar);
        }
        if U256::from_be_bytes(s.0) > U256::from_be_bytes(SECP256K1N_HALF.0) {
            return Err(SignatureError::NonCanonicalS);
        }
        Ok(Self {
            r,
            s,
            v: normalized,
        })
    }

    /// Split a 65-byte `r || s || v` signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }
        let r = B256::from_slice(&bytes[0..32]);
        let s = B256::from_slice(&bytes[32..64]);
        Self::new(r, s, bytes[64])
    }

    pub fn from_signature(signature: &Signature) -> Result<Self, SignatureError> {
        Self::new(
            B256::from(signature.r()),
            B256::from(signature.s()),
            27 + u8::from(signature.v()),
        )
    }

    pub fn r(&self) -> B256 {
        self.r
    }

    pub fn s(&self) -> B256 {
        self.s
    }

    /// Always 27 or 28.
    pub fn v(&self) -> u8 {
        self.v
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[0..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }

    /// Recover the address that signed `digest`.
    pub fn recover(&self, digest: &B256) -> Result<Address, alloy_primitives::SignatureError> {
        Signature::from_scalars_and_parity(self.r, self.s, self.v == 28)
            .recover_address_from_prehash(digest)
    }
}
