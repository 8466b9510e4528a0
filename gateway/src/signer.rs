//! Client side: what a user's wallet does before handing a call to a relayer.

use alloy_primitives::{Bytes, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{anyhow, Result};
use gateway_types::{Domain, MetaTransaction, SignedMetaTransaction};

use crate::{signature::SignatureParts, typed_data::meta_transaction_digest};

/// Sign `function_signature` for `domain` at `nonce`.
pub fn sign_meta_transaction(
    signer: &PrivateKeySigner,
    domain: &Domain,
    nonce: U256,
    function_signature: &[u8],
) -> Result<SignedMetaTransaction> {
    let message = MetaTransaction {
        nonce,
        from: signer.address(),
        function_signature: Bytes::copy_from_slice(function_signature),
    };
    let digest = meta_transaction_digest(domain, &message);
    let signature = signer.sign_hash_sync(&digest)?;
    let parts = SignatureParts::from_signature(&signature)
        .map_err(|e| anyhow!("signer produced an unusable signature: {e}"))?;

    Ok(SignedMetaTransaction {
        contract: domain.verifying_contract,
        from: message.from,
        nonce,
        function_signature: message.function_signature,
        r: parts.r(),
        s: parts.s(),
        v: parts.v(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{bytes, Address};

    #[test]
    fn signature_recovers_to_the_wallet() {
        let wallet = PrivateKeySigner::random();
        let domain = Domain::new("Vault Token", 1, Address::repeat_byte(0xaa));
        let call = bytes!("d0e30db0");
        let signed = sign_meta_transaction(&wallet, &domain, U256::from(2u64), &call).unwrap();

        assert_eq!(signed.from, wallet.address());
        assert_eq!(signed.contract, domain.verifying_contract);
        let digest = meta_transaction_digest(
            &domain,
            &MetaTransaction {
                nonce: U256::from(2u64),
                from: wallet.address(),
                function_signature: call,
            },
        );
        let parts = SignatureParts::new(signed.r, signed.s, signed.v).unwrap();
        assert_eq!(parts.recover(&digest).unwrap(), wallet.address());
    }
}
