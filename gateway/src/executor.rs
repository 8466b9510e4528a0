//! Verification and dispatch of signed meta-transactions.
//!
//! One submission walks `Received -> DigestBuilt -> SignerRecovered ->
//! NonceVerified -> Dispatched` and ends either committed or reverted. The
//! nonce read, the signature check, the dispatch and the nonce advance all
//! happen under the signer's ledger lock, and the dispatch runs against a
//! checkpoint of the target, so a revert leaves both the nonce and the target
//! state exactly as they were.

use alloy_primitives::{Address, Bytes, B256, U256};
use gateway_types::{Domain, MetaTransaction, MetaTransactionExecuted};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::{
    error::{GatewayError, Result},
    nonce::NonceLedger,
    signature::SignatureParts,
    struct_hash::{domain_separator, message_hash},
    target::{CallContext, MetaTxTarget},
    typed_data::signing_digest,
};

/// Outcome of a committed meta-transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReceipt {
    /// The nonce this execution consumed.
    pub nonce: U256,
    pub return_data: Bytes,
    pub event: MetaTransactionExecuted,
}

/// Fronts one contract instance: owns its domain, its nonce ledger and its state.
#[derive(Debug)]
pub struct MetaTxExecutor<T> {
    domain: Domain,
    separator: B256,
    ledger: NonceLedger,
    target: Mutex<T>,
    events: Mutex<Vec<MetaTransactionExecuted>>,
}

impl<T: MetaTxTarget> MetaTxExecutor<T> {
    /// Deploy `target` at `address` on `chain_id`. The domain name is the target's name.
    pub fn new(target: T, chain_id: u64, address: Address) -> Self {
        let domain = Domain::new(target.name(), chain_id, address);
        let separator = domain_separator(&domain);
        debug!(name = %domain.name, chain_id, %address, %separator, "executor deployed");
        Self {
            domain,
            separator,
            ledger: NonceLedger::new(),
            target: Mutex::new(target),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn domain_separator(&self) -> B256 {
        self.separator
    }

    pub fn chain_id(&self) -> u64 {
        self.domain.chain_id
    }

    pub fn address(&self) -> Address {
        self.domain.verifying_contract
    }

    /// Nonce the next meta-transaction from `account` must be signed with.
    pub fn nonce(&self, account: Address) -> U256 {
        self.ledger.current_nonce(account)
    }

    /// Snapshot of every `MetaTransactionExecuted` event so far, oldest first.
    pub fn events(&self) -> Vec<MetaTransactionExecuted> {
        self.events.lock().clone()
    }

    /// Read the committed target state.
    pub fn inspect<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.target.lock())
    }

    /// Whether `signature` authorizes `function_signature` for `from` at its current nonce.
    pub fn verify(&self, from: Address, function_signature: &[u8], signature: &SignatureParts) -> bool {
        let nonce = self.ledger.current_nonce(from);
        self.authenticate(from, nonce, function_signature, signature).is_ok()
    }

    /// Execute with the signature given as separate `r`, `s`, `v` components.
    pub fn execute(
        &self,
        relayer: Address,
        from: Address,
        function_signature: &[u8],
        r: B256,
        s: B256,
        v: u8,
    ) -> Result<ExecutionReceipt> {
        let signature = SignatureParts::new(r, s, v).inspect_err(|err| {
            warn!(%from, %relayer, %err, "rejected malformed signature");
        })?;
        self.execute_parts(relayer, from, function_signature, &signature)
    }

    /// Execute with a 65-byte `r || s || v` signature.
    pub fn execute_signature(
        &self,
        relayer: Address,
        from: Address,
        function_signature: &[u8],
        signature: &[u8],
    ) -> Result<ExecutionReceipt> {
        let signature = SignatureParts::from_bytes(signature).inspect_err(|err| {
            warn!(%from, %relayer, %err, "rejected malformed signature");
        })?;
        self.execute_parts(relayer, from, function_signature, &signature)
    }

    pub fn execute_parts(
        &self,
        relayer: Address,
        from: Address,
        function_signature: &[u8],
        signature: &SignatureParts,
    ) -> Result<ExecutionReceipt> {
        self.ledger.with_account(from, |entry| {
            let nonce = entry.current();
            if let Err(err) = self.authenticate(from, nonce, function_signature, signature) {
                warn!(%from, %relayer, %nonce, %err, "rejected meta-transaction");
                return Err(err);
            }
            if nonce == U256::MAX {
                return Err(GatewayError::NonceExhausted(from));
            }
            trace!(%from, %nonce, "nonce verified");

            let return_data = self.commit(from, function_signature).inspect_err(|err| {
                warn!(%from, %relayer, %nonce, %err, "meta-transaction reverted");
            })?;
            entry.advance();

            let event = MetaTransactionExecuted {
                user: from,
                relayer,
                function_signature: Bytes::copy_from_slice(function_signature),
            };
            self.events.lock().push(event.clone());
            info!(%from, %relayer, %nonce, contract = %self.address(), "meta-transaction executed");
            Ok(ExecutionReceipt {
                nonce,
                return_data,
                event,
            })
        })
    }

    /// Plain call with `sender` as the caller. No signature, no nonce.
    pub fn call(&self, sender: Address, calldata: &[u8]) -> Result<Bytes> {
        self.commit(sender, calldata)
    }

    fn authenticate(
        &self,
        from: Address,
        nonce: U256,
        function_signature: &[u8],
        signature: &SignatureParts,
    ) -> Result<()> {
        let message = MetaTransaction {
            nonce,
            from,
            function_signature: Bytes::copy_from_slice(function_signature),
        };
        let digest = signing_digest(self.separator, message_hash(&message));
        trace!(%from, %digest, "digest built");

        let recovered = signature.recover(&digest).ok();
        trace!(%from, ?recovered, "signer recovered");
        match recovered {
            Some(signer) if from != Address::ZERO && signer == from => Ok(()),
            _ => Err(GatewayError::InvalidSigner {
                expected: from,
                recovered,
            }),
        }
    }

    /// Dispatch into a checkpoint of the target and keep it only on success.
    fn commit(&self, sender: Address, calldata: &[u8]) -> Result<Bytes> {
        let ctx = CallContext {
            sender,
            contract: self.address(),
        };
        let mut state = self.target.lock();
        let mut checkpoint = state.clone();
        match checkpoint.dispatch(&ctx, calldata) {
            Ok(output) => {
                *state = checkpoint;
                Ok(output)
            }
            Err(revert) => Err(GatewayError::DispatchReverted {
                reason: revert.reason,
            }),
        }
    }
}
