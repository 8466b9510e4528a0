//! Registry of deployed executors on one chain, routed by contract address.

use std::{collections::HashMap, sync::Arc};

use alloy_primitives::{Address, Bytes, U256};
use gateway_types::{Domain, NetworkConfig, Submission, TargetKind};
use tracing::{info, warn};

use crate::{
    error::{GatewayError, Result},
    executor::{ExecutionReceipt, MetaTxExecutor},
    signature::SignatureParts,
    target::MetaTxTarget,
    targets::{Collectible, TokenVault},
};

/// Type-erased view of a [`MetaTxExecutor`].
pub trait Endpoint: Send + Sync {
    fn domain(&self) -> &Domain;

    fn nonce(&self, account: Address) -> U256;

    fn execute_meta(
        &self,
        relayer: Address,
        from: Address,
        function_signature: &[u8],
        signature: &SignatureParts,
    ) -> Result<ExecutionReceipt>;

    fn call(&self, sender: Address, calldata: &[u8]) -> Result<Bytes>;
}

impl<T: MetaTxTarget + 'static> Endpoint for MetaTxExecutor<T> {
    fn domain(&self) -> &Domain {
        MetaTxExecutor::domain(self)
    }

    fn nonce(&self, account: Address) -> U256 {
        MetaTxExecutor::nonce(self, account)
    }

    fn execute_meta(
        &self,
        relayer: Address,
        from: Address,
        function_signature: &[u8],
        signature: &SignatureParts,
    ) -> Result<ExecutionReceipt> {
        self.execute_parts(relayer, from, function_signature, signature)
    }

    fn call(&self, sender: Address, calldata: &[u8]) -> Result<Bytes> {
        MetaTxExecutor::call(self, sender, calldata)
    }
}

/// What a [`Submission`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Called(Bytes),
    Executed(ExecutionReceipt),
}

pub struct Network {
    chain_id: u64,
    endpoints: HashMap<Address, Arc<dyn Endpoint>>,
}

impl Network {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            endpoints: HashMap::new(),
        }
    }

    /// Deploy every contract listed in `config`.
    pub fn from_config(config: &NetworkConfig) -> Result<Self> {
        let mut network = Self::new(config.chain_id);
        for deployment in &config.deployments {
            match deployment.kind {
                TargetKind::Token => {
                    network.deploy(deployment.address, TokenVault::new(&deployment.name))?;
                }
                TargetKind::Collectible => {
                    // Without a configured minter nothing can ever be minted.
                    let minter = deployment.minter.unwrap_or(Address::ZERO);
                    network.deploy(
                        deployment.address,
                        Collectible::new(&deployment.name, minter),
                    )?;
                }
            }
        }
        Ok(network)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Place `target` at `address`. Addresses are unique per network, which
    /// keeps every deployed domain distinct.
    pub fn deploy<T: MetaTxTarget + 'static>(
        &mut self,
        address: Address,
        target: T,
    ) -> Result<Arc<MetaTxExecutor<T>>> {
        if self.endpoints.contains_key(&address) {
            return Err(GatewayError::AddressInUse(address));
        }
        let executor = Arc::new(MetaTxExecutor::new(target, self.chain_id, address));
        info!(name = %executor.domain().name, %address, "deployed");
        self.endpoints.insert(address, executor.clone());
        Ok(executor)
    }

    pub fn endpoint(&self, address: Address) -> Result<Arc<dyn Endpoint>> {
        self.endpoints
            .get(&address)
            .cloned()
            .ok_or(GatewayError::UnknownContract(address))
    }

    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.endpoints.values().map(|endpoint| endpoint.domain())
    }

    /// Route one submission to its contract. `relayer` is recorded on meta executions.
    pub fn submit(&self, relayer: Address, submission: &Submission) -> Result<Outcome> {
        let endpoint = self.endpoint(submission.target())?;
        match submission {
            Submission::Direct { caller, data, .. } => {
                endpoint.call(*caller, data).map(Outcome::Called)
            }
            Submission::Meta(signed) => {
                let expected = endpoint.nonce(signed.from);
                if signed.nonce != expected {
                    warn!(from = %signed.from, signed = %signed.nonce, %expected, "signed nonce is not current");
                }
                let signature = SignatureParts::new(signed.r, signed.s, signed.v)?;
                endpoint
                    .execute_meta(relayer, signed.from, &signed.function_signature, &signature)
                    .map(Outcome::Executed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{signer::sign_meta_transaction, targets::IVaultToken};
    use alloy_signer_local::PrivateKeySigner;
    use alloy_sol_types::SolCall;
    use gateway_types::DeploymentConfig;

    #[test]
    fn duplicate_address_is_rejected() {
        let mut network = Network::new(1);
        let address = Address::repeat_byte(0xaa);
        network.deploy(address, TokenVault::new("Vault Token")).unwrap();
        let err = network
            .deploy(address, Collectible::new("Collectible", Address::ZERO))
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err, GatewayError::AddressInUse(address));
    }

    #[test]
    fn config_deploys_each_kind() {
        let config = NetworkConfig {
            chain_id: 5,
            deployments: vec![
                DeploymentConfig {
                    kind: TargetKind::Token,
                    name: "Vault Token".into(),
                    address: Address::repeat_byte(1),
                    minter: None,
                },
                DeploymentConfig {
                    kind: TargetKind::Collectible,
                    name: "Collectible".into(),
                    address: Address::repeat_byte(2),
                    minter: Some(Address::repeat_byte(3)),
                },
            ],
        };
        let network = Network::from_config(&config).unwrap();
        let collectible = network.endpoint(Address::repeat_byte(2)).unwrap();
        assert_eq!(collectible.domain().name, "Collectible");
        assert_eq!(collectible.domain().chain_id, 5);
        assert_eq!(network.domains().count(), 2);
    }

    #[test]
    fn unknown_target_is_reported() {
        let network = Network::new(1);
        let submission = Submission::Direct {
            to: Address::repeat_byte(9),
            caller: Address::ZERO,
            data: Bytes::new(),
        };
        assert_eq!(
            network.submit(Address::ZERO, &submission).unwrap_err(),
            GatewayError::UnknownContract(Address::repeat_byte(9))
        );
    }

    #[test_log::test]
    fn stale_signed_nonce_fails_as_invalid_signer() {
        let mut network = Network::new(1);
        let address = Address::repeat_byte(0xaa);
        network.deploy(address, TokenVault::new("Vault Token")).unwrap();
        let user = PrivateKeySigner::random();
        let call = IVaultToken::depositCall {
            amount: U256::from(1u64),
        }
        .abi_encode();
        let domain = network.endpoint(address).unwrap().domain().clone();
        let signed = sign_meta_transaction(&user, &domain, U256::ZERO, &call).unwrap();
        let submission = Submission::Meta(signed);

        network.submit(Address::ZERO, &submission).unwrap();
        let err = network.submit(Address::ZERO, &submission).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidSigner { expected, .. } if expected == user.address()));
        assert_eq!(network.endpoint(address).unwrap().nonce(user.address()), U256::from(1u64));
    }
}
