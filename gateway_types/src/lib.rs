use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// EIP-712 domain of a single deployed executor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Domain {
    /// Every executor signs under domain version "1".
    pub const VERSION: &'static str = "1";

    pub fn new(name: impl Into<String>, chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: name.into(),
            version: Self::VERSION.to_string(),
            chain_id,
            verifying_contract,
        }
    }
}

/// The typed message a user signs to authorize `function_signature`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTransaction {
    pub nonce: U256,
    pub from: Address,
    pub function_signature: Bytes,
}

/// A meta-transaction together with its signature, as handed to a relayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedMetaTransaction {
    /// Verifying contract the signature was produced for.
    pub contract: Address,
    pub from: Address,
    /// Nonce the signer used. Informational; the executor always uses its ledger value.
    pub nonce: U256,
    pub function_signature: Bytes,
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

/// One entry of a relay batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Submission {
    /// Plain call where `caller` is the effective sender.
    Direct {
        to: Address,
        caller: Address,
        data: Bytes,
    },
    Meta(SignedMetaTransaction),
}

impl Submission {
    pub fn target(&self) -> Address {
        match self {
            Submission::Direct { to, .. } => *to,
            Submission::Meta(signed) => signed.contract,
        }
    }
}

/// Emitted once per successfully executed meta-transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTransactionExecuted {
    pub user: Address,
    pub relayer: Address,
    pub function_signature: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Token,
    Collectible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub kind: TargetKind,
    pub name: String,
    pub address: Address,
    /// Account allowed to mint; only meaningful for collectibles.
    #[serde(default)]
    pub minter: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub chain_id: u64,
    #[serde(default)]
    pub deployments: Vec<DeploymentConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn domain_defaults_to_version_one() {
        let domain = Domain::new("Vault", 31337, Address::ZERO);
        assert_eq!(domain.version, "1");
        assert_eq!(domain.chain_id, 31337);
    }

    #[test]
    fn submissions_are_tagged_by_kind() {
        let json = r#"[
            {"kind":"direct","to":"0x00000000000000000000000000000000000000aa","caller":"0x00000000000000000000000000000000000000bb","data":"0x01"},
            {"kind":"meta","contract":"0x00000000000000000000000000000000000000aa","from":"0x00000000000000000000000000000000000000bb","nonce":"0x0","functionSignature":"0x","r":"0x0000000000000000000000000000000000000000000000000000000000000001","s":"0x0000000000000000000000000000000000000000000000000000000000000002","v":27}
        ]"#;
        let subs: Vec<Submission> = serde_json::from_str(json).unwrap();
        assert_eq!(subs.len(), 2);
        let aa = address!("00000000000000000000000000000000000000aa");
        assert_eq!(subs[0].target(), aa);
        match &subs[1] {
            Submission::Meta(signed) => {
                assert_eq!(signed.v, 27);
                assert_eq!(signed.contract, aa);
            }
            other => panic!("unexpected submission {other:?}"),
        }
    }

    #[test]
    fn network_config_minter_is_optional() {
        let json = r#"{"chainId":1,"deployments":[{"kind":"token","name":"Vault","address":"0x00000000000000000000000000000000000000aa"}]}"#;
        let config: NetworkConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.deployments[0].kind, TargetKind::Token);
        assert_eq!(config.deployments[0].minter, None);
    }
}
