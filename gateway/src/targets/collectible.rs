use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolValue};
use tracing::debug;

use crate::target::{decode_call, CallContext, MetaTxTarget, Revert};

sol! {
    /// Non-fungible ownership registry.
    interface ICollectible {
        function mint(address to, uint256 tokenId) external;
        function transferFrom(address from, address to, uint256 tokenId) external;
        function ownerOf(uint256 tokenId) external view returns (address);
        function balanceOf(address owner) external view returns (uint256);
    }
}

use ICollectible::ICollectibleCalls;

#[derive(Debug, Clone)]
pub struct Collectible {
    name: String,
    minter: Address,
    owners: HashMap<U256, Address>,
    balances: HashMap<Address, U256>,
}

impl Collectible {
    pub fn new(name: impl Into<String>, minter: Address) -> Self {
        Self {
            name: name.into(),
            minter,
            owners: HashMap::new(),
            balances: HashMap::new(),
        }
    }

    pub fn owner_of(&self, token_id: U256) -> Option<Address> {
        self.owners.get(&token_id).copied()
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    fn assign(&mut self, token_id: U256, to: Address) {
        if let Some(previous) = self.owners.insert(token_id, to) {
            let balance = self.balance_of(previous);
            self.balances.insert(previous, balance - U256::from(1u64));
        }
        let balance = self.balance_of(to);
        self.balances.insert(to, balance + U256::from(1u64));
    }
}

impl MetaTxTarget for Collectible {
    fn name(&self) -> &str {
        &self.name
    }

    fn dispatch(&mut self, ctx: &CallContext, calldata: &[u8]) -> Result<Bytes, Revert> {
        let call = decode_call::<ICollectibleCalls>(calldata)?;
        debug!(sender = %ctx.sender, contract = %ctx.contract, "collectible call");
        let output = match call {
            ICollectibleCalls::mint(call) => {
                if ctx.sender != self.minter {
                    return Err(Revert::new("caller is not the minter"));
                }
                if call.to == Address::ZERO {
                    return Err(Revert::new("mint to the zero address"));
                }
                if self.owners.contains_key(&call.tokenId) {
                    return Err(Revert::new("token already minted"));
                }
                self.assign(call.tokenId, call.to);
                Vec::new()
            }
            ICollectibleCalls::transferFrom(call) => {
                let owner = self
                    .owner_of(call.tokenId)
                    .ok_or_else(|| Revert::new("nonexistent token"))?;
                if owner != call.from {
                    return Err(Revert::new("transfer from incorrect owner"));
                }
                if ctx.sender != owner {
                    return Err(Revert::new("caller is not the token owner"));
                }
                if call.to == Address::ZERO {
                    return Err(Revert::new("transfer to the zero address"));
                }
                self.assign(call.tokenId, call.to);
                Vec::new()
            }
            ICollectibleCalls::ownerOf(call) => self
                .owner_of(call.tokenId)
                .ok_or_else(|| Revert::new("nonexistent token"))?
                .abi_encode(),
            ICollectibleCalls::balanceOf(call) => self.balance_of(call.owner).abi_encode(),
        };
        Ok(output.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolCall;

    fn ctx(sender: Address) -> CallContext {
        CallContext {
            sender,
            contract: Address::repeat_byte(0xcd),
        }
    }

    fn minted(minter: Address, to: Address, id: u64) -> Collectible {
        let mut registry = Collectible::new("Collectible", minter);
        let mint = ICollectible::mintCall {
            to,
            tokenId: U256::from(id),
        };
        registry.dispatch(&ctx(minter), &mint.abi_encode()).unwrap();
        registry
    }

    #[test]
    fn only_minter_mints() {
        let minter = Address::repeat_byte(9);
        let mut registry = Collectible::new("Collectible", minter);
        let mint = ICollectible::mintCall {
            to: Address::repeat_byte(1),
            tokenId: U256::from(1u64),
        };
        let err = registry
            .dispatch(&ctx(Address::repeat_byte(1)), &mint.abi_encode())
            .unwrap_err();
        assert_eq!(err.reason, "caller is not the minter");
        assert_eq!(registry.owner_of(U256::from(1u64)), None);
    }

    #[test]
    fn owner_transfers_and_balances_follow() {
        let minter = Address::repeat_byte(9);
        let alice = Address::repeat_byte(1);
        let bob = Address::repeat_byte(2);
        let mut registry = minted(minter, alice, 5);
        let transfer = ICollectible::transferFromCall {
            from: alice,
            to: bob,
            tokenId: U256::from(5u64),
        };
        registry.dispatch(&ctx(alice), &transfer.abi_encode()).unwrap();
        assert_eq!(registry.owner_of(U256::from(5u64)), Some(bob));
        assert_eq!(registry.balance_of(alice), U256::ZERO);
        assert_eq!(registry.balance_of(bob), U256::from(1u64));
    }

    #[test]
    fn stranger_cannot_transfer() {
        let minter = Address::repeat_byte(9);
        let alice = Address::repeat_byte(1);
        let mut registry = minted(minter, alice, 5);
        let transfer = ICollectible::transferFromCall {
            from: alice,
            to: minter,
            tokenId: U256::from(5u64),
        };
        let err = registry
            .dispatch(&ctx(Address::repeat_byte(3)), &transfer.abi_encode())
            .unwrap_err();
        assert_eq!(err.reason, "caller is not the token owner");
    }

    #[test]
    fn owner_query_reverts_for_unknown_token() {
        let mut registry = Collectible::new("Collectible", Address::repeat_byte(9));
        let query = ICollectible::ownerOfCall {
            tokenId: U256::from(77u64),
        };
        let err = registry
            .dispatch(&ctx(Address::repeat_byte(1)), &query.abi_encode())
            .unwrap_err();
        assert_eq!(err.reason, "nonexistent token");
    }
}
