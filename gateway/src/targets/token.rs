use std::collections::HashMap;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolValue};
use tracing::debug;

use crate::target::{decode_call, CallContext, MetaTxTarget, Revert};

sol! {
    /// Deposit/withdraw token ledger.
    interface IVaultToken {
        function deposit(uint256 amount) external;
        function withdraw(uint256 amount) external;
        function transfer(address to, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function totalSupply() external view returns (uint256);
    }
}

use IVaultToken::IVaultTokenCalls;

/// Fungible balances keyed by holder.
#[derive(Debug, Clone, Default)]
pub struct TokenVault {
    name: String,
    balances: HashMap<Address, U256>,
    total_supply: U256,
}

impl TokenVault {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn credit(&mut self, account: Address, amount: U256) -> Result<(), Revert> {
        let balance = self.balance_of(account);
        let updated = balance
            .checked_add(amount)
            .ok_or_else(|| Revert::new("balance overflow"))?;
        self.balances.insert(account, updated);
        Ok(())
    }

    fn debit(&mut self, account: Address, amount: U256) -> Result<(), Revert> {
        let balance = self.balance_of(account);
        let updated = balance
            .checked_sub(amount)
            .ok_or_else(|| Revert::new("insufficient balance"))?;
        self.balances.insert(account, updated);
        Ok(())
    }
}

impl MetaTxTarget for TokenVault {
    fn name(&self) -> &str {
        &self.name
    }

    fn dispatch(&mut self, ctx: &CallContext, calldata: &[u8]) -> Result<Bytes, Revert> {
        let call = decode_call::<IVaultTokenCalls>(calldata)?;
        debug!(sender = %ctx.sender, contract = %ctx.contract, "token call");
        let output = match call {
            IVaultTokenCalls::deposit(call) => {
                self.total_supply = self
                    .total_supply
                    .checked_add(call.amount)
                    .ok_or_else(|| Revert::new("supply overflow"))?;
                self.credit(ctx.sender, call.amount)?;
                Vec::new()
            }
            IVaultTokenCalls::withdraw(call) => {
                self.debit(ctx.sender, call.amount)?;
                self.total_supply -= call.amount;
                Vec::new()
            }
            IVaultTokenCalls::transfer(call) => {
                if call.to == Address::ZERO {
                    return Err(Revert::new("transfer to the zero address"));
                }
                self.debit(ctx.sender, call.amount)?;
                self.credit(call.to, call.amount)?;
                true.abi_encode()
            }
            IVaultTokenCalls::balanceOf(call) => self.balance_of(call.account).abi_encode(),
            IVaultTokenCalls::totalSupply(_) => self.total_supply.abi_encode(),
        };
        Ok(output.into())
    }
}
