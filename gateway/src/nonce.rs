//! Per-account replay counters.

use std::{collections::HashMap, sync::Arc};

use alloy_primitives::{Address, U256};
use parking_lot::Mutex;

/// Keyed nonce store. Each account gets its own mutex so that the
/// read-verify-advance sequence of one account never races with itself,
/// while unrelated accounts proceed independently.
#[derive(Debug, Default)]
pub struct NonceLedger {
    slots: Mutex<HashMap<Address, Arc<Mutex<U256>>>>,
}

/// Exclusive view of one account's nonce, valid while the account lock is held.
#[derive(Debug)]
pub struct NonceEntry<'a> {
    account: Address,
    value: &'a mut U256,
}

impl NonceEntry<'_> {
    pub fn account(&self) -> Address {
        self.account
    }

    pub fn current(&self) -> U256 {
        *self.value
    }

    /// Increment by one and return the new value.
    pub fn advance(&mut self) -> U256 {
        *self.value = self.value.saturating_add(U256::from(1u64));
        *self.value
    }
}

impl NonceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, account: Address) -> Arc<Mutex<U256>> {
        self.slots.lock().entry(account).or_default().clone()
    }

    /// Current nonce, zero for accounts never seen.
    pub fn current_nonce(&self, account: Address) -> U256 {
        let slot = self.slots.lock().get(&account).cloned();
        slot.map_or(U256::ZERO, |slot| *slot.lock())
    }

    /// Advance `account` by one. Callers must have validated the nonce first.
    pub fn advance(&self, account: Address) -> U256 {
        self.with_account(account, |entry| entry.advance())
    }

    /// Run `f` while holding `account`'s lock.
    ///
    /// An account whose nonce is still zero afterwards is not kept, so
    /// rejected submissions from arbitrary addresses leave nothing behind.
    pub fn with_account<R>(&self, account: Address, f: impl FnOnce(&mut NonceEntry<'_>) -> R) -> R {
        let slot = self.slot(account);
        let result = {
            let mut guard = slot.lock();
            let mut entry = NonceEntry {
                account,
                value: &mut *guard,
            };
            f(&mut entry)
        };
        self.release(account, slot);
        result
    }

    fn release(&self, account: Address, slot: Arc<Mutex<U256>>) {
        let mut slots = self.slots.lock();
        // Slots are only cloned under the map lock, so a count of two (map and
        // `slot`) means no other caller can be holding or waiting on it.
        if Arc::strong_count(&slot) == 2 && slot.lock().is_zero() {
            slots.remove(&account);
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_accounts(&self) -> usize {
        self.slots.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn seed(&self, account: Address, value: U256) {
        self.slots.lock().insert(account, Arc::new(Mutex::new(value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn unseen_accounts_start_at_zero() {
        let ledger = NonceLedger::new();
        assert_eq!(ledger.current_nonce(Address::repeat_byte(1)), U256::ZERO);
    }

    #[test]
    fn advance_is_per_account() {
        let ledger = NonceLedger::new();
        let alice = Address::repeat_byte(1);
        let bob = Address::repeat_byte(2);
        assert_eq!(ledger.advance(alice), U256::from(1u64));
        assert_eq!(ledger.advance(alice), U256::from(2u64));
        assert_eq!(ledger.current_nonce(alice), U256::from(2u64));
        assert_eq!(ledger.current_nonce(bob), U256::ZERO);
    }

    #[test]
    fn entry_sees_its_own_advance() {
        let ledger = NonceLedger::new();
        let alice = Address::repeat_byte(1);
        let seen = ledger.with_account(alice, |entry| {
            let before = entry.current();
            entry.advance();
            (entry.account(), before, entry.current())
        });
        assert_eq!(seen, (alice, U256::ZERO, U256::from(1u64)));
    }

    #[test]
    fn concurrent_advances_are_never_lost() {
        let ledger = NonceLedger::new();
        let alice = Address::repeat_byte(1);
        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..250 {
                        ledger.advance(alice);
                    }
                });
            }
        });
        assert_eq!(ledger.current_nonce(alice), U256::from(2000u64));
    }

    #[test]
    fn untouched_accounts_are_not_retained() {
        let ledger = NonceLedger::new();
        for byte in 1..=50u8 {
            let current = ledger.with_account(Address::repeat_byte(byte), |entry| entry.current());
            assert_eq!(current, U256::ZERO);
        }
        assert_eq!(ledger.tracked_accounts(), 0);

        ledger.advance(Address::repeat_byte(1));
        ledger.with_account(Address::repeat_byte(2), |_| ());
        assert_eq!(ledger.tracked_accounts(), 1);
        assert_eq!(ledger.current_nonce(Address::repeat_byte(1)), U256::from(1u64));
    }

    #[test]
    fn concurrent_lookups_do_not_drop_live_slots() {
        let ledger = NonceLedger::new();
        let alice = Address::repeat_byte(1);
        thread::scope(|scope| {
            for worker in 0..8 {
                let ledger = &ledger;
                scope.spawn(move || {
                    for _ in 0..250 {
                        if worker % 2 == 0 {
                            ledger.advance(alice);
                        } else {
                            ledger.with_account(alice, |entry| entry.current());
                        }
                    }
                });
            }
        });
        assert_eq!(ledger.current_nonce(alice), U256::from(1000u64));
        assert_eq!(ledger.tracked_accounts(), 1);
    }
}
