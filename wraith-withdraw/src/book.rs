//! Local ledger of stealth balances.
//!
//! Indexer records are historical: they keep the amount that was received,
//! not what is left. The book layers two amounts per stealth account on top:
//! what this client has already moved (`spent`) and what an in-progress
//! withdrawal has claimed but not yet settled (`reserved`). Both are
//! subtracted before selection, so a drained or in-flight stealth account is
//! never picked twice, even by overlapping withdrawals.

use std::collections::HashMap;

use parking_lot::RwLock;

use wraith_core::error::Result;
use wraith_core::types::{PublicKey, StealthBalance, WithdrawalPick};

use crate::selector::{select_balances, total_available};

type BalanceKey = (PublicKey, String);

fn key_of(pick: &WithdrawalPick) -> BalanceKey {
    (pick.balance.address, pick.balance.mint.clone())
}

#[derive(Debug, Default)]
struct Ledger {
    spent: HashMap<BalanceKey, u64>,
    reserved: HashMap<BalanceKey, u64>,
}

impl Ledger {
    fn used(&self, key: &BalanceKey) -> u64 {
        let spent = self.spent.get(key).copied().unwrap_or(0);
        let reserved = self.reserved.get(key).copied().unwrap_or(0);
        spent.saturating_add(reserved)
    }

    fn unreserve(&mut self, key: &BalanceKey, amount: u64) {
        if let Some(held) = self.reserved.get_mut(key) {
            *held = held.saturating_sub(amount);
            if *held == 0 {
                self.reserved.remove(key);
            }
        }
    }
}

/// Balance records plus the amounts already withdrawn or reserved from each.
#[derive(Debug, Default)]
pub struct BalanceBook {
    records: RwLock<Vec<StealthBalance>>,
    ledger: RwLock<Ledger>,
}

impl BalanceBook {
    /// Creates a book over observed records.
    pub fn new(records: Vec<StealthBalance>) -> Self {
        Self {
            records: RwLock::new(records),
            ledger: RwLock::new(Ledger::default()),
        }
    }

    /// Replaces the records after a refresh from the indexer.
    ///
    /// Spent and reserved amounts are kept.
    pub fn replace(&self, records: Vec<StealthBalance>) {
        *self.records.write() = records;
    }

    /// Balances of `mint` with what remains in each.
    pub fn available(&self, mint: &str) -> Vec<StealthBalance> {
        let ledger = self.ledger.read();
        self.remaining(&ledger, mint)
    }

    // Lock order: ledger, then records.
    fn remaining(&self, ledger: &Ledger, mint: &str) -> Vec<StealthBalance> {
        self.records
            .read()
            .iter()
            .filter(|b| b.mint == mint)
            .filter_map(|b| {
                let used = ledger.used(&(b.address, b.mint.clone()));
                let remaining = b.amount.saturating_sub(used);
                (remaining > 0).then(|| StealthBalance {
                    amount: remaining,
                    ..b.clone()
                })
            })
            .collect()
    }

    /// Total remaining for `mint`.
    pub fn total(&self, mint: &str) -> u64 {
        total_available(&self.available(mint), mint)
    }

    /// Previews the picks for `amount` of `mint` without claiming them.
    pub fn select(&self, mint: &str, amount: u64) -> Result<Vec<WithdrawalPick>> {
        select_balances(&self.available(mint), mint, amount)
    }

    /// Selects picks for `amount` of `mint` and reserves them in one step.
    ///
    /// Every returned pick must later be passed to [`commit`](Self::commit)
    /// or [`release`](Self::release).
    ///
    /// # Errors
    /// `InsufficientFunds` if what remains (after other reservations) is
    /// short; nothing is reserved in that case.
    pub fn reserve(&self, mint: &str, amount: u64) -> Result<Vec<WithdrawalPick>> {
        let mut ledger = self.ledger.write();
        let picks = select_balances(&self.remaining(&ledger, mint), mint, amount)?;
        for pick in &picks {
            let held = ledger.reserved.entry(key_of(pick)).or_insert(0);
            *held = held.saturating_add(pick.amount_to_take);
        }
        Ok(picks)
    }

    /// Settles a reserved pick whose transaction confirmed.
    pub fn commit(&self, pick: &WithdrawalPick) {
        let key = key_of(pick);
        let mut ledger = self.ledger.write();
        ledger.unreserve(&key, pick.amount_to_take);
        let used = ledger.spent.entry(key).or_insert(0);
        *used = used.saturating_add(pick.amount_to_take);
    }

    /// Returns a reserved pick to the pool after its transaction failed.
    pub fn release(&self, pick: &WithdrawalPick) {
        self.ledger
            .write()
            .unreserve(&key_of(pick), pick.amount_to_take);
    }

    /// Amount of `mint` currently held by unsettled picks.
    pub fn reserved(&self, mint: &str) -> u64 {
        self.ledger
            .read()
            .reserved
            .iter()
            .filter(|((_, m), _)| m == mint)
            .map(|(_, amount)| *amount)
            .sum()
    }
}
