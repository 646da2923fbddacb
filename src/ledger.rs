/*!
# Ledger Boundary

The settlement core never keeps balances itself; minting, transfers and
burns are delegated to the host's ledger service through the [`Ledger`]
trait. Calls happen synchronously inside the triggering state transition,
and a ledger failure surfaces as that operation's error — never retried
internally.

[`InMemoryLedger`] is a reference implementation for embedding hosts and
tests.
*/

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use thiserror::Error;

use crate::state::{AccountId, Coin};

/// Account that escrows pooled outgoing transfers.
pub fn module_account() -> AccountId {
    AccountId::new("causeway_bridge")
}

/// Failure reported by the ledger collaborator.
#[derive(Error, Debug)]
#[error("ledger rejected {op}: {reason}")]
pub struct LedgerError {
    pub op: &'static str,
    pub reason: String,
}

impl LedgerError {
    pub fn new(op: &'static str, reason: impl Into<String>) -> Self {
        Self {
            op,
            reason: reason.into(),
        }
    }
}

/// Host ledger service: balance bookkeeping and account classification.
pub trait Ledger: Send + Sync {
    /// Create `coin` out of thin air on `account`.
    fn mint_to(&self, account: &AccountId, coin: &Coin) -> Result<(), LedgerError>;

    /// Move `coin` between two accounts.
    fn transfer(&self, from: &AccountId, to: &AccountId, coin: &Coin) -> Result<(), LedgerError>;

    /// Destroy `coin` held by `account`.
    fn burn_from(&self, account: &AccountId, coin: &Coin) -> Result<(), LedgerError>;

    /// Whether `account` is program-owned rather than a natural user.
    fn is_module_account(&self, account: &AccountId) -> bool;
}

/// In-memory ledger with per-(account, denom) balances.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: RwLock<HashMap<(AccountId, String), u128>>,
    module_accounts: RwLock<HashSet<AccountId>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        let ledger = Self::default();
        ledger.mark_module_account(module_account());
        ledger
    }

    /// Register `account` as program-owned.
    pub fn mark_module_account(&self, account: AccountId) {
        self.module_accounts.write().insert(account);
    }

    pub fn balance_of(&self, account: &AccountId, denom: &str) -> u128 {
        self.balances
            .read()
            .get(&(account.clone(), denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn credit(&self, account: &AccountId, coin: &Coin) -> Result<(), LedgerError> {
        let mut balances = self.balances.write();
        let slot = balances
            .entry((account.clone(), coin.denom.clone()))
            .or_insert(0);
        *slot = slot
            .checked_add(coin.amount)
            .ok_or_else(|| LedgerError::new("credit", format!("balance overflow for {account}")))?;
        Ok(())
    }

    fn debit(&self, account: &AccountId, coin: &Coin) -> Result<(), LedgerError> {
        let mut balances = self.balances.write();
        let slot = balances
            .entry((account.clone(), coin.denom.clone()))
            .or_insert(0);
        *slot = slot.checked_sub(coin.amount).ok_or_else(|| {
            LedgerError::new(
                "debit",
                format!("insufficient {} balance on {account}", coin.denom),
            )
        })?;
        Ok(())
    }
}

impl Ledger for InMemoryLedger {
    fn mint_to(&self, account: &AccountId, coin: &Coin) -> Result<(), LedgerError> {
        self.credit(account, coin)
    }

    fn transfer(&self, from: &AccountId, to: &AccountId, coin: &Coin) -> Result<(), LedgerError> {
        self.debit(from, coin)?;
        self.credit(to, coin)
    }

    fn burn_from(&self, account: &AccountId, coin: &Coin) -> Result<(), LedgerError> {
        self.debit(account, coin)
    }

    fn is_module_account(&self, account: &AccountId) -> bool {
        self.module_accounts.read().contains(account)
    }
}
