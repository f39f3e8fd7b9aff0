//! The in-memory nonce ledger: account -> network -> last seen nonce.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The last confirmed/assigned nonce for one account on one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceEntry {
    pub nonce: u64,
}

/// Per-network nonce entries for a single account.
pub type AccountNonces = HashMap<String, NonceEntry>;

/// Mapping from account identifier to per-network nonce entries.
///
/// Account keys are stored lower-cased; every lookup and insert
/// lower-cases its input first, so `0xABC` and `0xabc` address the same
/// entry. A given `(account, network)` pair holds at most one entry at
/// any time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NonceLedger {
    accounts: HashMap<String, AccountNonces>,
}

impl NonceLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the ledger tracks no accounts at all.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// All tracked accounts, keyed lower-case.
    pub fn accounts(&self) -> &HashMap<String, AccountNonces> {
        &self.accounts
    }

    /// Per-network entries for one account, if any.
    pub fn account(&self, account: &str) -> Option<&AccountNonces> {
        self.accounts.get(&account.to_lowercase())
    }

    /// The stored nonce for `(account, network)`, if one exists.
    pub fn current_nonce(&self, account: &str, network: &str) -> Option<u64> {
        self.accounts
            .get(&account.to_lowercase())
            .and_then(|networks| networks.get(network))
            .map(|entry| entry.nonce)
    }

    /// Replace the entry at `(account, network)` with `{ nonce }`.
    pub fn set_entry(&mut self, account: &str, network: &str, nonce: u64) {
        self.accounts
            .entry(account.to_lowercase())
            .or_default()
            .insert(network.to_string(), NonceEntry { nonce });
    }

    /// Shallow merge at the account-key level: accounts present in
    /// `other` replace the local account wholesale, other accounts are
    /// kept as-is.
    pub fn merge(&mut self, other: NonceLedger) {
        self.accounts.extend(other.accounts);
    }
}
