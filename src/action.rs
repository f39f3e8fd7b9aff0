use serde::{Deserialize, Serialize};
use strum::Display;

use crate::domain::ledger::NonceLedger;

/// State transitions published by the nonce manager.
///
/// Every mutation of the in-memory ledger flows through exactly one of
/// these records, so subscribers can replay them against an empty ledger
/// and arrive at the same state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum NonceAction {
    /// The persisted ledger was fetched; the payload merges into state
    /// at the account-key level.
    LoadSucceeded(NonceLedger),
    /// The persistence read failed; state is left untouched.
    LoadFailed,
    /// A watermark check passed upstream; the entry at
    /// `state[account][network]` is overwritten wholesale.
    NonceUpdated {
        account: String,
        network: String,
        nonce: u64,
    },
}
