pub mod ledger;
pub mod manager;
