//! Nonce Ledger - per-account, per-network transaction nonce tracking.
//!
//! This library provides:
//! - A watermark-based nonce ledger keyed by account and network
//! - Increment/decrement bookkeeping that ignores stale observations
//! - LMDB-backed persistence with fire-and-forget writes
//! - An action stream for host applications to observe ledger changes
//!
//! Host applications that want file logging can call [`logging::init`]
//! once at startup.

pub mod action;
pub mod config;
pub mod domain;
pub mod infra;
pub mod logging;
