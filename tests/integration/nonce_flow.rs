//! Watermark behavior through the public manager API.

use nonce_ledger::action::NonceAction;
use nonce_ledger::config::{Config, MAINNET};
use nonce_ledger::domain::manager::NonceManager;

use super::create_temp_store;

#[tokio::test]
async fn increments_in_order_keep_the_latest_nonce() {
    let (store, _dir) = create_temp_store();
    let (mut manager, _) = NonceManager::new(store, Config::default());

    manager.increment_nonce("0xaa", 1, Some("goerli"));
    manager.increment_nonce("0xaa", 2, Some("goerli"));

    assert_eq!(manager.ledger().current_nonce("0xaa", "goerli"), Some(2));
}

#[tokio::test]
async fn out_of_order_increment_is_ignored() {
    let (store, _dir) = create_temp_store();
    let (mut manager, _) = NonceManager::new(store, Config::default());

    manager.increment_nonce("0xaa", 2, Some("goerli"));
    manager.increment_nonce("0xaa", 1, Some("goerli"));

    assert_eq!(manager.ledger().current_nonce("0xaa", "goerli"), Some(2));
}

#[tokio::test]
async fn increment_on_empty_ledger_creates_the_entry() {
    let (store, _dir) = create_temp_store();
    let (mut manager, _) = NonceManager::new(store, Config::default());

    manager.increment_nonce("0xaa", 5, None);

    assert_eq!(manager.ledger().current_nonce("0xaa", MAINNET), Some(5));
}

#[tokio::test]
async fn decrement_on_empty_ledger_stores_one_below() {
    let (store, _dir) = create_temp_store();
    let (mut manager, _) = NonceManager::new(store, Config::default());

    manager.decrement_nonce("0xaa", 5, None);

    assert_eq!(manager.ledger().current_nonce("0xaa", MAINNET), Some(4));
}

#[tokio::test]
async fn repeated_increment_at_the_same_value_is_a_noop() {
    let (store, _dir) = create_temp_store();
    let (mut manager, mut actions) = NonceManager::new(store, Config::default());

    manager.increment_nonce("0xaa", 3, None);
    manager.increment_nonce("0xaa", 3, None);

    assert_eq!(manager.ledger().current_nonce("0xaa", MAINNET), Some(3));

    // Only the first call produced an update.
    let first = actions.recv().await.expect("one action");
    assert!(matches!(first, NonceAction::NonceUpdated { nonce: 3, .. }));
    assert!(actions.try_recv().is_err());
}

#[tokio::test]
async fn account_keys_are_case_insensitive() {
    let (store, _dir) = create_temp_store();
    let (mut manager, _) = NonceManager::new(store, Config::default());

    manager.increment_nonce("0xABC", 3, None);
    manager.increment_nonce("0xabc", 5, None);

    let ledger = manager.ledger();
    assert_eq!(ledger.accounts().len(), 1);
    assert!(ledger.accounts().contains_key("0xabc"));
    assert_eq!(ledger.current_nonce("0xABC", MAINNET), Some(5));
}

#[tokio::test]
async fn omitted_network_defaults_to_mainnet() {
    let (store, _dir) = create_temp_store();
    let (mut manager, _) = NonceManager::new(store, Config::default());

    manager.increment_nonce("0xaa", 7, None);

    let networks = manager.ledger().account("0xaa").expect("account exists");
    assert_eq!(networks.len(), 1);
    assert_eq!(networks[MAINNET].nonce, 7);
}

#[tokio::test]
async fn configured_default_network_is_honored() {
    let (store, _dir) = create_temp_store();
    let (mut manager, _) = NonceManager::new(store, Config::with_default_network("goerli"));

    manager.increment_nonce("0xaa", 7, None);

    assert_eq!(manager.ledger().current_nonce("0xaa", "goerli"), Some(7));
    assert_eq!(manager.ledger().current_nonce("0xaa", MAINNET), None);
}

#[tokio::test]
async fn stale_decrement_is_ignored() {
    let (store, _dir) = create_temp_store();
    let (mut manager, _) = NonceManager::new(store, Config::default());

    manager.increment_nonce("0xaa", 1, None);
    // Stored nonce 1 is already below the attempted 5.
    manager.decrement_nonce("0xaa", 5, None);

    assert_eq!(manager.ledger().current_nonce("0xaa", MAINNET), Some(1));
}

#[tokio::test]
async fn decrement_at_zero_clamps_to_zero() {
    let (store, _dir) = create_temp_store();
    let (mut manager, _) = NonceManager::new(store, Config::default());

    manager.decrement_nonce("0xaa", 0, None);

    assert_eq!(manager.ledger().current_nonce("0xaa", MAINNET), Some(0));
}

#[tokio::test]
async fn increment_then_decrement_scenario() {
    let (store, _dir) = create_temp_store();
    let (mut manager, _) = NonceManager::new(store, Config::default());

    manager.increment_nonce("0xAA", 1, None);
    manager.increment_nonce("0xaa", 2, None);
    manager.decrement_nonce("0xaa", 2, None);

    let ledger = manager.ledger();
    assert_eq!(ledger.accounts().len(), 1);
    let networks = ledger.account("0xaa").expect("account exists");
    assert_eq!(networks.len(), 1);
    assert_eq!(networks[MAINNET].nonce, 1);
}

#[tokio::test]
async fn dropped_action_stream_does_not_accumulate_actions() {
    let (store, _dir) = create_temp_store();
    let (mut manager, actions) = NonceManager::new(store, Config::default());

    // An uninterested host drops the stream; publishes become no-ops
    // instead of buffering in the channel for the process lifetime.
    drop(actions);

    for nonce in 1..=1000 {
        manager.increment_nonce("0xaa", nonce, None);
    }

    assert_eq!(manager.ledger().current_nonce("0xaa", MAINNET), Some(1000));
}

#[tokio::test]
async fn actions_are_published_with_lowercased_accounts() {
    let (store, _dir) = create_temp_store();
    let (mut manager, mut actions) = NonceManager::new(store, Config::default());

    manager.increment_nonce("0xAA", 1, Some("goerli"));

    match actions.recv().await.expect("one action") {
        NonceAction::NonceUpdated {
            account,
            network,
            nonce,
        } => {
            assert_eq!(account, "0xaa");
            assert_eq!(network, "goerli");
            assert_eq!(nonce, 1);
        }
        other => panic!("unexpected action: {other}"),
    }
}
