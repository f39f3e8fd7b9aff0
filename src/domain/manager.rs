//! The nonce manager: owns the ledger, applies watermark-guarded
//! mutations, publishes actions, and mirrors state to the store.

use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    oneshot,
};
use tracing::{debug, info, warn};

use crate::{
    action::NonceAction,
    config::Config,
    domain::ledger::NonceLedger,
    infra::store::Store,
};

/// Requests handled by the persistence writer task.
enum PersistRequest {
    Save(NonceLedger),
    Flush(oneshot::Sender<()>),
}

/// Owns the authoritative in-memory nonce ledger.
///
/// All mutations go through [`increment_nonce`](Self::increment_nonce)
/// and [`decrement_nonce`](Self::decrement_nonce); both are synchronous
/// read-modify-write operations, so there is no suspension point between
/// the watermark check and the state update. The subsequent persistence
/// write is queued to a dedicated writer task and not awaited. Writes
/// apply in queue order, so the last snapshot wins on disk; a crash
/// before the queue drains can lose the newest writes, which the
/// watermark check reconciles on the next load.
pub struct NonceManager {
    state: NonceLedger,
    store: Store,
    config: Config,
    action_tx: UnboundedSender<NonceAction>,
    persist_tx: UnboundedSender<PersistRequest>,
}

impl NonceManager {
    /// Create a manager with an empty ledger, returning it together
    /// with the action stream for host-application subscribers.
    ///
    /// Hosts that do not care about the stream can drop the receiver;
    /// publishes then fail cheaply instead of buffering, so unobserved
    /// actions never accumulate.
    ///
    /// Spawns the persistence writer task, so this must be called from
    /// within a tokio runtime. Call [`load`](Self::load) before issuing
    /// mutations if startup ordering matters; pre-load mutations are not
    /// queued and a later load merges over them at the account level.
    pub fn new(store: Store, config: Config) -> (Self, UnboundedReceiver<NonceAction>) {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (persist_tx, persist_rx) = mpsc::unbounded_channel();
        tokio::spawn(persist_loop(store.clone(), persist_rx));

        let manager = Self {
            state: NonceLedger::new(),
            store,
            config,
            action_tx,
            persist_tx,
        };
        (manager, action_rx)
    }

    /// The current in-memory ledger.
    pub fn ledger(&self) -> &NonceLedger {
        &self.state
    }

    /// Fetch the persisted ledger and merge it into memory.
    ///
    /// A failed read leaves the ledger untouched and dispatches
    /// [`NonceAction::LoadFailed`]; nothing is thrown to the caller.
    pub async fn load(&mut self) {
        let store = self.store.clone();
        let loaded = tokio::task::spawn_blocking(move || store.load_ledger()).await;
        match loaded {
            Ok(Ok(ledger)) => {
                info!(accounts = ledger.accounts().len(), "nonce ledger loaded");
                self.dispatch(NonceAction::LoadSucceeded(ledger));
            }
            Ok(Err(e)) => {
                warn!("failed to load nonce ledger: {e}");
                self.dispatch(NonceAction::LoadFailed);
            }
            Err(e) => {
                warn!("nonce ledger load task failed: {e}");
                self.dispatch(NonceAction::LoadFailed);
            }
        }
    }

    /// Record an observed/assigned nonce as a forward-moving watermark.
    ///
    /// The entry is replaced only when no nonce is stored for
    /// `(account, network)` or the stored nonce is strictly below
    /// `nonce`; otherwise the observation is stale and ignored.
    pub fn increment_nonce(&mut self, account: &str, nonce: u64, network: Option<&str>) {
        let network = self.network_or_default(network);
        let should_advance = match self.state.current_nonce(account, &network) {
            Some(current) => current < nonce,
            None => true,
        };
        if !should_advance {
            debug!(account, network = %network, nonce, "stale nonce increment ignored");
            return;
        }
        self.update_nonce(account, &network, nonce);
    }

    /// Record a rollback (dropped/rejected transaction) by moving the
    /// watermark back to one below the attempted nonce.
    ///
    /// Applies when no nonce is stored or the stored nonce is at or
    /// above `nonce`; a stored nonce already below the attempted value
    /// means the rollback is stale and ignored. An attempted nonce of 0
    /// cannot go lower, so it is clamped at 0 and flagged.
    pub fn decrement_nonce(&mut self, account: &str, nonce: u64, network: Option<&str>) {
        let network = self.network_or_default(network);
        let should_retreat = match self.state.current_nonce(account, &network) {
            Some(current) => current >= nonce,
            None => true,
        };
        if !should_retreat {
            debug!(account, network = %network, nonce, "stale nonce decrement ignored");
            return;
        }
        if nonce == 0 {
            warn!(account, network = %network, "nonce decrement below zero clamped to 0");
        }
        self.update_nonce(account, &network, nonce.saturating_sub(1));
    }

    /// Wait until every queued persistence write has completed.
    ///
    /// Mutations deliberately do not await their writes; shutdown paths
    /// and durability-sensitive callers can use this as a barrier.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.persist_tx.send(PersistRequest::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    fn network_or_default(&self, network: Option<&str>) -> String {
        network.unwrap_or(&self.config.default_network).to_string()
    }

    fn update_nonce(&mut self, account: &str, network: &str, nonce: u64) {
        self.dispatch(NonceAction::NonceUpdated {
            account: account.to_lowercase(),
            network: network.to_string(),
            nonce,
        });
        self.persist();
    }

    /// Apply an action to the ledger and publish it to subscribers.
    fn dispatch(&mut self, action: NonceAction) {
        reduce(&mut self.state, &action);
        // Subscribers are optional; a dropped receiver is not an error.
        let _ = self.action_tx.send(action);
    }

    fn persist(&self) {
        let _ = self
            .persist_tx
            .send(PersistRequest::Save(self.state.clone()));
    }
}

/// Apply one action to the ledger state.
///
/// `NonceUpdated` overwrites without re-checking the watermark; the
/// check already happened before the action was produced.
pub fn reduce(state: &mut NonceLedger, action: &NonceAction) {
    match action {
        NonceAction::LoadSucceeded(loaded) => state.merge(loaded.clone()),
        NonceAction::LoadFailed => {}
        NonceAction::NonceUpdated {
            account,
            network,
            nonce,
        } => state.set_entry(account, network, *nonce),
    }
}

async fn persist_loop(store: Store, mut rx: UnboundedReceiver<PersistRequest>) {
    while let Some(request) = rx.recv().await {
        match request {
            PersistRequest::Save(snapshot) => {
                let store = store.clone();
                let result =
                    tokio::task::spawn_blocking(move || store.save_ledger(&snapshot)).await;
                match result {
                    Ok(Ok(())) => {}
                    // Memory and disk stay inconsistent until the next
                    // successful write; the next load reconciles.
                    Ok(Err(e)) => warn!("failed to persist nonce ledger: {e}"),
                    Err(e) => warn!("nonce ledger persist task failed: {e}"),
                }
            }
            PersistRequest::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
