//! Event Fan-Out
//!
//! Per-game listener set. Every listener owns a single-slot channel; a
//! broadcast makes one non-blocking delivery attempt per listener and drops
//! the value for any listener whose slot is still full. A slow or vanished
//! listener can delay its own view of the game but never the broadcaster.

use std::collections::BTreeMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use crate::game::events::GameState;

/// Capacity of each listener's delivery slot.
pub const LISTENER_SLOT_CAPACITY: usize = 1;

/// Receiving end of a subscription.
#[derive(Debug)]
pub struct ListenerHandle {
    listener_id: String,
    receiver: mpsc::Receiver<GameState>,
}

impl ListenerHandle {
    /// Listener identifier used to unsubscribe.
    pub fn id(&self) -> &str {
        &self.listener_id
    }

    /// Wait for the next delivered snapshot.
    ///
    /// Returns `None` once the listener was removed from its game.
    pub async fn recv(&mut self) -> Option<GameState> {
        self.receiver.recv().await
    }

    /// Take a pending snapshot without waiting.
    pub fn try_recv(&mut self) -> Option<GameState> {
        self.receiver.try_recv().ok()
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Listeners that received the snapshot.
    pub delivered: usize,
    /// Listeners whose slot was full or whose receiver is gone.
    pub dropped: usize,
}

/// Listeners registered on one game.
#[derive(Debug, Default)]
pub struct ListenerSet {
    listeners: BTreeMap<String, mpsc::Sender<GameState>>,
}

impl ListenerSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Reusing an id replaces the previous registration.
    pub fn subscribe(&mut self, listener_id: impl Into<String>) -> ListenerHandle {
        let listener_id = listener_id.into();
        let (tx, rx) = mpsc::channel(LISTENER_SLOT_CAPACITY);

        if self.listeners.insert(listener_id.clone(), tx).is_some() {
            debug!(listener_id = %listener_id, "Replaced existing listener");
        }

        ListenerHandle {
            listener_id,
            receiver: rx,
        }
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, listener_id: &str) -> bool {
        self.listeners.remove(listener_id).is_some()
    }

    /// Offer `state` to every listener without blocking.
    pub fn broadcast(&self, state: &GameState) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        for (listener_id, tx) in &self.listeners {
            match tx.try_send(state.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    debug!(listener_id = %listener_id, game_id = %state.id, "Listener slot full, dropping update");
                    report.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(listener_id = %listener_id, game_id = %state.id, "Listener receiver gone, dropping update");
                    report.dropped += 1;
                }
            }
        }

        report
    }

    /// Remove every listener. Their receivers observe a closed channel
    /// after draining anything already delivered.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Whether a listener is registered.
    pub fn contains(&self, listener_id: &str) -> bool {
        self.listeners.contains_key(listener_id)
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// No listeners registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::board::{Board, Symbol};
    use crate::game::events::EventKind;

    fn state(index: usize) -> GameState {
        GameState {
            id: "g1".to_string(),
            event: EventKind::Move,
            board: Board::new().apply_move(Symbol::X, index).unwrap(),
            turn: Symbol::O,
            winner: None,
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_listeners() {
        let mut set = ListenerSet::new();
        let mut a = set.subscribe("a");
        let mut b = set.subscribe("b");

        let report = set.broadcast(&state(0));
        assert_eq!(report, BroadcastReport { delivered: 2, dropped: 0 });

        assert_eq!(a.recv().await, Some(state(0)));
        assert_eq!(b.recv().await, Some(state(0)));
    }

    #[tokio::test]
    async fn test_full_slot_drops_newer_update() {
        let mut set = ListenerSet::new();
        let mut slow = set.subscribe("slow");

        set.broadcast(&state(0));
        let report = set.broadcast(&state(1));
        assert_eq!(report, BroadcastReport { delivered: 0, dropped: 1 });

        // The first value survives, the second was dropped.
        assert_eq!(slow.recv().await, Some(state(0)));
        assert_eq!(slow.try_recv(), None);
    }

    #[tokio::test]
    async fn test_slow_listener_does_not_affect_others() {
        let mut set = ListenerSet::new();
        let _slow = set.subscribe("slow");
        let mut fast = set.subscribe("fast");

        set.broadcast(&state(0));
        assert_eq!(fast.recv().await, Some(state(0)));

        let report = set.broadcast(&state(1));
        assert_eq!(report, BroadcastReport { delivered: 1, dropped: 1 });
        assert_eq!(fast.recv().await, Some(state(1)));
    }

    #[test]
    fn test_dropped_receiver_counts_as_dropped() {
        let mut set = ListenerSet::new();
        drop(set.subscribe("gone"));

        let report = set.broadcast(&state(0));
        assert_eq!(report.dropped, 1);
        assert!(set.contains("gone"));
    }

    #[test]
    fn test_unsubscribe_idempotent() {
        let mut set = ListenerSet::new();
        let _a = set.subscribe("a");
        let _b = set.subscribe("b");

        assert!(set.unsubscribe("a"));
        assert!(!set.unsubscribe("a"));
        assert_eq!(set.len(), 1);
        assert!(set.contains("b"));
    }

    #[tokio::test]
    async fn test_clear_closes_receivers() {
        let mut set = ListenerSet::new();
        let mut a = set.subscribe("a");

        set.broadcast(&state(0));
        set.clear();
        assert!(set.is_empty());

        assert_eq!(a.recv().await, Some(state(0)));
        assert_eq!(a.recv().await, None);
    }
}
