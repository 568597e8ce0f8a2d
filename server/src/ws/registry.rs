use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::chat::client::ClientRecord;

/// Every open chat connection, in the order the connections were accepted.
///
/// All reads and writes go through one lock, so a broadcast or roster always
/// sees a membership that no register/deregister is halfway through.
#[derive(Clone, Debug, Default)]
pub struct ConnectionRegistry {
    clients: Arc<Mutex<Vec<Arc<ClientRecord>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Returns the number of registered connections.
    pub fn register(&self, record: Arc<ClientRecord>) -> usize {
        let mut clients = self.lock();
        clients.push(record);
        clients.len()
    }

    /// Remove a record. Returns false if it was already gone.
    pub fn deregister(&self, record: &ClientRecord) -> bool {
        let mut clients = self.lock();
        let before = clients.len();
        clients.retain(|client| client.id() != record.id());
        clients.len() != before
    }

    /// Copy of the current membership, safe to iterate while sending.
    pub fn snapshot_for_broadcast(&self) -> Vec<Arc<ClientRecord>> {
        self.lock().clone()
    }

    /// Current nicks in connection order.
    pub fn roster_nicks(&self) -> Vec<String> {
        self.with_members(|members| members.iter().map(|client| client.nick()).collect())
    }

    /// Run `f` against the membership while holding the registry lock.
    /// `f` must not block or await.
    pub fn with_members<R>(&self, f: impl FnOnce(&[Arc<ClientRecord>]) -> R) -> R {
        f(&self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<ClientRecord>>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn record() -> Arc<ClientRecord> {
        let (tx, _rx) = mpsc::unbounded_channel();
        Arc::new(ClientRecord::new(tx))
    }

    #[test]
    fn test_register_keeps_connection_order() {
        let registry = ConnectionRegistry::new();
        let (a, b, c) = (record(), record(), record());
        assert!(b.change_nick("Anonymous", "Bob"));
        assert!(c.change_nick("Anonymous", "Carol"));

        assert_eq!(registry.register(a.clone()), 1);
        assert_eq!(registry.register(b.clone()), 2);
        assert_eq!(registry.register(c.clone()), 3);

        assert_eq!(registry.roster_nicks(), vec!["Anonymous", "Bob", "Carol"]);
        let ids: Vec<_> = registry.snapshot_for_broadcast().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![a.id(), b.id(), c.id()]);
    }

    #[test]
    fn test_deregister_removes_only_that_record() {
        let registry = ConnectionRegistry::new();
        let (a, b, c) = (record(), record(), record());
        assert!(a.change_nick("Anonymous", "Ann"));
        assert!(c.change_nick("Anonymous", "Carol"));
        registry.register(a.clone());
        registry.register(b.clone());
        registry.register(c.clone());

        assert!(registry.deregister(&b));
        assert_eq!(registry.roster_nicks(), vec!["Ann", "Carol"]);
    }

    #[test]
    fn test_deregister_absent_record_is_noop() {
        let registry = ConnectionRegistry::new();
        let (a, b) = (record(), record());
        registry.register(a.clone());

        assert!(!registry.deregister(&b));
        assert_eq!(registry.len(), 1);

        assert!(registry.deregister(&a));
        assert!(!registry.deregister(&a));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_mutation() {
        let registry = ConnectionRegistry::new();
        let a = record();
        registry.register(a.clone());

        let snapshot = registry.snapshot_for_broadcast();
        registry.deregister(&a);
        registry.register(record());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id(), a.id());
    }

    #[test]
    fn test_roster_reflects_nick_changes() {
        let registry = ConnectionRegistry::new();
        let a = record();
        registry.register(a.clone());
        assert_eq!(registry.roster_nicks(), vec!["Anonymous"]);

        assert!(a.change_nick("Anonymous", "Bob"));
        assert_eq!(registry.roster_nicks(), vec!["Bob"]);
    }

    #[test]
    fn test_clones_share_membership() {
        let registry = ConnectionRegistry::new();
        let other = registry.clone();
        registry.register(record());
        assert_eq!(other.len(), 1);
    }
}
