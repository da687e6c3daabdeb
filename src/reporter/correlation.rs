// Local node id -> remote item id

use crate::client::TempId;
use crate::events::NodeId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Maps engine node ids to the provisional ids the reporting client issued
/// for them. Entries are only ever inserted; the map lives as long as the
/// run. The lock is never held across an await.
#[derive(Debug, Default)]
pub struct CorrelationMap {
    entries: Mutex<HashMap<NodeId, TempId>>,
}

impl CorrelationMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<NodeId, TempId>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the remote id of a node. A node is started once per run, so a
    /// second insert for the same id replaces the first and returns it.
    pub fn insert(&self, node: NodeId, remote: TempId) -> Option<TempId> {
        self.lock().insert(node, remote)
    }

    pub fn get(&self, node: &NodeId) -> Option<TempId> {
        self.lock().get(node).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_get() {
        let map = CorrelationMap::new();
        assert_eq!(map.get(&NodeId::new("s1")), None);

        assert_eq!(map.insert(NodeId::new("s1"), TempId::new("item-1")), None);
        assert_eq!(map.get(&NodeId::new("s1")), Some(TempId::new("item-1")));
        assert_eq!(map.get(&NodeId::new("s2")), None);
    }

    #[test]
    fn test_reinsert_returns_previous() {
        let map = CorrelationMap::new();
        map.insert(NodeId::new("t1"), TempId::new("item-1"));
        assert_eq!(
            map.insert(NodeId::new("t1"), TempId::new("item-2")),
            Some(TempId::new("item-1"))
        );
    }
}
