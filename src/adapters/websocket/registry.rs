//! In-memory connection registry: user id → live connection.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{ConnectionId, Role, UserId};
use crate::ports::{ConnectionInfo, ConnectionRegistry};

#[derive(Debug, Default)]
pub struct InMemoryConnectionRegistry {
    entries: RwLock<HashMap<UserId, ConnectionInfo>>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, info: ConnectionInfo) -> Option<ConnectionInfo> {
        let replaced = self.entries.write().await.insert(info.user_id.clone(), info);
        if let Some(old) = &replaced {
            tracing::debug!(
                user_id = %old.user_id,
                connection_id = %old.connection_id,
                "Connection replaced by a newer one"
            );
        }
        replaced
    }

    async fn unregister(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get(user_id) {
            Some(info) if info.connection_id == *connection_id => {
                entries.remove(user_id);
                true
            }
            _ => false,
        }
    }

    async fn get(&self, user_id: &UserId) -> Option<ConnectionInfo> {
        self.entries.read().await.get(user_id).cloned()
    }

    async fn list_by_role(&self, role: Role) -> Vec<ConnectionInfo> {
        self.entries
            .read()
            .await
            .values()
            .filter(|info| info.role == role)
            .cloned()
            .collect()
    }

    async fn count_by_role(&self) -> HashMap<Role, usize> {
        let entries = self.entries.read().await;
        let mut counts = HashMap::new();
        for info in entries.values() {
            *counts.entry(info.role).or_insert(0) += 1;
        }
        counts
    }

    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
