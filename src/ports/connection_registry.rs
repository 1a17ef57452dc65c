//! ConnectionRegistry port - who is connected right now.
//!
//! One entry per user: a second connection from the same user replaces the
//! first (last connection wins). Entries are transient and never persisted.
//!
//! ## Use Case
//!
//! 1. Socket upgrade resolves the caller's identity
//! 2. Handler registers a `ConnectionInfo` under that user
//! 3. On close, handler unregisters with its own connection id, so a stale
//!    socket closing after a reconnect cannot evict the newer entry
//! 4. Staff dashboards read `count_by_role` / `list_by_role`

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::foundation::{AuthenticatedUser, ConnectionId, Role, Timestamp, UserId};

/// Identity and bookkeeping for one live socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
    pub connected_at: Timestamp,
}

impl ConnectionInfo {
    pub fn new(connection_id: ConnectionId, user: &AuthenticatedUser) -> Self {
        Self {
            connection_id,
            user_id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
            connected_at: Timestamp::now(),
        }
    }
}

#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Registers a connection, returning the entry it replaced.
    async fn register(&self, info: ConnectionInfo) -> Option<ConnectionInfo>;

    /// Removes the user's entry only if it still belongs to `connection_id`.
    /// Returns whether anything was removed.
    async fn unregister(&self, user_id: &UserId, connection_id: &ConnectionId) -> bool;

    async fn get(&self, user_id: &UserId) -> Option<ConnectionInfo>;

    async fn list_by_role(&self, role: Role) -> Vec<ConnectionInfo>;

    /// Snapshot of connection counts; roles with no connections are absent.
    async fn count_by_role(&self) -> HashMap<Role, usize>;

    async fn len(&self) -> usize;
}
