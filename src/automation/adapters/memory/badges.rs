//! In-memory badge ledger.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::automation::{
    domain::Badge,
    ports::{BadgeLedger, BadgeLedgerError, BadgeLedgerResult},
};
use crate::project::domain::UserId;

/// Thread-safe in-memory badge ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBadgeLedger {
    state: Arc<RwLock<HashMap<UserId, Vec<Badge>>>>,
}

impl InMemoryBadgeLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BadgeLedger for InMemoryBadgeLedger {
    async fn award(&self, user: UserId, badge: Badge) -> BadgeLedgerResult<()> {
        let mut badges = self.state.write().map_err(|err| {
            BadgeLedgerError::persistence(std::io::Error::other(err.to_string()))
        })?;
        badges.entry(user).or_default().push(badge);
        Ok(())
    }

    async fn badges_for(&self, user: UserId) -> BadgeLedgerResult<Vec<Badge>> {
        let badges = self.state.read().map_err(|err| {
            BadgeLedgerError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(badges.get(&user).cloned().unwrap_or_default())
    }
}
