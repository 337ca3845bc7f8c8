//! Session registry — every live wizard session, keyed by id.
//!
//! Sessions live only in memory. Idle ones are swept by `spawn_prune_task`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::manager::{LeadWizard, WizardDeps};

pub struct SessionRegistry {
    deps: WizardDeps,
    sessions: RwLock<HashMap<Uuid, Arc<LeadWizard>>>,
}

impl SessionRegistry {
    pub fn new(deps: WizardDeps) -> Arc<Self> {
        Arc::new(Self {
            deps,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Collaborators shared by every session.
    pub fn deps(&self) -> &WizardDeps {
        &self.deps
    }

    /// Start and register a new session.
    pub async fn create(&self) -> Arc<LeadWizard> {
        let wizard = Arc::new(LeadWizard::start(self.deps.clone()).await);
        let id = wizard.id().await;
        self.sessions.write().await.insert(id, Arc::clone(&wizard));
        wizard
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<LeadWizard>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            debug!(session_id = %id, "Wizard session abandoned");
        }
        removed
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove sessions idle for longer than `max_idle`. Returns how many went.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let max_idle =
            chrono::Duration::from_std(max_idle).unwrap_or_else(|_| chrono::Duration::days(36_500));

        let snapshot: Vec<(Uuid, Arc<LeadWizard>)> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, wizard)| (*id, Arc::clone(wizard)))
            .collect();

        let mut stale = Vec::new();
        for (id, wizard) in snapshot {
            if wizard.idle_for().await > max_idle {
                stale.push(id);
            }
        }

        if stale.is_empty() {
            return 0;
        }
        let mut sessions = self.sessions.write().await;
        for id in &stale {
            sessions.remove(id);
        }
        info!(pruned = stale.len(), remaining = sessions.len(), "Pruned idle wizard sessions");
        stale.len()
    }
}

/// Spawn a background task that prunes idle sessions every `interval`.
pub fn spawn_prune_task(
    registry: Arc<SessionRegistry>,
    interval: Duration,
    max_idle: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            registry.prune_idle(max_idle).await;
        }
    })
}
