//! `LeadStore` trait — the single write the wizard makes.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::wizard::model::SubmittedLead;

/// A lead as read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredLead {
    pub id: String,
    pub lead: SubmittedLead,
}

/// Backend-agnostic lead persistence.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// Persist one lead. Returns the id the backend assigned.
    async fn insert_lead(&self, lead: &SubmittedLead) -> Result<String, DatabaseError>;
}
