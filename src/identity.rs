//! Anonymous session identity.
//!
//! Every wizard session signs in anonymously when it starts. A lead can only
//! be submitted once the session holds an identity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IdentityError;

/// Identity issued to one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: String,
    pub issued_at: DateTime<Utc>,
}

/// Source of anonymous identities.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Obtain a fresh anonymous identity.
    async fn sign_in_anonymously(&self) -> Result<SessionIdentity, IdentityError>;
}

/// Issues random v4 UUIDs locally. Never fails.
#[derive(Debug, Default, Clone)]
pub struct AnonymousIdentityProvider;

impl AnonymousIdentityProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityProvider for AnonymousIdentityProvider {
    fn name(&self) -> &str {
        "anonymous"
    }

    async fn sign_in_anonymously(&self) -> Result<SessionIdentity, IdentityError> {
        Ok(SessionIdentity {
            user_id: Uuid::new_v4().to_string(),
            issued_at: Utc::now(),
        })
    }
}
