//! Persistence layer — where submitted leads end up.

pub mod http;
pub mod libsql_backend;
pub mod migrations;
pub mod traits;

use std::sync::Arc;

pub use http::HttpLeadStore;
pub use libsql_backend::LibSqlBackend;
pub use traits::{LeadStore, StoredLead};

use crate::config::ServiceConfig;
use crate::error::DatabaseError;

/// Build the lead store selected by `config`: the remote document store when
/// a URL is configured, otherwise the local libSQL file.
pub async fn open_store(config: &ServiceConfig) -> Result<Arc<dyn LeadStore>, DatabaseError> {
    match config.remote_store {
        Some(ref remote) => Ok(Arc::new(HttpLeadStore::new(
            remote.base_url.clone(),
            remote.token.clone(),
        ))),
        None => Ok(Arc::new(LibSqlBackend::new_local(&config.db_path).await?)),
    }
}
