//! Remote document store — POSTs each lead as a JSON document.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::store::traits::LeadStore;
use crate::wizard::model::{Industry, SubmittedLead};

/// HTTP client for a remote document collection.
///
/// Leads land in `{base_url}/artifacts/{app_id}/public/data/leads`.
pub struct HttpLeadStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

#[derive(Deserialize)]
struct InsertResponse {
    id: String,
}

/// One lead as stored in the remote collection.
///
/// Field names follow the documents already in that collection, so existing
/// readers keep working. The namespace is carried by the URL, not the body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeadDocument<'a> {
    industry: Option<Industry>,
    employees: &'a str,
    exports: bool,
    training_needed: bool,
    investing_in_tech: bool,
    user_name: &'a str,
    user_email: &'a str,
    user_phone: &'a str,
    company_name: &'a str,
    timestamp: DateTime<Utc>,
    user_id: &'a str,
    source: &'a str,
}

impl<'a> From<&'a SubmittedLead> for LeadDocument<'a> {
    fn from(lead: &'a SubmittedLead) -> Self {
        let answers = &lead.answers;
        Self {
            industry: answers.industry,
            employees: &answers.employee_count_bucket,
            exports: answers.exports,
            training_needed: answers.training_needed,
            investing_in_tech: answers.investing_in_tech,
            user_name: &answers.contact_name,
            user_email: &answers.contact_email,
            user_phone: &answers.contact_phone,
            company_name: &answers.company_name,
            timestamp: lead.timestamp,
            user_id: &lead.user_id,
            source: &lead.source,
        }
    }
}

/// Last path segment of a `Location` header value.
fn id_from_location(location: &str) -> Option<String> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(String::from)
}

impl HttpLeadStore {
    /// `base_url` should be like `https://docs.example.com` (no trailing slash).
    pub fn new(base_url: impl Into<String>, token: Option<SecretString>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Collection URL for one application namespace.
    pub fn collection_url(&self, app_id: &str) -> String {
        format!("{}/artifacts/{}/public/data/leads", self.base_url, app_id)
    }
}

#[async_trait]
impl LeadStore for HttpLeadStore {
    fn name(&self) -> &str {
        "http"
    }

    /// Any 2xx means the document was written. The id comes from a JSON
    /// `{"id"}` body, else the `Location` header, else a fresh UUID.
    async fn insert_lead(&self, lead: &SubmittedLead) -> Result<String, DatabaseError> {
        let url = self.collection_url(&lead.app_id);

        let mut request = self.client.post(&url).json(&LeadDocument::from(lead));
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| DatabaseError::Remote(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DatabaseError::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(id_from_location);
        let body = resp.text().await.unwrap_or_default();

        let id = match serde_json::from_str::<InsertResponse>(&body) {
            Ok(created) => created.id,
            Err(_) => match location {
                Some(id) => id,
                None => {
                    let id = Uuid::new_v4().to_string();
                    warn!(
                        url = %url,
                        status = status.as_u16(),
                        id = %id,
                        "Remote store accepted lead without an id, using a local one"
                    );
                    id
                }
            },
        };
        info!(url = %url, id = %id, "Lead written to remote store");
        Ok(id)
    }
}
