//! Integration tests for the wizard REST API.
//!
//! Each test spins up an Axum server on a random port and drives a session
//! through the real HTTP contract with reqwest.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use lead_wizard::error::{DatabaseError, IdentityError};
use lead_wizard::identity::{AnonymousIdentityProvider, IdentityProvider, SessionIdentity};
use lead_wizard::store::{LeadStore, LibSqlBackend};
use lead_wizard::wizard::{SessionRegistry, SubmittedLead, WizardDeps, wizard_routes};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Identity provider that is never reachable.
struct OfflineIdentity;

#[async_trait]
impl IdentityProvider for OfflineIdentity {
    fn name(&self) -> &str {
        "offline"
    }
    async fn sign_in_anonymously(&self) -> Result<SessionIdentity, IdentityError> {
        Err(IdentityError::Unavailable {
            provider: "offline".into(),
            reason: "no network".into(),
        })
    }
}

/// Store whose writes fail while `down` is set.
struct SwitchableStore {
    down: AtomicBool,
    inner: LibSqlBackend,
}

#[async_trait]
impl LeadStore for SwitchableStore {
    fn name(&self) -> &str {
        "switchable"
    }
    async fn insert_lead(&self, lead: &SubmittedLead) -> Result<String, DatabaseError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(DatabaseError::Remote("secret upstream detail".into()));
        }
        self.inner.insert_lead(lead).await
    }
}

/// Start an Axum server on a random port with the given collaborators.
async fn start_server(identity: Arc<dyn IdentityProvider>, store: Arc<dyn LeadStore>) -> u16 {
    let registry = SessionRegistry::new(WizardDeps::new(identity, store));
    let app = wizard_routes(registry);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;
    port
}

async fn start_default_server() -> (u16, Arc<LibSqlBackend>) {
    let store = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let port = start_server(Arc::new(AnonymousIdentityProvider::new()), store.clone()).await;
    (port, store)
}

/// Thin client for one session.
struct Session {
    client: reqwest::Client,
    base: String,
    id: String,
}

impl Session {
    async fn start(port: u16) -> (Self, Value) {
        let client = reqwest::Client::new();
        let base = format!("http://127.0.0.1:{port}");
        let resp = client
            .post(format!("{base}/api/sessions"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let view: Value = resp.json().await.unwrap();
        let id = view["session_id"].as_str().unwrap().to_string();
        (Self { client, base, id }, view)
    }

    async fn post(&self, action: &str, body: Option<Value>) -> (u16, Value) {
        let mut req = self
            .client
            .post(format!("{}/api/sessions/{}/{action}", self.base, self.id));
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await.unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    async fn get(&self) -> Value {
        self.client
            .get(format!("{}/api/sessions/{}", self.base, self.id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// Walk intro → sector → size → profile → result.
    async fn walk(&self, industry: &str, bucket: &str, flags: &[&str]) -> Value {
        self.post("advance", None).await;
        let (status, _) = self.post("industry", Some(json!({"industry": industry}))).await;
        assert_eq!(status, 200);
        let (status, _) = self.post("employees", Some(json!({"bucket": bucket}))).await;
        assert_eq!(status, 200);
        for flag in flags {
            let (status, _) = self
                .post("flags", Some(json!({"flag": flag, "value": true})))
                .await;
            assert_eq!(status, 200);
        }
        let (status, view) = self.post("advance", None).await;
        assert_eq!(status, 200);
        view
    }

    async fn fill_contact(&self) {
        let (status, _) = self
            .post(
                "contact",
                Some(json!({
                    "contact_name": "Morgan Lee",
                    "company_name": "Lee Precision",
                    "contact_email": "morgan@leeprecision.example",
                    "contact_phone": "619-555-0123"
                })),
            )
            .await;
        assert_eq!(status, 200);
    }
}

fn programs(view: &Value) -> Vec<String> {
    view["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["program"].as_str().unwrap().to_string())
        .collect()
}

// ── Walkthrough ─────────────────────────────────────────────────────────

#[tokio::test]
async fn health_endpoint() {
    timeout(TEST_TIMEOUT, async {
        let (port, _store) = start_default_server().await;
        let resp = reqwest::get(format!("http://127.0.0.1:{port}/health"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn walkthrough_reports_each_step() {
    timeout(TEST_TIMEOUT, async {
        let (port, _store) = start_default_server().await;
        let (session, view) = Session::start(port).await;
        assert_eq!(view["step_index"], 0);

        let (_, view) = session.post("advance", None).await;
        assert_eq!(view["step"], "sector_select");
        let (_, view) = session
            .post("industry", Some(json!({"industry": "professional"})))
            .await;
        assert_eq!(view["step"], "size_select");
        assert_eq!(view["answers"]["industry"], "professional");
        let (_, view) = session
            .post("employees", Some(json!({"bucket": "25-100"})))
            .await;
        assert_eq!(view["step"], "profile_flags");
        assert!(view.get("recommendations").is_none());

        let (_, view) = session.post("advance", None).await;
        assert_eq!(view["step"], "result_and_submit");
        assert_eq!(view["submission"], "form");
        assert!(programs(&view).is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn manufacturer_gets_base_incentive_and_tax_exemption() {
    timeout(TEST_TIMEOUT, async {
        let (port, _store) = start_default_server().await;
        let (session, _) = Session::start(port).await;
        let view = session.walk("manufacturing", "11-24", &[]).await;
        assert_eq!(programs(&view), vec!["base_incentive", "tax_exemption"]);
        assert_eq!(view["recommendations"][0]["estimated_value"], "Up to $100,000");
        assert_eq!(view["recommendations"][0]["confidence"], "High");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn large_retailer_gets_training_grant_only() {
    timeout(TEST_TIMEOUT, async {
        let (port, _store) = start_default_server().await;
        let (session, _) = Session::start(port).await;
        let view = session.walk("retail", "100+", &["training_needed"]).await;
        assert_eq!(programs(&view), vec!["training_grant"]);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn advance_past_result_is_a_noop() {
    timeout(TEST_TIMEOUT, async {
        let (port, _store) = start_default_server().await;
        let (session, _) = Session::start(port).await;
        for _ in 0..4 {
            session.post("advance", None).await;
        }
        let (status, view) = session.post("advance", None).await;
        assert_eq!(status, 200);
        assert_eq!(view["step_index"], 4);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unknown_bucket_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let (port, _store) = start_default_server().await;
        let (session, _) = Session::start(port).await;
        session.post("advance", None).await;
        session
            .post("industry", Some(json!({"industry": "medical"})))
            .await;
        let (status, _) = session
            .post("employees", Some(json!({"bucket": "a dozen"})))
            .await;
        assert_eq!(status, 422);
        assert_eq!(session.get().await["step"], "size_select");
    })
    .await
    .expect("test timed out");
}

// ── Submission ──────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_stores_lead_and_confirms_once() {
    timeout(TEST_TIMEOUT, async {
        let (port, store) = start_default_server().await;
        let (session, _) = Session::start(port).await;
        session.walk("manufacturing", "1-10", &["exports"]).await;
        session.fill_contact().await;

        let (status, body) = session.post("submit", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["session"]["submission"], "confirmed");
        let lead_id = body["lead_id"].as_str().unwrap().to_string();

        let (status, _) = session.post("submit", None).await;
        assert_eq!(status, 409);

        let leads = store.list_leads("prospairity-consulting", 10).await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].id, lead_id);
        assert_eq!(leads[0].lead.source, "Ghost Diagnostic Page");
        assert_eq!(leads[0].lead.answers.company_name, "Lee Precision");
        assert!(leads[0].lead.answers.exports);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn submit_with_missing_contact_fields_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let (port, store) = start_default_server().await;
        let (session, _) = Session::start(port).await;
        session.walk("other", "1-10", &[]).await;
        session
            .post("contact", Some(json!({"contact_name": "Only Name"})))
            .await;

        let (status, body) = session.post("submit", None).await;
        assert_eq!(status, 422);
        let fields = body["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(session.get().await["submission"], "form");
        assert_eq!(store.count_leads("prospairity-consulting").await.unwrap(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn submit_without_identity_is_silent_noop() {
    timeout(TEST_TIMEOUT, async {
        let store = Arc::new(LibSqlBackend::new_memory().await.unwrap());
        let port = start_server(Arc::new(OfflineIdentity), store.clone()).await;
        let (session, view) = Session::start(port).await;
        assert_eq!(view["identity_ready"], false);

        session.walk("manufacturing", "11-24", &[]).await;
        session.fill_contact().await;
        let (status, view) = session.post("submit", None).await;
        assert_eq!(status, 202);
        assert_eq!(view["submission"], "form");
        assert_eq!(store.count_leads("prospairity-consulting").await.unwrap(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn store_failure_hides_detail_and_allows_retry() {
    timeout(TEST_TIMEOUT, async {
        let store = Arc::new(SwitchableStore {
            down: AtomicBool::new(true),
            inner: LibSqlBackend::new_memory().await.unwrap(),
        });
        let port = start_server(Arc::new(AnonymousIdentityProvider::new()), store.clone()).await;
        let (session, _) = Session::start(port).await;
        session.walk("professional", "11-24", &[]).await;
        session.fill_contact().await;

        let (status, body) = session.post("submit", None).await;
        assert_eq!(status, 503);
        assert!(!body["error"].as_str().unwrap().contains("secret"));
        assert_eq!(session.get().await["submission"], "form");

        store.down.store(false, Ordering::SeqCst);
        let (status, body) = session.post("submit", None).await;
        assert_eq!(status, 200);
        assert_eq!(body["session"]["submission"], "confirmed");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn reset_after_confirmation_starts_over() {
    timeout(TEST_TIMEOUT, async {
        let (port, _store) = start_default_server().await;
        let (session, _) = Session::start(port).await;
        session.walk("manufacturing", "11-24", &["investing_in_tech"]).await;
        session.fill_contact().await;
        session.post("submit", None).await;

        let (status, view) = session.post("reset", None).await;
        assert_eq!(status, 200);
        assert_eq!(view["step"], "intro");
        assert_eq!(view["submission"], "form");
        assert!(view["answers"]["industry"].is_null());
        assert_eq!(view["answers"]["employee_count_bucket"], "");
        assert_eq!(view["answers"]["investing_in_tech"], false);
        assert_eq!(view["answers"]["contact_name"], "");
    })
    .await
    .expect("test timed out");
}
