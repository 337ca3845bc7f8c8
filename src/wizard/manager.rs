//! LeadWizard — coordinates one session with its identity and lead store.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{DEFAULT_APP_ID, DEFAULT_SOURCE};
use crate::eligibility::{EligibilityEngine, IncentiveMatch};
use crate::error::{SubmissionError, WizardError};
use crate::identity::IdentityProvider;
use crate::store::LeadStore;

use super::model::{AnswerRecord, ContactUpdate, Industry, ProfileFlag, SubmittedLead};
use super::session::WizardSession;
use super::state::{SubmissionState, WizardStep};

/// Collaborators every session is built with.
#[derive(Clone)]
pub struct WizardDeps {
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn LeadStore>,
    pub engine: Arc<EligibilityEngine>,
    /// Namespace leads are filed under.
    pub app_id: String,
    /// Provenance tag written with every lead.
    pub source: String,
}

impl WizardDeps {
    pub fn new(identity: Arc<dyn IdentityProvider>, store: Arc<dyn LeadStore>) -> Self {
        Self {
            identity,
            store,
            engine: Arc::new(EligibilityEngine::standard()),
            app_id: DEFAULT_APP_ID.to_string(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }
}

/// What the front end renders for a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub step: WizardStep,
    pub step_index: u8,
    pub answers: AnswerRecord,
    pub submission: SubmissionState,
    /// Whether the anonymous identity is in place (submission needs it).
    pub identity_ready: bool,
    /// Only present on the result screen; recomputed on every render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<IncentiveMatch>>,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub lead_id: String,
    pub lead: SubmittedLead,
}

/// One prospect's wizard, shared between request handlers.
pub struct LeadWizard {
    deps: WizardDeps,
    session: RwLock<WizardSession>,
}

impl LeadWizard {
    /// Start a session: sign in anonymously, then open at the intro screen.
    ///
    /// A failed sign-in is logged and leaves the session without an identity;
    /// the wizard still works, but submission becomes a no-op.
    pub async fn start(deps: WizardDeps) -> Self {
        let identity = match deps.identity.sign_in_anonymously().await {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!(provider = deps.identity.name(), error = %e, "Anonymous sign-in failed");
                None
            }
        };
        let session = WizardSession::new(identity);
        info!(
            session_id = %session.id,
            identity_ready = session.identity().is_some(),
            "Wizard session started"
        );
        Self {
            deps,
            session: RwLock::new(session),
        }
    }

    pub async fn id(&self) -> Uuid {
        self.session.read().await.id
    }

    /// Time since the prospect last touched this session.
    pub async fn idle_for(&self) -> chrono::Duration {
        chrono::Utc::now() - self.session.read().await.last_activity
    }

    /// Build the view, evaluating the rules fresh when on the result screen.
    pub async fn view(&self) -> SessionView {
        let session = self.session.read().await;
        let step = session.step();
        let recommendations = step
            .is_terminal()
            .then(|| self.deps.engine.evaluate(session.answers()));
        SessionView {
            session_id: session.id,
            step,
            step_index: step.index(),
            answers: session.answers().clone(),
            submission: session.submission(),
            identity_ready: session.identity().is_some(),
            recommendations,
        }
    }

    pub async fn advance(&self) -> WizardStep {
        let mut session = self.session.write().await;
        let from = session.step();
        let to = session.advance();
        if from == to {
            debug!(session_id = %session.id, step = %to, "Advance at last step ignored");
        } else {
            debug!(session_id = %session.id, from = %from, to = %to, "Wizard advanced");
        }
        to
    }

    pub async fn select_industry(&self, industry: Industry) -> Result<WizardStep, WizardError> {
        let mut session = self.session.write().await;
        let step = session.select_industry(industry)?;
        debug!(session_id = %session.id, industry = %industry, "Sector selected");
        Ok(step)
    }

    pub async fn select_employee_bucket(&self, label: &str) -> Result<WizardStep, WizardError> {
        let mut session = self.session.write().await;
        let step = session.select_employee_bucket(label)?;
        debug!(session_id = %session.id, bucket = label, "Headcount selected");
        Ok(step)
    }

    pub async fn set_flag(&self, flag: ProfileFlag, value: bool) -> Result<(), WizardError> {
        self.session.write().await.set_flag(flag, value)
    }

    pub async fn update_contact(&self, update: ContactUpdate) -> Result<(), WizardError> {
        self.session.write().await.update_contact(update)
    }

    pub async fn reset(&self) {
        let mut session = self.session.write().await;
        session.reset();
        info!(session_id = %session.id, "Wizard session reset");
    }

    /// Submit the lead.
    ///
    /// The store write happens outside the session lock; the `Submitting`
    /// sub-state rejects any second attempt until it settles. On failure the
    /// form is re-enabled and the error is logged.
    pub async fn submit(&self) -> Result<SubmissionReceipt, SubmissionError> {
        let (session_id, pending) = {
            let mut session = self.session.write().await;
            match session.begin_submission(&self.deps.app_id, &self.deps.source) {
                Ok(pending) => (session.id, pending),
                Err(SubmissionError::IdentityUnavailable) => {
                    debug!(session_id = %session.id, "Submit ignored, no identity yet");
                    return Err(SubmissionError::IdentityUnavailable);
                }
                Err(e) => return Err(e),
            }
        };

        let result = self.deps.store.insert_lead(&pending.lead).await;

        let mut session = self.session.write().await;
        match result {
            Ok(lead_id) => {
                if let Err(e) = session.complete_submission(&pending) {
                    warn!(
                        session_id = %session_id,
                        lead_id = %lead_id,
                        "Lead stored after the session was reset"
                    );
                    return Err(e);
                }
                info!(
                    session_id = %session_id,
                    lead_id = %lead_id,
                    store = self.deps.store.name(),
                    "Lead submitted"
                );
                Ok(SubmissionReceipt {
                    lead_id,
                    lead: pending.lead,
                })
            }
            Err(e) => {
                error!(
                    session_id = %session_id,
                    store = self.deps.store.name(),
                    error = %e,
                    "Error saving lead"
                );
                session.abort_submission(&pending);
                Err(SubmissionError::Store(e))
            }
        }
    }
}
