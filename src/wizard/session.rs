//! One prospect's pass through the wizard: step cursor, answers, and the
//! submission sub-state. Purely in-memory; no I/O happens here.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{SubmissionError, WizardError};
use crate::identity::SessionIdentity;

use super::model::{AnswerRecord, ContactUpdate, EMPLOYEE_BUCKETS, Industry, ProfileFlag, SubmittedLead};
use super::state::{SubmissionState, WizardStep};

/// Snapshot handed out by `begin_submission`, to be settled later.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub lead: SubmittedLead,
    generation: u64,
}

/// Wizard session state.
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub id: Uuid,
    step: WizardStep,
    answers: AnswerRecord,
    identity: Option<SessionIdentity>,
    submission: SubmissionState,
    /// Bumped on every reset so late submission results can be discarded.
    generation: u64,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(identity: Option<SessionIdentity>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            step: WizardStep::default(),
            answers: AnswerRecord::default(),
            identity,
            submission: SubmissionState::default(),
            generation: 0,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        self.identity.as_ref()
    }

    pub fn submission(&self) -> SubmissionState {
        self.submission
    }

    pub fn is_submitting(&self) -> bool {
        self.submission == SubmissionState::Submitting
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Move to the next screen. A no-op at the result screen.
    pub fn advance(&mut self) -> WizardStep {
        if let Some(next) = self.step.next() {
            debug_assert!(self.step.can_transition_to(next));
            self.step = next;
        }
        self.touch();
        self.step
    }

    fn require_step(&self, expected: WizardStep, operation: &str) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                operation: operation.to_string(),
                step: self.step.to_string(),
            })
        }
    }

    /// Record the sector and move on to the size screen in one transition.
    pub fn select_industry(&mut self, industry: Industry) -> Result<WizardStep, WizardError> {
        self.require_step(WizardStep::SectorSelect, "select_industry")?;
        self.answers.industry = Some(industry);
        Ok(self.advance())
    }

    /// Record the headcount bucket and move on to the profile screen in one transition.
    pub fn select_employee_bucket(&mut self, label: &str) -> Result<WizardStep, WizardError> {
        self.require_step(WizardStep::SizeSelect, "select_employee_bucket")?;
        if !EMPLOYEE_BUCKETS.contains(&label) {
            return Err(WizardError::UnknownBucket(label.to_string()));
        }
        self.answers.employee_count_bucket = label.to_string();
        Ok(self.advance())
    }

    /// Set one profile checkbox. Does not advance.
    pub fn set_flag(&mut self, flag: ProfileFlag, value: bool) -> Result<(), WizardError> {
        self.require_step(WizardStep::ProfileFlags, "set_flag")?;
        self.answers.set_flag(flag, value);
        self.touch();
        Ok(())
    }

    /// Fill in contact form fields on the result screen.
    pub fn update_contact(&mut self, update: ContactUpdate) -> Result<(), WizardError> {
        self.require_step(WizardStep::ResultAndSubmit, "update_contact")?;
        self.answers.apply_contact(update);
        self.touch();
        Ok(())
    }

    /// Back to the intro screen with a fresh, empty record.
    pub fn reset(&mut self) {
        self.step = WizardStep::Intro;
        self.answers = AnswerRecord::default();
        self.submission = SubmissionState::Form;
        self.generation += 1;
        self.touch();
    }

    /// Check every submission precondition and, if they hold, flip to
    /// `Submitting` and snapshot the lead to write.
    pub fn begin_submission(
        &mut self,
        app_id: &str,
        source: &str,
    ) -> Result<PendingSubmission, SubmissionError> {
        let identity = self
            .identity
            .as_ref()
            .ok_or(SubmissionError::IdentityUnavailable)?;
        match self.submission {
            SubmissionState::Submitting => return Err(SubmissionError::InProgress),
            SubmissionState::Confirmed => return Err(SubmissionError::AlreadySubmitted),
            SubmissionState::Form => {}
        }
        if !self.step.is_terminal() {
            return Err(SubmissionError::NotAtResultStep {
                step: self.step.to_string(),
            });
        }
        let missing = self.answers.missing_contact_fields();
        if !missing.is_empty() {
            return Err(SubmissionError::MissingFields { fields: missing });
        }

        let lead = SubmittedLead {
            answers: self.answers.clone(),
            timestamp: Utc::now(),
            user_id: identity.user_id.clone(),
            source: source.to_string(),
            app_id: app_id.to_string(),
        };
        self.submission = SubmissionState::Submitting;
        self.touch();
        Ok(PendingSubmission {
            lead,
            generation: self.generation,
        })
    }

    /// The write succeeded: show the confirmation.
    pub fn complete_submission(
        &mut self,
        pending: &PendingSubmission,
    ) -> Result<(), SubmissionError> {
        if pending.generation != self.generation {
            return Err(SubmissionError::Superseded);
        }
        self.submission = SubmissionState::Confirmed;
        self.touch();
        Ok(())
    }

    /// The write failed: re-enable the form so the prospect can retry.
    pub fn abort_submission(&mut self, pending: &PendingSubmission) {
        if pending.generation == self.generation {
            self.submission = SubmissionState::Form;
        }
        self.touch();
    }
}
