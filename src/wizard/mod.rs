//! Diagnostic wizard — the five-screen flow a prospect walks through.
//!
//! Intro → sector → headcount → strategic profile → results and contact
//! form. Each prospect gets a `LeadWizard` session held in the
//! `SessionRegistry`; the REST routes drive it.

pub mod manager;
pub mod model;
pub mod registry;
pub mod routes;
pub mod session;
pub mod state;

pub use manager::{LeadWizard, SessionView, SubmissionReceipt, WizardDeps};
pub use model::{AnswerRecord, ContactUpdate, EMPLOYEE_BUCKETS, Industry, ProfileFlag, SubmittedLead};
pub use registry::{SessionRegistry, spawn_prune_task};
pub use routes::{WizardRouteState, wizard_routes};
pub use session::WizardSession;
pub use state::{SubmissionState, WizardStep};
