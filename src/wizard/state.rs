//! Wizard state machine — tracks which screen the prospect is on.

use serde::{Deserialize, Serialize};

/// The screens of the diagnostic.
///
/// Progresses linearly: Intro → SectorSelect → SizeSelect → ProfileFlags →
/// ResultAndSubmit. Only `reset` goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Intro,
    SectorSelect,
    SizeSelect,
    ProfileFlags,
    ResultAndSubmit,
}

impl WizardStep {
    /// Every step, in screen order.
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Intro,
        WizardStep::SectorSelect,
        WizardStep::SizeSelect,
        WizardStep::ProfileFlags,
        WizardStep::ResultAndSubmit,
    ];

    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: WizardStep) -> bool {
        use WizardStep::*;
        matches!(
            (self, target),
            (Intro, SectorSelect)
                | (SectorSelect, SizeSelect)
                | (SizeSelect, ProfileFlags)
                | (ProfileFlags, ResultAndSubmit)
        )
    }

    /// Whether this is the last screen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ResultAndSubmit)
    }

    /// The next screen, if any.
    pub fn next(&self) -> Option<WizardStep> {
        use WizardStep::*;
        match self {
            Intro => Some(SectorSelect),
            SectorSelect => Some(SizeSelect),
            SizeSelect => Some(ProfileFlags),
            ProfileFlags => Some(ResultAndSubmit),
            ResultAndSubmit => None,
        }
    }

    /// Zero-based screen index (the front end's step cursor).
    pub fn index(&self) -> u8 {
        match self {
            Self::Intro => 0,
            Self::SectorSelect => 1,
            Self::SizeSelect => 2,
            Self::ProfileFlags => 3,
            Self::ResultAndSubmit => 4,
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Intro => "intro",
            Self::SectorSelect => "sector_select",
            Self::SizeSelect => "size_select",
            Self::ProfileFlags => "profile_flags",
            Self::ResultAndSubmit => "result_and_submit",
        };
        write!(f, "{s}")
    }
}

/// Sub-view of the result screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    /// Contact form is shown and the submit control is enabled.
    #[default]
    Form,
    /// A write is in flight; the submit control is disabled.
    Submitting,
    /// The lead was stored; the confirmation is shown.
    Confirmed,
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Form => write!(f, "form"),
            Self::Submitting => write!(f, "submitting"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}
