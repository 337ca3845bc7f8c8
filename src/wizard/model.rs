//! Answer record, catalog data, and the submitted lead document.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Business sector, the closed set shown on the sector screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Industry {
    Manufacturing,
    Professional,
    Medical,
    Hospitality,
    Retail,
    Other,
}

impl Industry {
    pub const ALL: [Industry; 6] = [
        Industry::Manufacturing,
        Industry::Professional,
        Industry::Medical,
        Industry::Hospitality,
        Industry::Retail,
        Industry::Other,
    ];

    /// Display label for the sector button.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Manufacturing => "Manufacturing / R&D",
            Self::Professional => "Professional / Technical",
            Self::Medical => "Medical / Wellness",
            Self::Hospitality => "Hospitality / Restaurant",
            Self::Retail => "Retail / Product",
            Self::Other => "Other Service",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Manufacturing => "⚙️",
            Self::Professional => "💼",
            Self::Medical => "🏥",
            Self::Hospitality => "🍽️",
            Self::Retail => "🛍️",
            Self::Other => "✨",
        }
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Manufacturing => "manufacturing",
            Self::Professional => "professional",
            Self::Medical => "medical",
            Self::Hospitality => "hospitality",
            Self::Retail => "retail",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Industry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Industry::ALL
            .into_iter()
            .find(|industry| industry.to_string() == s)
            .ok_or_else(|| format!("unknown industry: {s}"))
    }
}

/// Headcount bucket labels, in display order.
pub const EMPLOYEE_BUCKETS: [&str; 4] = ["1-10", "11-24", "25-100", "100+"];

static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?\d+)").expect("static regex"));

/// Numeric lower bound of a headcount bucket label.
///
/// Takes the leading integer ("11-24" → 11, "100+" → 100). Anything without
/// one, including the empty label, counts as 0.
pub fn bucket_lower_bound(label: &str) -> i64 {
    LEADING_INT
        .captures(label)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Yes/no questions on the strategic profile screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileFlag {
    Exports,
    InvestingInTech,
    TrainingNeeded,
}

impl ProfileFlag {
    pub const ALL: [ProfileFlag; 3] = [
        ProfileFlag::Exports,
        ProfileFlag::InvestingInTech,
        ProfileFlag::TrainingNeeded,
    ];

    /// Checkbox prompt.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Exports => "Sell services outside SD County.",
            Self::InvestingInTech => "Tech investment planned 2026.",
            Self::TrainingNeeded => "Upskilling required for new tools.",
        }
    }
}

/// Everything the prospect has answered so far. One per session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    #[serde(default)]
    pub industry: Option<Industry>,
    /// Bucket label as selected, e.g. "11-24". Empty until chosen.
    #[serde(default)]
    pub employee_count_bucket: String,
    #[serde(default)]
    pub exports: bool,
    #[serde(default)]
    pub investing_in_tech: bool,
    #[serde(default)]
    pub training_needed: bool,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
}

impl AnswerRecord {
    /// Lower bound of the selected headcount bucket (0 when unset or unparseable).
    pub fn employee_lower_bound(&self) -> i64 {
        bucket_lower_bound(&self.employee_count_bucket)
    }

    pub fn flag(&self, flag: ProfileFlag) -> bool {
        match flag {
            ProfileFlag::Exports => self.exports,
            ProfileFlag::InvestingInTech => self.investing_in_tech,
            ProfileFlag::TrainingNeeded => self.training_needed,
        }
    }

    pub fn set_flag(&mut self, flag: ProfileFlag, value: bool) {
        match flag {
            ProfileFlag::Exports => self.exports = value,
            ProfileFlag::InvestingInTech => self.investing_in_tech = value,
            ProfileFlag::TrainingNeeded => self.training_needed = value,
        }
    }

    /// Overwrite the contact fields present in `update`; absent fields are kept.
    pub fn apply_contact(&mut self, update: ContactUpdate) {
        if let Some(name) = update.contact_name {
            self.contact_name = name;
        }
        if let Some(company) = update.company_name {
            self.company_name = company;
        }
        if let Some(email) = update.contact_email {
            self.contact_email = email;
        }
        if let Some(phone) = update.contact_phone {
            self.contact_phone = phone;
        }
    }

    /// Names of required contact fields that are still blank.
    pub fn missing_contact_fields(&self) -> Vec<&'static str> {
        [
            ("contact_name", &self.contact_name),
            ("company_name", &self.company_name),
            ("contact_email", &self.contact_email),
            ("contact_phone", &self.contact_phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Partial contact-form update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
}

/// The document written to the lead store. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedLead {
    #[serde(flatten)]
    pub answers: AnswerRecord,
    pub timestamp: DateTime<Utc>,
    /// Anonymous session identity of the submitter.
    pub user_id: String,
    /// Provenance tag naming the originating page.
    pub source: String,
    /// Namespace the lead is filed under.
    pub app_id: String,
}
