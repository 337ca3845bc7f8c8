//! Incentive eligibility rules.
//!
//! Each rule is an independent predicate over the answer record paired with
//! a fixed recommendation. Every rule that matches is reported, in
//! declaration order; the order is not a ranking.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::wizard::model::{AnswerRecord, Industry};

/// Confidence label shown with every match. The rule set has no variable scoring.
pub const CONFIDENCE_HIGH: &str = "High";

/// Headcount ceiling for the base incentive.
const BASE_INCENTIVE_MAX_EMPLOYEES: i64 = 24;

/// Headcount floor for the training grant.
const TRAINING_GRANT_MIN_EMPLOYEES: i64 = 10;

/// The incentive programs the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncentiveRule {
    /// Small base-sector or exporting firms.
    BaseIncentive,
    /// Mid-size teams that need upskilling.
    TrainingGrant,
    /// Manufacturers and firms buying technology.
    TaxExemption,
}

impl IncentiveRule {
    pub fn program_name(&self) -> &'static str {
        match self {
            Self::BaseIncentive => "SD Business Incentive (BIP)",
            Self::TrainingGrant => "ETP Training Grants",
            Self::TaxExemption => "CA Sales Tax Exemption",
        }
    }

    pub fn estimated_value(&self) -> &'static str {
        match self {
            Self::BaseIncentive => "Up to $100,000",
            Self::TrainingGrant => "$25k - $50k+",
            Self::TaxExemption => "~4.12% Savings",
        }
    }

    pub fn rationale(&self) -> &'static str {
        match self {
            Self::BaseIncentive => "Matches 'Base Sector' profile for San Diego County.",
            Self::TrainingGrant => "Upskilling potential for teams adopting AI logic.",
            Self::TaxExemption => "Direct reduction on R&D software/hardware.",
        }
    }

    /// Whether this rule fires for `record`.
    pub fn matches(&self, record: &AnswerRecord) -> bool {
        let employees = record.employee_lower_bound();
        match self {
            Self::BaseIncentive => {
                let base_sector = matches!(
                    record.industry,
                    Some(Industry::Manufacturing | Industry::Professional)
                );
                employees <= BASE_INCENTIVE_MAX_EMPLOYEES && (base_sector || record.exports)
            }
            Self::TrainingGrant => {
                record.training_needed && employees >= TRAINING_GRANT_MIN_EMPLOYEES
            }
            Self::TaxExemption => {
                record.industry == Some(Industry::Manufacturing) || record.investing_in_tech
            }
        }
    }

    /// The recommendation this rule produces.
    pub fn to_match(self) -> IncentiveMatch {
        IncentiveMatch {
            program: self,
            program_name: self.program_name().to_string(),
            estimated_value: self.estimated_value().to_string(),
            confidence: CONFIDENCE_HIGH.to_string(),
            rationale: self.rationale().to_string(),
        }
    }
}

/// A recommended incentive. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveMatch {
    pub program: IncentiveRule,
    pub program_name: String,
    /// Display string; ranges are opaque to the engine.
    pub estimated_value: String,
    pub confidence: String,
    pub rationale: String,
}

/// Ordered rule list evaluated against an answer record.
#[derive(Debug, Clone)]
pub struct EligibilityEngine {
    rules: Vec<IncentiveRule>,
}

impl EligibilityEngine {
    /// The published rule set.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                IncentiveRule::BaseIncentive,
                IncentiveRule::TrainingGrant,
                IncentiveRule::TaxExemption,
            ],
        }
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[IncentiveRule] {
        &self.rules
    }

    /// Evaluate every rule against `record`. Pure; never fails.
    pub fn evaluate(&self, record: &AnswerRecord) -> Vec<IncentiveMatch> {
        self.rules
            .iter()
            .filter(|rule| {
                let hit = rule.matches(record);
                if hit {
                    debug!(
                        rule = ?rule,
                        industry = ?record.industry,
                        employees = record.employee_lower_bound(),
                        "Incentive rule matched"
                    );
                }
                hit
            })
            .map(|rule| rule.to_match())
            .collect()
    }
}
