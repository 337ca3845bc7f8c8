//! Eligibility rule engine — maps an answer record to recommended incentives.

pub mod rules;

pub use rules::{CONFIDENCE_HIGH, EligibilityEngine, IncentiveMatch, IncentiveRule};
