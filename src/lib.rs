//! Lead wizard — incentive diagnostic and lead capture service.

pub mod config;
pub mod eligibility;
pub mod error;
pub mod identity;
pub mod store;
pub mod wizard;

pub use error::{Error, Result};
