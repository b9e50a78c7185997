#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/surplus/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod calculator;
pub mod capital;
pub mod error;
pub mod identity;
pub mod profit_rate;
pub mod registry;
pub mod surplus_value;
pub mod validation;

pub use calculator::{calculate_identities, compute_identities};
pub use error::{IdentityError, Result};
pub use identity::Identity;

// Re-export registry types for convenience
pub use registry::{
    IdentityCheckInfo, PROFIT_RATE_CHECK, SURPLUS_RATE_CHECKS, all_identities, identity_checks,
};
pub use validation::{CheckSummary, ValidationRecord, run_validation, validate_identities};
