//! Identity Registry
//!
//! Central list of the derived series the calculator produces and of the
//! identity checks the validator runs against book columns.

use crate::capital::{C_FROM_SP, ConstantCapitalIdentity, V_FROM_SP, VariableCapitalIdentity};
use crate::identity::{Identity, R_PRIME};
use crate::profit_rate::{ProfitRateIdentity, R_SP_OVER_KU};
use crate::surplus_value::{S_U_CALC, UtilizedSurplusRateIdentity};

/// Validation key of the profit-rate check.
pub const PROFIT_RATE_CHECK: &str = "r'";

/// Validation keys of the surplus-value-rate checks. The second is how OCR
/// reads the book's glyph and is kept verbatim.
pub const SURPLUS_RATE_CHECKS: [&str; 2] = ["s'u", "s'«u"];

/// Instantiate every identity, in computation order
pub fn all_identities() -> Vec<Box<dyn Identity>> {
    vec![
        Box::new(ProfitRateIdentity),
        Box::new(UtilizedSurplusRateIdentity),
        Box::new(VariableCapitalIdentity),
        Box::new(ConstantCapitalIdentity),
    ]
}

/// A comparison between a book column and its calculated counterpart
#[derive(Debug, Clone)]
pub struct IdentityCheckInfo {
    /// Key under which the result is stored
    pub key: &'static str,
    /// Book column
    pub book_column: &'static str,
    /// Calculated column
    pub calculated_column: &'static str,
    /// What the check establishes
    pub description: &'static str,
}

/// Get all identity checks
pub fn identity_checks() -> Vec<IdentityCheckInfo> {
    vec![
        IdentityCheckInfo {
            key: PROFIT_RATE_CHECK,
            book_column: R_PRIME,
            calculated_column: R_SP_OVER_KU,
            description: "Profit rate",
        },
        IdentityCheckInfo {
            key: SURPLUS_RATE_CHECKS[0],
            book_column: SURPLUS_RATE_CHECKS[0],
            calculated_column: S_U_CALC,
            description: "Surplus-value rate at utilisation",
        },
        IdentityCheckInfo {
            key: SURPLUS_RATE_CHECKS[1],
            book_column: SURPLUS_RATE_CHECKS[1],
            calculated_column: S_U_CALC,
            description: "Surplus-value rate at utilisation (OCR variant)",
        },
    ]
}
