//! Profit Rate on Utilised Capital
//!
//! Surplus product over the capital stock actually in use: `SP / (K · u)`.
//! Checked against the book's `r'` row.

use crate::identity::{Identity, K, SP, U, ratio};
use polars::prelude::*;

/// Output column of [`ProfitRateIdentity`].
pub const R_SP_OVER_KU: &str = "r_sp_over_Ku";

/// `r' = SP / (K · u)`
#[derive(Debug, Default, Clone, Copy)]
pub struct ProfitRateIdentity;

impl Identity for ProfitRateIdentity {
    fn name(&self) -> &str {
        "profit_rate"
    }

    fn output(&self) -> &str {
        R_SP_OVER_KU
    }

    fn required_columns(&self) -> &[&str] {
        &[SP, K, U]
    }

    fn formula(&self) -> &str {
        "SP / (K * u)"
    }

    fn expression(&self) -> Expr {
        ratio(col(SP), col(K) * col(U))
    }
}
