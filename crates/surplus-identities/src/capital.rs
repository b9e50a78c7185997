//! Capital Flows Implied by Surplus Product
//!
//! With `s' = SP / V` and `r' = SP / (C + V)` the book's rates pin down
//! variable and constant capital:
//!
//! - `V = SP / s'`
//! - `C = SP / r' − V`

use crate::identity::{Identity, R_PRIME, S_PRIME, SP, ratio};
use polars::prelude::*;

/// Output column of [`VariableCapitalIdentity`].
pub const V_FROM_SP: &str = "V_from_SP";

/// Output column of [`ConstantCapitalIdentity`].
pub const C_FROM_SP: &str = "C_from_SP";

/// `V = SP / s'`
#[derive(Debug, Default, Clone, Copy)]
pub struct VariableCapitalIdentity;

impl Identity for VariableCapitalIdentity {
    fn name(&self) -> &str {
        "variable_capital"
    }

    fn output(&self) -> &str {
        V_FROM_SP
    }

    fn required_columns(&self) -> &[&str] {
        &[SP, S_PRIME]
    }

    fn formula(&self) -> &str {
        "SP / s'"
    }

    fn expression(&self) -> Expr {
        ratio(col(SP), col(S_PRIME))
    }
}

/// `C = SP / r' − SP / s'`
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstantCapitalIdentity;

impl Identity for ConstantCapitalIdentity {
    fn name(&self) -> &str {
        "constant_capital"
    }

    fn output(&self) -> &str {
        C_FROM_SP
    }

    fn required_columns(&self) -> &[&str] {
        &[SP, R_PRIME, S_PRIME]
    }

    fn formula(&self) -> &str {
        "SP / r' - SP / s'"
    }

    fn expression(&self) -> Expr {
        ratio(col(SP), col(R_PRIME)) - VariableCapitalIdentity.expression()
    }
}
