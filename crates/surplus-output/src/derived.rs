//! The derived columns carried into the final table.
//!
//! This one list drives both the exporter's overlay and the verifier's
//! exclusion set, so the two cannot drift apart.

use surplus_identities::capital::{C_FROM_SP, V_FROM_SP};
use surplus_identities::profit_rate::R_SP_OVER_KU;
use surplus_identities::surplus_value::S_U_CALC;

/// A calculated series and the name it takes in the final table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedColumn {
    /// Column in the calculated panel.
    pub source: &'static str,
    /// Column in the final table. Never a book column name.
    pub output: &'static str,
    /// Short human-readable description.
    pub label: &'static str,
}

/// Every derived column overlaid onto the final table, in output order.
pub static DERIVED_COLUMNS: [DerivedColumn; 4] = [
    DerivedColumn {
        source: R_SP_OVER_KU,
        output: "r_prime_calc",
        label: "profit rate, SP / (K * u)",
    },
    DerivedColumn {
        source: S_U_CALC,
        output: "s_u_calc",
        label: "surplus-value rate at utilisation, s' / u",
    },
    DerivedColumn {
        source: V_FROM_SP,
        output: "V_from_SP",
        label: "variable capital, SP / s'",
    },
    DerivedColumn {
        source: C_FROM_SP,
        output: "C_from_SP",
        label: "constant capital, SP / r' - V",
    },
];

/// Whether `name` is a derived output column (excluded from authenticity checks).
pub fn is_derived(name: &str) -> bool {
    DERIVED_COLUMNS.iter().any(|d| d.output == name)
}
