//! Surplus-Value Rate at Capacity Utilisation
//!
//! The book prints the rate of surplus value both raw (`s'`) and scaled by
//! capacity utilisation (`s'u`; some scans read it as `s'«u`). This
//! identity rebuilds the scaled series: `s' / u`.

use crate::identity::{Identity, S_PRIME, U, ratio};
use polars::prelude::*;

/// Output column of [`UtilizedSurplusRateIdentity`].
pub const S_U_CALC: &str = "s_u_calc";

/// `s'u = s' / u`
#[derive(Debug, Default, Clone, Copy)]
pub struct UtilizedSurplusRateIdentity;

impl Identity for UtilizedSurplusRateIdentity {
    fn name(&self) -> &str {
        "surplus_rate_utilized"
    }

    fn output(&self) -> &str {
        S_U_CALC
    }

    fn required_columns(&self) -> &[&str] {
        &[S_PRIME, U]
    }

    fn formula(&self) -> &str {
        "s' / u"
    }

    fn expression(&self) -> Expr {
        ratio(col(S_PRIME), col(U))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute() {
        let df = df![
            "s'" => [Some(1.8), Some(2.0)],
            "u" => [Some(0.9), None],
        ]
        .unwrap();

        let out = UtilizedSurplusRateIdentity
            .compute(df.lazy())
            .collect()
            .unwrap();
        let values: Vec<Option<f64>> = out
            .column(S_U_CALC)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();

        approx::assert_relative_eq!(values[0].unwrap(), 2.0);
        assert!(values[1].is_none());
    }
}
