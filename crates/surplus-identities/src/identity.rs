//! The [`Identity`] trait and shared expression helpers.

use polars::prelude::*;

/// Book variable: surplus product.
pub const SP: &str = "SP";
/// Book variable: capital stock.
pub const K: &str = "K";
/// Book variable: capacity utilisation.
pub const U: &str = "u";
/// Book variable: rate of surplus value.
pub const S_PRIME: &str = "s'";
/// Book variable: rate of profit.
pub const R_PRIME: &str = "r'";

/// A derived series defined by a fixed algebraic formula over book variables.
pub trait Identity: std::fmt::Debug + Send + Sync {
    /// Unique identifier.
    fn name(&self) -> &str;

    /// Column the result is written to.
    fn output(&self) -> &str;

    /// Book columns the formula reads.
    fn required_columns(&self) -> &[&str];

    /// The formula in book notation, for logs and reports.
    fn formula(&self) -> &str;

    /// The formula as an unaliased expression.
    fn expression(&self) -> Expr;

    /// Append the derived column to `data`.
    fn compute(&self, data: LazyFrame) -> LazyFrame {
        data.with_columns([self.expression().alias(self.output())])
    }
}

/// `numerator / denominator`, null where the denominator is zero or null.
pub fn ratio(numerator: Expr, denominator: Expr) -> Expr {
    when(denominator.clone().neq(lit(0.0)))
        .then(numerator / denominator)
        .otherwise(lit(NULL))
}
