//! Listing filters for companies and jobs.
//!
//! A filter is a case-insensitive substring match over one or two text
//! columns, ANDed with inclusive numeric bounds. Absent options fall back to
//! an open range, so an empty [`FilterOptions`] matches every row. A company
//! with no recorded headcount counts as 0 employees.

use crate::error::{StoreError, StoreResult};
use crate::qb::{BuiltQuery, Expr, ParamList};
use serde::Deserialize;

/// Upper bound used when no maximum is supplied.
pub const MAX_BOUND: i32 = 2_147_483_646;

/// Nullable headcount compared as 0.
const EMPLOYEE_COUNT: &str = "COALESCE(num_employees, 0)";

/// Which column set a filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Company,
    Job,
}

impl ResourceKind {
    fn search_columns(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Company => &["name", "handle"],
            ResourceKind::Job => &["title", "company_handle"],
        }
    }
}

/// Recognized listing options. Unknown query keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterOptions {
    pub search: Option<String>,
    /// Companies: minimum employee count.
    pub min: Option<i32>,
    /// Companies: maximum employee count.
    pub max: Option<i32>,
    /// Jobs: minimum salary.
    pub min_salary: Option<f64>,
    /// Jobs: minimum equity.
    pub min_equity: Option<f64>,
}

impl FilterOptions {
    /// Reject inconsistent bounds for `kind`. Runs before any SQL is built.
    /// Jobs ignore `min`/`max`, so only companies check them.
    pub fn validate(&self, kind: ResourceKind) -> StoreResult<()> {
        if kind != ResourceKind::Company {
            return Ok(());
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(StoreError::validation("Min cannot be greater than max"));
            }
        }
        Ok(())
    }
}

/// Escape `LIKE` metacharacters so the input matches literally.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn search_pattern(search: Option<&str>) -> String {
    format!("%{}%", escape_like(search.unwrap_or("")))
}

/// Build the filter as an expression, ready to be ANDed into a SELECT.
pub fn filter_expr(kind: ResourceKind, options: &FilterOptions) -> StoreResult<Expr> {
    options.validate(kind)?;

    let pattern = search_pattern(options.search.as_deref());
    let text_match = Expr::any_ilike(kind.search_columns(), pattern);

    let expr = match kind {
        ResourceKind::Company => Expr::and(vec![
            text_match,
            Expr::gte(EMPLOYEE_COUNT, options.min.unwrap_or(0)),
            Expr::lte(EMPLOYEE_COUNT, options.max.unwrap_or(MAX_BOUND)),
        ]),
        ResourceKind::Job => Expr::and(vec![
            text_match,
            Expr::gte("salary", options.min_salary.unwrap_or(0.0)),
            Expr::gte("equity", options.min_equity.unwrap_or(0.0)),
        ]),
    };
    Ok(expr)
}

/// Build the WHERE predicate (without the `WHERE` keyword) and its three
/// bound parameters, numbered from `$1`.
pub fn build_filter_predicate(
    kind: ResourceKind,
    options: &FilterOptions,
) -> StoreResult<BuiltQuery> {
    let expr = filter_expr(kind, options)?;
    let mut params = ParamList::new();
    let sql = expr.build(&mut params);
    Ok(BuiltQuery::new(sql, params))
}
