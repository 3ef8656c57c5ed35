//! Operator table: maps operator symbol + negation to a comparison
//! semantic.
//!
//! Negation policy for ordered comparisons is "negate to strict
//! opposite": `gt`+not compiles to `<`, `lt`+not to `>`, and likewise
//! for `gte`/`lte`. One policy, everywhere.

use crate::error::{QueryError, QueryResult};
use crate::types::FilterValue;

/// Filter operator symbols accepted in a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equality (the default).
    Eq,
    /// Substring match (`%value%`).
    Ct,
    /// Prefix match (`value%`).
    Sw,
    /// Suffix match (`%value`).
    Ew,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Gte,
    /// Less than or equal.
    Lte,
    /// Set membership.
    In,
}

impl FilterOperator {
    /// Parse an operator symbol. Unknown symbols fail at compile time,
    /// never at execution time.
    pub fn parse(symbol: &str) -> QueryResult<Self> {
        Ok(match symbol {
            "eq" => FilterOperator::Eq,
            "ct" => FilterOperator::Ct,
            "sw" => FilterOperator::Sw,
            "ew" => FilterOperator::Ew,
            "gt" => FilterOperator::Gt,
            "lt" => FilterOperator::Lt,
            "gte" => FilterOperator::Gte,
            "lte" => FilterOperator::Lte,
            "in" => FilterOperator::In,
            other => return Err(QueryError::InvalidOperator(other.to_string())),
        })
    }

    /// The descriptor symbol for this operator.
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ct => "ct",
            FilterOperator::Sw => "sw",
            FilterOperator::Ew => "ew",
            FilterOperator::Gt => "gt",
            FilterOperator::Lt => "lt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
        }
    }
}

/// Pattern-match flavor for `ct`/`sw`/`ew`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Contains,
    StartsWith,
    EndsWith,
}

/// Resolved comparison semantic handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    NotEq,
    Like(MatchKind),
    NotLike(MatchKind),
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

/// Resolve an operator + negation + value into a comparison semantic.
///
/// `eq` against a null-like value short-circuits to IS NULL / IS NOT
/// NULL, independent of the generic equality path. Every other operator
/// requires a value.
pub fn resolve(op: FilterOperator, not: bool, value: &FilterValue) -> QueryResult<Comparison> {
    if value.is_null_like() && op != FilterOperator::Eq {
        return Err(QueryError::InvalidFilterShape(format!(
            "operator `{}` requires a value",
            op.symbol()
        )));
    }
    if op != FilterOperator::In && matches!(value, FilterValue::List(_)) {
        return Err(QueryError::InvalidFilterShape(format!(
            "operator `{}` requires a scalar value",
            op.symbol()
        )));
    }

    Ok(match op {
        FilterOperator::Eq if value.is_null_like() => {
            if not {
                Comparison::IsNotNull
            } else {
                Comparison::IsNull
            }
        }
        FilterOperator::Eq => {
            if not {
                Comparison::NotEq
            } else {
                Comparison::Eq
            }
        }
        FilterOperator::Ct => pattern(MatchKind::Contains, not),
        FilterOperator::Sw => pattern(MatchKind::StartsWith, not),
        FilterOperator::Ew => pattern(MatchKind::EndsWith, not),
        FilterOperator::Gt => {
            if not {
                Comparison::Lt
            } else {
                Comparison::Gt
            }
        }
        FilterOperator::Lt => {
            if not {
                Comparison::Gt
            } else {
                Comparison::Lt
            }
        }
        FilterOperator::Gte => {
            if not {
                Comparison::Lte
            } else {
                Comparison::Gte
            }
        }
        FilterOperator::Lte => {
            if not {
                Comparison::Gte
            } else {
                Comparison::Lte
            }
        }
        FilterOperator::In => match value {
            FilterValue::List(items) if !items.is_empty() => {
                if !items.iter().all(|item| item.is_scalar()) {
                    return Err(QueryError::InvalidFilterShape(
                        "operator `in` requires scalar list items".to_string(),
                    ));
                }
                if not {
                    Comparison::NotIn
                } else {
                    Comparison::In
                }
            }
            _ => {
                return Err(QueryError::InvalidFilterShape(
                    "operator `in` requires a non-empty list".to_string(),
                ));
            }
        },
    })
}

fn pattern(kind: MatchKind, not: bool) -> Comparison {
    if not {
        Comparison::NotLike(kind)
    } else {
        Comparison::Like(kind)
    }
}
