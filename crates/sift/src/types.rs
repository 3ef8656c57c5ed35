//! Resource-query descriptor types.
//!
//! A `ResourceOptions` value is the client-supplied description of a list
//! query: which relations to include, which filter predicates to apply
//! (with boolean grouping), how to sort, and how to paginate. It is a
//! transient value consumed once per compilation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level query descriptor. All fields are optional; an empty
/// descriptor compiles to the identity query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceOptions {
    /// Relation paths to eagerly join and project (dot-separated).
    pub includes: Vec<String>,

    /// Filter groups, AND-combined across groups.
    pub filter_groups: Vec<FilterGroup>,

    /// Sort rules, applied in order.
    pub sort: Vec<SortRule>,

    /// Row cap.
    pub limit: Option<u64>,

    /// 1-based page number. Meaningless without `limit`.
    pub page: Option<u64>,
}

impl ResourceOptions {
    /// Whether this descriptor requests nothing at all.
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
            && self.filter_groups.is_empty()
            && self.sort.is_empty()
            && self.limit.is_none()
            && self.page.is_none()
    }
}

/// A set of filters combined by a single boolean operator.
///
/// Within a group, filters combine with OR when `or` is set, else AND.
/// Groups themselves always AND together; that is structural, not
/// user-selectable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterGroup {
    /// Combine the group's filters with OR instead of AND.
    pub or: bool,

    /// Filters in this group.
    pub filters: Vec<Filter>,
}

/// A single filter predicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    /// Field to filter on: `alias.field` or bare `field` (qualified with
    /// the root alias at resolution time).
    pub key: String,

    /// Operator symbol (`eq`, `ct`, `sw`, `ew`, `gt`, `lt`, `gte`,
    /// `lte`, `in`). Defaults to `eq`.
    #[serde(default = "default_operator")]
    pub operator: String,

    /// Value to compare against. A missing value deserializes as null.
    #[serde(default)]
    pub value: FilterValue,

    /// Negate the comparison.
    #[serde(default)]
    pub not: bool,
}

fn default_operator() -> String {
    "eq".to_string()
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            key: String::new(),
            operator: default_operator(),
            value: FilterValue::Null,
            not: false,
        }
    }
}

/// Filter value types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Explicit JSON null (or an absent value).
    Null,
    /// String value.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// UUID value.
    Uuid(Uuid),
    /// List of values (for the `in` operator).
    List(Vec<FilterValue>),
}

impl Default for FilterValue {
    fn default() -> Self {
        FilterValue::Null
    }
}

impl FilterValue {
    /// Whether this value compiles to an IS NULL check under `eq`:
    /// explicit null, or the empty string.
    pub fn is_null_like(&self) -> bool {
        match self {
            FilterValue::Null => true,
            FilterValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Whether this value is a bindable scalar (not null, not a list).
    pub fn is_scalar(&self) -> bool {
        !matches!(self, FilterValue::Null | FilterValue::List(_))
    }

    /// Scalar string rendering, used for LIKE pattern building.
    pub fn as_string(&self) -> Option<String> {
        match self {
            FilterValue::String(s) => Some(s.clone()),
            FilterValue::Integer(i) => Some(i.to_string()),
            FilterValue::Float(f) => Some(f.to_string()),
            FilterValue::Boolean(b) => Some(b.to_string()),
            FilterValue::Uuid(u) => Some(u.to_string()),
            FilterValue::Null | FilterValue::List(_) => None,
        }
    }

    /// Borrow the items of a list value.
    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            FilterValue::List(items) => Some(items),
            _ => None,
        }
    }
}

/// A sort rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SortRule {
    /// Field to sort by, same shape as a filter key.
    pub key: String,

    /// Direction string, parsed case-insensitively; anything other than
    /// "desc" sorts ascending.
    #[serde(default)]
    pub direction: String,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive parse, defaulting to ascending for anything
    /// unrecognized.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }
}

/// A fully qualified field reference handed to the backend.
///
/// Bare field names never reach the backend; qualification happens in
/// [`qualify`] before any predicate or ordering is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    /// Table alias (root alias or a joined relation alias).
    pub alias: String,
    /// Column name.
    pub column: String,
}

/// Split a filter/sort key into its relation path (if any) and a fully
/// qualified field reference.
///
/// `"name"` resolves against the root alias. `"company.name"` names the
/// `company` relation. A key explicitly qualified with the root alias
/// (`"users.name"` on root `"users"`) is treated as a root field.
pub fn qualify<'a>(key: &'a str, root: &str) -> (Option<&'a str>, FieldRef) {
    match key.rsplit_once('.') {
        Some((path, column)) if path != root => {
            let alias = path.rsplit_once('.').map_or(path, |(_, last)| last);
            (
                Some(path),
                FieldRef {
                    alias: alias.to_string(),
                    column: column.to_string(),
                },
            )
        }
        Some((_, column)) => (
            None,
            FieldRef {
                alias: root.to_string(),
                column: column.to_string(),
            },
        ),
        None => (
            None,
            FieldRef {
                alias: root.to_string(),
                column: key.to_string(),
            },
        ),
    }
}

/// Canonical spelling of a qualified field, used as the handler lookup
/// key: bare column name for root fields (an explicit root qualifier is
/// stripped), relation path plus column for joined fields.
pub fn canonical_key(relation: Option<&str>, column: &str) -> String {
    match relation {
        Some(path) => format!("{path}.{column}"),
        None => column.to_string(),
    }
}

/// Validate a SQL identifier name (alias/column/relation segments).
/// Allows only `[a-zA-Z_][a-zA-Z0-9_]*` with max 63 chars (PostgreSQL limit).
pub fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
}

/// Validate a dot-separated field or relation path: every segment must
/// be a safe identifier.
pub fn is_safe_field_path(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(is_safe_identifier)
}
