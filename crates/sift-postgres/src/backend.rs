//! sea-query implementation of the backend contract.

use sea_query::{Alias, Asterisk, Cond, Expr, ExprTrait, JoinType, Order, SimpleExpr, Value};

use sift::backend::{ParamGen, QueryBackend, RelationKind, RelationMeta, SchemaMap};
use sift::error::{QueryError, QueryResult};
use sift::operator::{Comparison, MatchKind};
use sift::types::{FieldRef, FilterValue, SortDirection};

use crate::query::PgQuery;

/// PostgreSQL backend: builds `sea_query` expression trees and renders
/// bound values as statement parameters, never as interpolated text.
pub struct PostgresBackend {
    schema: SchemaMap,
}

impl PostgresBackend {
    pub fn new(schema: SchemaMap) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &SchemaMap {
        &self.schema
    }
}

fn field_expr(field: &FieldRef) -> SimpleExpr {
    Expr::col((Alias::new(&field.alias), Alias::new(&field.column))).into()
}

/// Convert a scalar filter value for binding.
fn scalar(value: &FilterValue) -> QueryResult<Value> {
    match value {
        FilterValue::String(s) => Ok(s.clone().into()),
        FilterValue::Integer(i) => Ok((*i).into()),
        FilterValue::Float(f) => Ok((*f).into()),
        FilterValue::Boolean(b) => Ok((*b).into()),
        FilterValue::Uuid(u) => Ok((*u).into()),
        FilterValue::Null | FilterValue::List(_) => Err(QueryError::InvalidFilterShape(
            "expected a scalar value".to_string(),
        )),
    }
}

/// Build a LIKE pattern, escaping wildcard characters in the value.
fn pattern(kind: MatchKind, value: &FilterValue) -> QueryResult<String> {
    let text = value.as_string().ok_or_else(|| {
        QueryError::InvalidFilterShape("pattern match requires a scalar value".to_string())
    })?;
    let escaped = escape_like_wildcards(&text);
    Ok(match kind {
        MatchKind::Contains => format!("%{escaped}%"),
        MatchKind::StartsWith => format!("{escaped}%"),
        MatchKind::EndsWith => format!("%{escaped}"),
    })
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
pub fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl QueryBackend for PostgresBackend {
    type Query = PgQuery;
    type Expr = SimpleExpr;

    fn root_alias(&self, query: &PgQuery) -> Option<String> {
        query.root.clone()
    }

    fn relation(&self, owner: &str, name: &str) -> Option<RelationMeta> {
        self.schema.relation(owner, name).cloned()
    }

    fn add_left_join(
        &self,
        query: &mut PgQuery,
        owner_alias: &str,
        alias: &str,
        meta: &RelationMeta,
    ) {
        let (local, foreign) = match meta.kind {
            RelationKind::BelongsTo => (meta.foreign_key.as_str(), meta.owner_key.as_str()),
            RelationKind::HasOne | RelationKind::HasMany => {
                (meta.owner_key.as_str(), meta.foreign_key.as_str())
            }
        };
        let on = Expr::col((Alias::new(owner_alias), Alias::new(local)))
            .equals((Alias::new(alias), Alias::new(foreign)));
        query.select.join_as(
            JoinType::LeftJoin,
            Alias::new(&meta.target_table),
            Alias::new(alias),
            on,
        );
    }

    fn add_projection(&self, query: &mut PgQuery, alias: &str) {
        query.select.column((Alias::new(alias), Asterisk));
    }

    fn comparison(
        &self,
        query: &mut PgQuery,
        field: &FieldRef,
        cmp: Comparison,
        value: &FilterValue,
        params: &mut ParamGen,
    ) -> QueryResult<SimpleExpr> {
        let col = field_expr(field);
        Ok(match cmp {
            Comparison::Eq => {
                let v = scalar(value)?;
                query.bind(params.fresh(), v.clone());
                col.eq(v)
            }
            Comparison::NotEq => {
                let v = scalar(value)?;
                query.bind(params.fresh(), v.clone());
                col.ne(v)
            }
            Comparison::Like(kind) => {
                let p = pattern(kind, value)?;
                query.bind(params.fresh(), p.clone().into());
                col.like(p)
            }
            Comparison::NotLike(kind) => {
                let p = pattern(kind, value)?;
                query.bind(params.fresh(), p.clone().into());
                col.not_like(p)
            }
            Comparison::Gt => {
                let v = scalar(value)?;
                query.bind(params.fresh(), v.clone());
                col.gt(v)
            }
            Comparison::Lt => {
                let v = scalar(value)?;
                query.bind(params.fresh(), v.clone());
                col.lt(v)
            }
            Comparison::Gte => {
                let v = scalar(value)?;
                query.bind(params.fresh(), v.clone());
                col.gte(v)
            }
            Comparison::Lte => {
                let v = scalar(value)?;
                query.bind(params.fresh(), v.clone());
                col.lte(v)
            }
            Comparison::In | Comparison::NotIn => {
                let items = value.as_list().ok_or_else(|| {
                    QueryError::InvalidFilterShape("operator `in` requires a list".to_string())
                })?;
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let v = scalar(item)?;
                    query.bind(params.fresh(), v.clone());
                    values.push(v);
                }
                if matches!(cmp, Comparison::NotIn) {
                    col.is_not_in(values)
                } else {
                    col.is_in(values)
                }
            }
            Comparison::IsNull => col.is_null(),
            Comparison::IsNotNull => col.is_not_null(),
        })
    }

    fn add_predicates(&self, query: &mut PgQuery, any: bool, predicates: Vec<SimpleExpr>) {
        let mut cond = if any { Cond::any() } else { Cond::all() };
        for predicate in predicates {
            cond = cond.add(predicate);
        }
        // Successive cond_where calls conjoin with AND: groups always
        // AND together.
        query.select.cond_where(cond);
    }

    fn add_ordering(&self, query: &mut PgQuery, field: &FieldRef, direction: SortDirection) {
        let order = match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        query
            .select
            .order_by((Alias::new(&field.alias), Alias::new(&field.column)), order);
    }

    fn set_limit(&self, query: &mut PgQuery, limit: u64) {
        query.select.limit(limit);
    }

    fn set_offset(&self, query: &mut PgQuery, offset: u64) {
        query.select.offset(offset);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_wildcards_handles_specials() {
        assert_eq!(escape_like_wildcards("hello"), "hello");
        assert_eq!(escape_like_wildcards("100%"), "100\\%");
        assert_eq!(escape_like_wildcards("a_b"), "a\\_b");
        assert_eq!(escape_like_wildcards("a\\b"), "a\\\\b");
    }

    #[test]
    fn pattern_wraps_by_kind() {
        let value = FilterValue::String("ali".to_string());
        assert_eq!(pattern(MatchKind::Contains, &value).unwrap(), "%ali%");
        assert_eq!(pattern(MatchKind::StartsWith, &value).unwrap(), "ali%");
        assert_eq!(pattern(MatchKind::EndsWith, &value).unwrap(), "%ali");
    }

    #[test]
    fn pattern_rejects_lists() {
        let value = FilterValue::List(vec![]);
        assert!(pattern(MatchKind::Contains, &value).is_err());
    }

    #[test]
    fn scalar_rejects_null_and_lists() {
        assert!(scalar(&FilterValue::Null).is_err());
        assert!(scalar(&FilterValue::List(vec![])).is_err());
        assert!(scalar(&FilterValue::Integer(1)).is_ok());
    }
}
