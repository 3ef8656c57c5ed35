//! Recording backend for unit tests: logs every operation the compiler
//! asks for as a plain string, so tests can assert on exact sequences.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::backend::{ParamGen, QueryBackend, RelationMeta, SchemaMap};
use crate::error::QueryResult;
use crate::operator::Comparison;
use crate::types::{FieldRef, FilterValue, SortDirection};

/// Fake query under construction: a root alias plus an operation log.
#[derive(Debug, Default)]
pub(crate) struct RecQuery {
    pub root: Option<String>,
    pub ops: Vec<String>,
    pub bindings: Vec<String>,
}

impl RecQuery {
    pub fn new(root: &str) -> Self {
        Self {
            root: Some(root.to_string()),
            ops: Vec::new(),
            bindings: Vec::new(),
        }
    }
}

pub(crate) struct RecordingBackend {
    schema: SchemaMap,
}

impl RecordingBackend {
    pub fn new(schema: SchemaMap) -> Self {
        Self { schema }
    }

    /// Backend over a small `users` schema with a nested relation chain.
    pub fn users() -> Self {
        let schema = SchemaMap::new()
            .belongs_to("users", "company", "companies", "company_id", "id")
            .has_many("users", "posts", "posts", "user_id", "id")
            .belongs_to("companies", "country", "countries", "country_id", "id");
        Self { schema }
    }
}

impl QueryBackend for RecordingBackend {
    type Query = RecQuery;
    type Expr = String;

    fn root_alias(&self, query: &RecQuery) -> Option<String> {
        query.root.clone()
    }

    fn relation(&self, owner: &str, name: &str) -> Option<RelationMeta> {
        self.schema.relation(owner, name).cloned()
    }

    fn add_left_join(
        &self,
        query: &mut RecQuery,
        owner_alias: &str,
        alias: &str,
        meta: &RelationMeta,
    ) {
        query
            .ops
            .push(format!("join {} as {alias} on {owner_alias}", meta.target_table));
    }

    fn add_projection(&self, query: &mut RecQuery, alias: &str) {
        query.ops.push(format!("project {alias}"));
    }

    fn comparison(
        &self,
        query: &mut RecQuery,
        field: &FieldRef,
        cmp: Comparison,
        value: &FilterValue,
        params: &mut ParamGen,
    ) -> QueryResult<String> {
        let expr = match cmp {
            Comparison::IsNull | Comparison::IsNotNull => {
                format!("{}.{} {cmp:?}", field.alias, field.column)
            }
            Comparison::In | Comparison::NotIn => {
                let items = value.as_list().unwrap_or_default();
                let names: Vec<String> = items
                    .iter()
                    .map(|_| {
                        let name = params.fresh();
                        query.bindings.push(name.clone());
                        format!(":{name}")
                    })
                    .collect();
                format!(
                    "{}.{} {cmp:?} ({})",
                    field.alias,
                    field.column,
                    names.join(", ")
                )
            }
            _ => {
                let name = params.fresh();
                query.bindings.push(name.clone());
                format!("{}.{} {cmp:?} :{name}", field.alias, field.column)
            }
        };
        Ok(expr)
    }

    fn add_predicates(&self, query: &mut RecQuery, any: bool, predicates: Vec<String>) {
        let combinator = if any { "any" } else { "all" };
        query
            .ops
            .push(format!("where {combinator} ({})", predicates.join(", ")));
    }

    fn add_ordering(&self, query: &mut RecQuery, field: &FieldRef, direction: SortDirection) {
        query
            .ops
            .push(format!("order {}.{} {direction:?}", field.alias, field.column));
    }

    fn set_limit(&self, query: &mut RecQuery, limit: u64) {
        query.ops.push(format!("limit {limit}"));
    }

    fn set_offset(&self, query: &mut RecQuery, offset: u64) {
        query.ops.push(format!("offset {offset}"));
    }
}
