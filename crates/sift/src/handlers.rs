//! Per-field custom handler registry.
//!
//! A handler replaces generic operator/sort compilation for one field.
//! Handlers are registered by field key at construction time; lookup is
//! a plain map access, no naming conventions and no reflection. Keys
//! use the canonical field spelling: a bare column name for root fields
//! (`"name"`, which also matches an explicitly root-qualified
//! `"users.name"` in a descriptor) and a relation-qualified path for
//! joined fields (`"company.name"`). When a
//! handler is present for a field the compiler emits no predicate or
//! ordering itself, but it still joins the field's relation, since
//! handlers commonly reference a relation's columns.

use std::collections::HashMap;

use crate::operator::FilterOperator;
use crate::types::{FilterValue, SortDirection};

/// Custom filter compilation for one field.
///
/// Receives the exact operator/value/negation triple from the
/// descriptor and mutates the query directly.
pub trait FilterHandler<Q>: Send + Sync {
    fn apply(
        &self,
        query: &mut Q,
        operator: FilterOperator,
        value: &FilterValue,
        not: bool,
    ) -> anyhow::Result<()>;

    /// Whether the relation joined for this field should also be
    /// projected into the result set.
    fn wants_projection(&self) -> bool {
        false
    }
}

/// Custom sort compilation for one field.
pub trait SortHandler<Q>: Send + Sync {
    fn apply(&self, query: &mut Q, direction: SortDirection) -> anyhow::Result<()>;

    fn wants_projection(&self) -> bool {
        false
    }
}

impl<Q, F> FilterHandler<Q> for F
where
    F: Fn(&mut Q, FilterOperator, &FilterValue, bool) -> anyhow::Result<()> + Send + Sync,
{
    fn apply(
        &self,
        query: &mut Q,
        operator: FilterOperator,
        value: &FilterValue,
        not: bool,
    ) -> anyhow::Result<()> {
        self(query, operator, value, not)
    }
}

impl<Q, F> SortHandler<Q> for F
where
    F: Fn(&mut Q, SortDirection) -> anyhow::Result<()> + Send + Sync,
{
    fn apply(&self, query: &mut Q, direction: SortDirection) -> anyhow::Result<()> {
        self(query, direction)
    }
}

/// Registry mapping field keys to their custom handlers.
pub struct HandlerRegistry<Q> {
    filters: HashMap<String, Box<dyn FilterHandler<Q>>>,
    sorts: HashMap<String, Box<dyn SortHandler<Q>>>,
}

impl<Q> Default for HandlerRegistry<Q> {
    fn default() -> Self {
        Self {
            filters: HashMap::new(),
            sorts: HashMap::new(),
        }
    }
}

impl<Q> HandlerRegistry<Q> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter handler for a field key.
    pub fn register_filter(
        &mut self,
        key: impl Into<String>,
        handler: impl FilterHandler<Q> + 'static,
    ) {
        self.filters.insert(key.into(), Box::new(handler));
    }

    /// Register a sort handler for a field key.
    pub fn register_sort(
        &mut self,
        key: impl Into<String>,
        handler: impl SortHandler<Q> + 'static,
    ) {
        self.sorts.insert(key.into(), Box::new(handler));
    }

    /// Look up the filter handler for a field key.
    pub fn filter(&self, key: &str) -> Option<&dyn FilterHandler<Q>> {
        self.filters.get(key).map(|h| h.as_ref())
    }

    /// Look up the sort handler for a field key.
    pub fn sort(&self, key: &str) -> Option<&dyn SortHandler<Q>> {
        self.sorts.get(key).map(|h| h.as_ref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    struct NoopFilter;

    impl FilterHandler<Vec<String>> for NoopFilter {
        fn apply(
            &self,
            query: &mut Vec<String>,
            operator: FilterOperator,
            _value: &FilterValue,
            not: bool,
        ) -> anyhow::Result<()> {
            query.push(format!("{}:{not}", operator.symbol()));
            Ok(())
        }

        fn wants_projection(&self) -> bool {
            true
        }
    }

    #[test]
    fn registry_lookup_by_key() {
        let mut registry: HandlerRegistry<Vec<String>> = HandlerRegistry::new();
        registry.register_filter("status", NoopFilter);

        assert!(registry.filter("status").is_some());
        assert!(registry.filter("other").is_none());
        assert!(registry.sort("status").is_none());
    }

    #[test]
    fn handler_mutates_query() {
        let mut registry: HandlerRegistry<Vec<String>> = HandlerRegistry::new();
        registry.register_filter("status", NoopFilter);

        let mut query = Vec::new();
        let handler = registry.filter("status").unwrap();
        handler
            .apply(&mut query, FilterOperator::Eq, &FilterValue::Integer(1), true)
            .unwrap();

        assert_eq!(query, ["eq:true"]);
        assert!(handler.wants_projection());
    }

    #[test]
    fn closures_are_handlers() {
        let mut registry: HandlerRegistry<Vec<String>> = HandlerRegistry::new();
        registry.register_sort(
            "name",
            |query: &mut Vec<String>, direction: SortDirection| -> anyhow::Result<()> {
                query.push(format!("sort {direction:?}"));
                Ok(())
            },
        );

        let mut query = Vec::new();
        registry
            .sort("name")
            .unwrap()
            .apply(&mut query, SortDirection::Desc)
            .unwrap();
        assert_eq!(query, ["sort Desc"]);
    }
}
