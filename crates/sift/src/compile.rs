//! Resource option compiler: validates a descriptor and drives the
//! filter/sort/join/pagination stages against a backend query builder.

use tracing::debug;

use crate::backend::{ParamGen, QueryBackend};
use crate::error::{QueryError, QueryResult};
use crate::filter::apply_filter_groups;
use crate::handlers::HandlerRegistry;
use crate::join::{JoinRegistry, check_alias_collisions, ensure_joined, resolve_path};
use crate::operator::{self, FilterOperator};
use crate::sort::apply_sorts;
use crate::types::{ResourceOptions, canonical_key, is_safe_field_path, qualify};

/// Compiles [`ResourceOptions`] descriptors into queries.
///
/// Owns the backend and the custom handler registry, and nothing else:
/// every compilation constructs its own join registry and parameter
/// generator, so one compiler can serve concurrent requests without
/// locking.
pub struct ResourceCompiler<B: QueryBackend> {
    backend: B,
    handlers: HandlerRegistry<B::Query>,
}

impl<B: QueryBackend> ResourceCompiler<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            handlers: HandlerRegistry::new(),
        }
    }

    /// The custom handler registry, for registering per-field overrides.
    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry<B::Query> {
        &mut self.handlers
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply a resource descriptor to a query under construction.
    ///
    /// Stages run strictly in order: resolve root alias, validate the
    /// whole descriptor, includes, filters, sorts, pagination. The
    /// descriptor is validated in full before the first mutation, so a
    /// failed compilation leaves the query untouched.
    pub fn apply(&self, query: &mut B::Query, options: &ResourceOptions) -> QueryResult<()> {
        let root = self
            .backend
            .root_alias(query)
            .ok_or(QueryError::NoRootAlias)?;

        self.validate(&root, options)?;
        debug!(root = %root, "applying resource options");

        let mut joins = JoinRegistry::new();
        let mut params = ParamGen::default();

        for path in &options.includes {
            ensure_joined(&self.backend, query, &mut joins, &root, path, true)?;
        }

        apply_filter_groups(
            &self.backend,
            query,
            &self.handlers,
            &mut joins,
            &mut params,
            &root,
            &options.filter_groups,
        )?;

        apply_sorts(
            &self.backend,
            query,
            &self.handlers,
            &mut joins,
            &root,
            &options.sort,
        )?;

        if let Some(limit) = options.limit {
            self.backend.set_limit(query, limit);
            // Offset only ever applies alongside a limit; `page` alone
            // is meaningless and is ignored.
            if let Some(page) = options.page {
                self.backend
                    .set_offset(query, page.saturating_sub(1).saturating_mul(limit));
            }
        }

        Ok(())
    }

    /// Validate the whole descriptor up front: shapes, operator symbols,
    /// value shapes, identifier safety, relation resolvability, and
    /// alias uniqueness.
    fn validate(&self, root: &str, options: &ResourceOptions) -> QueryResult<()> {
        let mut relation_paths: Vec<&str> = Vec::new();

        for path in &options.includes {
            if !is_safe_field_path(path) {
                return Err(QueryError::InvalidIncludesShape(format!(
                    "invalid relation path '{path}'"
                )));
            }
            resolve_path(&self.backend, root, path)?;
            relation_paths.push(path);
        }

        for group in &options.filter_groups {
            for filter in &group.filters {
                if !is_safe_field_path(&filter.key) {
                    return Err(QueryError::InvalidFilterShape(format!(
                        "invalid filter key '{}'",
                        filter.key
                    )));
                }
                let op = FilterOperator::parse(&filter.operator)?;
                let (relation, field) = qualify(&filter.key, root);
                if let Some(path) = relation {
                    resolve_path(&self.backend, root, path)?;
                    relation_paths.push(path);
                }
                // Custom-handled fields skip comparison resolution; the
                // handler receives the operator/value/negation as-is.
                if self
                    .handlers
                    .filter(&canonical_key(relation, &field.column))
                    .is_none()
                {
                    operator::resolve(op, filter.not, &filter.value)?;
                }
            }
        }

        for rule in &options.sort {
            if !is_safe_field_path(&rule.key) {
                return Err(QueryError::InvalidSortShape(format!(
                    "invalid sort key '{}'",
                    rule.key
                )));
            }
            let (relation, _) = qualify(&rule.key, root);
            if let Some(path) = relation {
                resolve_path(&self.backend, root, path)?;
                relation_paths.push(path);
            }
        }

        check_alias_collisions(root, relation_paths)?;
        Ok(())
    }
}
