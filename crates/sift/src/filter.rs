//! Filter compiler: walks filter groups and emits boolean-grouped,
//! parameter-bound predicates.

use tracing::debug;

use crate::backend::{ParamGen, QueryBackend};
use crate::error::{QueryError, QueryResult};
use crate::handlers::HandlerRegistry;
use crate::join::{JoinRegistry, ensure_joined};
use crate::operator::{self, FilterOperator};
use crate::types::{FilterGroup, canonical_key, qualify};

/// Compile filter groups into the query.
///
/// Per filter: qualify the key, dispatch to a custom handler if one is
/// registered, otherwise resolve the comparison semantic and ask the
/// backend for a predicate bound to fresh parameter names. Values are
/// always bound, never interpolated. Filters referencing relations
/// trigger a deduplicated left join (`with_select = false` unless the
/// handler asks for projection).
pub(crate) fn apply_filter_groups<B: QueryBackend>(
    backend: &B,
    query: &mut B::Query,
    handlers: &HandlerRegistry<B::Query>,
    joins: &mut JoinRegistry,
    params: &mut ParamGen,
    root: &str,
    groups: &[FilterGroup],
) -> QueryResult<()> {
    for group in groups {
        let mut predicates = Vec::with_capacity(group.filters.len());

        for filter in &group.filters {
            let (relation, field) = qualify(&filter.key, root);
            let op = FilterOperator::parse(&filter.operator)?;

            // Handlers are keyed by canonical spelling, so an explicit
            // root qualifier still finds the handler for the bare field.
            if let Some(handler) = handlers.filter(&canonical_key(relation, &field.column)) {
                if let Some(path) = relation {
                    ensure_joined(backend, query, joins, root, path, handler.wants_projection())?;
                }
                debug!(key = %filter.key, "dispatching custom filter handler");
                handler
                    .apply(query, op, &filter.value, filter.not)
                    .map_err(|source| QueryError::Handler {
                        field: filter.key.clone(),
                        source,
                    })?;
                continue;
            }

            if let Some(path) = relation {
                ensure_joined(backend, query, joins, root, path, false)?;
            }

            let cmp = operator::resolve(op, filter.not, &filter.value)?;
            let expr = backend.comparison(query, &field, cmp, &filter.value, params)?;
            predicates.push(expr);
        }

        if !predicates.is_empty() {
            backend.add_predicates(query, group.or, predicates);
        }
    }

    Ok(())
}
