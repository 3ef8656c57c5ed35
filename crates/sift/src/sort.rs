//! Sort compiler: walks sort rules and emits ordering clauses.

use tracing::debug;

use crate::backend::QueryBackend;
use crate::error::{QueryError, QueryResult};
use crate::handlers::HandlerRegistry;
use crate::join::{JoinRegistry, ensure_joined};
use crate::types::{SortDirection, SortRule, canonical_key, qualify};

/// Compile sort rules into the query.
///
/// A custom sort handler takes precedence and receives the parsed
/// direction. Otherwise a relation-qualified key triggers a left join
/// with projection (the joined table's columns keep the root entity
/// hydrated when the join reshapes the result set), and the ordering is
/// appended directly.
pub(crate) fn apply_sorts<B: QueryBackend>(
    backend: &B,
    query: &mut B::Query,
    handlers: &HandlerRegistry<B::Query>,
    joins: &mut JoinRegistry,
    root: &str,
    rules: &[SortRule],
) -> QueryResult<()> {
    for rule in rules {
        let direction = SortDirection::parse(&rule.direction);
        let (relation, field) = qualify(&rule.key, root);

        if let Some(handler) = handlers.sort(&canonical_key(relation, &field.column)) {
            if let Some(path) = relation {
                ensure_joined(backend, query, joins, root, path, handler.wants_projection())?;
            }
            debug!(key = %rule.key, "dispatching custom sort handler");
            handler
                .apply(query, direction)
                .map_err(|source| QueryError::Handler {
                    field: rule.key.clone(),
                    source,
                })?;
            continue;
        }

        if let Some(path) = relation {
            ensure_joined(backend, query, joins, root, path, true)?;
        }
        backend.add_ordering(query, &field, direction);
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::testutil::{RecQuery, RecordingBackend};

    fn compile(rules: &[SortRule]) -> RecQuery {
        let backend = RecordingBackend::users();
        let handlers = HandlerRegistry::new();
        let mut query = RecQuery::new("users");
        let mut joins = JoinRegistry::new();
        apply_sorts(&backend, &mut query, &handlers, &mut joins, "users", rules).unwrap();
        query
    }

    #[test]
    fn root_field_orders_directly() {
        let query = compile(&[SortRule {
            key: "name".to_string(),
            direction: "ASC".to_string(),
        }]);
        assert_eq!(query.ops, ["order users.name Asc"]);
    }

    #[test]
    fn unrecognized_direction_defaults_ascending() {
        let query = compile(&[SortRule {
            key: "name".to_string(),
            direction: "bogus".to_string(),
        }]);
        assert_eq!(query.ops, ["order users.name Asc"]);
    }

    #[test]
    fn relation_sort_joins_with_projection() {
        let query = compile(&[SortRule {
            key: "company.name".to_string(),
            direction: "desc".to_string(),
        }]);
        assert_eq!(
            query.ops,
            [
                "join companies as company on users",
                "project company",
                "order company.name Desc",
            ]
        );
    }

    #[test]
    fn repeated_relation_sorts_share_one_join() {
        let query = compile(&[
            SortRule {
                key: "company.name".to_string(),
                direction: String::new(),
            },
            SortRule {
                key: "company.size".to_string(),
                direction: "desc".to_string(),
            },
        ]);

        let joins = query.ops.iter().filter(|op| op.starts_with("join")).count();
        let projections = query.ops.iter().filter(|op| op.starts_with("project")).count();
        assert_eq!(joins, 1);
        assert_eq!(projections, 1);
    }

    #[test]
    fn custom_sort_handler_receives_direction() {
        let backend = RecordingBackend::users();
        let mut handlers: HandlerRegistry<RecQuery> = HandlerRegistry::new();
        handlers.register_sort(
            "popularity",
            |query: &mut RecQuery, direction: SortDirection| -> anyhow::Result<()> {
                query.ops.push(format!("custom popularity {direction:?}"));
                Ok(())
            },
        );

        let mut query = RecQuery::new("users");
        let mut joins = JoinRegistry::new();
        apply_sorts(
            &backend,
            &mut query,
            &handlers,
            &mut joins,
            "users",
            &[SortRule {
                key: "popularity".to_string(),
                direction: "DESC".to_string(),
            }],
        )
        .unwrap();

        assert_eq!(query.ops, ["custom popularity Desc"]);
    }
}
