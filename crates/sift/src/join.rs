//! Join deduplication.
//!
//! A relation path is joined at most once per compiled query, no matter
//! how many includes, filters, or sorts reference it. The registry is
//! compilation-scoped: constructed at the start of a compilation, passed
//! through the call, and dropped when it returns, so join state can
//! never leak across requests.

use std::collections::HashMap;

use crate::backend::QueryBackend;
use crate::error::{QueryError, QueryResult};

/// Set of relation paths already joined for one query, in insertion
/// order of first request (includes before filters before sorts).
#[derive(Debug, Default)]
pub struct JoinRegistry {
    joined: Vec<String>,
    projected: Vec<String>,
}

impl JoinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this exact dot path has already been joined.
    pub fn is_joined(&self, path: &str) -> bool {
        self.joined.iter().any(|p| p == path)
    }

    /// Joined paths in first-request order.
    pub fn joined_paths(&self) -> &[String] {
        &self.joined
    }
}

/// Join every not-yet-joined segment of `path`, left-joining via the
/// backend's relation metadata. With `with_select`, the final alias's
/// columns are projected, at most once per query.
///
/// Idempotent: re-invoking with an already-joined path adds nothing and
/// returns `false`.
pub fn ensure_joined<B: QueryBackend>(
    backend: &B,
    query: &mut B::Query,
    registry: &mut JoinRegistry,
    root: &str,
    path: &str,
    with_select: bool,
) -> QueryResult<bool> {
    let mut added = false;
    let mut owner_model = root.to_string();
    let mut owner_alias = root.to_string();
    let mut walked = String::with_capacity(path.len());

    for segment in path.split('.') {
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(segment);

        let meta = backend.relation(&owner_model, segment).ok_or_else(|| {
            QueryError::UnresolvableRelation {
                owner: owner_model.clone(),
                relation: segment.to_string(),
            }
        })?;

        if !registry.is_joined(&walked) {
            backend.add_left_join(query, &owner_alias, segment, &meta);
            registry.joined.push(walked.clone());
            added = true;
        }

        owner_model = meta.target_table;
        owner_alias = segment.to_string();
    }

    if with_select && !registry.projected.iter().any(|a| a == &owner_alias) {
        backend.add_projection(query, &owner_alias);
        registry.projected.push(owner_alias);
    }

    Ok(added)
}

/// Walk a relation path against the schema without touching the query.
/// Used to validate a whole descriptor before any mutation.
pub(crate) fn resolve_path<B: QueryBackend>(
    backend: &B,
    root: &str,
    path: &str,
) -> QueryResult<()> {
    let mut owner = root.to_string();
    for segment in path.split('.') {
        let meta = backend.relation(&owner, segment).ok_or_else(|| {
            QueryError::UnresolvableRelation {
                owner: owner.clone(),
                relation: segment.to_string(),
            }
        })?;
        owner = meta.target_table;
    }
    Ok(())
}

/// Reject descriptors whose relation paths would join under colliding
/// aliases.
///
/// An alias is the final segment of its dot path, so two distinct paths
/// ending in the same relation name (or a relation named like the root
/// alias) would emit two joins under one alias. Checked over every
/// relation path a descriptor references, before any mutation.
pub(crate) fn check_alias_collisions<'a, I>(root: &str, paths: I) -> QueryResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut by_alias: HashMap<&'a str, String> = HashMap::new();
    for path in paths {
        let mut walked = String::with_capacity(path.len());
        for segment in path.split('.') {
            if !walked.is_empty() {
                walked.push('.');
            }
            walked.push_str(segment);

            if segment == root {
                return Err(QueryError::AmbiguousRelationAlias {
                    alias: segment.to_string(),
                    first: root.to_string(),
                    second: walked,
                });
            }
            if let Some(existing) = by_alias.get(segment) {
                if existing != &walked {
                    return Err(QueryError::AmbiguousRelationAlias {
                        alias: segment.to_string(),
                        first: existing.clone(),
                        second: walked,
                    });
                }
            } else {
                by_alias.insert(segment, walked.clone());
            }
        }
    }
    Ok(())
}
