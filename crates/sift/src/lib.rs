//! sift: a declarative resource-query compiler.
//!
//! Takes a client-supplied [`ResourceOptions`] descriptor (which
//! relations to include, which filter predicates to apply with boolean
//! grouping, how to sort, how to paginate) and deterministically
//! compiles it into an executable query against a relational backend.
//! API endpoints get a uniform, injection-safe querying surface without
//! hand-written query-building code per endpoint.
//!
//! The compiler is backend-agnostic: everything engine-specific lives
//! behind the [`backend::QueryBackend`] trait, implemented once per
//! relational engine (see the `sift-postgres` crate for the sea-query
//! PostgreSQL adapter). Query execution, schema discovery, and HTTP
//! concerns stay outside this crate.

pub mod backend;
pub mod compile;
pub mod error;
pub mod handlers;
pub mod join;
pub mod operator;
pub mod types;

mod filter;
mod sort;

#[cfg(test)]
pub(crate) mod testutil;

pub use compile::ResourceCompiler;
pub use error::{QueryError, QueryResult};
pub use types::{Filter, FilterGroup, FilterValue, ResourceOptions, SortRule};
