//! PostgreSQL adapter for the `sift` resource-query compiler.
//!
//! Implements [`sift::backend::QueryBackend`] on top of sea-query's
//! expression-tree builder: predicates become `SimpleExpr` trees,
//! groups become `Cond::all()`/`Cond::any()`, joins are `LEFT JOIN ...
//! AS alias`, and every bound value renders as a statement parameter.
//!
//! ```
//! use sift::backend::SchemaMap;
//! use sift::{ResourceCompiler, ResourceOptions};
//! use sift_postgres::{PgQuery, PostgresBackend};
//!
//! let schema = SchemaMap::new()
//!     .belongs_to("users", "company", "companies", "company_id", "id");
//! let compiler = ResourceCompiler::new(PostgresBackend::new(schema));
//!
//! let mut query = PgQuery::from_table("users");
//! let options: ResourceOptions = serde_json::from_str(
//!     r#"{
//!         "filter_groups": [{"filters": [{"key": "company.name", "operator": "ct", "value": "acme"}]}],
//!         "sort": [{"key": "name", "direction": "desc"}],
//!         "limit": 10,
//!         "page": 2
//!     }"#,
//! )?;
//! compiler.apply(&mut query, &options)?;
//! # let _ = query.to_sql();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod backend;
mod query;

pub use backend::{PostgresBackend, escape_like_wildcards};
pub use query::PgQuery;
