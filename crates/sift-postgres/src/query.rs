//! SELECT statement wrapper carrying compilation state.

use sea_query::{Alias, Asterisk, PostgresQueryBuilder, Query, SelectStatement, Value};

/// A SELECT statement under construction, plus the state the resource
/// compiler reads back from it: the root alias and the parameter
/// bindings generated so far.
#[derive(Debug, Clone)]
pub struct PgQuery {
    pub(crate) select: SelectStatement,
    pub(crate) root: Option<String>,
    pub(crate) bindings: Vec<(String, Value)>,
}

impl PgQuery {
    /// Start a `SELECT table.* FROM table` query rooted at `table`.
    pub fn from_table(table: &str) -> Self {
        let mut select = Query::select();
        select
            .column((Alias::new(table), Asterisk))
            .from(Alias::new(table));
        Self {
            select,
            root: Some(table.to_string()),
            bindings: Vec::new(),
        }
    }

    /// Wrap a pre-built statement, naming its root alias.
    pub fn from_select(select: SelectStatement, root: impl Into<String>) -> Self {
        Self {
            select,
            root: Some(root.into()),
            bindings: Vec::new(),
        }
    }

    /// Wrap a statement with no identifiable root entity. Compiling
    /// resource options against it fails with `NoRootAlias`.
    pub fn bare(select: SelectStatement) -> Self {
        Self {
            select,
            root: None,
            bindings: Vec::new(),
        }
    }

    /// The primary alias this query is built against, if any.
    pub fn root_alias(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// The statement under construction.
    pub fn select(&self) -> &SelectStatement {
        &self.select
    }

    /// Mutable access for custom handlers that attach their own
    /// predicates or orderings.
    pub fn select_mut(&mut self) -> &mut SelectStatement {
        &mut self.select
    }

    /// Unwrap the finished statement for execution downstream.
    pub fn into_select(self) -> SelectStatement {
        self.select
    }

    /// Parameter bindings generated during compilation, in order. Names
    /// are unique within one compiled query.
    pub fn bindings(&self) -> &[(String, Value)] {
        &self.bindings
    }

    /// Render the statement as PostgreSQL SQL.
    pub fn to_sql(&self) -> String {
        self.select.to_string(PostgresQueryBuilder)
    }

    pub(crate) fn bind(&mut self, name: String, value: Value) {
        self.bindings.push((name, value));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn from_table_selects_everything() {
        let query = PgQuery::from_table("users");
        assert_eq!(query.root_alias(), Some("users"));

        let sql = query.to_sql();
        assert!(sql.contains(r#"SELECT "users".*"#), "{sql}");
        assert!(sql.contains(r#"FROM "users""#), "{sql}");
    }

    #[test]
    fn bare_query_has_no_root() {
        let query = PgQuery::bare(Query::select());
        assert!(query.root_alias().is_none());
    }

    #[test]
    fn bindings_accumulate_in_order() {
        let mut query = PgQuery::from_table("users");
        query.bind("p0".to_string(), "a".into());
        query.bind("p1".to_string(), 7i64.into());
        let names: Vec<_> = query.bindings().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["p0", "p1"]);
    }
}
