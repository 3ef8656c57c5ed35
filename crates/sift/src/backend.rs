//! Backend collaborator contract.
//!
//! The compiler itself is backend-agnostic; everything engine-specific
//! (how a join, predicate, ordering, or bound parameter is expressed)
//! lives behind [`QueryBackend`], implemented once per relational
//! engine targeted.

use std::collections::HashMap;

use crate::error::QueryResult;
use crate::operator::Comparison;
use crate::types::{FieldRef, FilterValue, SortDirection};

/// How a relation hangs off its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Owner carries the foreign key (`owner.fk = target.key`).
    BelongsTo,
    /// Target carries the foreign key, single row.
    HasOne,
    /// Target carries the foreign key, many rows.
    HasMany,
}

/// Relation metadata consumed from the schema collaborator.
#[derive(Debug, Clone)]
pub struct RelationMeta {
    /// Table the relation joins to.
    pub target_table: String,
    /// Foreign key column.
    pub foreign_key: String,
    /// Key column on the owning side (usually the primary key).
    pub owner_key: String,
    /// Which side carries the foreign key.
    pub kind: RelationKind,
}

/// Generator for parameter names bound during one compilation.
///
/// Names are unique within a single compiled query; a fresh generator is
/// created per compilation, never shared across calls.
#[derive(Debug, Default)]
pub struct ParamGen {
    counter: usize,
}

impl ParamGen {
    /// Issue the next parameter name (`p0`, `p1`, ...).
    pub fn fresh(&mut self) -> String {
        let name = format!("p{}", self.counter);
        self.counter += 1;
        name
    }
}

/// The query-builder collaborator the compiler drives.
pub trait QueryBackend {
    /// Query under construction (mutated in place).
    type Query;
    /// Predicate expression produced by [`QueryBackend::comparison`].
    type Expr;

    /// Primary alias of the query under construction, from the builder's
    /// own state. `None` means compilation cannot proceed.
    fn root_alias(&self, query: &Self::Query) -> Option<String>;

    /// Describe a relation of `owner` by name, if the schema knows it.
    fn relation(&self, owner: &str, name: &str) -> Option<RelationMeta>;

    /// Emit a left join from `owner_alias` to `alias` per the metadata.
    fn add_left_join(
        &self,
        query: &mut Self::Query,
        owner_alias: &str,
        alias: &str,
        meta: &RelationMeta,
    );

    /// Project the joined alias's columns into the result set.
    fn add_projection(&self, query: &mut Self::Query, alias: &str);

    /// Build one predicate expression, binding the (possibly
    /// transformed) value to parameter names drawn from `params`.
    fn comparison(
        &self,
        query: &mut Self::Query,
        field: &FieldRef,
        cmp: Comparison,
        value: &FilterValue,
        params: &mut ParamGen,
    ) -> QueryResult<Self::Expr>;

    /// Attach one boolean group of predicates to the query. `any` means
    /// OR within the group; successive groups must AND together.
    fn add_predicates(&self, query: &mut Self::Query, any: bool, predicates: Vec<Self::Expr>);

    /// Append an ordering clause.
    fn add_ordering(&self, query: &mut Self::Query, field: &FieldRef, direction: SortDirection);

    /// Cap the row count.
    fn set_limit(&self, query: &mut Self::Query, limit: u64);

    /// Skip leading rows.
    fn set_offset(&self, query: &mut Self::Query, offset: u64);
}

/// In-memory relation metadata registry.
///
/// Schema discovery stays external; callers describe their relations up
/// front and the compiler only ever reads them back.
#[derive(Debug, Clone, Default)]
pub struct SchemaMap {
    relations: HashMap<(String, String), RelationMeta>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a relation of `owner` by name.
    pub fn relation(&self, owner: &str, name: &str) -> Option<&RelationMeta> {
        self.relations
            .get(&(owner.to_string(), name.to_string()))
    }

    /// Declare a belongs-to relation: `owner.foreign_key = target.owner_key`.
    pub fn belongs_to(
        self,
        owner: &str,
        name: &str,
        target_table: &str,
        foreign_key: &str,
        owner_key: &str,
    ) -> Self {
        self.insert(owner, name, target_table, foreign_key, owner_key, RelationKind::BelongsTo)
    }

    /// Declare a has-one relation: `owner.owner_key = target.foreign_key`.
    pub fn has_one(
        self,
        owner: &str,
        name: &str,
        target_table: &str,
        foreign_key: &str,
        owner_key: &str,
    ) -> Self {
        self.insert(owner, name, target_table, foreign_key, owner_key, RelationKind::HasOne)
    }

    /// Declare a has-many relation: `owner.owner_key = target.foreign_key`.
    pub fn has_many(
        self,
        owner: &str,
        name: &str,
        target_table: &str,
        foreign_key: &str,
        owner_key: &str,
    ) -> Self {
        self.insert(owner, name, target_table, foreign_key, owner_key, RelationKind::HasMany)
    }

    fn insert(
        mut self,
        owner: &str,
        name: &str,
        target_table: &str,
        foreign_key: &str,
        owner_key: &str,
        kind: RelationKind,
    ) -> Self {
        self.relations.insert(
            (owner.to_string(), name.to_string()),
            RelationMeta {
                target_table: target_table.to_string(),
                foreign_key: foreign_key.to_string(),
                owner_key: owner_key.to_string(),
                kind,
            },
        );
        self
    }
}
