// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Builder - scoped construction of predicate trees
//!
//! The builder keeps a stack of open groups. The root is an AND group that
//! is never popped; [`QueryBuilder::and`] / [`QueryBuilder::or`] open a
//! nested group, run the block against the same builder, then attach the
//! finished group to its parent.
//!
//! # Example
//!
//! ```rust
//! use search_index_client::search::{QueryBuilder, QueryTranslator};
//!
//! let mut builder = QueryBuilder::new();
//! builder.tag("category").eq("tech");
//! builder.or(|b| {
//!     b.text("title").prefix("Hello");
//!     b.numeric("price").between(10.0, 20.0);
//! });
//!
//! let root = builder.finish();
//! assert_eq!(
//!     QueryTranslator::render_group(&root),
//!     "(@category:{tech} ((@title:Hello*) | @price:[10 20]))"
//! );
//! ```
//!
//! # Stack balance
//!
//! A nested block may fail (`try_and` / `try_or`) or panic. Either way the
//! stack is truncated back to the depth it had on entry and the parent group
//! is left exactly as it was before the block started.

use std::convert::Infallible;

use super::predicate::{BoolOp, Predicate, PredicateCollection, QueryNode, RangeBound};
use super::translator::QueryTranslator;

/// Mutable predicate-tree builder
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    root: PredicateCollection,
    open: Vec<PredicateCollection>,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            root: PredicateCollection::and(),
            open: Vec::new(),
        }
    }

    /// Number of groups on the stack, root included.
    pub fn depth(&self) -> usize {
        self.open.len() + 1
    }

    /// The group predicates are currently added to.
    pub fn current(&self) -> &PredicateCollection {
        self.open.last().unwrap_or(&self.root)
    }

    fn current_mut(&mut self) -> &mut PredicateCollection {
        self.open.last_mut().unwrap_or(&mut self.root)
    }

    /// Append a predicate to the current group.
    pub fn add_predicate(&mut self, predicate: Predicate) -> &mut Self {
        self.current_mut().push(predicate);
        self
    }

    /// Attach a prebuilt tree (e.g. from [`and`](super::and)) to the
    /// current group.
    pub fn node(&mut self, node: impl Into<QueryNode>) -> &mut Self {
        self.current_mut().push(node);
        self
    }

    /// Nested AND group.
    pub fn and<F>(&mut self, block: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder),
    {
        self.infallible_group(BoolOp::And, block)
    }

    /// Nested OR group.
    pub fn or<F>(&mut self, block: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder),
    {
        self.infallible_group(BoolOp::Or, block)
    }

    /// Nested AND group whose block may fail. On error nothing is attached.
    pub fn try_and<F, E>(&mut self, block: F) -> Result<&mut Self, E>
    where
        F: FnOnce(&mut QueryBuilder) -> Result<(), E>,
    {
        self.group(BoolOp::And, block)
    }

    /// Nested OR group whose block may fail. On error nothing is attached.
    pub fn try_or<F, E>(&mut self, block: F) -> Result<&mut Self, E>
    where
        F: FnOnce(&mut QueryBuilder) -> Result<(), E>,
    {
        self.group(BoolOp::Or, block)
    }

    fn infallible_group<F>(&mut self, op: BoolOp, block: F) -> &mut Self
    where
        F: FnOnce(&mut QueryBuilder),
    {
        let result: Result<&mut Self, Infallible> = self.group(op, |b| {
            block(b);
            Ok(())
        });
        match result {
            Ok(builder) => builder,
            Err(never) => match never {},
        }
    }

    fn group<F, E>(&mut self, op: BoolOp, block: F) -> Result<&mut Self, E>
    where
        F: FnOnce(&mut QueryBuilder) -> Result<(), E>,
    {
        let mut scope = GroupScope::open(self, op);
        block(&mut *scope.builder)?;
        scope.close();
        Ok(self)
    }

    /// Text field helpers.
    pub fn text(&mut self, field: impl Into<String>) -> TextField<'_> {
        TextField {
            builder: self,
            field: field.into(),
        }
    }

    /// Tag field helpers.
    pub fn tag(&mut self, field: impl Into<String>) -> TagField<'_> {
        TagField {
            builder: self,
            field: field.into(),
        }
    }

    /// Numeric field helpers.
    pub fn numeric(&mut self, field: impl Into<String>) -> NumericField<'_> {
        NumericField {
            builder: self,
            field: field.into(),
        }
    }

    /// Consume the builder and return the root group.
    pub fn finish(self) -> PredicateCollection {
        self.root
    }
}

/// Open nested group. Dropping the scope without closing it truncates the
/// stack back to its entry depth, which covers `?` early returns and
/// unwinding panics alike.
struct GroupScope<'a> {
    builder: &'a mut QueryBuilder,
    depth: usize,
}

impl<'a> GroupScope<'a> {
    fn open(builder: &'a mut QueryBuilder, op: BoolOp) -> Self {
        let depth = builder.open.len();
        builder.open.push(PredicateCollection::new(op));
        Self { builder, depth }
    }

    /// Pop this scope's group and attach it to the parent. Empty groups
    /// are dropped.
    fn close(mut self) {
        self.builder.open.truncate(self.depth + 1);
        if let Some(group) = self.builder.open.pop() {
            if !group.is_empty() {
                self.builder.current_mut().push(group);
            }
        }
    }
}

impl Drop for GroupScope<'_> {
    fn drop(&mut self) {
        self.builder.open.truncate(self.depth);
    }
}

/// Leaf helpers for a text field
pub struct TextField<'a> {
    builder: &'a mut QueryBuilder,
    field: String,
}

impl<'a> TextField<'a> {
    /// Exact phrase: `@field:"value"`
    pub fn eq(self, value: impl Into<String>) -> &'a mut QueryBuilder {
        self.builder.add_predicate(Predicate::text_eq(self.field, value))
    }

    /// Raw pattern, passed through verbatim: `(@field:pattern)`
    pub fn matches(self, pattern: impl Into<String>) -> &'a mut QueryBuilder {
        self.builder.add_predicate(Predicate::matches(self.field, pattern))
    }

    /// Prefix match: `(@field:value*)`. The value is escaped.
    pub fn prefix(self, value: &str) -> &'a mut QueryBuilder {
        let pattern = format!("{}*", QueryTranslator::escape_term(value));
        self.builder.add_predicate(Predicate::matches(self.field, pattern))
    }

    /// Levenshtein-distance-1 match: `(@field:%value%)`. The value is escaped.
    pub fn fuzzy(self, value: &str) -> &'a mut QueryBuilder {
        let pattern = format!("%{}%", QueryTranslator::escape_term(value));
        self.builder.add_predicate(Predicate::matches(self.field, pattern))
    }
}

/// Leaf helpers for a tag field
pub struct TagField<'a> {
    builder: &'a mut QueryBuilder,
    field: String,
}

impl<'a> TagField<'a> {
    pub fn eq(self, value: impl Into<String>) -> &'a mut QueryBuilder {
        self.builder.add_predicate(Predicate::tag(self.field, value))
    }

    pub fn any_of<I, S>(self, values: I) -> &'a mut QueryBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builder.add_predicate(Predicate::tags(self.field, values))
    }
}

/// Leaf helpers for a numeric field
pub struct NumericField<'a> {
    builder: &'a mut QueryBuilder,
    field: String,
}

impl<'a> NumericField<'a> {
    pub fn eq(self, value: f64) -> &'a mut QueryBuilder {
        self.builder
            .add_predicate(Predicate::numeric_eq(self.field, value))
    }

    pub fn between(self, min: f64, max: f64) -> &'a mut QueryBuilder {
        self.builder
            .add_predicate(Predicate::between(self.field, min, max))
    }

    pub fn gt(self, value: f64) -> &'a mut QueryBuilder {
        self.range(RangeBound::Exclusive(value), RangeBound::Unbounded)
    }

    pub fn gte(self, value: f64) -> &'a mut QueryBuilder {
        self.range(RangeBound::Inclusive(value), RangeBound::Unbounded)
    }

    pub fn lt(self, value: f64) -> &'a mut QueryBuilder {
        self.range(RangeBound::Unbounded, RangeBound::Exclusive(value))
    }

    pub fn lte(self, value: f64) -> &'a mut QueryBuilder {
        self.range(RangeBound::Unbounded, RangeBound::Inclusive(value))
    }

    fn range(self, min: RangeBound, max: RangeBound) -> &'a mut QueryBuilder {
        self.builder
            .add_predicate(Predicate::range(self.field, min, max))
    }
}
