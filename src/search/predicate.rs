// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Predicate tree - AST for search query strings
//!
//! Leaves are single-field predicates; inner nodes are AND/OR groups and
//! negations. Trees are plain values: build them with [`and`], [`or`] and
//! [`not`], or let a [`QueryBuilder`](super::QueryBuilder) assemble one.
//!
//! # Example
//!
//! ```rust
//! use search_index_client::search::{and, or, Predicate, QueryNode, QueryTranslator};
//!
//! let tree = and([
//!     QueryNode::from(Predicate::tag("category", "tech")),
//!     or([
//!         Predicate::matches("title", "Hello*"),
//!         Predicate::between("price", 10.0, 20.0),
//!     ]),
//! ]);
//!
//! assert_eq!(
//!     QueryTranslator::render(&tree),
//!     "(@category:{tech} ((@title:Hello*) | @price:[10 20]))"
//! );
//! ```

use serde::Serialize;

/// Boolean operator of a predicate group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BoolOp {
    /// All children must match: `(a b)`
    And,
    /// Any child may match: `(a | b)`
    Or,
}

impl BoolOp {
    pub fn separator(self) -> &'static str {
        match self {
            BoolOp::And => " ",
            BoolOp::Or => " | ",
        }
    }
}

/// Value compared by an equality predicate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TermValue {
    /// Exact phrase on a text field
    Text(String),
    /// Tag membership (any of the values)
    Tags(Vec<String>),
    /// Numeric equality
    Number(f64),
}

/// One end of a numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RangeBound {
    /// `-inf` / `+inf`
    Unbounded,
    Inclusive(f64),
    /// Rendered with a leading `(`
    Exclusive(f64),
}

impl From<f64> for RangeBound {
    fn from(v: f64) -> Self {
        RangeBound::Inclusive(v)
    }
}

impl From<Option<f64>> for RangeBound {
    fn from(v: Option<f64>) -> Self {
        v.map_or(RangeBound::Unbounded, RangeBound::Inclusive)
    }
}

/// A single-field condition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Predicate {
    /// `@field:{tag}`, `@field:"phrase"` or `@field:[n n]`
    Equality { field: String, value: TermValue },
    /// `(@field:pattern)`; the pattern is passed through verbatim
    Match { field: String, pattern: String },
    /// `@field:[min max]`
    Range {
        field: String,
        min: RangeBound,
        max: RangeBound,
    },
}

impl Predicate {
    pub fn field(&self) -> &str {
        match self {
            Predicate::Equality { field, .. }
            | Predicate::Match { field, .. }
            | Predicate::Range { field, .. } => field,
        }
    }

    /// Tag equality: `@field:{value}`
    pub fn tag(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Equality {
            field: field.into(),
            value: TermValue::Tags(vec![value.into()]),
        }
    }

    /// Tag membership: `@field:{a | b}`
    pub fn tags<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::Equality {
            field: field.into(),
            value: TermValue::Tags(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Exact phrase: `@field:"value"`
    pub fn text_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::Equality {
            field: field.into(),
            value: TermValue::Text(value.into()),
        }
    }

    /// Numeric equality: `@field:[n n]`
    pub fn numeric_eq(field: impl Into<String>, value: f64) -> Self {
        Predicate::Equality {
            field: field.into(),
            value: TermValue::Number(value),
        }
    }

    /// Raw text match: `(@field:pattern)`
    pub fn matches(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Predicate::Match {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Inclusive numeric range
    pub fn between(field: impl Into<String>, min: f64, max: f64) -> Self {
        Self::range(field, RangeBound::Inclusive(min), RangeBound::Inclusive(max))
    }

    pub fn range(field: impl Into<String>, min: RangeBound, max: RangeBound) -> Self {
        Predicate::Range {
            field: field.into(),
            min,
            max,
        }
    }
}

/// An AND/OR group of predicates and nested groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredicateCollection {
    op: BoolOp,
    children: Vec<QueryNode>,
}

impl PredicateCollection {
    pub fn new(op: BoolOp) -> Self {
        Self {
            op,
            children: Vec::new(),
        }
    }

    pub fn and() -> Self {
        Self::new(BoolOp::And)
    }

    pub fn or() -> Self {
        Self::new(BoolOp::Or)
    }

    pub fn op(&self) -> BoolOp {
        self.op
    }

    pub fn children(&self) -> &[QueryNode] {
        &self.children
    }

    pub fn push(&mut self, node: impl Into<QueryNode>) {
        self.children.push(node.into());
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Query AST node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QueryNode {
    Predicate(Predicate),
    Group(PredicateCollection),
    /// Boolean NOT: `-node`
    Not(Box<QueryNode>),
}

impl From<Predicate> for QueryNode {
    fn from(p: Predicate) -> Self {
        QueryNode::Predicate(p)
    }
}

impl From<PredicateCollection> for QueryNode {
    fn from(group: PredicateCollection) -> Self {
        QueryNode::Group(group)
    }
}

/// AND group of `nodes`
pub fn and<I>(nodes: I) -> QueryNode
where
    I: IntoIterator,
    I::Item: Into<QueryNode>,
{
    group(BoolOp::And, nodes)
}

/// OR group of `nodes`
pub fn or<I>(nodes: I) -> QueryNode
where
    I: IntoIterator,
    I::Item: Into<QueryNode>,
{
    group(BoolOp::Or, nodes)
}

/// Negation of `node`
pub fn not(node: impl Into<QueryNode>) -> QueryNode {
    QueryNode::Not(Box::new(node.into()))
}

fn group<I>(op: BoolOp, nodes: I) -> QueryNode
where
    I: IntoIterator,
    I::Item: Into<QueryNode>,
{
    QueryNode::Group(PredicateCollection {
        op,
        children: nodes.into_iter().map(Into::into).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_predicate() {
        let p = Predicate::tags("tags", ["rust", "database"]);
        assert_eq!(
            p,
            Predicate::Equality {
                field: "tags".to_string(),
                value: TermValue::Tags(vec!["rust".to_string(), "database".to_string()]),
            }
        );
        assert_eq!(p.field(), "tags");
    }

    #[test]
    fn test_and_group() {
        let node = and([
            Predicate::text_eq("name", "Alice"),
            Predicate::between("age", 25.0, 40.0),
        ]);

        match node {
            QueryNode::Group(group) => {
                assert_eq!(group.op(), BoolOp::And);
                assert_eq!(group.len(), 2);
            }
            _ => panic!("Expected Group node"),
        }
    }

    #[test]
    fn test_or_of_ands() {
        let alice = and([
            Predicate::text_eq("name", "Alice"),
            Predicate::between("age", 25.0, 40.0),
        ]);
        let bob = and([
            Predicate::text_eq("name", "Bob"),
            Predicate::between("age", 30.0, 50.0),
        ]);

        match or([alice, bob]) {
            QueryNode::Group(group) => {
                assert_eq!(group.op(), BoolOp::Or);
                for child in group.children() {
                    match child {
                        QueryNode::Group(inner) => assert_eq!(inner.len(), 2),
                        _ => panic!("Expected Group node"),
                    }
                }
            }
            _ => panic!("Expected Group node"),
        }
    }

    #[test]
    fn test_not() {
        match not(Predicate::tag("deleted", "true")) {
            QueryNode::Not(inner) => assert!(matches!(*inner, QueryNode::Predicate(_))),
            _ => panic!("Expected Not node"),
        }
    }

    #[test]
    fn test_range_bound_from_option() {
        assert_eq!(RangeBound::from(None), RangeBound::Unbounded);
        assert_eq!(RangeBound::from(Some(3.0)), RangeBound::Inclusive(3.0));
    }
}
