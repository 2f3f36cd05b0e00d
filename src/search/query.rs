// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search query: predicate root, literal fallback and options.
//!
//! # Example
//!
//! ```rust
//! use search_index_client::search::Query;
//!
//! let args = Query::literal("Hello").with_scores().paging(0, 1).to_args();
//! assert_eq!(args, ["Hello", "WITHSCORES", "LIMIT", "0", "1"]);
//!
//! let query = Query::build(|b| {
//!     b.tag("category").eq("tech");
//!     b.numeric("price").lt(100.0);
//! });
//! assert_eq!(query.query_string(), "(@category:{tech} @price:[-inf (100])");
//! ```

use serde::Serialize;

use super::builder::QueryBuilder;
use super::options::{
    HighlightOptions, Paging, SearchOptions, SortBy, SortOrder, SummarizeOptions,
};
use super::predicate::{BoolOp, PredicateCollection, QueryNode, RangeBound};
use super::translator::QueryTranslator;
use crate::channel::{f32_blob, Arg};

/// Name of the query parameter carrying the KNN vector
pub const KNN_VECTOR_PARAM: &str = "BLOB";

/// Lowest query dialect that understands `=>[KNN ...]`
const KNN_DIALECT: u32 = 2;

/// K-nearest-neighbour clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Knn {
    pub field: String,
    pub k: usize,
    pub vector: Vec<f32>,
}

/// A complete FT.SEARCH request minus the index name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    root: PredicateCollection,
    base: Option<String>,
    options: SearchOptions,
    knn: Option<Knn>,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    /// Match-all query (`*`) with no options.
    pub fn new() -> Self {
        Self {
            root: PredicateCollection::and(),
            base: None,
            options: SearchOptions::default(),
            knn: None,
        }
    }

    /// Raw query string, used as-is while no predicates are added.
    pub fn literal(query: impl Into<String>) -> Self {
        Self {
            base: Some(query.into()),
            ..Self::new()
        }
    }

    /// Query rooted at a prebuilt tree. An AND group becomes the root
    /// itself; anything else is wrapped in one.
    pub fn from_node(node: impl Into<QueryNode>) -> Self {
        let root = match node.into() {
            QueryNode::Group(group) if group.op() == BoolOp::And => group,
            other => {
                let mut root = PredicateCollection::and();
                root.push(other);
                root
            }
        };
        Self {
            root,
            ..Self::new()
        }
    }

    pub fn from_builder(builder: QueryBuilder) -> Self {
        Self {
            root: builder.finish(),
            ..Self::new()
        }
    }

    /// Build the predicate tree with a block.
    pub fn build<F>(block: F) -> Self
    where
        F: FnOnce(&mut QueryBuilder),
    {
        let mut builder = QueryBuilder::new();
        block(&mut builder);
        Self::from_builder(builder)
    }

    /// Build the predicate tree with a block that may fail.
    pub fn try_build<F, E>(block: F) -> Result<Self, E>
    where
        F: FnOnce(&mut QueryBuilder) -> Result<(), E>,
    {
        let mut builder = QueryBuilder::new();
        block(&mut builder)?;
        Ok(Self::from_builder(builder))
    }

    pub fn root(&self) -> &PredicateCollection {
        &self.root
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn knn_clause(&self) -> Option<&Knn> {
        self.knn.as_ref()
    }

    pub fn no_content(mut self) -> Self {
        self.options.no_content = true;
        self
    }

    pub fn verbatim(mut self) -> Self {
        self.options.verbatim = true;
        self
    }

    pub fn no_stopwords(mut self) -> Self {
        self.options.no_stopwords = true;
        self
    }

    pub fn with_scores(mut self) -> Self {
        self.options.with_scores = true;
        self
    }

    pub fn with_payloads(mut self) -> Self {
        self.options.with_payloads = true;
        self
    }

    pub fn filter(
        mut self,
        field: impl Into<String>,
        min: impl Into<RangeBound>,
        max: impl Into<RangeBound>,
    ) -> Self {
        self.options.filter(field, min, max);
        self
    }

    pub fn return_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.return_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn summarize(mut self, summarize: SummarizeOptions) -> Self {
        self.options.summarize = Some(summarize);
        self
    }

    pub fn highlight(mut self, highlight: HighlightOptions) -> Self {
        self.options.highlight = Some(highlight);
        self
    }

    pub fn slop(mut self, slop: u32) -> Self {
        self.options.slop = Some(slop);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.options.language = Some(language.into());
        self
    }

    pub fn in_order(mut self) -> Self {
        self.options.in_order = true;
        self
    }

    /// Replaces any previous sort.
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.options.sort_by = Some(SortBy {
            field: field.into(),
            order,
        });
        self
    }

    /// Replaces any previous page.
    pub fn paging(mut self, offset: usize, num: usize) -> Self {
        self.options.limit = Some(Paging { offset, num });
        self
    }

    pub fn scorer(mut self, scorer: impl Into<String>) -> Self {
        self.options.scorer = Some(scorer.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.options.param(name, value);
        self
    }

    pub fn dialect(mut self, dialect: u32) -> Self {
        self.options.dialect = Some(dialect);
        self
    }

    /// Rank the matches of this query by distance to `vector` on a vector
    /// field and keep the `k` nearest.
    pub fn knn(mut self, field: impl Into<String>, k: usize, vector: Vec<f32>) -> Self {
        self.knn = Some(Knn {
            field: field.into(),
            k,
            vector,
        });
        self
    }

    /// The query string: rendered predicates, else the literal, else `*`.
    pub fn query_string(&self) -> String {
        let base = if self.root.is_empty() {
            self.base.clone().unwrap_or_else(|| "*".to_string())
        } else {
            QueryTranslator::render_group(&self.root)
        };

        match &self.knn {
            Some(knn) => {
                let filter = if base == "*" { base } else { format!("({})", base) };
                format!("{}=>[KNN {} @{} ${}]", filter, knn.k, knn.field, KNN_VECTOR_PARAM)
            }
            None => base,
        }
    }

    /// Options as they go on the wire. A KNN clause adds the vector
    /// parameter and raises the dialect to at least 2.
    pub fn effective_options(&self) -> SearchOptions {
        let mut options = self.options.clone();
        if let Some(knn) = &self.knn {
            options.param(KNN_VECTOR_PARAM, f32_blob(&knn.vector));
            options.dialect = Some(options.dialect.map_or(KNN_DIALECT, |d| d.max(KNN_DIALECT)));
        }
        options
    }

    /// `[query_string, options...]`
    pub fn to_args(&self) -> Vec<Arg> {
        let mut args: Vec<Arg> = vec![self.query_string().into()];
        args.extend(self.effective_options().to_args());
        args
    }
}

impl From<QueryBuilder> for Query {
    fn from(builder: QueryBuilder) -> Self {
        Self::from_builder(builder)
    }
}

impl From<&str> for Query {
    fn from(literal: &str) -> Self {
        Self::literal(literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::predicate::{and, or, Predicate};

    #[test]
    fn test_wildcard_when_empty() {
        assert_eq!(Query::new().query_string(), "*");
        assert_eq!(Query::new().to_args(), ["*"]);
    }

    #[test]
    fn test_literal_used_while_no_predicates() {
        assert_eq!(Query::literal("hello world").query_string(), "hello world");
    }

    #[test]
    fn test_predicates_take_precedence_over_literal() {
        let mut query = Query::build(|b| {
            b.tag("a").eq("x");
        });
        query.base = Some("ignored".into());
        assert_eq!(query.query_string(), "(@a:{x})");
    }

    #[test]
    fn test_scores_and_paging() {
        let args = Query::literal("Hello").with_scores().paging(0, 1).to_args();
        assert_eq!(args, ["Hello", "WITHSCORES", "LIMIT", "0", "1"]);
    }

    #[test]
    fn test_with_scores_precedes_filter_and_return() {
        let args = Query::literal("Hello")
            .paging(5, 10)
            .return_fields(["title"])
            .filter("price", 1.0, 2.0)
            .with_scores()
            .to_args();
        assert_eq!(
            args,
            [
                "Hello", "WITHSCORES", "FILTER", "price", "1", "2", "RETURN", "1", "title",
                "LIMIT", "5", "10",
            ]
        );
    }

    #[test]
    fn test_sort_and_paging_replace() {
        let query = Query::new()
            .sort_by("a", SortOrder::Asc)
            .sort_by("b", SortOrder::Desc)
            .paging(0, 10)
            .paging(10, 10);
        assert_eq!(query.to_args(), ["*", "SORTBY", "b", "DESC", "LIMIT", "10", "10"]);
    }

    #[test]
    fn test_from_node_and_group_is_root() {
        let query = Query::from_node(and([
            Predicate::tag("a", "x"),
            Predicate::tag("b", "y"),
        ]));
        assert_eq!(query.query_string(), "(@a:{x} @b:{y})");

        let query = Query::from_node(or([Predicate::tag("a", "x"), Predicate::tag("b", "y")]));
        assert_eq!(query.query_string(), "((@a:{x} | @b:{y}))");
    }

    #[test]
    fn test_try_build_propagates_error() {
        let result = Query::try_build(|b| {
            b.tag("a").eq("x");
            Err::<(), _>("nope")
        });
        assert_eq!(result.unwrap_err(), "nope");
    }

    #[test]
    fn test_knn_on_wildcard() {
        let query = Query::new().knn("embedding", 5, vec![1.0, 2.0]);
        let args = query.to_args();
        assert_eq!(args[0], "*=>[KNN 5 @embedding $BLOB]");
        assert_eq!(args[1..4], ["PARAMS", "2", "BLOB"]);
        assert_eq!(args[4].as_bytes(), f32_blob(&[1.0, 2.0]).as_slice());
        assert_eq!(args[5..], ["DIALECT", "2"]);
    }

    #[test]
    fn test_knn_wraps_filter_and_keeps_higher_dialect() {
        let query = Query::build(|b| {
            b.tag("genre").eq("scifi");
        })
        .dialect(3)
        .knn("v", 10, vec![0.5]);
        assert_eq!(query.query_string(), "((@genre:{scifi}))=>[KNN 10 @v $BLOB]");
        assert_eq!(query.effective_options().dialect, Some(3));
        assert!(query.options().params.is_empty());
    }
}
