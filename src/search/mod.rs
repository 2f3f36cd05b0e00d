// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search queries
//!
//! # Architecture
//!
//! ```text
//! QueryBuilder / and() / or() / not()
//!     ↓
//! PredicateCollection (AST)
//!     ↓
//! QueryTranslator → query string
//!     ↓
//! Query = query string + SearchOptions → FT.SEARCH args
//!     ↓
//! SearchResults::from_reply
//! ```
//!
//! # Query Language
//!
//! ```text
//! @category:{tech}          - Tag equality
//! @tags:{rust | database}   - Tag membership
//! @name:"Alice"             - Exact phrase
//! (@title:Hello*)           - Prefix match
//! (@name:%alice%)           - Fuzzy match (Levenshtein)
//! @age:[25 40]              - Numeric range
//! (q1 q2)                   - Boolean AND
//! (q1 | q2)                 - Boolean OR
//! -q                        - Boolean NOT
//! *=>[KNN 10 @vec $BLOB]    - Vector similarity
//! ```

mod builder;
mod options;
mod predicate;
mod query;
mod results;
mod translator;

pub use builder::{NumericField, QueryBuilder, TagField, TextField};
pub use options::{
    HighlightOptions, NumericFilter, Paging, SearchOptions, SortBy, SortOrder, SummarizeOptions,
};
pub use predicate::{
    and, not, or, BoolOp, Predicate, PredicateCollection, QueryNode, RangeBound, TermValue,
};
pub use query::{Knn, Query, KNN_VECTOR_PARAM};
pub use results::{Document, SearchResults};
pub use translator::QueryTranslator;
