//! FT.SEARCH options and their argument serialization.
//!
//! Everything after the query string comes from [`SearchOptions::to_args`],
//! in one fixed order:
//!
//! ```text
//! NOCONTENT VERBATIM NOSTOPWORDS WITHSCORES WITHPAYLOADS
//! FILTER f min max ...
//! RETURN n f ...
//! SUMMARIZE [FIELDS n f ...] FRAGS k LEN l SEPARATOR s
//! HIGHLIGHT [FIELDS n f ...] TAGS open close
//! SLOP n  LANGUAGE l  INORDER  SORTBY f ASC|DESC  LIMIT offset num
//! SCORER name  PARAMS 2n k v ...  DIALECT d
//! ```

use serde::Serialize;
use std::fmt;

use super::predicate::RangeBound;
use super::translator::QueryTranslator;
use crate::channel::Arg;

/// Numeric FILTER clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericFilter {
    pub field: String,
    pub min: RangeBound,
    pub max: RangeBound,
}

/// SUMMARIZE clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizeOptions {
    /// Empty = all returned fields
    pub fields: Vec<String>,
    pub frags: u32,
    pub len: u32,
    pub separator: String,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            frags: 3,
            len: 20,
            separator: "...".to_string(),
        }
    }
}

impl SummarizeOptions {
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn frags(mut self, frags: u32) -> Self {
        self.frags = frags;
        self
    }

    pub fn len(mut self, len: u32) -> Self {
        self.len = len;
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

/// HIGHLIGHT clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightOptions {
    /// Empty = all returned fields
    pub fields: Vec<String>,
    pub open: String,
    pub close: String,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            open: "<b>".to_string(),
            close: "</b>".to_string(),
        }
    }
}

impl HighlightOptions {
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn tags(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.open = open.into();
        self.close = close.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortBy {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paging {
    pub offset: usize,
    pub num: usize,
}

/// Every option FT.SEARCH accepts after the query string.
///
/// At most one sort and one page are active; setting either again replaces
/// the previous value. Filters and params accumulate in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchOptions {
    pub no_content: bool,
    pub verbatim: bool,
    pub no_stopwords: bool,
    pub with_scores: bool,
    pub with_payloads: bool,
    pub filters: Vec<NumericFilter>,
    pub return_fields: Vec<String>,
    pub summarize: Option<SummarizeOptions>,
    pub highlight: Option<HighlightOptions>,
    pub slop: Option<u32>,
    pub language: Option<String>,
    pub in_order: bool,
    pub sort_by: Option<SortBy>,
    pub limit: Option<Paging>,
    pub scorer: Option<String>,
    #[serde(skip)]
    pub params: Vec<(String, Arg)>,
    pub dialect: Option<u32>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numeric FILTER clause.
    pub fn filter(
        &mut self,
        field: impl Into<String>,
        min: impl Into<RangeBound>,
        max: impl Into<RangeBound>,
    ) -> &mut Self {
        self.filters.push(NumericFilter {
            field: field.into(),
            min: min.into(),
            max: max.into(),
        });
        self
    }

    /// Set or replace a query parameter (`$name` in the query string).
    pub fn param(&mut self, name: impl Into<String>, value: impl Into<Arg>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    /// Arguments following the query string.
    pub fn to_args(&self) -> Vec<Arg> {
        let mut args: Vec<Arg> = Vec::new();

        let flags = [
            (self.no_content, "NOCONTENT"),
            (self.verbatim, "VERBATIM"),
            (self.no_stopwords, "NOSTOPWORDS"),
            (self.with_scores, "WITHSCORES"),
            (self.with_payloads, "WITHPAYLOADS"),
        ];
        for (set, flag) in flags {
            if set {
                args.push(flag.into());
            }
        }

        for filter in &self.filters {
            args.push("FILTER".into());
            args.push(filter.field.as_str().into());
            args.push(QueryTranslator::format_bound(&filter.min, "-inf").into());
            args.push(QueryTranslator::format_bound(&filter.max, "+inf").into());
        }

        if !self.return_fields.is_empty() {
            args.push("RETURN".into());
            push_counted(&mut args, &self.return_fields);
        }

        if let Some(summarize) = &self.summarize {
            args.push("SUMMARIZE".into());
            if !summarize.fields.is_empty() {
                args.push("FIELDS".into());
                push_counted(&mut args, &summarize.fields);
            }
            args.push("FRAGS".into());
            args.push(summarize.frags.into());
            args.push("LEN".into());
            args.push(summarize.len.into());
            args.push("SEPARATOR".into());
            args.push(summarize.separator.as_str().into());
        }

        if let Some(highlight) = &self.highlight {
            args.push("HIGHLIGHT".into());
            if !highlight.fields.is_empty() {
                args.push("FIELDS".into());
                push_counted(&mut args, &highlight.fields);
            }
            args.push("TAGS".into());
            args.push(highlight.open.as_str().into());
            args.push(highlight.close.as_str().into());
        }

        if let Some(slop) = self.slop {
            args.push("SLOP".into());
            args.push(slop.into());
        }

        if let Some(language) = &self.language {
            args.push("LANGUAGE".into());
            args.push(language.as_str().into());
        }

        if self.in_order {
            args.push("INORDER".into());
        }

        if let Some(sort) = &self.sort_by {
            args.push("SORTBY".into());
            args.push(sort.field.as_str().into());
            args.push(sort.order.to_string().into());
        }

        if let Some(page) = self.limit {
            args.push("LIMIT".into());
            args.push(page.offset.into());
            args.push(page.num.into());
        }

        if let Some(scorer) = &self.scorer {
            args.push("SCORER".into());
            args.push(scorer.as_str().into());
        }

        if !self.params.is_empty() {
            args.push("PARAMS".into());
            args.push((self.params.len() * 2).into());
            for (name, value) in &self.params {
                args.push(name.as_str().into());
                args.push(value.clone());
            }
        }

        if let Some(dialect) = self.dialect {
            args.push("DIALECT".into());
            args.push(dialect.into());
        }

        args
    }
}

fn push_counted(args: &mut Vec<Arg>, items: &[String]) {
    args.push(items.len().into());
    args.extend(items.iter().map(|s| Arg::from(s.as_str())));
}
