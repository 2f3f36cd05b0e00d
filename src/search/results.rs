//! FT.SEARCH reply parsing.
//!
//! The reply is a flat array whose row stride depends on the request flags:
//!
//! ```text
//! [total, id, score?, payload?, [field, value, ...]?, id, ...]
//!              WITHSCORES  WITHPAYLOADS   absent with NOCONTENT
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::options::SearchOptions;
use crate::channel::Reply;
use crate::error::{Result, SearchError};

/// One matching document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub score: Option<f64>,
    pub payload: Option<String>,
    /// Field/value pairs in reply order
    pub fields: Vec<(String, String)>,
}

impl Document {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Decode the `$` field that JSON-storage indexes return.
    ///
    /// `None` when the document carries no `$` field.
    pub fn json<T: DeserializeOwned>(&self) -> Option<serde_json::Result<T>> {
        self.get("$").map(serde_json::from_str)
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchResults {
    /// Total matches on the server, not just this page
    pub total: u64,
    pub documents: Vec<Document>,
}

impl SearchResults {
    /// Parse a reply produced by a request sent with `options`.
    pub fn from_reply(reply: Reply, options: &SearchOptions) -> Result<Self> {
        let items = match reply {
            Reply::Array(items) => items,
            other => return Err(SearchError::unexpected("search result array", other)),
        };

        let mut iter = items.into_iter();
        let total = match iter.next() {
            Some(Reply::Integer(n)) if n >= 0 => n as u64,
            Some(other) => return Err(SearchError::unexpected("result count", other)),
            None => return Err(SearchError::unexpected("result count", "empty array")),
        };

        let mut documents = Vec::new();
        while let Some(id) = iter.next() {
            let id = reply_text(id, "document id")?;

            let score = if options.with_scores {
                let raw = iter
                    .next()
                    .ok_or_else(|| SearchError::unexpected("document score", "end of reply"))?;
                Some(parse_score(raw)?)
            } else {
                None
            };

            let payload = if options.with_payloads {
                match iter.next() {
                    Some(Reply::Nil) => None,
                    Some(raw) => Some(reply_text(raw, "document payload")?),
                    None => return Err(SearchError::unexpected("document payload", "end of reply")),
                }
            } else {
                None
            };

            let fields = if options.no_content {
                Vec::new()
            } else {
                match iter.next() {
                    Some(Reply::Array(pairs)) => parse_fields(pairs)?,
                    // Documents deleted between match and load come back as nil
                    Some(Reply::Nil) => Vec::new(),
                    Some(other) => return Err(SearchError::unexpected("field array", other)),
                    None => return Err(SearchError::unexpected("field array", "end of reply")),
                }
            };

            documents.push(Document {
                id,
                score,
                payload,
                fields,
            });
        }

        Ok(Self { total, documents })
    }

    /// Remove `"<prefix>:"` from every document id that carries it.
    pub fn strip_prefix(&mut self, prefix: &str) {
        let full = format!("{}:", prefix);
        for doc in &mut self.documents {
            if let Some(rest) = doc.id.strip_prefix(&full) {
                doc.id = rest.to_string();
            }
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.id.as_str()).collect()
    }

    /// Documents in this page
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn reply_text(reply: Reply, expected: &'static str) -> Result<String> {
    match reply {
        Reply::Bulk(s) | Reply::Status(s) => Ok(s),
        Reply::Integer(n) => Ok(n.to_string()),
        Reply::Blob(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        other => Err(SearchError::unexpected(expected, other)),
    }
}

fn parse_score(reply: Reply) -> Result<f64> {
    match &reply {
        Reply::Integer(n) => Ok(*n as f64),
        Reply::Bulk(s) | Reply::Status(s) => s
            .parse()
            .map_err(|_| SearchError::unexpected("numeric score", &reply)),
        _ => Err(SearchError::unexpected("numeric score", &reply)),
    }
}

fn parse_fields(pairs: Vec<Reply>) -> Result<Vec<(String, String)>> {
    if pairs.len() % 2 != 0 {
        return Err(SearchError::unexpected("even field/value list", pairs.len()));
    }
    let mut fields = Vec::with_capacity(pairs.len() / 2);
    let mut iter = pairs.into_iter();
    while let (Some(name), Some(value)) = (iter.next(), iter.next()) {
        fields.push((reply_text(name, "field name")?, reply_text(value, "field value")?));
    }
    Ok(fields)
}
