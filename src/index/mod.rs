// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index handle
//!
//! An [`Index`] binds a name, an optional key prefix, a storage type and a
//! [`Schema`] to a command channel. Serialization is delegated to the schema
//! and query types; the index splices in its name, validates documents and
//! post-processes replies.
//!
//! # Index Creation
//!
//! ```text
//! FT.CREATE products
//!   ON HASH
//!   PREFIX 1 product:
//!   SCHEMA
//!     title TEXT WEIGHT 5.0
//!     category TAG
//!     price NUMERIC SORTABLE
//! ```
//!
//! # Key Prefix
//!
//! With a prefix bound, `add("42", ..)` writes key `product:42` and every
//! search strips `product:` back off the returned ids, so ids round-trip
//! exactly.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use search_index_client::channel::{RecordingChannel, Reply};
//! use search_index_client::schema::{NumericFieldOptions, Schema, TextFieldOptions};
//! use search_index_client::{FieldValue, Index, IndexDefinition, Query};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let channel = Arc::new(RecordingChannel::new());
//! let schema = Schema::builder()
//!     .text("title", TextFieldOptions::new())?
//!     .numeric("price", NumericFieldOptions::new())?
//!     .build();
//!
//! let index = Index::create(
//!     channel.clone(),
//!     IndexDefinition::new("products").prefix("product"),
//!     schema,
//! )?;
//! index.add("42", [("title", FieldValue::from("Lamp")), ("price", FieldValue::from(19.5))])?;
//!
//! channel.push_reply(Reply::Array(vec![
//!     Reply::Integer(1),
//!     "product:42".into(),
//!     Reply::Array(vec!["title".into(), "Lamp".into()]),
//! ]));
//! let results = index.search(&Query::literal("Lamp"))?;
//! assert_eq!(results.ids(), vec!["42"]);
//! # Ok(())
//! # }
//! ```

mod document;

pub use document::FieldValue;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::channel::{self, Arg, CommandChannel, Reply};
use crate::config::SearchClientConfig;
use crate::error::{ChannelError, Result, SearchError, ValidationError};
use crate::metrics;
use crate::schema::{Field, Schema};
use crate::search::{Document, Query, QueryBuilder, SearchOptions, SearchResults};

/// How documents of an index are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StorageType {
    /// One hash per document (HSET)
    #[default]
    Hash,
    /// One JSON document per key (JSON.SET)
    Json,
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageType::Hash => write!(f, "HASH"),
            StorageType::Json => write!(f, "JSON"),
        }
    }
}

/// Everything about an index except its schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDefinition {
    pub name: String,
    /// Key prefix without the trailing `:`
    pub prefix: Option<String>,
    pub storage_type: StorageType,
    /// `None` keeps the server's stopwords, `Some(vec![])` disables them
    pub stopwords: Option<Vec<String>>,
    /// Dialect for searches whose query sets none
    pub dialect: Option<u32>,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            storage_type: StorageType::default(),
            stopwords: None,
            dialect: None,
        }
    }

    /// Definition carrying the config's storage type, stopwords and dialect.
    pub fn from_config(name: impl Into<String>, config: &SearchClientConfig) -> Self {
        Self {
            storage_type: config.storage_type,
            stopwords: config.stopwords.clone(),
            dialect: config.dialect,
            ..Self::new(name)
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn storage_type(mut self, storage_type: StorageType) -> Self {
        self.storage_type = storage_type;
        self
    }

    pub fn stopwords<I, S>(mut self, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = Some(stopwords.into_iter().map(Into::into).collect());
        self
    }

    pub fn dialect(mut self, dialect: u32) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// FT.CREATE arguments (after the command name).
    pub fn create_args(&self, schema: &Schema) -> Vec<Arg> {
        let mut args: Vec<Arg> = vec![
            self.name.as_str().into(),
            "ON".into(),
            self.storage_type.to_string().into(),
        ];

        if let Some(prefix) = &self.prefix {
            args.push("PREFIX".into());
            args.push(1usize.into());
            args.push(format!("{}:", prefix).into());
        }

        if let Some(stopwords) = &self.stopwords {
            args.push("STOPWORDS".into());
            args.push(stopwords.len().into());
            args.extend(stopwords.iter().map(Arg::from));
        }

        args.extend(schema.serialize());
        args
    }

    /// Storage key of document `id`.
    pub fn document_key(&self, id: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, id),
            None => id.to_string(),
        }
    }
}

/// A bound search index
pub struct Index {
    channel: Arc<dyn CommandChannel>,
    definition: IndexDefinition,
    schema: Schema,
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("definition", &self.definition)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl Index {
    /// Create the index on the server and return a handle bound to it.
    ///
    /// An empty schema is rejected before anything is sent. Server errors
    /// that complain about the schema come back as
    /// [`ValidationError::InvalidSchema`]; every other error is passed through.
    pub fn create(
        channel: Arc<dyn CommandChannel>,
        definition: IndexDefinition,
        schema: Schema,
    ) -> Result<Self> {
        if schema.is_empty() {
            metrics::record_validation_failure(&definition.name);
            return Err(ValidationError::EmptySchema.into());
        }

        let args = definition.create_args(&schema);
        debug!(
            index = %definition.name,
            prefix = ?definition.prefix,
            storage = %definition.storage_type,
            fields = schema.len(),
            "Creating search index"
        );

        match channel::send(channel.as_ref(), "FT.CREATE", &args) {
            Ok(_) => {
                metrics::record_index_operation("create", true);
                info!(index = %definition.name, "Search index created");
                Ok(Self::bind(channel, definition, schema))
            }
            Err(e) => {
                metrics::record_index_operation("create", false);
                Err(create_error(&definition.name, e))
            }
        }
    }

    /// Handle for an index that already exists. Nothing is sent.
    pub fn bind(channel: Arc<dyn CommandChannel>, definition: IndexDefinition, schema: Schema) -> Self {
        Self {
            channel,
            definition,
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &IndexDefinition {
        &self.definition
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn document_key(&self, id: &str) -> String {
        self.definition.document_key(id)
    }

    fn command(&self, command: &str, args: &[Arg]) -> Result<Reply> {
        Ok(channel::send(self.channel.as_ref(), command, args)?)
    }

    /// Write a document.
    ///
    /// Values for schema-numeric fields are checked first; a non-numeric
    /// value fails with [`ValidationError::NonNumericValue`] and nothing is
    /// sent.
    pub fn add<I, K>(&self, id: &str, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let fields: Vec<(String, FieldValue)> =
            fields.into_iter().map(|(k, v)| (k.into(), v)).collect();

        for (name, value) in &fields {
            if let Some(field) = self.schema.get(name) {
                if let Err(e) = value.validate(field) {
                    metrics::record_validation_failure(self.name());
                    return Err(e.into());
                }
            }
        }

        let key = self.document_key(id);
        match self.definition.storage_type {
            StorageType::Hash => {
                let mut args: Vec<Arg> = Vec::with_capacity(1 + fields.len() * 2);
                args.push(key.into());
                for (name, value) in &fields {
                    let arg = value.to_hash_arg(self.schema.get(name));
                    args.push(name.as_str().into());
                    args.push(arg);
                }
                self.command("HSET", &args)?;
            }
            StorageType::Json => {
                let object: serde_json::Map<String, serde_json::Value> = fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect();
                let body = serde_json::Value::Object(object).to_string();
                self.command("JSON.SET", &[key.into(), "$".into(), body.into()])?;
            }
        }
        Ok(())
    }

    /// Delete a document. Returns whether it existed.
    pub fn delete_document(&self, id: &str) -> Result<bool> {
        let reply = self.command("DEL", &[self.document_key(id).into()])?;
        reply
            .as_integer()
            .map(|n| n > 0)
            .ok_or_else(|| SearchError::unexpected("integer", reply))
    }

    /// Load a document by id. JSON documents come back as a single `$`
    /// field, the same shape search returns them in.
    pub fn get_document(&self, id: &str) -> Result<Option<Document>> {
        let key = self.document_key(id);
        let fields = match self.definition.storage_type {
            StorageType::Hash => {
                let reply = self.command("HGETALL", &[key.into()])?;
                let items = reply
                    .into_array()
                    .ok_or_else(|| SearchError::unexpected("field array", "non-array reply"))?;
                if items.is_empty() {
                    return Ok(None);
                }
                let mut pairs = Vec::with_capacity(items.len() / 2);
                let mut iter = items.into_iter();
                while let (Some(name), Some(value)) = (iter.next(), iter.next()) {
                    pairs.push((reply_string(name)?, reply_string(value)?));
                }
                pairs
            }
            StorageType::Json => match self.command("JSON.GET", &[key.into()])? {
                Reply::Nil => return Ok(None),
                other => vec![("$".to_string(), reply_string(other)?)],
            },
        };

        Ok(Some(Document {
            id: id.to_string(),
            score: None,
            payload: None,
            fields,
        }))
    }

    /// Run a query. The index dialect applies when the query sets none.
    pub fn search(&self, query: &Query) -> Result<SearchResults> {
        self.search_with_options(&query.query_string(), &self.query_options(query))
    }

    /// Options of `query` with the index dialect filled in when unset.
    fn query_options(&self, query: &Query) -> SearchOptions {
        let mut options = query.effective_options();
        if options.dialect.is_none() {
            options.dialect = self.definition.dialect;
        }
        options
    }

    /// Run a raw query string.
    pub fn search_str(&self, query: &str) -> Result<SearchResults> {
        self.search(&Query::literal(query))
    }

    /// Build the predicate tree with a block and run it.
    pub fn search_with<F>(&self, block: F) -> Result<SearchResults>
    where
        F: FnOnce(&mut QueryBuilder),
    {
        self.search(&Query::build(block))
    }

    /// Low-level search: a query string plus options, sent as given.
    pub fn search_with_options(&self, query: &str, options: &SearchOptions) -> Result<SearchResults> {
        debug!(index = %self.name(), query = %query, "Searching");

        let mut args: Vec<Arg> = vec![self.name().into(), query.into()];
        args.extend(options.to_args());

        let reply = self.command("FT.SEARCH", &args)?;
        let mut results = SearchResults::from_reply(reply, options)?;
        if let Some(prefix) = &self.definition.prefix {
            results.strip_prefix(prefix);
        }

        metrics::record_search_results(results.len());
        debug!(index = %self.name(), total = results.total, count = results.len(), "Search complete");
        Ok(results)
    }

    /// FT.INFO as attribute/value pairs.
    pub fn info(&self) -> Result<Vec<(String, Reply)>> {
        let reply = self.command("FT.INFO", &[self.name().into()])?;
        let items = reply
            .into_array()
            .ok_or_else(|| SearchError::unexpected("info array", "non-array reply"))?;

        let mut info = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            info.push((reply_string(key)?, value));
        }
        Ok(info)
    }

    /// Drop the index; `delete_documents` also deletes the indexed keys.
    pub fn drop_index(&self, delete_documents: bool) -> Result<()> {
        let mut args: Vec<Arg> = vec![self.name().into()];
        if delete_documents {
            args.push("DD".into());
        }
        match self.command("FT.DROPINDEX", &args) {
            Ok(_) => {
                metrics::record_index_operation("drop", true);
                info!(index = %self.name(), delete_documents, "Search index dropped");
                Ok(())
            }
            Err(e) => {
                metrics::record_index_operation("drop", false);
                Err(e)
            }
        }
    }

    /// FT.AGGREGATE with a caller-built pipeline.
    pub fn aggregate<I, A>(&self, query: &str, pipeline: I) -> Result<Reply>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let mut args: Vec<Arg> = vec![self.name().into(), query.into()];
        args.extend(pipeline.into_iter().map(Into::into));
        self.command("FT.AGGREGATE", &args)
    }

    /// Execution plan of a query as the server parsed it.
    pub fn explain(&self, query: &Query) -> Result<String> {
        let mut args: Vec<Arg> = vec![self.name().into(), query.query_string().into()];
        if let Some(dialect) = self.query_options(query).dialect {
            args.push("DIALECT".into());
            args.push(dialect.into());
        }
        let reply = self.command("FT.EXPLAIN", &args)?;
        reply_string(reply)
    }

    /// Add a field to the index and to the local schema.
    pub fn alter(&mut self, field: Field) -> Result<()> {
        let schema = self.schema.with_field(field.clone())?;

        let mut args: Vec<Arg> = vec![self.name().into(), "SCHEMA".into(), "ADD".into()];
        args.extend(field.serialize());

        match self.command("FT.ALTER", &args) {
            Ok(_) => {
                metrics::record_index_operation("alter", true);
                info!(index = %self.name(), field = %field.name(), "Search index altered");
                self.schema = schema;
                Ok(())
            }
            Err(e) => {
                metrics::record_index_operation("alter", false);
                Err(e)
            }
        }
    }

    /// Spelling suggestions for the terms of `query`.
    pub fn spellcheck(&self, query: &str, distance: Option<u32>) -> Result<Reply> {
        let mut args: Vec<Arg> = vec![self.name().into(), query.into()];
        if let Some(distance) = distance {
            args.push("DISTANCE".into());
            args.push(distance.into());
        }
        self.command("FT.SPELLCHECK", &args)
    }

    pub fn syndump(&self) -> Result<Reply> {
        self.command("FT.SYNDUMP", &[self.name().into()])
    }

    /// Add `terms` to synonym group `group_id`.
    pub fn synupdate<I, S>(&self, group_id: &str, terms: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args: Vec<Arg> = vec![self.name().into(), group_id.into()];
        args.extend(terms.into_iter().map(|t| Arg::from(t.into())));
        self.command("FT.SYNUPDATE", &args)?;
        Ok(())
    }

    /// Distinct values of a tag field.
    pub fn tagvals(&self, field: &str) -> Result<Vec<String>> {
        let reply = self.command("FT.TAGVALS", &[self.name().into(), field.into()])?;
        let items = reply
            .into_array()
            .ok_or_else(|| SearchError::unexpected("tag value array", "non-array reply"))?;
        items.into_iter().map(reply_string).collect()
    }

    /// Run a search under FT.PROFILE; the raw profile reply is returned.
    pub fn profile(&self, query: &Query, limited: bool) -> Result<Reply> {
        let mut args: Vec<Arg> = vec![self.name().into(), "SEARCH".into()];
        if limited {
            args.push("LIMITED".into());
        }
        args.push("QUERY".into());
        args.push(query.query_string().into());
        args.extend(self.query_options(query).to_args());
        self.command("FT.PROFILE", &args)
    }
}

/// Server messages that point at the schema clause
const SCHEMA_ERROR_HINTS: [&str; 3] = ["schema", "field", "argument"];

fn create_error(index: &str, err: ChannelError) -> SearchError {
    match err {
        ChannelError::Server(message) => {
            let lower = message.to_lowercase();
            if SCHEMA_ERROR_HINTS.iter().any(|hint| lower.contains(hint)) {
                ValidationError::InvalidSchema {
                    index: index.to_string(),
                    message,
                }
                .into()
            } else {
                ChannelError::Server(message).into()
            }
        }
        other => other.into(),
    }
}

fn reply_string(reply: Reply) -> Result<String> {
    match reply {
        Reply::Bulk(s) | Reply::Status(s) => Ok(s),
        Reply::Integer(n) => Ok(n.to_string()),
        Reply::Blob(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        other => Err(SearchError::unexpected("string", other)),
    }
}
