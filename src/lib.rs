//! # Search Index Client
//!
//! Client-side query construction and command serialization for a
//! RediSearch-compatible document index.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Schema                              │
//! │  • Typed fields: TEXT, TAG, NUMERIC, GEO, VECTOR           │
//! │  • Unknown options rejected at declaration time            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Query / QueryBuilder                     │
//! │  • Nested AND/OR predicate groups                          │
//! │  • Paging, sorting, filters, highlight, KNN, ...           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Index                              │
//! │  • FT.CREATE / FT.SEARCH / HSET / JSON.SET                 │
//! │  • Key prefix added on write, stripped from results        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CommandChannel                          │
//! │  • RedisChannel (redis crate) or RecordingChannel (tests)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use search_index_client::channel::RedisChannel;
//! use search_index_client::schema::{NumericFieldOptions, Schema, TagFieldOptions, TextFieldOptions};
//! use search_index_client::search::SortOrder;
//! use search_index_client::{FieldValue, Index, IndexDefinition, Query, SearchClientConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SearchClientConfig::default();
//!     let channel = Arc::new(RedisChannel::from_config(&config)?);
//!
//!     let schema = Schema::builder()
//!         .text("title", TextFieldOptions::new().weight(5.0))?
//!         .tag("category", TagFieldOptions::new())?
//!         .numeric("price", NumericFieldOptions::new().sortable())?
//!         .build();
//!
//!     let index = Index::create(
//!         channel,
//!         IndexDefinition::from_config("products", &config).prefix("product"),
//!         schema,
//!     )?;
//!
//!     index.add("1", [
//!         ("title", FieldValue::from("Desk lamp")),
//!         ("category", FieldValue::Tags(vec!["home".into()])),
//!         ("price", FieldValue::from(19.5)),
//!     ])?;
//!
//!     let query = Query::build(|b| {
//!         b.tag("category").eq("home");
//!         b.or(|b| {
//!             b.text("title").prefix("lamp");
//!             b.numeric("price").lt(20.0);
//!         });
//!     })
//!     .sort_by("price", SortOrder::Asc)
//!     .paging(0, 10);
//!
//!     for doc in index.search(&query)?.documents {
//!         println!("{} {:?}", doc.id, doc.get("title"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: Field descriptors and schema declaration
//! - [`search`]: Predicate trees, query builder, options and reply parsing
//! - [`index`]: The [`Index`] handle tying schema, queries and channel together
//! - [`channel`]: Command channel trait and implementations
//! - [`config`]: [`SearchClientConfig`]
//! - [`metrics`]: `metrics` crate instrumentation

pub mod channel;
pub mod config;
pub mod error;
pub mod index;
pub mod metrics;
pub mod schema;
pub mod search;

pub use channel::{CommandChannel, RecordingChannel, RedisChannel, Reply};
pub use config::SearchClientConfig;
pub use error::{ChannelError, Result, SchemaError, SearchError, ValidationError};
pub use index::{FieldValue, Index, IndexDefinition, StorageType};
pub use schema::{Field, FieldType, Schema, SchemaDefinition};
pub use search::{Query, QueryBuilder, SearchOptions, SearchResults};
