//! Configuration for the search client.
//!
//! # Example
//!
//! ```
//! use search_index_client::{SearchClientConfig, StorageType};
//!
//! // Minimal config (uses defaults)
//! let config = SearchClientConfig::default();
//! assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
//! assert_eq!(config.storage_type, StorageType::Hash);
//!
//! // From JSON, e.g. a section of a larger service config
//! let config: SearchClientConfig = serde_json::from_str(
//!     r#"{"redis_url": "redis://search:6379", "storage_type": "JSON", "stopwords": []}"#,
//! ).unwrap();
//! assert_eq!(config.storage_type, StorageType::Json);
//! assert_eq!(config.stopwords, Some(vec![]));
//! ```

use serde::Deserialize;

use crate::index::StorageType;

/// Configuration for channels and index definitions.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchClientConfig {
    /// Redis connection string (e.g., "redis://localhost:6379")
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// How indexed documents are stored (default: HASH)
    #[serde(default)]
    pub storage_type: StorageType,

    /// Custom stopword list for new indexes. `Some(vec![])` disables
    /// stopwords entirely; `None` keeps the server defaults.
    #[serde(default)]
    pub stopwords: Option<Vec<String>>,

    /// Query dialect appended to every search (None = server default)
    #[serde(default)]
    pub dialect: Option<u32>,
}

fn default_redis_url() -> String { "redis://127.0.0.1:6379".to_string() }

impl Default for SearchClientConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            storage_type: StorageType::default(),
            stopwords: None,
            dialect: None,
        }
    }
}
