//! Record persistence
//!
//! Harvested pages are written through a [`RecordSink`]. Production runs use
//! [`SupabaseSink`]; dry runs stream JSON lines with [`JsonLinesSink`].

pub mod jsonl;
pub mod record;
pub mod supabase;

pub use jsonl::JsonLinesSink;
pub use record::PhishRecord;
pub use supabase::SupabaseSink;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while storing records
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request could not be sent
    #[error("Upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server refused the insert
    #[error("Insert rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Server answered with something other than the inserted rows
    #[error("Unexpected insert response: {0}")]
    InvalidResponse(String),

    /// Destination could not be built from configuration
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    /// Local output failed
    #[error("Failed to write records: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A later batch failed after earlier batches were committed
    #[error("Upload stopped after {inserted} rows were stored: {source}")]
    PartialInsert {
        inserted: usize,
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    /// Rows committed before the failure
    pub fn rows_inserted(&self) -> usize {
        match self {
            StoreError::PartialInsert { inserted, .. } => *inserted,
            _ => 0,
        }
    }
}

/// Destination for harvested records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Stores `records`, returning how many rows were stored
    ///
    /// When some rows were committed before a failure the error is
    /// [`StoreError::PartialInsert`] carrying that count.
    async fn insert(&self, records: &[PhishRecord]) -> Result<usize, StoreError>;

    /// Human-readable destination, e.g. a table or file name
    fn describe(&self) -> String;
}
