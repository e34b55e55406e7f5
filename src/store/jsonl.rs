//! JSON-lines sink for dry runs and local archives

use super::{PhishRecord, RecordSink, StoreError};
use async_trait::async_trait;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Writes one JSON object per record
pub struct JsonLinesSink {
    writer: Mutex<Box<dyn Write + Send>>,
    destination: String,
}

impl JsonLinesSink {
    /// Creates (or truncates) `path`
    pub fn to_file(path: &Path) -> Result<Self, StoreError> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(Box::new(BufWriter::new(file))),
            destination: path.display().to_string(),
        })
    }

    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
            destination: "stdout".to_string(),
        }
    }

    /// Writes to `path` when given, stdout otherwise
    pub fn to_path_or_stdout(path: Option<&PathBuf>) -> Result<Self, StoreError> {
        match path {
            Some(path) => Self::to_file(path),
            None => Ok(Self::stdout()),
        }
    }

    fn write_all(&self, records: &[PhishRecord]) -> Result<usize, StoreError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StoreError::Io(io::Error::other("record writer poisoned")))?;

        for record in records {
            serde_json::to_writer(&mut *writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        Ok(records.len())
    }
}

#[async_trait]
impl RecordSink for JsonLinesSink {
    async fn insert(&self, records: &[PhishRecord]) -> Result<usize, StoreError> {
        self.write_all(records)
    }

    fn describe(&self) -> String {
        format!("JSON lines ({})", self.destination)
    }
}
