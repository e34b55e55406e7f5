//! Supabase table sink via the PostgREST API

use super::{PhishRecord, RecordSink, StoreError};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Inserts records into a Supabase table
pub struct SupabaseSink {
    endpoint: Url,
    api_key: String,
    table: String,
    batch_size: usize,
    http_client: Client,
}

/// PostgREST endpoint of `table` under a Supabase project URL
pub fn table_endpoint(project_url: &Url, table: &str) -> Result<Url, StoreError> {
    let mut base = project_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(&format!("rest/v1/{}", table))
        .map_err(|e| StoreError::InvalidDestination(format!("{}: {}", table, e)))
}

impl SupabaseSink {
    pub fn new(
        project_url: &Url,
        api_key: impl Into<String>,
        table: impl Into<String>,
        batch_size: usize,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let table = table.into();
        let endpoint = table_endpoint(project_url, &table)?;
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key: api_key.into(),
            table,
            batch_size: batch_size.max(1),
            http_client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn insert_batch(&self, batch: &[PhishRecord]) -> Result<usize, StoreError> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(batch)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let rows: Vec<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|e| StoreError::InvalidResponse(format!("{} (body: {})", e, body)))?;

        Ok(rows.len())
    }
}

#[async_trait]
impl RecordSink for SupabaseSink {
    async fn insert(&self, records: &[PhishRecord]) -> Result<usize, StoreError> {
        let mut inserted = 0;

        for (index, batch) in records.chunks(self.batch_size).enumerate() {
            let count = match self.insert_batch(batch).await {
                Ok(count) => count,
                Err(e) if inserted > 0 => {
                    return Err(StoreError::PartialInsert {
                        inserted,
                        source: Box::new(e),
                    })
                }
                Err(e) => return Err(e),
            };
            debug!(batch = index, rows = count, table = %self.table, "Batch inserted");
            inserted += count;
        }

        info!(rows = inserted, table = %self.table, "Successfully uploaded records");
        Ok(inserted)
    }

    fn describe(&self) -> String {
        format!("supabase table '{}'", self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_endpoint() {
        let base = Url::parse("https://abc.supabase.co").unwrap();
        assert_eq!(
            table_endpoint(&base, "daily_phish").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/daily_phish"
        );
    }

    #[test]
    fn test_table_endpoint_keeps_base_path() {
        let base = Url::parse("http://gateway.local/supabase").unwrap();
        assert_eq!(
            table_endpoint(&base, "daily_phish").unwrap().as_str(),
            "http://gateway.local/supabase/rest/v1/daily_phish"
        );
    }

    #[test]
    fn test_describe() {
        let base = Url::parse("https://abc.supabase.co").unwrap();
        let sink = SupabaseSink::new(&base, "k", "daily_phish", 10, Duration::from_secs(5)).unwrap();
        assert_eq!(sink.describe(), "supabase table 'daily_phish'");
        assert_eq!(sink.endpoint().path(), "/rest/v1/daily_phish");
    }
}
