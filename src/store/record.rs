use serde::{Deserialize, Serialize};

/// One captured phishing page, shaped like a row of the destination table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhishRecord {
    pub url: String,
    pub html_content: String,
    /// Impersonated brand reported by PhishTank
    pub target: String,
    /// PhishTank verification timestamp, as published
    pub verification_time: String,
    /// UTC capture date, `YYYY-MM-DD`
    pub fetched_date: String,
}
