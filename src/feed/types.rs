use serde::{Deserialize, Deserializer, Serialize};

/// Marker value PhishTank uses for boolean-ish fields
pub const YES: &str = "yes";

/// Decodes a string field, treating `null` like a missing value
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One record of the PhishTank feed
///
/// Only the fields the harvest needs are modelled; everything else in the
/// feed is ignored during decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phish_id: Option<serde_json::Value>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phish_detail_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_time: Option<String>,

    /// "yes" once the community has confirmed the report
    #[serde(default, deserialize_with = "null_as_empty")]
    pub verified: String,

    /// ISO-8601 timestamp, e.g. `2024-05-01T12:34:56+00:00`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub verification_time: String,

    /// "yes" while the phish was reachable at the last check
    #[serde(default, deserialize_with = "null_as_empty")]
    pub online: String,

    /// Impersonated brand, e.g. "PayPal" or "Other"
    #[serde(default, deserialize_with = "null_as_empty")]
    pub target: String,
}

impl FeedEntry {
    /// Date part of `verification_time` (everything before the first `T`)
    pub fn verification_date(&self) -> &str {
        self.verification_time
            .split('T')
            .next()
            .unwrap_or_default()
    }

    pub fn is_verified(&self) -> bool {
        self.verified == YES
    }

    pub fn is_online(&self) -> bool {
        self.online == YES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_feed_entry_ignores_unknown_fields() {
        let json = r#"{
            "phish_id": 8512345,
            "url": "http://secure-login.example.tk/",
            "phish_detail_url": "http://www.phishtank.com/phish_detail.php?phish_id=8512345",
            "submission_time": "2024-05-01T10:00:00+00:00",
            "verified": "yes",
            "verification_time": "2024-05-01T12:34:56+00:00",
            "online": "yes",
            "details": [{"ip_address": "192.0.2.1", "cidr_block": "192.0.2.0/24"}],
            "target": "PayPal"
        }"#;

        let entry: FeedEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.url, "http://secure-login.example.tk/");
        assert_eq!(entry.target, "PayPal");
        assert_eq!(entry.phish_id, Some(serde_json::json!(8512345)));
        assert!(entry.is_verified());
        assert!(entry.is_online());
        assert_eq!(entry.verification_date(), "2024-05-01");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let entry: FeedEntry = serde_json::from_str(r#"{"url": "http://x.test"}"#).unwrap();
        assert_eq!(entry.verification_time, "");
        assert_eq!(entry.verification_date(), "");
        assert!(!entry.is_verified());
        assert!(!entry.is_online());
    }

    #[test]
    fn test_null_fields_decode_as_empty() {
        let json = r#"{
            "url": "http://x.test/login",
            "verified": "yes",
            "verification_time": "2024-05-01T12:00:00+00:00",
            "online": null,
            "target": null,
            "phish_detail_url": null
        }"#;

        let entry: FeedEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.target, "");
        assert_eq!(entry.online, "");
        assert!(!entry.is_online());
        assert!(entry.phish_detail_url.is_none());
    }

    #[test]
    fn test_verification_date_without_time_part() {
        let entry = FeedEntry {
            verification_time: "2024-05-01".to_string(),
            ..Default::default()
        };
        assert_eq!(entry.verification_date(), "2024-05-01");
    }
}
