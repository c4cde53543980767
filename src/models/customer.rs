use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::de;

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(deserialize_with = "de::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub first_order_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub last_order_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::count_or_zero")]
    pub total_orders: i64,
    #[serde(default, deserialize_with = "de::number_or_zero")]
    pub total_spent: f64,
    #[serde(default)]
    pub segment: Option<String>,
}

// ---------------------------------------------------------------------------
// Segment
// ---------------------------------------------------------------------------

/// Behavioral customer segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Segment {
    New,
    Returning,
    Loyal,
    AtRisk,
    Inactive,
    Churned,
    /// Any stored label outside the known set, kept verbatim.
    Other(String),
}

impl Segment {
    /// Parse a stored label. Matching is case-insensitive and accepts
    /// `at-risk` / `at risk` spellings.
    pub fn parse(label: &str) -> Self {
        let norm = label.trim().to_lowercase().replace(['-', ' '], "_");
        match norm.as_str() {
            "new" => Segment::New,
            "returning" => Segment::Returning,
            "loyal" => Segment::Loyal,
            "at_risk" => Segment::AtRisk,
            "inactive" => Segment::Inactive,
            "churned" => Segment::Churned,
            _ => Segment::Other(label.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Segment::New => "new",
            Segment::Returning => "returning",
            Segment::Loyal => "loyal",
            Segment::AtRisk => "at_risk",
            Segment::Inactive => "inactive",
            Segment::Churned => "churned",
            Segment::Other(s) => s,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Segment {
    fn from(label: String) -> Self {
        Segment::parse(&label)
    }
}

impl From<Segment> for String {
    fn from(segment: Segment) -> Self {
        segment.as_str().to_string()
    }
}
