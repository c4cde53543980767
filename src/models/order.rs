use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::de;

// ---------------------------------------------------------------------------
// Order: one row of the transactional orders table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(deserialize_with = "de::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "de::number_or_zero")]
    pub total_price: f64,
    #[serde(default, deserialize_with = "de::opt_id")]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub customer_segment: Option<String>,
}

// ---------------------------------------------------------------------------
// OrderLineItem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    #[serde(deserialize_with = "de::id")]
    pub order_id: String,
    #[serde(deserialize_with = "de::id")]
    pub product_id: String,
    #[serde(default)]
    pub product_title: Option<String>,
    #[serde(default, deserialize_with = "de::count_or_zero")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "de::number_or_zero")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "de::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl OrderLineItem {
    pub fn revenue(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

// ---------------------------------------------------------------------------
// Refund
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    #[serde(deserialize_with = "de::id")]
    pub order_id: String,
    #[serde(default, deserialize_with = "de::number_or_zero")]
    pub amount: f64,
    #[serde(deserialize_with = "de::timestamp")]
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// SummaryRow: one row of the precomputed daily_sales_summary table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(deserialize_with = "de::date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub customer_segment: Option<String>,
    #[serde(default, deserialize_with = "de::number_or_zero")]
    pub revenue: f64,
    #[serde(default, deserialize_with = "de::count_or_zero")]
    pub order_count: i64,
    #[serde(default, deserialize_with = "de::count_or_zero")]
    pub customer_count: i64,
}
