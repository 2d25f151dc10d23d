use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Catalog Value Objects
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewKitchen {
    pub name: String,
    #[serde(default)]
    pub brand_slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenuItem {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// How a fan-out insert across every kitchen treats a single failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkInsertMode {
    /// Keep inserting; failed kitchens are reported
    #[default]
    BestEffort,
    /// One batch write; either every kitchen gets the item or none does
    AllOrNothing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkInsertFailure {
    pub kitchen_id: Uuid,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkInsertReport {
    pub inserted: usize,
    pub ids: Vec<Uuid>,
    pub failures: Vec<BulkInsertFailure>,
}
