use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

// ============================================================================
// Discount Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiscountScope {
    Global,
    Brand,
    Kitchen,
}

impl DiscountScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountScope::Global => "GLOBAL",
            DiscountScope::Brand => "BRAND",
            DiscountScope::Kitchen => "KITCHEN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GLOBAL" => Some(DiscountScope::Global),
            "BRAND" => Some(DiscountScope::Brand),
            "KITCHEN" => Some(DiscountScope::Kitchen),
            _ => None,
        }
    }
}

/// How `value` is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiscountKind {
    /// `value` is a percentage, 0-100
    Percent,
    /// `value` is a flat amount in currency units
    Amount,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percent => "PERCENT",
            DiscountKind::Amount => "AMOUNT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PERCENT" => Some(DiscountKind::Percent),
            "AMOUNT" => Some(DiscountKind::Amount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: Uuid,
    pub code: String,
    pub scope: DiscountScope,
    pub brand_slug: Option<String>,
    pub kitchen_id: Option<Uuid>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: Decimal,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    /// Stored for reporting; redemptions are not counted
    pub max_redemptions: Option<u32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when an admin creates a discount
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDiscount {
    pub code: String,
    pub scope: DiscountScope,
    #[serde(default)]
    pub brand_slug: Option<String>,
    #[serde(default)]
    pub kitchen_id: Option<Uuid>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub max_redemptions: Option<u32>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl NewDiscount {
    pub fn new(code: impl Into<String>, scope: DiscountScope, kind: DiscountKind, value: Decimal) -> Self {
        Self {
            code: code.into(),
            scope,
            brand_slug: None,
            kitchen_id: None,
            description: None,
            kind,
            value,
            starts_at: None,
            ends_at: None,
            max_redemptions: None,
            is_active: None,
        }
    }

    pub fn for_brand(mut self, brand_slug: impl Into<String>) -> Self {
        self.brand_slug = Some(brand_slug.into());
        self
    }

    pub fn for_kitchen(mut self, kitchen_id: Uuid) -> Self {
        self.kitchen_id = Some(kitchen_id);
        self
    }

    pub fn valid_between(mut self, starts_at: Option<DateTime<Utc>>, ends_at: Option<DateTime<Utc>>) -> Self {
        self.starts_at = starts_at;
        self.ends_at = ends_at;
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// Optional filter for listing discounts
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountFilter {
    pub scope: Option<DiscountScope>,
    pub brand_slug: Option<String>,
    pub kitchen_id: Option<Uuid>,
}

impl DiscountFilter {
    /// A scope without its qualifier falls back to "everything"
    pub fn matches(&self, discount: &Discount) -> bool {
        match (self.scope, &self.brand_slug, self.kitchen_id) {
            (Some(DiscountScope::Global), _, _) => {
                discount.scope == DiscountScope::Global && discount.brand_slug.is_none()
            }
            (Some(DiscountScope::Brand), Some(brand), _) => {
                discount.scope == DiscountScope::Brand && discount.brand_slug.as_deref() == Some(brand.as_str())
            }
            (Some(DiscountScope::Kitchen), _, Some(kitchen)) => {
                discount.scope == DiscountScope::Kitchen && discount.kitchen_id == Some(kitchen)
            }
            _ => true,
        }
    }
}

/// Input to `validate_and_price`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRequest {
    pub code: String,
    #[serde(default)]
    pub brand_slug: Option<String>,
    #[serde(default)]
    pub kitchen_id: Option<Uuid>,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Invalid,
    NotStarted,
    Expired,
    ScopeMismatch,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::Invalid => "invalid",
            RejectionReason::NotStarted => "not_started",
            RejectionReason::Expired => "expired",
            RejectionReason::ScopeMismatch => "scope_mismatch",
        }
    }
}

/// Outcome of pricing a code; a rejection is a value, not an error
#[derive(Debug, Clone, PartialEq)]
pub enum PriceQuote {
    Valid { discount_amount: Decimal, total: Decimal },
    Rejected(RejectionReason),
}

impl PriceQuote {
    pub fn is_valid(&self) -> bool {
        matches!(self, PriceQuote::Valid { .. })
    }

    /// Label used for metrics and logs
    pub fn outcome(&self) -> &'static str {
        match self {
            PriceQuote::Valid { .. } => "valid",
            PriceQuote::Rejected(reason) => reason.as_str(),
        }
    }
}

// Wire shape: {valid:false, reason} | {valid:true, discountAmount, total}
impl Serialize for PriceQuote {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PriceQuote::Valid { discount_amount, total } => {
                let mut state = serializer.serialize_struct("PriceQuote", 3)?;
                state.serialize_field("valid", &true)?;
                state.serialize_field("discountAmount", discount_amount)?;
                state.serialize_field("total", total)?;
                state.end()
            }
            PriceQuote::Rejected(reason) => {
                let mut state = serializer.serialize_struct("PriceQuote", 2)?;
                state.serialize_field("valid", &false)?;
                state.serialize_field("reason", reason)?;
                state.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discount(scope: DiscountScope, brand: Option<&str>, kitchen: Option<Uuid>) -> Discount {
        Discount {
            id: Uuid::new_v4(),
            code: "WELCOME".to_string(),
            scope,
            brand_slug: brand.map(str::to_string),
            kitchen_id: kitchen,
            description: None,
            kind: DiscountKind::Percent,
            value: Decimal::TEN,
            starts_at: None,
            ends_at: None,
            max_redemptions: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_quote_wire_shape() {
        let valid = PriceQuote::Valid {
            discount_amount: Decimal::from(100),
            total: Decimal::from(900),
        };
        let json = serde_json::to_value(&valid).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["discountAmount"].as_f64(), Some(100.0));
        assert_eq!(json["total"].as_f64(), Some(900.0));

        let rejected = PriceQuote::Rejected(RejectionReason::ScopeMismatch);
        let json = serde_json::to_value(&rejected).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["reason"], "scope_mismatch");
        assert!(json.get("total").is_none());
    }

    #[test]
    fn test_discount_type_field_name() {
        let json = serde_json::to_value(discount(DiscountScope::Global, None, None)).unwrap();
        assert_eq!(json["type"], "PERCENT");
        assert_eq!(json["scope"], "GLOBAL");
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_filter_by_scope_and_qualifier() {
        let kitchen = Uuid::new_v4();
        let global = discount(DiscountScope::Global, None, None);
        let brand = discount(DiscountScope::Brand, Some("el-chaplo"), None);
        let local = discount(DiscountScope::Kitchen, None, Some(kitchen));

        let only_global = DiscountFilter { scope: Some(DiscountScope::Global), ..Default::default() };
        assert!(only_global.matches(&global));
        assert!(!only_global.matches(&brand));

        let by_brand = DiscountFilter {
            scope: Some(DiscountScope::Brand),
            brand_slug: Some("el-chaplo".to_string()),
            ..Default::default()
        };
        assert!(by_brand.matches(&brand));
        assert!(!by_brand.matches(&local));

        let by_kitchen = DiscountFilter {
            scope: Some(DiscountScope::Kitchen),
            kitchen_id: Some(kitchen),
            ..Default::default()
        };
        assert!(by_kitchen.matches(&local));
        assert!(!by_kitchen.matches(&global));

        // Brand scope without a slug lists everything
        let unqualified = DiscountFilter { scope: Some(DiscountScope::Brand), ..Default::default() };
        assert!(unqualified.matches(&global) && unqualified.matches(&local));
    }

    #[test]
    fn test_new_discount_deserializes_optional_fields() {
        let json = r#"{"code":"FLAT50","scope":"GLOBAL","type":"AMOUNT","value":50}"#;
        let new: NewDiscount = serde_json::from_str(json).unwrap();

        assert_eq!(new.kind, DiscountKind::Amount);
        assert_eq!(new.value, Decimal::from(50));
        assert!(new.is_active.is_none());
        assert!(new.ends_at.is_none());
    }
}
