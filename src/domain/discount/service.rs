use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DiscountError;
use super::pricing::{quote, PricingContext};
use super::value_objects::{Discount, DiscountFilter, DiscountScope, NewDiscount, PriceQuote, PriceRequest};
use crate::metrics::Metrics;
use crate::store::{Store, StoreError};

// ============================================================================
// Discount Service
// ============================================================================

pub struct DiscountService {
    store: Arc<dyn Store>,
    metrics: Arc<Metrics>,
}

impl DiscountService {
    pub fn new(store: Arc<dyn Store>, metrics: Arc<Metrics>) -> Self {
        Self { store, metrics }
    }

    /// Persist a new discount; the code must not exist yet (exact match)
    pub async fn create(&self, new: NewDiscount) -> Result<Uuid, DiscountError> {
        validate(&new)?;

        let discount = Discount {
            id: Uuid::new_v4(),
            code: new.code,
            scope: new.scope,
            brand_slug: new.brand_slug,
            kitchen_id: new.kitchen_id,
            description: new.description,
            kind: new.kind,
            value: new.value,
            starts_at: new.starts_at,
            ends_at: new.ends_at,
            max_redemptions: new.max_redemptions,
            is_active: new.is_active.unwrap_or(true),
            created_at: Utc::now(),
        };

        match self.store.insert_discount(&discount).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists { .. }) => {
                tracing::warn!(code = %discount.code, "Rejected duplicate discount code");
                return Err(DiscountError::DuplicateCode(discount.code));
            }
            Err(e) => return Err(e.into()),
        }

        self.metrics.record_discount_created();
        tracing::info!(
            discount_id = %discount.id,
            code = %discount.code,
            scope = discount.scope.as_str(),
            kind = discount.kind.as_str(),
            "Created discount"
        );

        Ok(discount.id)
    }

    pub async fn find(&self, code: &str) -> Result<Option<Discount>, DiscountError> {
        Ok(self.store.find_discount_by_code(code).await?)
    }

    pub async fn list(&self, filter: &DiscountFilter) -> Result<Vec<Discount>, DiscountError> {
        let discounts = self.store.list_discounts().await?;
        Ok(discounts.into_iter().filter(|d| filter.matches(d)).collect())
    }

    /// Validate a code for the caller's brand/kitchen and price the subtotal
    pub async fn validate_and_price(&self, request: &PriceRequest) -> Result<PriceQuote, DiscountError> {
        self.validate_and_price_at(request, Utc::now()).await
    }

    pub async fn validate_and_price_at(
        &self,
        request: &PriceRequest,
        now: DateTime<Utc>,
    ) -> Result<PriceQuote, DiscountError> {
        let started = Instant::now();
        let discount = self.store.find_discount_by_code(&request.code).await?;

        let context = PricingContext {
            brand_slug: request.brand_slug.as_deref(),
            kitchen_id: request.kitchen_id,
        };
        let result = quote(discount.as_ref(), context, request.subtotal, now)?;

        self.metrics.record_discount_quote(result.outcome());
        self.metrics
            .observe_duration("validate_and_price", started.elapsed().as_secs_f64());
        tracing::debug!(code = %request.code, outcome = result.outcome(), "Priced discount code");

        Ok(result)
    }
}

fn validate(new: &NewDiscount) -> Result<(), DiscountError> {
    if new.code.trim().is_empty() {
        return Err(DiscountError::EmptyCode);
    }
    if new.value.is_sign_negative() && !new.value.is_zero() {
        return Err(DiscountError::NegativeValue(new.value));
    }

    let qualified = match new.scope {
        DiscountScope::Global => true,
        DiscountScope::Brand => new.brand_slug.as_deref().is_some_and(|b| !b.is_empty()),
        DiscountScope::Kitchen => new.kitchen_id.is_some(),
    };
    if !qualified {
        return Err(DiscountError::MissingQualifier(new.scope));
    }

    if let (Some(starts), Some(ends)) = (new.starts_at, new.ends_at) {
        if starts > ends {
            return Err(DiscountError::InvertedWindow);
        }
    }

    Ok(())
}
