use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use super::errors::DiscountError;
use super::value_objects::{Discount, DiscountKind, DiscountScope, PriceQuote, RejectionReason};

// ============================================================================
// Discount Pricing
// ============================================================================
//
// Checks run in a fixed order: existence/activity, start, end, scope. The
// first failing check decides the rejection reason.
//
// Percent discounts are rounded to whole currency units, midpoints away from
// zero (half up for the non-negative amounts seen here). The total is clamped
// at zero; the discount amount is not.
//
// ============================================================================

/// Caller context a code is validated against
#[derive(Debug, Clone, Copy, Default)]
pub struct PricingContext<'a> {
    pub brand_slug: Option<&'a str>,
    pub kitchen_id: Option<Uuid>,
}

/// A negative subtotal, or one whose discount would overflow, is an error
/// rather than a rejection
pub fn quote(
    discount: Option<&Discount>,
    context: PricingContext<'_>,
    subtotal: Decimal,
    now: DateTime<Utc>,
) -> Result<PriceQuote, DiscountError> {
    if subtotal.is_sign_negative() && !subtotal.is_zero() {
        return Err(DiscountError::SubtotalOutOfRange(subtotal));
    }

    let discount = match discount {
        Some(d) if d.is_active => d,
        _ => return Ok(PriceQuote::Rejected(RejectionReason::Invalid)),
    };

    if discount.starts_at.is_some_and(|starts| starts > now) {
        return Ok(PriceQuote::Rejected(RejectionReason::NotStarted));
    }
    if discount.ends_at.is_some_and(|ends| ends < now) {
        return Ok(PriceQuote::Rejected(RejectionReason::Expired));
    }
    if !scope_matches(discount, context) {
        return Ok(PriceQuote::Rejected(RejectionReason::ScopeMismatch));
    }

    let out_of_range = || DiscountError::SubtotalOutOfRange(subtotal);
    let discount_amount = discount_amount(discount.kind, discount.value, subtotal).ok_or_else(out_of_range)?;
    let total = subtotal.checked_sub(discount_amount).ok_or_else(out_of_range)?;

    Ok(PriceQuote::Valid {
        discount_amount,
        total: total.max(Decimal::ZERO),
    })
}

/// An omitted caller qualifier never mismatches
fn scope_matches(discount: &Discount, context: PricingContext<'_>) -> bool {
    match discount.scope {
        DiscountScope::Global => true,
        DiscountScope::Brand => match context.brand_slug {
            Some(brand) => discount.brand_slug.as_deref() == Some(brand),
            None => true,
        },
        DiscountScope::Kitchen => match context.kitchen_id {
            Some(kitchen) => discount.kitchen_id == Some(kitchen),
            None => true,
        },
    }
}

/// `None` when the amount does not fit in a `Decimal`
pub fn discount_amount(kind: DiscountKind, value: Decimal, subtotal: Decimal) -> Option<Decimal> {
    match kind {
        DiscountKind::Percent => value
            .checked_mul(subtotal)
            .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
            // Near the top of the range, scale the subtotal down first
            .or_else(|| (subtotal / Decimal::ONE_HUNDRED).checked_mul(value))
            .map(round_half_up),
        DiscountKind::Amount => Some(value),
    }
}

/// Round to whole currency units, midpoints away from zero
pub fn round_half_up(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
