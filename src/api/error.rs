use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;

use crate::domain::catalog::CatalogError;
use crate::domain::discount::DiscountError;
use crate::domain::identity::IdentityError;
use crate::domain::ledger::LedgerError;
use crate::domain::order::OrderError;
use crate::store::StoreError;

// ============================================================================
// API Errors
// ============================================================================
//
// Domain errors become a status code plus a stable machine-readable code.
// Store failures are logged here and hidden from the client.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", "Missing or expired session")
    }

    fn unprocessable(code: &'static str, message: impl ToString) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, code, message.to_string())
    }

    fn not_found(code: &'static str, message: impl ToString) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message.to_string())
    }

    fn conflict(code: &'static str, message: impl ToString) -> Self {
        Self::new(StatusCode::CONFLICT, code, message.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(json!({
            "error": self.code,
            "message": self.message,
        }))
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict { .. } => Self::conflict("concurrent_update", e),
            StoreError::AlreadyExists { .. } => Self::conflict("already_exists", e),
            StoreError::Malformed { .. } | StoreError::Backend(_) => {
                tracing::error!(error = %e, "Store failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal server error")
            }
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(_) => Self::not_found("order_not_found", e),
            OrderError::MenuItemNotFound(_) => Self::not_found("menu_item_not_found", e),
            OrderError::EmptyItems | OrderError::InvalidQuantity(_) | OrderError::TotalOverflow => {
                Self::unprocessable("invalid_items", e)
            }
            OrderError::InvalidTransition { .. } => Self::unprocessable("invalid_transition", e),
            OrderError::NoNextStatus(_) => Self::unprocessable("no_next_status", e),
            OrderError::NotInitialized => {
                tracing::error!(error = %e, "Order history is inconsistent");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal server error")
            }
            OrderError::Store(inner) => inner.into(),
        }
    }
}

impl From<DiscountError> for ApiError {
    fn from(e: DiscountError) -> Self {
        match e {
            DiscountError::DuplicateCode(_) => Self::conflict("duplicate_code", e),
            DiscountError::Store(inner) => inner.into(),
            _ => Self::unprocessable("invalid_discount", e),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::DuplicateName(_) => Self::conflict("duplicate_name", e),
            CatalogError::KitchenNotFound(_) => Self::not_found("kitchen_not_found", e),
            CatalogError::MenuItemNotFound(_) => Self::not_found("menu_item_not_found", e),
            CatalogError::EmptyName | CatalogError::NegativePrice(_) => Self::unprocessable("invalid_menu", e),
            CatalogError::Store(inner) => inner.into(),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::UserAlreadyExists(_) => Self::conflict("user_exists", e),
            IdentityError::UserNotFound(_) => Self::not_found("user_not_found", e),
            IdentityError::Store(inner) => inner.into(),
            _ => Self::unprocessable("invalid_user", e),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::NotFound(_) => Self::not_found("transaction_not_found", e),
            LedgerError::Store(inner) => inner.into(),
            _ => Self::unprocessable("invalid_transaction", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderStatus;
    use uuid::Uuid;

    #[test]
    fn test_status_codes() {
        let e: ApiError = OrderError::NotFound(Uuid::new_v4()).into();
        assert_eq!(e.status, StatusCode::NOT_FOUND);

        let e: ApiError = OrderError::InvalidTransition { from: OrderStatus::Placed, to: OrderStatus::Served }.into();
        assert_eq!(e.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.code, "invalid_transition");

        let e: ApiError = OrderError::TotalOverflow.into();
        assert_eq!(e.status, StatusCode::UNPROCESSABLE_ENTITY);

        let e: ApiError = DiscountError::DuplicateCode("X".to_string()).into();
        assert_eq!(e.status, StatusCode::CONFLICT);

        let e: ApiError = OrderError::Store(StoreError::Backend(anyhow::anyhow!("node down"))).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!e.message.contains("node down"));
    }
}
