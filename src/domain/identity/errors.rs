use crate::models::Role;
use crate::store::StoreError;

// ============================================================================
// Identity Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Role {} cannot be assigned by an admin", .0.as_str())]
    RoleNotAssignable(Role),

    #[error("User already exists: {0}")]
    UserAlreadyExists(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
