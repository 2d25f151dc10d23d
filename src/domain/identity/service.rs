use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::errors::IdentityError;
use super::session::{Session, SessionRegistry};
use crate::models::{Role, User};
use crate::store::{Store, StoreError};

// ============================================================================
// Identity Service
// ============================================================================
//
// Admins invite SUPER_ADMIN and KITCHEN users; customers sign up themselves.
// Sessions are issued by email lookup only, credentials are verified
// elsewhere.
//
// ============================================================================

/// Admin invite payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpsert {
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub brand_slug: Option<String>,
    #[serde(default)]
    pub kitchen_id: Option<Uuid>,
}

pub struct IdentityService {
    store: Arc<dyn Store>,
    sessions: SessionRegistry,
}

impl IdentityService {
    pub fn new(store: Arc<dyn Store>, sessions: SessionRegistry) -> Self {
        Self { store, sessions }
    }

    /// Create the user or patch role and binding of an existing one
    pub async fn upsert_user(&self, upsert: UserUpsert) -> Result<User, IdentityError> {
        if upsert.role == Role::Customer {
            return Err(IdentityError::RoleNotAssignable(upsert.role));
        }
        let email = normalize_email(&upsert.email)?;

        if let Some(mut user) = self.store.find_user_by_email(&email).await? {
            user.role = upsert.role;
            user.brand_slug = upsert.brand_slug;
            user.kitchen_id = upsert.kitchen_id;
            self.store.update_user(&user).await?;
            tracing::info!(user_id = %user.id, role = user.role.as_str(), "User updated");
            return Ok(user);
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            role: upsert.role,
            brand_slug: upsert.brand_slug,
            kitchen_id: upsert.kitchen_id,
            created_at: Utc::now(),
        };
        match self.store.insert_user(&user).await {
            Ok(()) => {}
            // Lost a race with a concurrent invite; the patch wins
            Err(StoreError::AlreadyExists { .. }) => self.store.update_user(&user).await?,
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User invited");
        Ok(user)
    }

    pub async fn find_user(&self, email: &str) -> Result<Option<User>, IdentityError> {
        let email = normalize_email(email)?;
        Ok(self.store.find_user_by_email(&email).await?)
    }

    /// Register a new customer account
    pub async fn sign_up(&self, email: &str) -> Result<User, IdentityError> {
        let email = normalize_email(email)?;
        let user = User {
            id: Uuid::new_v4(),
            email,
            role: Role::Customer,
            brand_slug: None,
            kitchen_id: None,
            created_at: Utc::now(),
        };

        match self.store.insert_user(&user).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists { .. }) => return Err(IdentityError::UserAlreadyExists(user.email)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(user_id = %user.id, "👤 Customer signed up");
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str) -> Result<Session, IdentityError> {
        let email = normalize_email(email)?;
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(IdentityError::UserNotFound(email))?;

        let session = self.sessions.issue(user).await;
        tracing::info!(user_id = %session.user.id, role = session.role.as_str(), "Session issued");
        Ok(session)
    }

    /// Returns false when the token was unknown or already expired
    pub async fn sign_out(&self, token: &str) -> bool {
        let revoked = self.sessions.revoke(token).await;
        tracing::debug!(revoked, "Sign out");
        revoked
    }

    pub async fn current_session(&self, token: &str) -> Option<Session> {
        self.sessions.resolve(token).await
    }
}

/// Emails are compared trimmed and lowercased
fn normalize_email(email: &str) -> Result<String, IdentityError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(IdentityError::EmptyEmail);
    }
    if !email.contains('@') {
        return Err(IdentityError::InvalidEmail(email));
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn service() -> IdentityService {
        IdentityService::new(Arc::new(MemoryStore::new()), SessionRegistry::new(Duration::minutes(60)))
    }

    fn invite(email: &str, role: Role) -> UserUpsert {
        UserUpsert { email: email.to_string(), role, brand_slug: None, kitchen_id: None }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_patches() {
        let service = service();
        let created = service.upsert_user(invite("ops@booms.in", Role::SuperAdmin)).await.unwrap();

        let kitchen = Uuid::new_v4();
        let mut patch = invite("OPS@booms.in", Role::Kitchen);
        patch.kitchen_id = Some(kitchen);
        let patched = service.upsert_user(patch).await.unwrap();

        assert_eq!(patched.id, created.id);
        assert_eq!(patched.role, Role::Kitchen);
        assert_eq!(patched.kitchen_id, Some(kitchen));

        let found = service.find_user("ops@booms.in").await.unwrap().unwrap();
        assert_eq!(found, patched);
    }

    #[tokio::test]
    async fn test_upsert_rejects_customer_role_and_bad_email() {
        let service = service();

        assert!(matches!(
            service.upsert_user(invite("a@b.in", Role::Customer)).await,
            Err(IdentityError::RoleNotAssignable(Role::Customer))
        ));
        assert!(matches!(
            service.upsert_user(invite("not-an-email", Role::Kitchen)).await,
            Err(IdentityError::InvalidEmail(_))
        ));
        assert!(matches!(
            service.upsert_user(invite("  ", Role::Kitchen)).await,
            Err(IdentityError::EmptyEmail)
        ));
    }

    #[tokio::test]
    async fn test_sign_up_sign_in_sign_out() {
        let service = service();
        let user = service.sign_up("hungry@mail.in").await.unwrap();
        assert_eq!(user.role, Role::Customer);

        assert!(matches!(
            service.sign_up("hungry@mail.in").await,
            Err(IdentityError::UserAlreadyExists(_))
        ));

        let session = service.sign_in("hungry@mail.in").await.unwrap();
        assert_eq!(session.user.id, user.id);

        let current = service.current_session(&session.token).await.unwrap();
        assert_eq!(current.role, Role::Customer);

        assert!(service.sign_out(&session.token).await);
        assert!(service.current_session(&session.token).await.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_unknown_user() {
        let service = service();
        assert!(matches!(
            service.sign_in("ghost@mail.in").await,
            Err(IdentityError::UserNotFound(_))
        ));
    }
}
