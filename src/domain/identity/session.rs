use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::models::{Role, User};

// ============================================================================
// Session Registry
// ============================================================================
//
// Opaque bearer tokens mapped to the signed-in user. Sessions live in process
// memory only. Expired sessions are pruned whenever a new one is issued, and
// an expired token is dropped as soon as it is looked up.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: User,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

pub struct SessionRegistry {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn issue(&self, user: User) -> Session {
        self.issue_at(user, Utc::now()).await
    }

    pub async fn issue_at(&self, user: User, now: DateTime<Utc>) -> Session {
        let session = Session {
            token: uuid::Uuid::new_v4().simple().to_string(),
            role: user.role,
            user,
            expires_at: now + self.ttl,
        };
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, existing| !existing.is_expired_at(now));
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    pub async fn resolve(&self, token: &str) -> Option<Session> {
        self.resolve_at(token, Utc::now()).await
    }

    pub async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let session = self.sessions.read().await.get(token).cloned()?;
        if session.is_expired_at(now) {
            self.sessions.write().await.remove(token);
            return None;
        }
        Some(session)
    }

    /// Returns false when the token was unknown
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "chef@kitchen.in".to_string(),
            role: Role::Kitchen,
            brand_slug: None,
            kitchen_id: Some(Uuid::new_v4()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_issue_and_resolve() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let session = registry.issue(user()).await;

        let resolved = registry.resolve(&session.token).await.unwrap();
        assert_eq!(resolved, session);
        assert_eq!(resolved.role, Role::Kitchen);
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let now = Utc::now();
        let session = registry.issue_at(user(), now).await;

        assert!(registry.resolve_at(&session.token, now + Duration::minutes(29)).await.is_some());
        assert!(registry.resolve_at(&session.token, now + Duration::minutes(31)).await.is_none());
        // Gone for good, even at an earlier clock
        assert!(registry.resolve_at(&session.token, now).await.is_none());
    }

    #[tokio::test]
    async fn test_revoke() {
        let registry = SessionRegistry::new(Duration::minutes(5));
        let session = registry.issue(user()).await;

        assert!(registry.revoke(&session.token).await);
        assert!(!registry.revoke(&session.token).await);
        assert!(registry.resolve(&session.token).await.is_none());
    }

    #[tokio::test]
    async fn test_issue_prunes_expired_sessions() {
        let registry = SessionRegistry::new(Duration::minutes(30));
        let now = Utc::now();
        let stale = registry.issue_at(user(), now).await;
        let fresh = registry.issue_at(user(), now + Duration::minutes(10)).await;

        // Never resolved again, yet gone once a later sign-in happens
        let latest = registry.issue_at(user(), now + Duration::minutes(31)).await;

        let sessions = registry.sessions.read().await;
        assert!(!sessions.contains_key(&stale.token));
        assert!(sessions.contains_key(&fresh.token));
        assert!(sessions.contains_key(&latest.token));
        assert_eq!(sessions.len(), 2);
    }
}
