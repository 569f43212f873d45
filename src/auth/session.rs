//! # Session Management
//!
//! Sessions issued by a successful login.
//!
//! The raw token goes to the client as a cookie value; only its SHA-256
//! digest is stored. Updating a password revokes every session of that
//! account.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::crypto::{generate_token, hash_token};
use super::errors::{AuthError, AuthResult};

/// Session model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: Uuid,

    /// User this session belongs to
    pub user_id: Uuid,

    /// Hashed session token (raw token given to client)
    #[serde(skip_serializing)]
    pub token_hash: String,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the session expires
    pub expires_at: DateTime<Utc>,

    /// Whether the session has been revoked
    pub revoked: bool,
}

/// Session lifetimes
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Lifetime of an ordinary session
    pub ttl: Duration,

    /// Lifetime when the user asked to be remembered
    pub remember_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(12),
            remember_ttl: Duration::days(30),
        }
    }
}

impl SessionConfig {
    /// Lifetime for a login with the given `remember` choice
    pub fn ttl_for(&self, remember: bool) -> Duration {
        if remember {
            self.remember_ttl
        } else {
            self.ttl
        }
    }
}

/// Session manager handles session creation and validation
pub struct SessionManager {
    config: SessionConfig,
    repository: Box<dyn SessionRepository>,
}

impl SessionManager {
    pub fn new(config: SessionConfig, repository: Box<dyn SessionRepository>) -> Self {
        Self { config, repository }
    }

    /// Session manager backed by memory
    pub fn in_memory(config: SessionConfig) -> Self {
        Self::new(config, Box::new(InMemorySessionRepository::new()))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Create a new session for a user
    ///
    /// Returns the raw token (not hashed) to give to the client.
    pub fn create_session(&self, user_id: Uuid, remember: bool) -> AuthResult<(Session, String)> {
        let token = generate_token();
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            token_hash: hash_token(&token),
            created_at: now,
            expires_at: now + self.config.ttl_for(remember),
            revoked: false,
        };

        self.repository.create(&session)?;

        Ok((session, token))
    }

    /// Validate a raw token and return the associated session
    pub fn validate(&self, token: &str) -> AuthResult<Session> {
        let session = self
            .repository
            .find_by_token_hash(&hash_token(token))?
            .ok_or(AuthError::SessionInvalid)?;

        if session.revoked || session.expires_at < Utc::now() {
            return Err(AuthError::SessionInvalid);
        }

        Ok(session)
    }

    /// Revoke all sessions for a user, returning how many were live
    pub fn revoke_all_user_sessions(&self, user_id: Uuid) -> AuthResult<usize> {
        self.repository.revoke_all_for_user(user_id)
    }
}

/// Session repository trait
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find session by token hash
    fn find_by_token_hash(&self, hash: &str) -> AuthResult<Option<Session>>;

    /// Revoke all sessions for a user
    fn revoke_all_for_user(&self, user_id: Uuid) -> AuthResult<usize>;
}

/// In-memory session repository
///
/// Sessions are keyed by token digest. Expired and revoked sessions are
/// dropped whenever a new one is stored.
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions currently held, live or not
    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> AuthError {
    AuthError::StorageError("Lock poisoned".to_string())
}

impl SessionRepository for InMemorySessionRepository {
    fn create(&self, session: &Session) -> AuthResult<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        sessions.retain(|_, s| !s.revoked && s.expires_at > now);
        sessions.insert(session.token_hash.clone(), session.clone());
        Ok(())
    }

    fn find_by_token_hash(&self, hash: &str) -> AuthResult<Option<Session>> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        Ok(sessions.get(hash).cloned())
    }

    fn revoke_all_for_user(&self, user_id: Uuid) -> AuthResult<usize> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;

        let mut revoked = 0;
        for session in sessions
            .values_mut()
            .filter(|s| s.user_id == user_id && !s.revoked)
        {
            session.revoked = true;
            revoked += 1;
        }

        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_manager() -> SessionManager {
        SessionManager::in_memory(SessionConfig::default())
    }

    #[test]
    fn test_session_lifetime_follows_remember() {
        let manager = create_manager();
        let user_id = Uuid::new_v4();

        let (short, _) = manager.create_session(user_id, false).unwrap();
        let (long, _) = manager.create_session(user_id, true).unwrap();

        assert_eq!(short.expires_at - short.created_at, Duration::hours(12));
        assert_eq!(long.expires_at - long.created_at, Duration::days(30));
    }

    #[test]
    fn test_token_validation() {
        let manager = create_manager();
        let user_id = Uuid::new_v4();

        let (session, token) = manager.create_session(user_id, false).unwrap();
        assert_eq!(manager.validate(&token).unwrap().id, session.id);
        assert_eq!(
            manager.validate("invalid_token").unwrap_err(),
            AuthError::SessionInvalid
        );
    }

    #[test]
    fn test_revoke_all_user_sessions() {
        let manager = create_manager();
        let user_id = Uuid::new_v4();
        let other = Uuid::new_v4();

        let (_, token1) = manager.create_session(user_id, false).unwrap();
        let (_, token2) = manager.create_session(user_id, true).unwrap();
        let (_, kept) = manager.create_session(other, false).unwrap();

        assert_eq!(manager.revoke_all_user_sessions(user_id).unwrap(), 2);
        assert!(manager.validate(&token1).is_err());
        assert!(manager.validate(&token2).is_err());
        assert!(manager.validate(&kept).is_ok());
        assert_eq!(manager.revoke_all_user_sessions(user_id).unwrap(), 0);
    }

    #[test]
    fn test_dead_sessions_dropped_on_create() {
        let repository = InMemorySessionRepository::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let session = |token: &str, expires_at: DateTime<Utc>| Session {
            id: Uuid::new_v4(),
            user_id,
            token_hash: hash_token(token),
            created_at: now,
            expires_at,
            revoked: false,
        };

        repository.create(&session("expired", now - Duration::minutes(1))).unwrap();
        repository.create(&session("revoked", now + Duration::hours(1))).unwrap();
        repository.revoke_all_for_user(user_id).unwrap();
        assert_eq!(repository.len(), 2);

        repository.create(&session("fresh", now + Duration::hours(1))).unwrap();
        assert_eq!(repository.len(), 1);
        assert!(repository
            .find_by_token_hash(&hash_token("fresh"))
            .unwrap()
            .is_some());
    }
}
