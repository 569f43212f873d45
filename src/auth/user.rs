//! # User Accounts
//!
//! Account model and repository used by the auth features.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use uuid::Uuid;

use super::crypto::{hash_password, verify_password};
use super::errors::{AuthError, AuthResult};

/// Portal role, decides where a user lands after login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Client => "client",
        }
    }

    /// Dashboard route for this role
    pub fn dashboard_route(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Client => "/client/dashboard",
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,

    /// Contact email (unique, compared case-insensitively)
    pub email: String,

    /// Portal role
    pub role: Role,

    /// Company given at signup
    #[serde(default)]
    pub company_name: Option<String>,

    /// Whether email has been confirmed
    pub email_verified: bool,

    /// Argon2id password hash (never plaintext)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an account with a freshly hashed password
    pub fn new(email: impl Into<String>, password: &str, role: Role) -> AuthResult<Self> {
        let password_hash = hash_password(password)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            email: email.into(),
            role,
            company_name: None,
            email_verified: false,
            password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    /// Attach the company named at signup
    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = Some(company_name.into());
        self
    }

    /// Verify a password against this user's stored hash
    pub fn verify_password(&self, password: &str) -> AuthResult<bool> {
        verify_password(password, &self.password_hash)
    }

    /// Replace the password
    pub fn set_password(&mut self, new_password: &str) -> AuthResult<()> {
        self.password_hash = hash_password(new_password)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Mark email as confirmed
    pub fn verify_email(&mut self) {
        self.email_verified = true;
        self.updated_at = Utc::now();
    }
}

/// User repository trait
///
/// Abstracts storage operations for accounts.
pub trait UserRepository: Send + Sync {
    /// Find an account by id
    fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>>;

    /// Find an account by email
    fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Create a new account
    fn create(&self, user: &User) -> AuthResult<()>;

    /// Update an existing account
    fn update(&self, user: &User) -> AuthResult<()>;
}

/// In-memory user repository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> AuthError {
    AuthError::StorageError("Lock poisoned".to_string())
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let users = self.users.read().map_err(|_| poisoned())?;
        Ok(users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().map_err(|_| poisoned())?;

        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(AuthError::EmailAlreadyExists);
        }

        users.push(user.clone());
        Ok(())
    }

    fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().map_err(|_| poisoned())?;

        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AuthError::AccountNotFound),
        }
    }
}
