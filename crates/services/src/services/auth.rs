//! Admin authentication: bcrypt password checks and JWT bearer tokens.

use chrono::{Duration, Utc};
use db::{
    DbPool,
    models::admin_user::{AdminUser, CreateAdminUser, UpdateAdminUser},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Checked against when the username is unknown so both failure paths cost one bcrypt verify.
const TIMING_DUMMY_HASH: &str = "$2a$12$YIuOrmXTivZ54PH2JZrsfOjWO46YnA6DfDE92OwP3xZUBJxSG83C.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("password must be at least 8 characters")]
    WeakPassword,
    #[error("admin account not found")]
    AccountNotFound,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Claims carried by an admin bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Admin user id.
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(secret: &SecretString, token_ttl: Duration, bcrypt_cost: u32) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl,
            bcrypt_cost,
        }
    }

    pub fn issue_token(&self, admin: &AdminUser) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: admin.id.to_string(),
            username: admin.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword);
        }
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_string();
        let hash = hash.to_string();
        Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
    }

    /// Resolve username/password to the admin account. Unknown users and wrong passwords
    /// both yield [`AuthError::InvalidCredentials`].
    pub async fn authenticate(
        &self,
        pool: &DbPool,
        username: &str,
        password: &str,
    ) -> Result<AdminUser, AuthError> {
        let Some(admin) = AdminUser::find_by_username(pool, username).await? else {
            let _ = Self::verify_password(password, TIMING_DUMMY_HASH).await;
            warn!(username, "Login attempt for unknown admin");
            return Err(AuthError::InvalidCredentials);
        };

        match Self::verify_password(password, &admin.password).await {
            Ok(true) => Ok(admin),
            Ok(false) => {
                warn!(username, "Login attempt with wrong password");
                Err(AuthError::InvalidCredentials)
            }
            Err(AuthError::Hash(e)) => {
                warn!(username, error = %e, "Stored admin hash is unreadable");
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => Err(e),
        }
    }

    /// Create the admin account from configuration when none exists yet.
    pub async fn ensure_admin(
        pool: &DbPool,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<AdminUser>, AuthError> {
        if AdminUser::count(pool).await? > 0 {
            return Ok(None);
        }

        let admin = AdminUser::create(
            pool,
            &CreateAdminUser {
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            },
        )
        .await?;
        info!(username = %admin.username, "Bootstrapped admin account");
        Ok(Some(admin))
    }

    /// Change username and/or password after re-checking the current password.
    pub async fn change_credentials(
        &self,
        pool: &DbPool,
        admin_id: i64,
        current_password: &str,
        new_username: Option<String>,
        new_password: Option<String>,
    ) -> Result<AdminUser, AuthError> {
        let admin = AdminUser::find_by_id(pool, admin_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !Self::verify_password(current_password, &admin.password)
            .await
            .unwrap_or(false)
        {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = match new_password {
            Some(password) => Some(self.hash_password(&password).await?),
            None => None,
        };

        let updated = AdminUser::update(
            pool,
            admin_id,
            &UpdateAdminUser {
                username: new_username,
                password_hash,
            },
        )
        .await?
        .ok_or(AuthError::AccountNotFound)?;

        info!(admin_id, username = %updated.username, "Admin credentials updated");
        Ok(updated)
    }

    /// Overwrite the password of `username` without the current one, for operator recovery.
    pub async fn reset_password(
        &self,
        pool: &DbPool,
        username: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let hash = self.hash_password(new_password).await?;
        if AdminUser::update_password(pool, username, &hash).await? == 0 {
            return Err(AuthError::AccountNotFound);
        }
        warn!(username, "Admin password reset");
        Ok(())
    }
}
