use argon2::{ Argon2, PasswordHash, PasswordHasher, PasswordVerifier };
use argon2::password_hash::{ SaltString, rand_core::OsRng };
use chrono::{ DateTime, Duration, Utc };
use sea_orm::SqlErr;
use serde::{ Deserialize, Serialize };
use sha2::{ Digest, Sha256 };
use std::sync::Arc;

use crate::db::entity::{ session, user };
use crate::db::UserRepository;
use crate::error::{ AppError, Result };
use crate::services::settings_service::validate_email;

const MIN_PASSWORD_LEN: usize = 6;
const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Returned on sign-up and sign-in. `token` is shown exactly once.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: user::Model,
    pub expires_at: DateTime<Utc>,
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn generate_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e|
        AppError::Internal(format!("Invalid password hash: {}", e))
    )?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

fn already_registered() -> AppError {
    AppError::InvalidInput("User already registered".to_string())
}

/// A concurrent sign-up can slip past the lookup and hit the unique index
/// on `users.email` instead; report that the same way.
fn map_duplicate_user(err: AppError) -> AppError {
    if let AppError::Database(db_err) = &err {
        if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            return already_registered();
        }
    }
    err
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid login credentials".to_string())
}

pub struct AuthService {
    repository: Arc<UserRepository>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(repository: Arc<UserRepository>, session_ttl_hours: i64) -> Self {
        Self {
            repository,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    pub async fn sign_up(&self, credentials: Credentials) -> Result<AuthSession> {
        let email = credentials.email.trim().to_lowercase();
        validate_email(&email)?;

        if credentials.password.len() < MIN_PASSWORD_LEN {
            return Err(
                AppError::InvalidInput("Password should be at least 6 characters".to_string())
            );
        }

        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(already_registered());
        }

        let password_hash = hash_password(&credentials.password)?;
        let user = self.repository
            .create_user(email, password_hash).await
            .map_err(map_duplicate_user)?;
        tracing::info!(user_id = %user.id, "User registered");

        self.open_session(user).await
    }

    pub async fn sign_in(&self, credentials: Credentials) -> Result<AuthSession> {
        let email = credentials.email.trim().to_lowercase();

        let user = self.repository.find_by_email(&email).await?.ok_or_else(invalid_credentials)?;
        if !verify_password(&credentials.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Rejected sign-in with wrong password");
            return Err(invalid_credentials());
        }

        let purged = self.repository.delete_expired_sessions(Utc::now()).await?;
        if purged > 0 {
            tracing::debug!("Purged {} expired sessions", purged);
        }

        self.open_session(user).await
    }

    /// Ends the session for `token`. Unknown tokens are ignored.
    pub async fn sign_out(&self, token: &str) -> Result<()> {
        self.repository.delete_session(&hash_token(token)).await
    }

    pub async fn get_session(&self, token: &str) -> Result<Option<session::Model>> {
        let session = self.repository.find_session(&hash_token(token)).await?;
        Ok(session.filter(|s| s.expires_at > Utc::now()))
    }

    pub async fn get_current_user(&self, token: &str) -> Result<Option<user::Model>> {
        match self.get_session(token).await? {
            Some(session) => self.repository.find_by_id(session.user_id).await,
            None => Ok(None),
        }
    }

    async fn open_session(&self, user: user::Model) -> Result<AuthSession> {
        let token = generate_token();
        let expires_at = Utc::now() + self.session_ttl;
        self.repository.create_session(user.id, hash_token(&token), expires_at).await?;

        Ok(AuthSession {
            token,
            user,
            expires_at,
        })
    }
}
