//! Authentication service for registration, login and password reset

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use shared::{validate_email, Role, User};
use sqlx::PgPool;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, phone_number, address, created_at";

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    token_expiry: i64,
    reset_token_expiry: i64,
}

/// Input for registering a user account
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Session token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // User ID
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Issue a signed session token for `user`
pub fn issue_session_token(user: &User, secret: &str, expiry_secs: i64) -> AppResult<String> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Decode and validate a session token
pub fn decode_session_token(token: &str, secret: &str) -> AppResult<SessionClaims> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

// ============================================================================
// Password reset tokens
// ============================================================================
//
// Format: base64url("{user_id}:{expires_at}") "." base64url(HMAC-SHA256)
// The MAC covers the payload and the user's current password hash, so a
// token stops verifying as soon as it has been used to change the password.

type HmacSha256 = Hmac<Sha256>;

fn reset_mac(secret: &str, payload: &str, password_hash: &str) -> AppResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Internal("Failed to create HMAC".to_string()))?;
    mac.update(payload.as_bytes());
    mac.update(b".");
    mac.update(password_hash.as_bytes());
    Ok(mac)
}

/// Sign a reset token for `user_id` valid until `expires_at` (unix seconds)
pub fn sign_reset_token(
    secret: &str,
    user_id: i64,
    password_hash: &str,
    expires_at: i64,
) -> AppResult<String> {
    let payload = format!("{}:{}", user_id, expires_at);
    let signature = reset_mac(secret, &payload, password_hash)?.finalize().into_bytes();
    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(payload.as_bytes()),
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Decoded, not yet verified, reset token
#[derive(Debug, PartialEq, Eq)]
pub struct ResetTokenClaims {
    pub user_id: i64,
    pub expires_at: i64,
}

/// Read the user and expiry out of a reset token without checking the signature
pub fn parse_reset_token(token: &str) -> AppResult<ResetTokenClaims> {
    let (payload, _) = token.split_once('.').ok_or(AppError::InvalidResetToken)?;
    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or(AppError::InvalidResetToken)?;

    let (user_id, expires_at) = payload.split_once(':').ok_or(AppError::InvalidResetToken)?;
    Ok(ResetTokenClaims {
        user_id: user_id.parse().map_err(|_| AppError::InvalidResetToken)?,
        expires_at: expires_at.parse().map_err(|_| AppError::InvalidResetToken)?,
    })
}

/// Check signature and expiry against the user's current password hash
pub fn verify_reset_token(
    secret: &str,
    token: &str,
    password_hash: &str,
    now: i64,
) -> AppResult<ResetTokenClaims> {
    let claims = parse_reset_token(token)?;
    if claims.expires_at < now {
        return Err(AppError::InvalidResetToken);
    }

    let (payload, signature) = token.split_once('.').ok_or(AppError::InvalidResetToken)?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| AppError::InvalidResetToken)?;
    let payload = URL_SAFE_NO_PAD
        .decode(payload)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or(AppError::InvalidResetToken)?;

    reset_mac(secret, &payload, password_hash)?
        .verify_slice(&signature)
        .map_err(|_| AppError::InvalidResetToken)?;

    Ok(claims)
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            token_expiry: config.jwt.token_expiry,
            reset_token_expiry: config.mail.reset_token_expiry,
        }
    }

    /// Session lifetime in seconds, used for the cookie max-age
    pub fn token_expiry(&self) -> i64 {
        self.token_expiry
    }

    /// Register a new user account
    pub async fn register(&self, input: RegisterInput) -> AppResult<User> {
        let role = input.role.parse::<Role>()?;
        validate_email(&input.email)?;
        if input.password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, phone_number, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(role)
        .bind(&input.phone_number)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::on_unique_violation(e, "Email already exists"))?;

        tracing::info!(user_id = user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Authenticate with email and password, returning the user and a session token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(User, String)> {
        let user = self
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = issue_session_token(&user, &self.jwt_secret, self.token_expiry)?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok((user, token))
    }

    /// Load the profile of the authenticated user
    pub async fn profile(&self, user_id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Create a reset token for `email`. `None` when no account uses the address.
    pub async fn create_reset_token(&self, email: &str) -> AppResult<Option<(User, String)>> {
        let Some(user) = self.find_by_email(email).await? else {
            tracing::debug!("password reset requested for unknown address");
            return Ok(None);
        };

        let expires_at = (Utc::now() + Duration::seconds(self.reset_token_expiry)).timestamp();
        let token = sign_reset_token(&self.jwt_secret, user.id, &user.password_hash, expires_at)?;
        Ok(Some((user, token)))
    }

    /// Replace the password of the user named by a valid reset token
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AppResult<()> {
        if new_password.is_empty() {
            return Err(AppError::Validation("Password must not be empty".to_string()));
        }

        let claims = parse_reset_token(token)?;
        let current_hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE id = $1",
        )
        .bind(claims.user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidResetToken)?;

        verify_reset_token(&self.jwt_secret, token, &current_hash, Utc::now().timestamp())?;

        let password_hash = hash_password(new_password)?;
        // Only the hash the token was checked against may be replaced
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1 WHERE id = $2 AND password_hash = $3",
        )
        .bind(&password_hash)
        .bind(claims.user_id)
        .bind(&current_hash)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(user_id = claims.user_id, "reset token already consumed");
            return Err(AppError::InvalidResetToken);
        }

        tracing::info!(user_id = claims.user_id, "password reset");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

/// Hash a password with bcrypt
pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}
