//! Authentication handlers

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use shared::User;

use crate::error::AppResult;
use crate::extract::{JsonPayload, PathParam};
use crate::external::MailClient;
use crate::handlers::MessageResponse;
use crate::middleware::CurrentUser;
use crate::services::auth::{RegisterInput, SESSION_COOKIE};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    payload: JsonPayload,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    payload.require(&["name", "email", "password", "role"])?;
    let input: RegisterInput = payload.parse()?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    auth_service.register(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}

/// Login endpoint handler; the session token is returned as an HttpOnly cookie
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: JsonPayload,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    payload.require(&["email", "password"])?;
    let body: LoginRequest = payload.parse()?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let (user, token) = auth_service.login(&body.email, &body.password).await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(auth_service.token_expiry()))
        .build();

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Logged in successfully",
            user,
        }),
    ))
}

/// Logout endpoint handler
pub async fn logout(jar: CookieJar, current_user: CurrentUser) -> (CookieJar, Json<MessageResponse>) {
    tracing::info!(user_id = current_user.0.user_id, "user logged out");
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// Profile of the logged-in user
pub async fn profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<User>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service.profile(current_user.0.user_id).await?;
    Ok(Json(user))
}

/// Email a reset link. The response is the same whether or not the address is registered.
pub async fn forgot_password(
    State(state): State<AppState>,
    payload: JsonPayload,
) -> AppResult<Json<MessageResponse>> {
    payload.require(&["email"])?;
    let body: ForgotPasswordRequest = payload.parse()?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    if let Some((user, token)) = auth_service.create_reset_token(&body.email).await? {
        let link = format!(
            "{}/{}",
            state.config.mail.reset_url_base.trim_end_matches('/'),
            token
        );
        let mail = MailClient::new(&state.config.mail);
        if let Err(e) = mail.send_password_reset(&user.email, &link).await {
            tracing::error!(user_id = user.id, "Failed to send password reset mail: {}", e);
        }
    }

    Ok(Json(MessageResponse::new(
        "If an account exists for that email, a password reset link has been sent",
    )))
}

/// Set a new password with a reset token
pub async fn reset_password(
    State(state): State<AppState>,
    PathParam(token): PathParam<String>,
    payload: JsonPayload,
) -> AppResult<Json<MessageResponse>> {
    payload.require(&["password"])?;
    let body: ResetPasswordRequest = payload.parse()?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    auth_service.reset_password(&token, &body.password).await?;

    Ok(Json(MessageResponse::new("Your password has been reset")))
}
