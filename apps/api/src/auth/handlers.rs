use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::session::{CurrentSession, Session};
use crate::auth::users::NewUser;
use crate::errors::AppError;
use crate::models::user::{JobSeekerInfo, User, UserType};
use crate::state::AppState;
use crate::validation::{
    is_valid_email, is_valid_password, password_strength, StrengthLabel, ValidationErrorMap,
};

pub const PASSWORD_POLICY_MESSAGE: &str =
    "Password must be at least 8 characters with upper and lower case letters, a number and a special character";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    pub user_type: UserType,
    pub job_seeker_info: Option<JobSeekerInfo>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct PasswordStrengthRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordStrengthResponse {
    pub score: u8,
    pub label: StrengthLabel,
    pub meets_policy: bool,
}

/// Field checks for the registration form. One message per field, first failure wins.
pub fn validate_registration(req: &RegisterRequest) -> ValidationErrorMap {
    let mut errors = ValidationErrorMap::new();

    if req.name.trim().is_empty() {
        errors.insert("name", "Name is required");
    }

    if req.email.is_empty() {
        errors.insert("email", "Email is required");
    } else if !is_valid_email(&req.email) {
        errors.insert("email", "Please enter a valid email address");
    }

    if req.password.is_empty() {
        errors.insert("password", "Password is required");
    } else if !is_valid_password(&req.password) {
        errors.insert("password", PASSWORD_POLICY_MESSAGE);
    }

    if req.password != req.confirm_password {
        errors.insert("confirmPassword", "Passwords do not match");
    }

    errors
}

async fn open_session(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let session = Session::issue(user);
    state.tokens.store(&session).await?;
    Ok(AuthResponse {
        token: session.token,
        user: session.user,
    })
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validate_registration(&req)
        .into_result()
        .map_err(AppError::InvalidFields)?;

    let user = state
        .users
        .register(NewUser {
            name: req.name.trim().to_string(),
            email: req.email,
            password: req.password,
            user_type: req.user_type,
            job_seeker_info: req.job_seeker_info,
        })
        .await?;
    let response = open_session(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let Some(user) = state.users.authenticate(&req.email, &req.password).await else {
        warn!("Failed login attempt");
        return Err(AppError::InvalidCredentials);
    };
    info!("User {} logged in as {:?}", user.id, user.user_type);
    Ok(Json(open_session(&state, user).await?))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Result<StatusCode, AppError> {
    state.tokens.revoke(&session.token).await?;
    info!("User {} logged out", session.user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
pub async fn handle_me(CurrentSession(session): CurrentSession) -> Json<User> {
    Json(session.user)
}

/// POST /api/v1/auth/password-strength
pub async fn handle_password_strength(
    Json(req): Json<PasswordStrengthRequest>,
) -> Json<PasswordStrengthResponse> {
    let score = password_strength(&req.password);
    Json(PasswordStrengthResponse {
        score,
        label: StrengthLabel::from_score(score),
        meets_policy: is_valid_password(&req.password),
    })
}
