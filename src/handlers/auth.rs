// src/handlers/auth.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, User, UserDirectory},
    utils::jwt::sign_jwt,
};

/// Logs a user in and returns a JWT token.
///
/// The e-mail selects one of the known users; the password is not checked.
pub async fn login(
    State(users): State<Arc<UserDirectory>>,
    State(config): State<Config>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = users
        .find_by_email(&payload.email)
        .ok_or(AppError::AuthError("User not found".to_string()))?;

    let token = sign_jwt(user, &config.jwt_secret, config.jwt_expiration)?;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "user logged in");

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "user": user
    })))
}

/// Returns the current user.
pub async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
