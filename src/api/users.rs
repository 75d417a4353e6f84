//! Account registration, gated by the bootstrap admin key.

use actix_web::{HttpResponse, post, web};
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::auth::AdminGate;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{CreateUserRequest, CreateUserResponse};
use crate::services::access_token;

/// Register an account and issue its personal access token.
///
/// The token is returned exactly once; only its SHA-256 hash is stored.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = CreateUserResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 401, description = "Missing or invalid admin key", body = crate::error::ErrorResponse)
    ),
    security(("admin_key" = []))
)]
#[post("/users")]
pub async fn create_user(
    _gate: AdminGate,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidInput("A valid email is required".to_string()));
    }
    if req.first_name.trim().is_empty() || req.last_name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "first_name and last_name are required".to_string(),
        ));
    }

    if db::users::find_by_email(db.get_ref(), &email).await?.is_some() {
        return Err(AppError::InvalidInput(format!(
            "Email {} is already registered",
            email
        )));
    }

    let user = db::users::insert(
        db.get_ref(),
        &email,
        req.first_name.trim(),
        req.last_name.trim(),
        req.role,
        req.rut.as_deref(),
    )
    .await?;

    let token = access_token::issue(db.get_ref(), user.id).await?;

    info!(user_id = %user.id, role = %req.role, "Account created");

    Ok(HttpResponse::Created().json(CreateUserResponse {
        user_id: user.id,
        email: user.email,
        role: req.role,
        access_token: token,
    }))
}

/// Revoke every live access token of an account.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/revoke-tokens",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Tokens revoked"),
        (status = 401, description = "Missing or invalid admin key", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    ),
    security(("admin_key" = []))
)]
#[post("/users/{id}/revoke-tokens")]
pub async fn revoke_tokens(
    _gate: AdminGate,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let user_id = uuid::Uuid::parse_str(&path.into_inner())?;

    db::users::find_by_id(db.get_ref(), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;

    let revoked = db::access_tokens::revoke_all_for_user(db.get_ref(), user_id).await?;

    info!(user_id = %user_id, revoked, "Access tokens revoked");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "revoked": revoked })))
}

/// Configure user management routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_user).service(revoke_tokens);
}
