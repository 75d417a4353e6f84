//! Reviewer endpoints: work queue, ficha detail, decisions and outcomes.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::TokenAuth;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{
    DocumentDecisionRequest, FieldDecisionRequest, FinalizeRequest, ObserveRequest, StatusResponse,
};
use crate::services::notify::ReviewNotifier;
use crate::services::{finalize, review};

fn require_reviewer(auth: &TokenAuth) -> AppResult<()> {
    if auth.user.role.can_review() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Review endpoints require the REVIEWER or ADMIN role".to_string(),
        ))
    }
}

/// Fichas waiting for review, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/review/queue",
    tag = "Review",
    responses(
        (status = 200, description = "Pending fichas", body = Vec<crate::models::FichaSummary>),
        (status = 403, description = "Caller cannot review", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[get("/review/queue")]
pub async fn queue(auth: TokenAuth, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    require_reviewer(&auth)?;
    let fichas = review::queue(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(fichas))
}

/// Full detail of one ficha for the review screen.
#[utoipa::path(
    get,
    path = "/api/v1/review/fichas/{id}",
    tag = "Review",
    params(
        ("id" = Uuid, Path, description = "Ficha id")
    ),
    responses(
        (status = 200, description = "Ficha detail", body = crate::models::FichaDetail),
        (status = 404, description = "Ficha not found", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[get("/review/fichas/{id}")]
pub async fn detail(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    require_reviewer(&auth)?;
    let ficha_id = Uuid::parse_str(&path.into_inner())?;
    let detail = review::detail(db.get_ref(), ficha_id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// Record a verdict on one field. Decisions upsert by (ficha, field_key).
#[utoipa::path(
    post,
    path = "/api/v1/review/fichas/{id}/fields",
    tag = "Review",
    params(
        ("id" = Uuid, Path, description = "Ficha id")
    ),
    request_body = FieldDecisionRequest,
    responses(
        (status = 204, description = "Decision recorded"),
        (status = 409, description = "Ficha does not accept decisions", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[post("/review/fichas/{id}/fields")]
pub async fn decide_field(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    body: web::Json<FieldDecisionRequest>,
) -> AppResult<HttpResponse> {
    require_reviewer(&auth)?;
    let ficha_id = Uuid::parse_str(&path.into_inner())?;
    let req = body.into_inner();
    review::decide_field(
        db.get_ref(),
        ficha_id,
        auth.user.id,
        &req.section,
        &req.field_key,
        req.status,
        req.notes.as_deref(),
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Record a verdict on a document.
#[utoipa::path(
    post,
    path = "/api/v1/review/documents/{id}",
    tag = "Review",
    params(
        ("id" = Uuid, Path, description = "Document id")
    ),
    request_body = DocumentDecisionRequest,
    responses(
        (status = 204, description = "Decision recorded"),
        (status = 400, description = "ATTACHED is not a verdict", body = crate::error::ErrorResponse),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[post("/review/documents/{id}")]
pub async fn decide_document(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    body: web::Json<DocumentDecisionRequest>,
) -> AppResult<HttpResponse> {
    require_reviewer(&auth)?;
    let document_id = Uuid::parse_str(&path.into_inner())?;
    let req = body.into_inner();
    review::decide_document(
        db.get_ref(),
        document_id,
        auth.user.id,
        req.status,
        req.notes.as_deref(),
    )
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// One entry of a document's review audit trail.
#[derive(Serialize, ToSchema)]
pub struct DocumentReviewLogEntry {
    pub old_status: Option<String>,
    pub new_status: String,
    pub notes: Option<String>,
    pub reviewed_by: Uuid,
    pub reviewed_at: DateTime<Utc>,
}

/// Audit trail of a document's review decisions, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/review/documents/{id}/log",
    tag = "Review",
    params(
        ("id" = Uuid, Path, description = "Document id")
    ),
    responses(
        (status = 200, description = "Review trail", body = Vec<DocumentReviewLogEntry>),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[get("/review/documents/{id}/log")]
pub async fn document_log(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    require_reviewer(&auth)?;
    let document_id = Uuid::parse_str(&path.into_inner())?;

    crate::db::documents::find_by_id(db.get_ref(), document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {}", document_id)))?;

    let entries: Vec<DocumentReviewLogEntry> =
        crate::db::documents::list_review_log(db.get_ref(), document_id)
            .await?
            .into_iter()
            .map(|row| DocumentReviewLogEntry {
                old_status: row.old_status,
                new_status: row.new_status,
                notes: row.notes,
                reviewed_by: row.reviewed_by,
                reviewed_at: row.reviewed_at,
            })
            .collect();

    Ok(HttpResponse::Ok().json(entries))
}

/// Finalize the review round: APPROVED when no field is NOT_OK, REJECTED
/// otherwise. Idempotent on already finalized fichas.
#[utoipa::path(
    post,
    path = "/api/v1/review/fichas/{id}/finalize",
    tag = "Review",
    params(
        ("id" = Uuid, Path, description = "Ficha id")
    ),
    request_body = FinalizeRequest,
    responses(
        (status = 200, description = "Outcome recorded", body = StatusResponse),
        (status = 409, description = "Ficha cannot be finalized", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[post("/review/fichas/{id}/finalize")]
pub async fn finalize_review(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Box<dyn ReviewNotifier>>,
    config: web::Data<Config>,
    path: web::Path<String>,
    body: web::Json<FinalizeRequest>,
) -> AppResult<HttpResponse> {
    require_reviewer(&auth)?;
    let ficha_id = Uuid::parse_str(&path.into_inner())?;
    let status = finalize::finalize(
        db.get_ref(),
        notifier.get_ref().as_ref(),
        &config.dashboard_url,
        ficha_id,
        auth.user.id,
        body.global_notes.as_deref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(StatusResponse { ficha_id, status }))
}

/// Explicit approval, additionally requiring every document REVIEWED_OK.
#[utoipa::path(
    post,
    path = "/api/v1/review/fichas/{id}/approve",
    tag = "Review",
    params(
        ("id" = Uuid, Path, description = "Ficha id")
    ),
    request_body = FinalizeRequest,
    responses(
        (status = 200, description = "Ficha approved", body = StatusResponse),
        (status = 409, description = "NOT_OK fields or unreviewed documents remain", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[post("/review/fichas/{id}/approve")]
pub async fn approve(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    notifier: web::Data<Box<dyn ReviewNotifier>>,
    config: web::Data<Config>,
    path: web::Path<String>,
    body: web::Json<FinalizeRequest>,
) -> AppResult<HttpResponse> {
    require_reviewer(&auth)?;
    let ficha_id = Uuid::parse_str(&path.into_inner())?;
    let status = finalize::approve(
        db.get_ref(),
        notifier.get_ref().as_ref(),
        &config.dashboard_url,
        ficha_id,
        auth.user.id,
        body.global_notes.as_deref(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(StatusResponse { ficha_id, status }))
}

/// Send the ficha back to the student with observations.
#[utoipa::path(
    post,
    path = "/api/v1/review/fichas/{id}/observe",
    tag = "Review",
    params(
        ("id" = Uuid, Path, description = "Ficha id")
    ),
    request_body = ObserveRequest,
    responses(
        (status = 200, description = "Ficha observed", body = StatusResponse),
        (status = 409, description = "Status does not allow observation", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[post("/review/fichas/{id}/observe")]
pub async fn observe(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    body: web::Json<ObserveRequest>,
) -> AppResult<HttpResponse> {
    require_reviewer(&auth)?;
    let ficha_id = Uuid::parse_str(&path.into_inner())?;
    let status =
        finalize::observe(db.get_ref(), ficha_id, auth.user.id, body.notes.as_deref()).await?;
    Ok(HttpResponse::Ok().json(StatusResponse { ficha_id, status }))
}

/// Configure review routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(queue)
        .service(decide_field)
        .service(finalize_review)
        .service(approve)
        .service(observe)
        .service(detail)
        .service(document_log)
        .service(decide_document);
}
