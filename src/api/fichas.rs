//! Student-facing ficha endpoints: active ficha, sections, photo, submit.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, put, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::api::documents::read_single_file;
use crate::auth::TokenAuth;
use crate::error::AppResult;
use crate::models::{
    AcademicUpdate, DeclarationUpdate, GeneralUpdate, MedicalUpdate, StatusResponse, VaccinesUpdate,
};
use crate::services::storage::Storage;
use crate::services::{lifecycle, review, sections};

/// Fetch the caller's active ficha, creating a DRAFT one on first access.
#[utoipa::path(
    get,
    path = "/api/v1/fichas/active",
    tag = "Fichas",
    responses(
        (status = 200, description = "Active ficha detail", body = crate::models::FichaDetail),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[get("/fichas/active")]
pub async fn get_active(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let ficha = lifecycle::get_or_create_active(db.get_ref(), auth.user.id).await?;
    let detail = review::detail(db.get_ref(), ficha.id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

/// List the caller's fichas, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/fichas",
    tag = "Fichas",
    responses(
        (status = 200, description = "The caller's fichas", body = Vec<crate::models::FichaSummary>)
    ),
    security(("access_token" = []))
)]
#[get("/fichas")]
pub async fn list_own(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let fichas = crate::db::fichas::list_for_user(db.get_ref(), auth.user.id).await?;
    let mut out = Vec::with_capacity(fichas.len());
    for ficha in fichas {
        let status = lifecycle::parse_status(&ficha)?;
        out.push(crate::models::FichaSummary {
            id: ficha.id,
            student_email: auth.user.email.clone(),
            status,
            created_at: ficha.created_at,
            updated_at: ficha.updated_at,
        });
    }
    Ok(HttpResponse::Ok().json(out))
}

/// Submit the active ficha for review.
#[utoipa::path(
    post,
    path = "/api/v1/fichas/active/submit",
    tag = "Fichas",
    responses(
        (status = 200, description = "Ficha submitted", body = StatusResponse),
        (status = 409, description = "Status does not allow submission", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[post("/fichas/active/submit")]
pub async fn submit(auth: TokenAuth, db: web::Data<DatabaseConnection>) -> AppResult<HttpResponse> {
    let (ficha_id, status) = lifecycle::submit(db.get_ref(), auth.user.id).await?;
    Ok(HttpResponse::Ok().json(StatusResponse { ficha_id, status }))
}

/// Make a ficha the caller's active one, deactivating any sibling.
#[utoipa::path(
    post,
    path = "/api/v1/fichas/{id}/activate",
    tag = "Fichas",
    params(
        ("id" = Uuid, Path, description = "Ficha id")
    ),
    responses(
        (status = 200, description = "Ficha activated", body = StatusResponse),
        (status = 403, description = "Ficha belongs to another student", body = crate::error::ErrorResponse),
        (status = 404, description = "Ficha not found", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[post("/fichas/{id}/activate")]
pub async fn activate(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let ficha_id = Uuid::parse_str(&path.into_inner())?;
    let ficha = lifecycle::activate(db.get_ref(), auth.user.id, ficha_id).await?;
    let status = lifecycle::parse_status(&ficha)?;
    Ok(HttpResponse::Ok().json(StatusResponse {
        ficha_id: ficha.id,
        status,
    }))
}

/// Update the general background section.
#[utoipa::path(
    put,
    path = "/api/v1/fichas/active/sections/general",
    tag = "Fichas",
    request_body = GeneralUpdate,
    responses(
        (status = 204, description = "Section updated"),
        (status = 409, description = "Ficha not editable", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse)
    ),
    security(("access_token" = []))
)]
#[put("/fichas/active/sections/general")]
pub async fn update_general(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    body: web::Json<GeneralUpdate>,
) -> AppResult<HttpResponse> {
    let ficha = lifecycle::get_or_create_active(db.get_ref(), auth.user.id).await?;
    sections::update_general(db.get_ref(), &ficha, &body).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Update the academic background section.
#[utoipa::path(
    put,
    path = "/api/v1/fichas/active/sections/academic",
    tag = "Fichas",
    request_body = AcademicUpdate,
    responses(
        (status = 204, description = "Section updated"),
        (status = 409, description = "Ficha not editable", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse)
    ),
    security(("access_token" = []))
)]
#[put("/fichas/active/sections/academic")]
pub async fn update_academic(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    body: web::Json<AcademicUpdate>,
) -> AppResult<HttpResponse> {
    let ficha = lifecycle::get_or_create_active(db.get_ref(), auth.user.id).await?;
    sections::update_academic(db.get_ref(), &ficha, &body).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Update the medical background section.
#[utoipa::path(
    put,
    path = "/api/v1/fichas/active/sections/medical",
    tag = "Fichas",
    request_body = MedicalUpdate,
    responses(
        (status = 204, description = "Section updated"),
        (status = 409, description = "Ficha not editable", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse)
    ),
    security(("access_token" = []))
)]
#[put("/fichas/active/sections/medical")]
pub async fn update_medical(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    body: web::Json<MedicalUpdate>,
) -> AppResult<HttpResponse> {
    let ficha = lifecycle::get_or_create_active(db.get_ref(), auth.user.id).await?;
    sections::update_medical(db.get_ref(), &ficha, &body).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Replace the vaccine and serology section wholesale.
#[utoipa::path(
    put,
    path = "/api/v1/fichas/active/sections/vaccines",
    tag = "Fichas",
    request_body = VaccinesUpdate,
    responses(
        (status = 204, description = "Section replaced"),
        (status = 409, description = "Ficha not editable", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse)
    ),
    security(("access_token" = []))
)]
#[put("/fichas/active/sections/vaccines")]
pub async fn update_vaccines(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    body: web::Json<VaccinesUpdate>,
) -> AppResult<HttpResponse> {
    let ficha = lifecycle::get_or_create_active(db.get_ref(), auth.user.id).await?;
    sections::update_vaccines(db.get_ref(), &ficha, &body).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Update the sworn declaration section.
#[utoipa::path(
    put,
    path = "/api/v1/fichas/active/sections/declaration",
    tag = "Fichas",
    request_body = DeclarationUpdate,
    responses(
        (status = 204, description = "Section updated"),
        (status = 409, description = "Ficha not editable", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse)
    ),
    security(("access_token" = []))
)]
#[put("/fichas/active/sections/declaration")]
pub async fn update_declaration(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    body: web::Json<DeclarationUpdate>,
) -> AppResult<HttpResponse> {
    let ficha = lifecycle::get_or_create_active(db.get_ref(), auth.user.id).await?;
    sections::update_declaration(db.get_ref(), &ficha, &body).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Store or replace the section photo (png or jpeg).
#[utoipa::path(
    put,
    path = "/api/v1/fichas/active/photo",
    tag = "Fichas",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 204, description = "Photo stored"),
        (status = 400, description = "Unsupported type or empty payload", body = crate::error::ErrorResponse),
        (status = 409, description = "Ficha not editable", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[put("/fichas/active/photo")]
pub async fn upload_photo(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    storage: web::Data<Storage>,
    max_upload_size: web::Data<usize>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let ficha = lifecycle::get_or_create_active(db.get_ref(), auth.user.id).await?;
    let file = read_single_file(&mut payload, **max_upload_size).await?;
    sections::upsert_photo(db.get_ref(), storage.get_ref(), &ficha, &file.mime, file.data).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Configure student ficha routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_active)
        .service(list_own)
        .service(submit)
        .service(upload_photo)
        .service(update_general)
        .service(update_academic)
        .service(update_medical)
        .service(update_vaccines)
        .service(update_declaration)
        .service(activate);
}
