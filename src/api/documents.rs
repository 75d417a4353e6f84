//! Document attachment endpoints: slot uploads and content download.

use actix_multipart::Multipart;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, post, web};
use futures_util::StreamExt;
use sea_orm::DatabaseConnection;

use crate::auth::TokenAuth;
use crate::error::{AppError, AppResult};
use crate::models::DocumentSlot;
use crate::services::{documents, lifecycle};
use crate::services::storage::Storage;

/// One file pulled out of a multipart payload, fully buffered.
pub(crate) struct UploadedFile {
    pub file_name: String,
    pub mime: String,
    pub data: Vec<u8>,
}

/// Read the first file field of a multipart payload, enforcing the size cap.
///
/// Documents are small (certificates, ID scans), so buffering in memory is
/// fine; the cap bounds it.
pub(crate) async fn read_single_file(
    payload: &mut Multipart,
    max_upload_size: usize,
) -> AppResult<UploadedFile> {
    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let file_name = match field.content_disposition().and_then(|cd| cd.get_filename()) {
            Some(name) => name.to_string(),
            // Not a file field; skip it.
            None => continue,
        };

        let mime = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            if data.len() + chunk.len() > max_upload_size {
                return Err(AppError::InvalidInput(format!(
                    "File exceeds the maximum upload size of {} bytes",
                    max_upload_size
                )));
            }
            data.extend_from_slice(&chunk);
        }

        return Ok(UploadedFile {
            file_name,
            mime,
            data,
        });
    }

    Err(AppError::InvalidInput(
        "Multipart payload contained no file".to_string(),
    ))
}

/// Attach a document to a slot of the caller's active ficha.
///
/// Re-uploading into an occupied slot replaces the previous document.
#[utoipa::path(
    post,
    path = "/api/v1/fichas/active/documents/{slot}",
    tag = "Documents",
    params(
        ("slot" = String, Path, description = "Document slot, e.g. CI_FRENTE or HEPB_CERT")
    ),
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document attached", body = crate::models::AttachResponse),
        (status = 400, description = "Invalid slot or payload", body = crate::error::ErrorResponse),
        (status = 409, description = "Ficha not editable or identification cap reached", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[post("/fichas/active/documents/{slot}")]
pub async fn attach_document(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    storage: web::Data<Storage>,
    max_upload_size: web::Data<usize>,
    path: web::Path<String>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let slot_str = path.into_inner();
    let slot = DocumentSlot::parse(&slot_str)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown document slot '{}'", slot_str)))?;

    let ficha = lifecycle::get_or_create_active(db.get_ref(), auth.user.id).await?;
    let file = read_single_file(&mut payload, **max_upload_size).await?;

    let response = documents::attach(
        db.get_ref(),
        storage.get_ref(),
        &ficha,
        slot,
        &file.file_name,
        &file.mime,
        file.data,
    )
    .await?;

    Ok(HttpResponse::Created().json(response))
}

/// Download a document's bytes.
///
/// Students may fetch their own documents; reviewers and admins any.
#[utoipa::path(
    get,
    path = "/api/v1/documents/{id}/content",
    tag = "Documents",
    params(
        ("id" = Uuid, Path, description = "Document id")
    ),
    responses(
        (status = 200, description = "Document bytes"),
        (status = 404, description = "Document not found", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[get("/documents/{id}/content")]
pub async fn download_document(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    storage: web::Data<Storage>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let document_id = uuid::Uuid::parse_str(&path.into_inner())?;

    if !auth.user.role.can_review() {
        let doc = crate::db::documents::find_by_id(db.get_ref(), document_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {}", document_id)))?;
        let ficha = crate::db::fichas::find_by_id(db.get_ref(), doc.ficha_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ficha {}", doc.ficha_id)))?;
        if ficha.user_id != auth.user.id {
            return Err(AppError::Forbidden(
                "Document belongs to another student".to_string(),
            ));
        }
    }

    let (file_name, mime, data) =
        documents::download(db.get_ref(), storage.get_ref(), document_id).await?;

    Ok(HttpResponse::Ok()
        .content_type(mime)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .body(data))
}

/// Configure document routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(attach_document).service(download_document);
}
