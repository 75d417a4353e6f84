//! Database operations for attached documents and their review trail.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{document, document_blob, document_review_log};
use crate::error::AppResult;
use crate::models::{DocumentReviewStatus, DocumentSection, DocumentSlot};

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> AppResult<Option<document::Model>> {
    let result = document::Entity::find_by_id(id).one(db).await?;
    Ok(result)
}

pub async fn list_for_ficha<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<Vec<document::Model>> {
    let result = document::Entity::find()
        .filter(document::Column::FichaId.eq(ficha_id))
        .order_by_asc(document::Column::Slot)
        .order_by_asc(document::Column::UploadedAt)
        .all(db)
        .await?;
    Ok(result)
}

pub async fn list_for_slot<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
    slot: DocumentSlot,
) -> AppResult<Vec<document::Model>> {
    let result = document::Entity::find()
        .filter(document::Column::FichaId.eq(ficha_id))
        .filter(document::Column::Slot.eq(slot.as_str()))
        .order_by_asc(document::Column::UploadedAt)
        .all(db)
        .await?;
    Ok(result)
}

/// Insert a document row together with its blob metadata. The caller
/// supplies the id because the object key embeds it. The raw `DbErr` is
/// returned so callers can detect a unique violation on (ficha, slot)
/// from a concurrent upload and retry.
pub async fn insert<C: ConnectionTrait>(
    db: &C,
    document_id: Uuid,
    ficha_id: Uuid,
    section: DocumentSection,
    slot: DocumentSlot,
    file_name: &str,
    file_mime: &str,
    object_key: &str,
    size_bytes: i64,
    sha256: &str,
) -> Result<document::Model, DbErr> {
    let now = Utc::now();

    let row = document::ActiveModel {
        id: Set(document_id),
        ficha_id: Set(ficha_id),
        section: Set(section.as_str().to_string()),
        slot: Set(slot.as_str().to_string()),
        file_name: Set(file_name.to_string()),
        file_mime: Set(file_mime.to_string()),
        review_status: Set(DocumentReviewStatus::Attached.as_str().to_string()),
        review_notes: Set(None),
        reviewed_by: Set(None),
        reviewed_at: Set(None),
        uploaded_at: Set(now),
    }
    .insert(db)
    .await?;

    document_blob::ActiveModel {
        id: Set(Uuid::new_v4()),
        document_id: Set(document_id),
        object_key: Set(object_key.to_string()),
        size_bytes: Set(size_bytes),
        sha256: Set(sha256.to_string()),
        created_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(row)
}

/// Delete a document row (the blob row follows via cascade). Returns the
/// blob's object key so the caller can clean up storage after commit.
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<String>> {
    let blob = document_blob::Entity::find()
        .filter(document_blob::Column::DocumentId.eq(id))
        .one(db)
        .await?;

    document::Entity::delete_by_id(id).exec(db).await?;

    Ok(blob.map(|b| b.object_key))
}

pub async fn find_blob<C: ConnectionTrait>(
    db: &C,
    document_id: Uuid,
) -> AppResult<Option<document_blob::Model>> {
    let result = document_blob::Entity::find()
        .filter(document_blob::Column::DocumentId.eq(document_id))
        .one(db)
        .await?;
    Ok(result)
}

/// Apply a review decision and append the audit row in the same call.
pub async fn record_decision<C: ConnectionTrait>(
    db: &C,
    doc: document::Model,
    new_status: DocumentReviewStatus,
    notes: Option<&str>,
    reviewer_id: Uuid,
) -> AppResult<document::Model> {
    let now = Utc::now();
    let old_status = doc.review_status.clone();
    let document_id = doc.id;

    let mut active: document::ActiveModel = doc.into();
    active.review_status = Set(new_status.as_str().to_string());
    active.review_notes = Set(notes.map(|n| n.to_string()));
    active.reviewed_by = Set(Some(reviewer_id));
    active.reviewed_at = Set(Some(now));
    let updated = active.update(db).await?;

    document_review_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        document_id: Set(document_id),
        old_status: Set(Some(old_status)),
        new_status: Set(new_status.as_str().to_string()),
        notes: Set(notes.map(|n| n.to_string())),
        reviewed_by: Set(reviewer_id),
        reviewed_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(updated)
}

pub async fn list_review_log<C: ConnectionTrait>(
    db: &C,
    document_id: Uuid,
) -> AppResult<Vec<document_review_log::Model>> {
    let result = document_review_log::Entity::find()
        .filter(document_review_log::Column::DocumentId.eq(document_id))
        .order_by_desc(document_review_log::Column::ReviewedAt)
        .all(db)
        .await?;
    Ok(result)
}
