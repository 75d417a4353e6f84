//! Database operations for field-level review decisions.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::field_review::{self, Entity as FieldReview};
use crate::error::AppResult;
use crate::models::FieldReviewStatus;

/// Upsert a decision on (ficha, field_key). Concurrent reviewers hit the
/// unique constraint and the later write wins.
pub async fn upsert<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
    section: &str,
    field_key: &str,
    status: FieldReviewStatus,
    notes: Option<&str>,
    reviewer_id: Uuid,
) -> AppResult<()> {
    let model = field_review::ActiveModel {
        id: Set(Uuid::new_v4()),
        ficha_id: Set(ficha_id),
        section: Set(section.to_string()),
        field_key: Set(field_key.to_string()),
        status: Set(status.as_str().to_string()),
        notes: Set(notes.map(|n| n.to_string())),
        reviewed_by: Set(reviewer_id),
        reviewed_at: Set(Utc::now()),
    };

    FieldReview::insert(model)
        .on_conflict(
            OnConflict::columns([field_review::Column::FichaId, field_review::Column::FieldKey])
                .update_columns([
                    field_review::Column::Section,
                    field_review::Column::Status,
                    field_review::Column::Notes,
                    field_review::Column::ReviewedBy,
                    field_review::Column::ReviewedAt,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;

    Ok(())
}

pub async fn list_for_ficha<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<Vec<field_review::Model>> {
    let result = FieldReview::find()
        .filter(field_review::Column::FichaId.eq(ficha_id))
        .order_by_asc(field_review::Column::Section)
        .order_by_asc(field_review::Column::FieldKey)
        .all(db)
        .await?;
    Ok(result)
}

/// Only the NOT_OK rows, in the order they appear in the consolidated
/// rejection notes.
pub async fn list_not_ok<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<Vec<field_review::Model>> {
    let result = FieldReview::find()
        .filter(field_review::Column::FichaId.eq(ficha_id))
        .filter(field_review::Column::Status.eq(FieldReviewStatus::NotOk.as_str()))
        .order_by_asc(field_review::Column::Section)
        .order_by_asc(field_review::Column::FieldKey)
        .all(db)
        .await?;
    Ok(result)
}

/// Drop all decisions for a ficha. Used when a student resubmits after a
/// rejection so the next review starts clean.
pub async fn clear_for_ficha<C: ConnectionTrait>(db: &C, ficha_id: Uuid) -> AppResult<u64> {
    let result = FieldReview::delete_many()
        .filter(field_review::Column::FichaId.eq(ficha_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
