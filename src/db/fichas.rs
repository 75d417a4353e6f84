//! Database operations for fichas.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::ficha::{self, Entity as Ficha};
use crate::error::AppResult;
use crate::models::FichaStatus;

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<ficha::Model>> {
    let result = Ficha::find_by_id(id).one(db).await?;
    Ok(result)
}

pub async fn find_active_by_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> AppResult<Option<ficha::Model>> {
    let result = Ficha::find()
        .filter(ficha::Column::UserId.eq(user_id))
        .filter(ficha::Column::IsActiva.eq(true))
        .one(db)
        .await?;
    Ok(result)
}

/// Insert a fresh active ficha in DRAFT. The partial unique index rejects
/// this when the user already has an active one; the raw `DbErr` is
/// returned so callers can detect the unique violation and retry.
pub async fn insert_active<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<ficha::Model, DbErr> {
    let now = Utc::now();

    let model = ficha::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        is_activa: Set(true),
        estado_global: Set(FichaStatus::Draft.as_str().to_string()),
        observaciones_globales: Set(None),
        revisado_por: Set(None),
        revisado_en: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let result = model.insert(db).await?;
    Ok(result)
}

/// Clear the active flag on every ficha of the user. Used inside the
/// activation transaction before flipping the target row on.
pub async fn deactivate_all_for_user<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<u64> {
    let result = Ficha::update_many()
        .col_expr(ficha::Column::IsActiva, sea_query::Expr::value(false))
        .filter(ficha::Column::UserId.eq(user_id))
        .filter(ficha::Column::IsActiva.eq(true))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

pub async fn set_active<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
    Ficha::update_many()
        .col_expr(ficha::Column::IsActiva, sea_query::Expr::value(true))
        .filter(ficha::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

pub async fn set_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: FichaStatus,
) -> AppResult<()> {
    Ficha::update_many()
        .col_expr(
            ficha::Column::EstadoGlobal,
            sea_query::Expr::value(status.as_str()),
        )
        .filter(ficha::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

/// Record a review outcome: status, consolidated notes, reviewer and time.
pub async fn record_review_outcome<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: FichaStatus,
    notes: Option<&str>,
    reviewer_id: Uuid,
) -> AppResult<()> {
    Ficha::update_many()
        .col_expr(
            ficha::Column::EstadoGlobal,
            sea_query::Expr::value(status.as_str()),
        )
        .col_expr(
            ficha::Column::ObservacionesGlobales,
            sea_query::Expr::value(notes.map(|n| n.to_string())),
        )
        .col_expr(ficha::Column::RevisadoPor, sea_query::Expr::value(reviewer_id))
        .col_expr(ficha::Column::RevisadoEn, sea_query::Expr::value(Utc::now()))
        .filter(ficha::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(())
}

/// Fichas waiting for a reviewer, oldest submission first.
pub async fn list_pending_review(db: &DatabaseConnection) -> AppResult<Vec<ficha::Model>> {
    let pending = [
        FichaStatus::Submitted.as_str(),
        FichaStatus::UnderReview.as_str(),
        FichaStatus::Observed.as_str(),
    ];

    let result = Ficha::find()
        .filter(ficha::Column::EstadoGlobal.is_in(pending))
        .order_by_asc(ficha::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(result)
}

pub async fn list_for_user(db: &DatabaseConnection, user_id: Uuid) -> AppResult<Vec<ficha::Model>> {
    let result = Ficha::find()
        .filter(ficha::Column::UserId.eq(user_id))
        .order_by_desc(ficha::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(result)
}
