//! Ficha lifecycle: get-or-create, activation and submission.

use sea_orm::{DatabaseConnection, SqlErr, TransactionTrait};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{fichas, field_reviews};
use crate::entity::ficha;
use crate::error::{AppError, AppResult};
use crate::models::FichaStatus;

/// Return the student's active ficha, creating one in DRAFT when none
/// exists. Section rows are not created here; each appears on its first
/// save.
///
/// Creation races on the partial unique index: when a concurrent request
/// wins, the insert fails with a unique violation and the select is retried.
pub async fn get_or_create_active(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<ficha::Model> {
    if let Some(existing) = fichas::find_active_by_user(db, user_id).await? {
        return Ok(existing);
    }

    match fichas::insert_active(db, user_id).await {
        Ok(created) => {
            info!(ficha_id = %created.id, user_id = %user_id, "Created active ficha");
            Ok(created)
        }
        Err(e) => {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                // Lost the race; the winner's row is there now.
                fichas::find_active_by_user(db, user_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::Database(
                            "Active ficha vanished after unique violation".to_string(),
                        )
                    })
            } else {
                Err(e.into())
            }
        }
    }
}

/// Make the given ficha the student's active one. Deactivating siblings and
/// activating the target happen in one transaction so the partial unique
/// index never sees two active rows.
pub async fn activate(
    db: &DatabaseConnection,
    user_id: Uuid,
    ficha_id: Uuid,
) -> AppResult<ficha::Model> {
    let ficha = fichas::find_by_id(db, ficha_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ficha {}", ficha_id)))?;

    if ficha.user_id != user_id {
        return Err(AppError::Forbidden(
            "Ficha belongs to another student".to_string(),
        ));
    }

    if ficha.is_activa {
        return Ok(ficha);
    }

    let txn = db.begin().await?;
    fichas::deactivate_all_for_user(&txn, user_id).await?;
    fichas::set_active(&txn, ficha_id).await?;
    txn.commit().await?;

    info!(ficha_id = %ficha_id, user_id = %user_id, "Activated ficha");

    fichas::find_by_id(db, ficha_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ficha {}", ficha_id)))
}

/// Submit the active ficha for review.
///
/// DRAFT moves to SUBMITTED. OBSERVED and REJECTED fichas resubmit directly
/// into UNDER_REVIEW; a rejected resubmission clears the previous field
/// review ledger so the next round starts clean. Any other status is a
/// conflict.
pub async fn submit(db: &DatabaseConnection, user_id: Uuid) -> AppResult<(Uuid, FichaStatus)> {
    let ficha = fichas::find_active_by_user(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Active ficha".to_string()))?;

    let current = parse_status(&ficha)?;

    let target = match current {
        FichaStatus::Draft => FichaStatus::Submitted,
        FichaStatus::Observed | FichaStatus::Rejected => FichaStatus::UnderReview,
        _ => {
            warn!(ficha_id = %ficha.id, status = %current, "Submit refused");
            return Err(AppError::InvariantViolation(format!(
                "Ficha in status {} cannot be submitted",
                current
            )));
        }
    };

    let txn = db.begin().await?;
    if current == FichaStatus::Rejected {
        field_reviews::clear_for_ficha(&txn, ficha.id).await?;
    }
    fichas::set_status(&txn, ficha.id, target).await?;
    txn.commit().await?;

    info!(ficha_id = %ficha.id, from = %current, to = %target, "Ficha submitted");

    Ok((ficha.id, target))
}

/// Parse the stored status string, treating an unknown value as data
/// corruption rather than caller error.
pub fn parse_status(ficha: &ficha::Model) -> AppResult<FichaStatus> {
    FichaStatus::parse(&ficha.estado_global).ok_or_else(|| {
        AppError::Database(format!(
            "Ficha {} has unknown status '{}'",
            ficha.id, ficha.estado_global
        ))
    })
}
