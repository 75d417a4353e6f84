//! Review finalization: outcome aggregation, atomic status write and
//! post-commit notification.

use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use crate::db::{documents, fichas, field_reviews, users};
use crate::error::{AppError, AppResult};
use crate::models::{
    DocumentReviewStatus, FichaStatus, RejectedField, ReviewResultNotification, field_label,
};
use crate::services::lifecycle::parse_status;
use crate::services::notify::{self, ReviewNotifier};

/// Placeholder when a NOT_OK decision carried no notes.
const NO_REVIEWER_COMMENT: &str = "Sin comentario del revisor.";

/// Pure outcome computation: APPROVED iff zero NOT_OK fields, plus the
/// consolidated notes string stored on the ficha.
pub fn aggregate(
    rejected: &[RejectedField],
    global_notes: Option<&str>,
) -> (FichaStatus, Option<String>) {
    let status = if rejected.is_empty() {
        FichaStatus::Approved
    } else {
        FichaStatus::Rejected
    };

    let mut lines: Vec<String> = rejected
        .iter()
        .map(|f| {
            format!(
                "- {} • {}: {}",
                f.section,
                f.field_key,
                f.notes.as_deref().unwrap_or(NO_REVIEWER_COMMENT)
            )
        })
        .collect();

    if let Some(g) = global_notes {
        let g = g.trim();
        if !g.is_empty() {
            lines.push(format!("Comentario general del revisor: {}", g));
        }
    }

    let consolidated = if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    };

    (status, consolidated)
}

async fn load_rejected(
    db: &DatabaseConnection,
    ficha_id: Uuid,
) -> AppResult<Vec<RejectedField>> {
    let rows = field_reviews::list_not_ok(db, ficha_id).await?;
    Ok(rows
        .into_iter()
        .map(|r| RejectedField {
            section: r.section,
            label: field_label(&r.field_key).to_string(),
            field_key: r.field_key,
            notes: r.notes,
        })
        .collect())
}

async fn write_outcome_and_notify(
    db: &DatabaseConnection,
    notifier: &dyn ReviewNotifier,
    dashboard_url: &str,
    ficha_id: Uuid,
    reviewer_id: Uuid,
    status: FichaStatus,
    consolidated: Option<String>,
    rejected: Vec<RejectedField>,
    global_notes: Option<String>,
) -> AppResult<FichaStatus> {
    fichas::record_review_outcome(db, ficha_id, status, consolidated.as_deref(), reviewer_id)
        .await?;

    info!(ficha_id = %ficha_id, outcome = %status, "Review finalized");

    // Strictly after the write; a lost notification never rolls back a verdict.
    let ficha = fichas::find_by_id(db, ficha_id).await?;
    let student_email = match &ficha {
        Some(f) => users::find_by_id(db, f.user_id)
            .await?
            .map(|u| u.email)
            .unwrap_or_default(),
        None => String::new(),
    };

    let payload = ReviewResultNotification {
        ficha_id,
        student_email,
        approved: status == FichaStatus::Approved,
        rejected_fields: rejected,
        global_notes,
        dashboard_link: dashboard_url.to_string(),
    };
    notify::dispatch(notifier, &payload).await;

    Ok(status)
}

/// Finalize a review round: aggregate field decisions into APPROVED or
/// REJECTED, persist the consolidated notes and notify the student.
/// Calling it on an already finalized ficha is a no-op returning the
/// recorded outcome.
pub async fn finalize(
    db: &DatabaseConnection,
    notifier: &dyn ReviewNotifier,
    dashboard_url: &str,
    ficha_id: Uuid,
    reviewer_id: Uuid,
    global_notes: Option<&str>,
) -> AppResult<FichaStatus> {
    let ficha = fichas::find_by_id(db, ficha_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ficha {}", ficha_id)))?;

    let current = parse_status(&ficha)?;
    if matches!(current, FichaStatus::Approved | FichaStatus::Rejected) {
        return Ok(current);
    }
    if !current.accepts_review_decisions() {
        return Err(AppError::InvariantViolation(format!(
            "Ficha in status {} cannot be finalized",
            current
        )));
    }

    let rejected = load_rejected(db, ficha_id).await?;
    let (status, consolidated) = aggregate(&rejected, global_notes);

    write_outcome_and_notify(
        db,
        notifier,
        dashboard_url,
        ficha_id,
        reviewer_id,
        status,
        consolidated,
        rejected,
        global_notes.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
    )
    .await
}

/// Explicit approval. On top of the finalize rules, every attached document
/// must already be REVIEWED_OK.
pub async fn approve(
    db: &DatabaseConnection,
    notifier: &dyn ReviewNotifier,
    dashboard_url: &str,
    ficha_id: Uuid,
    reviewer_id: Uuid,
    global_notes: Option<&str>,
) -> AppResult<FichaStatus> {
    let ficha = fichas::find_by_id(db, ficha_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ficha {}", ficha_id)))?;

    let current = parse_status(&ficha)?;
    if current == FichaStatus::Approved {
        return Ok(current);
    }
    if !current.accepts_review_decisions() {
        return Err(AppError::InvariantViolation(format!(
            "Ficha in status {} cannot be approved",
            current
        )));
    }

    let rejected = load_rejected(db, ficha_id).await?;
    if !rejected.is_empty() {
        return Err(AppError::InvariantViolation(format!(
            "{} field(s) are marked NOT_OK",
            rejected.len()
        )));
    }

    for doc in documents::list_for_ficha(db, ficha_id).await? {
        if doc.review_status != DocumentReviewStatus::ReviewedOk.as_str() {
            return Err(AppError::InvariantViolation(format!(
                "Document {} ({}) is not REVIEWED_OK",
                doc.id, doc.slot
            )));
        }
    }

    let (_, consolidated) = aggregate(&[], global_notes);

    write_outcome_and_notify(
        db,
        notifier,
        dashboard_url,
        ficha_id,
        reviewer_id,
        FichaStatus::Approved,
        consolidated,
        Vec::new(),
        global_notes.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
    )
    .await
}

/// Send the ficha back to the student with observations.
pub async fn observe(
    db: &DatabaseConnection,
    ficha_id: Uuid,
    reviewer_id: Uuid,
    notes: Option<&str>,
) -> AppResult<FichaStatus> {
    let ficha = fichas::find_by_id(db, ficha_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ficha {}", ficha_id)))?;

    let current = parse_status(&ficha)?;
    if !current.can_transition(FichaStatus::Observed) {
        return Err(AppError::InvariantViolation(format!(
            "Ficha in status {} cannot be observed",
            current
        )));
    }

    fichas::record_review_outcome(
        db,
        ficha_id,
        FichaStatus::Observed,
        notes.map(str::trim).filter(|n| !n.is_empty()),
        reviewer_id,
    )
    .await?;

    info!(ficha_id = %ficha_id, "Ficha observed");

    Ok(FichaStatus::Observed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(section: &str, key: &str, notes: Option<&str>) -> RejectedField {
        RejectedField {
            section: section.to_string(),
            field_key: key.to_string(),
            label: field_label(key).to_string(),
            notes: notes.map(|n| n.to_string()),
        }
    }

    #[test]
    fn test_no_not_ok_fields_approves() {
        let (status, notes) = aggregate(&[], None);
        assert_eq!(status, FichaStatus::Approved);
        assert_eq!(notes, None);
    }

    #[test]
    fn test_approved_with_comment_keeps_it() {
        let (status, notes) = aggregate(&[], Some("Todo en orden"));
        assert_eq!(status, FichaStatus::Approved);
        assert_eq!(
            notes.as_deref(),
            Some("Comentario general del revisor: Todo en orden")
        );
    }

    #[test]
    fn test_any_not_ok_rejects() {
        let fields = [rejected("generales", "rut", Some("RUT ilegible"))];
        let (status, notes) = aggregate(&fields, None);
        assert_eq!(status, FichaStatus::Rejected);
        assert_eq!(notes.as_deref(), Some("- generales • rut: RUT ilegible"));
    }

    #[test]
    fn test_missing_notes_get_placeholder() {
        let fields = [rejected("academicos", "carrera", None)];
        let (_, notes) = aggregate(&fields, None);
        assert_eq!(
            notes.as_deref(),
            Some("- academicos • carrera: Sin comentario del revisor.")
        );
    }

    #[test]
    fn test_consolidated_notes_order_and_global_comment() {
        let fields = [
            rejected("generales", "rut", Some("Ilegible")),
            rejected("morbidos", "alergias_detalle", None),
        ];
        let (status, notes) = aggregate(&fields, Some("  Revisar y reenviar  "));
        assert_eq!(status, FichaStatus::Rejected);
        let expected = "- generales • rut: Ilegible\n\
                        - morbidos • alergias_detalle: Sin comentario del revisor.\n\
                        Comentario general del revisor: Revisar y reenviar";
        assert_eq!(notes.as_deref(), Some(expected));
    }

    #[test]
    fn test_blank_global_comment_is_dropped() {
        let (_, notes) = aggregate(&[], Some("   "));
        assert_eq!(notes, None);
    }
}
