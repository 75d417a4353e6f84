//! Reviewer operations: field and document decisions, queue and detail.

use std::collections::BTreeMap;

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;
use uuid::Uuid;

use crate::db::{documents, fichas, field_reviews, sections, users};
use crate::entity::ficha;
use crate::error::{AppError, AppResult};
use crate::models::{
    AcademicSectionView, DeclarationSectionView, DocumentReviewStatus, DocumentSection,
    DocumentSlot, DocumentSummary, FichaDetail, FichaStatus, FichaSummary, FieldReviewPill,
    FieldReviewStatus, GeneralSectionView, MedicalSectionView, SerologyView, VaccineDoseView,
};
use crate::services::lifecycle::parse_status;

fn require_reviewable(ficha: &ficha::Model) -> AppResult<FichaStatus> {
    let status = parse_status(ficha)?;
    if !status.accepts_review_decisions() {
        return Err(AppError::InvariantViolation(format!(
            "Ficha in status {} does not accept review decisions",
            status
        )));
    }
    Ok(status)
}

async fn load_ficha(db: &DatabaseConnection, ficha_id: Uuid) -> AppResult<ficha::Model> {
    fichas::find_by_id(db, ficha_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ficha {}", ficha_id)))
}

/// Record a reviewer's verdict on one field. Decisions upsert by
/// (ficha, field_key); an OK verdict clears any previous notes.
pub async fn decide_field(
    db: &DatabaseConnection,
    ficha_id: Uuid,
    reviewer_id: Uuid,
    section: &str,
    field_key: &str,
    status: FieldReviewStatus,
    notes: Option<&str>,
) -> AppResult<()> {
    if section.trim().is_empty() || field_key.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "section and field_key are required".to_string(),
        ));
    }

    let ficha = load_ficha(db, ficha_id).await?;
    let current = require_reviewable(&ficha)?;

    let stored_notes = match status {
        FieldReviewStatus::NotOk => notes.filter(|n| !n.trim().is_empty()),
        FieldReviewStatus::Ok => None,
    };

    let txn = db.begin().await?;
    field_reviews::upsert(
        &txn,
        ficha_id,
        section,
        field_key,
        status,
        stored_notes,
        reviewer_id,
    )
    .await?;
    // The first decision pulls a submitted ficha into review.
    if current == FichaStatus::Submitted {
        fichas::set_status(&txn, ficha_id, FichaStatus::UnderReview).await?;
    }
    txn.commit().await?;

    info!(
        ficha_id = %ficha_id,
        field_key,
        status = status.as_str(),
        "Field decision recorded"
    );

    Ok(())
}

/// Record a reviewer's verdict on a document. The row is updated and one
/// immutable audit entry appended in the same transaction.
pub async fn decide_document(
    db: &DatabaseConnection,
    document_id: Uuid,
    reviewer_id: Uuid,
    status: DocumentReviewStatus,
    notes: Option<&str>,
) -> AppResult<()> {
    if status == DocumentReviewStatus::Attached {
        return Err(AppError::InvalidInput(
            "ATTACHED is not a reviewer verdict".to_string(),
        ));
    }

    let doc = documents::find_by_id(db, document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {}", document_id)))?;

    let ficha = load_ficha(db, doc.ficha_id).await?;
    require_reviewable(&ficha)?;

    let stored_notes = match status {
        DocumentReviewStatus::ReviewedNotOk => notes.filter(|n| !n.trim().is_empty()),
        _ => None,
    };

    let txn = db.begin().await?;
    documents::record_decision(&txn, doc, status, stored_notes, reviewer_id).await?;
    txn.commit().await?;

    info!(
        document_id = %document_id,
        status = status.as_str(),
        "Document decision recorded"
    );

    Ok(())
}

/// Fichas waiting for review, oldest first.
pub async fn queue(db: &DatabaseConnection) -> AppResult<Vec<FichaSummary>> {
    let pending = fichas::list_pending_review(db).await?;

    let mut out = Vec::with_capacity(pending.len());
    for ficha in pending {
        let status = parse_status(&ficha)?;
        let student = users::find_by_id(db, ficha.user_id).await?;
        out.push(FichaSummary {
            id: ficha.id,
            student_email: student.map(|u| u.email).unwrap_or_default(),
            status,
            created_at: ficha.created_at,
            updated_at: ficha.updated_at,
        });
    }

    Ok(out)
}

/// Assemble the aggregate detail DTO: every section, the documents and the
/// field review map the review UI restores its pills from.
pub async fn detail(db: &DatabaseConnection, ficha_id: Uuid) -> AppResult<FichaDetail> {
    let ficha = load_ficha(db, ficha_id).await?;
    let status = parse_status(&ficha)?;
    let student = users::find_by_id(db, ficha.user_id).await?;

    let general = match sections::find_general(db, ficha_id).await? {
        Some(g) => {
            let has_photo = sections::find_photo(db, g.id).await?.is_some();
            Some(GeneralSectionView {
                nombre_legal: g.nombre_legal,
                rut: g.rut,
                genero: g.genero,
                fecha_nacimiento: g.fecha_nacimiento,
                telefono_celular: g.telefono_celular,
                direccion_actual: g.direccion_actual,
                direccion_origen: g.direccion_origen,
                contacto_emergencia_nombre: g.contacto_emergencia_nombre,
                contacto_emergencia_parentesco: g.contacto_emergencia_parentesco,
                contacto_emergencia_telefono: g.contacto_emergencia_telefono,
                centro_salud: g.centro_salud,
                seguro: g.seguro,
                seguro_detalle: g.seguro_detalle,
                correo_institucional: g.correo_institucional,
                has_photo,
            })
        }
        None => None,
    };

    let academic = sections::find_academic(db, ficha_id)
        .await?
        .map(|a| AcademicSectionView {
            nombre_social: a.nombre_social,
            carrera: a.carrera,
            anio_cursa: a.anio_cursa,
            estado: a.estado,
            asignatura: a.asignatura,
            correo_institucional: a.correo_institucional,
            correo_personal: a.correo_personal,
        });

    let medical = sections::find_medical(db, ficha_id)
        .await?
        .map(|m| MedicalSectionView {
            alergias_detalle: m.alergias_detalle,
            grupo_sanguineo: m.grupo_sanguineo,
            cronicas_detalle: m.cronicas_detalle,
            medicamentos_detalle: m.medicamentos_detalle,
            otros_antecedentes: m.otros_antecedentes,
        });

    let declaration =
        sections::find_declaration(db, ficha_id)
            .await?
            .map(|d| DeclarationSectionView {
                nombre_estudiante: d.nombre_estudiante,
                rut: d.rut,
                firma: d.firma,
                fecha: d.fecha,
            });

    let vaccine_doses = sections::list_vaccine_doses(db, ficha_id)
        .await?
        .into_iter()
        .map(|d| VaccineDoseView {
            vaccine_type: d.vaccine_type,
            dose_label: d.dose_label,
            date: d.fecha,
        })
        .collect();

    let serologies = sections::list_serologies(db, ficha_id)
        .await?
        .into_iter()
        .map(|s| SerologyView {
            pathogen: s.vaccine_type,
            result: s.resultado,
            date: s.fecha,
        })
        .collect();

    let mut document_summaries = Vec::new();
    for doc in documents::list_for_ficha(db, ficha_id).await? {
        let blob = documents::find_blob(db, doc.id).await?;
        let section = DocumentSection::parse(&doc.section)
            .ok_or_else(|| AppError::Database(format!("Unknown section '{}'", doc.section)))?;
        let slot = DocumentSlot::parse(&doc.slot)
            .ok_or_else(|| AppError::Database(format!("Unknown slot '{}'", doc.slot)))?;
        let review_status = DocumentReviewStatus::parse(&doc.review_status).ok_or_else(|| {
            AppError::Database(format!("Unknown review status '{}'", doc.review_status))
        })?;
        document_summaries.push(DocumentSummary {
            id: doc.id,
            section,
            slot,
            file_name: doc.file_name,
            mime: Some(doc.file_mime),
            size_bytes: blob.as_ref().map(|b| b.size_bytes).unwrap_or_default(),
            sha256: blob.map(|b| b.sha256).unwrap_or_default(),
            review_status,
            review_notes: doc.review_notes,
            reviewed_at: doc.reviewed_at,
            uploaded_at: doc.uploaded_at,
        });
    }

    let mut field_review_map = BTreeMap::new();
    for fr in field_reviews::list_for_ficha(db, ficha_id).await? {
        let status = FieldReviewStatus::parse(&fr.status)
            .ok_or_else(|| AppError::Database(format!("Unknown field status '{}'", fr.status)))?;
        field_review_map.insert(
            fr.field_key,
            FieldReviewPill {
                status,
                notes: fr.notes,
            },
        );
    }

    Ok(FichaDetail {
        id: ficha.id,
        student_email: student.map(|u| u.email).unwrap_or_default(),
        status,
        is_active: ficha.is_activa,
        global_notes: ficha.observaciones_globales,
        reviewed_at: ficha.revisado_en,
        created_at: ficha.created_at,
        updated_at: ficha.updated_at,
        general,
        academic,
        medical,
        declaration,
        vaccine_doses,
        serologies,
        documents: document_summaries,
        field_reviews: field_review_map,
    })
}
