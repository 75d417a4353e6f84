//! Ficha lifecycle status and aggregate DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::document::DocumentSummary;
use super::review::FieldReviewPill;

/// Global ficha status. The string values are a wire-level contract with the
/// review UI and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FichaStatus {
    Draft,
    Submitted,
    UnderReview,
    Observed,
    Approved,
    Rejected,
}

impl FichaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Submitted => "SUBMITTED",
            Self::UnderReview => "UNDER_REVIEW",
            Self::Observed => "OBSERVED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(Self::Draft),
            "SUBMITTED" => Some(Self::Submitted),
            "UNDER_REVIEW" => Some(Self::UnderReview),
            "OBSERVED" => Some(Self::Observed),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Legal transitions of the lifecycle state machine.
    ///
    /// REJECTED re-opens into review when the student resubmits, so the only
    /// truly terminal state is APPROVED.
    pub fn can_transition(&self, to: FichaStatus) -> bool {
        use FichaStatus::*;
        matches!(
            (self, to),
            (Draft, Submitted)
                | (Submitted, UnderReview)
                | (UnderReview, Observed)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                // finalize/observe may act directly on a submitted ficha
                | (Submitted, Observed)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                // repeated review rounds
                | (Observed, UnderReview)
                | (Observed, Observed)
                | (Observed, Approved)
                | (Observed, Rejected)
                | (Rejected, UnderReview)
        )
    }

    /// Statuses a reviewer's work queue shows.
    pub fn is_pending_review(&self) -> bool {
        matches!(self, Self::Submitted | Self::UnderReview | Self::Observed)
    }

    /// Statuses in which the field review ledger accepts decisions.
    pub fn accepts_review_decisions(&self) -> bool {
        self.is_pending_review()
    }

    /// A student may edit section data only while drafting or after
    /// observations sent the ficha back.
    pub fn is_editable_by_student(&self) -> bool {
        matches!(self, Self::Draft | Self::Observed | Self::Rejected)
    }
}

impl std::fmt::Display for FichaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Row in the reviewer work queue.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FichaSummary {
    pub id: Uuid,
    pub student_email: String,
    pub status: FichaStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// General section as returned to clients.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct GeneralSectionView {
    pub nombre_legal: Option<String>,
    pub rut: Option<String>,
    pub genero: Option<String>,
    pub fecha_nacimiento: Option<chrono::NaiveDate>,
    pub telefono_celular: Option<String>,
    pub direccion_actual: Option<String>,
    pub direccion_origen: Option<String>,
    pub contacto_emergencia_nombre: Option<String>,
    pub contacto_emergencia_parentesco: Option<String>,
    pub contacto_emergencia_telefono: Option<String>,
    pub centro_salud: Option<String>,
    pub seguro: Option<String>,
    pub seguro_detalle: Option<String>,
    pub correo_institucional: Option<String>,
    /// Whether a photo blob is stored for this section.
    pub has_photo: bool,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct AcademicSectionView {
    pub nombre_social: Option<String>,
    pub carrera: Option<String>,
    pub anio_cursa: Option<i16>,
    pub estado: Option<String>,
    pub asignatura: Option<String>,
    pub correo_institucional: Option<String>,
    pub correo_personal: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct MedicalSectionView {
    pub alergias_detalle: Option<String>,
    pub grupo_sanguineo: Option<String>,
    pub cronicas_detalle: Option<String>,
    pub medicamentos_detalle: Option<String>,
    pub otros_antecedentes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DeclarationSectionView {
    pub nombre_estudiante: Option<String>,
    pub rut: Option<String>,
    pub firma: Option<String>,
    pub fecha: Option<chrono::NaiveDate>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VaccineDoseView {
    pub vaccine_type: String,
    pub dose_label: String,
    pub date: chrono::NaiveDate,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SerologyView {
    pub pathogen: String,
    pub result: String,
    pub date: chrono::NaiveDate,
}

/// Aggregate ficha detail used by both dashboards.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FichaDetail {
    pub id: Uuid,
    pub student_email: String,
    pub status: FichaStatus,
    pub is_active: bool,
    pub global_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub general: Option<GeneralSectionView>,
    pub academic: Option<AcademicSectionView>,
    pub medical: Option<MedicalSectionView>,
    pub declaration: Option<DeclarationSectionView>,
    pub vaccine_doses: Vec<VaccineDoseView>,
    pub serologies: Vec<SerologyView>,
    pub documents: Vec<DocumentSummary>,
    /// `field_key → {status, notes}`; the review UI restores its pills from this.
    pub field_reviews: BTreeMap<String, FieldReviewPill>,
}

/// Generic status response for lifecycle operations.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusResponse {
    pub ficha_id: Uuid,
    pub status: FichaStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in [
            FichaStatus::Draft,
            FichaStatus::Submitted,
            FichaStatus::UnderReview,
            FichaStatus::Observed,
            FichaStatus::Approved,
            FichaStatus::Rejected,
        ] {
            assert_eq!(FichaStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(FichaStatus::parse("OK"), None);
    }

    #[test]
    fn test_submit_only_from_draft() {
        assert!(FichaStatus::Draft.can_transition(FichaStatus::Submitted));
        assert!(!FichaStatus::Submitted.can_transition(FichaStatus::Submitted));
        assert!(!FichaStatus::Approved.can_transition(FichaStatus::Submitted));
    }

    #[test]
    fn test_approved_is_terminal() {
        use FichaStatus::*;
        for to in [Draft, Submitted, UnderReview, Observed, Rejected] {
            assert!(!Approved.can_transition(to));
        }
    }

    #[test]
    fn test_rejected_reopens_into_review() {
        assert!(FichaStatus::Rejected.can_transition(FichaStatus::UnderReview));
        assert!(!FichaStatus::Rejected.can_transition(FichaStatus::Approved));
    }

    #[test]
    fn test_detail_reports_unsaved_sections_as_null() {
        let now = Utc::now();
        let detail = FichaDetail {
            id: Uuid::nil(),
            student_email: "ana@uni.cl".to_string(),
            status: FichaStatus::Draft,
            is_active: true,
            global_notes: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
            general: None,
            academic: None,
            medical: None,
            declaration: None,
            vaccine_doses: Vec::new(),
            serologies: Vec::new(),
            documents: Vec::new(),
            field_reviews: BTreeMap::new(),
        };

        let json = serde_json::to_value(&detail).unwrap();
        for section in ["general", "academic", "medical", "declaration"] {
            assert!(json[section].is_null(), "{} should be null", section);
        }
        assert_eq!(json["status"], "DRAFT");
    }

    #[test]
    fn test_observed_is_re_reviewable() {
        assert!(FichaStatus::Observed.can_transition(FichaStatus::Observed));
        assert!(FichaStatus::Observed.can_transition(FichaStatus::Rejected));
    }
}
