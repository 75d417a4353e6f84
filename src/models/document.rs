//! Document sections, slots and attachment DTOs.
//!
//! A slot is a fixed document category; it is the stable key for the
//! replace-on-reupload policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::review::DocumentReviewStatus;

/// Section grouping for attached documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentSection {
    Generales,
    Academicos,
    Morbidos,
    Vacunas,
    Adjunta,
}

impl DocumentSection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generales => "GENERALES",
            Self::Academicos => "ACADEMICOS",
            Self::Morbidos => "MORBIDOS",
            Self::Vacunas => "VACUNAS",
            Self::Adjunta => "ADJUNTA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GENERALES" => Some(Self::Generales),
            "ACADEMICOS" => Some(Self::Academicos),
            "MORBIDOS" => Some(Self::Morbidos),
            "VACUNAS" => Some(Self::Vacunas),
            "ADJUNTA" => Some(Self::Adjunta),
            _ => None,
        }
    }

    /// Display title, used when deriving canonical file names.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Generales => "Antecedentes Generales",
            Self::Academicos => "Antecedentes Académicos",
            Self::Morbidos => "Antecedentes Mórbidos",
            Self::Vacunas => "Vacunas / Serología",
            Self::Adjunta => "Documentación Adjunta",
        }
    }
}

/// Fixed document categories. Each (ficha, slot) pair holds at most one
/// document; uploading again replaces the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentSlot {
    // Identification (paired, capped at 2 per ficha)
    CiFrente,
    CiReverso,
    AutorizacionMedica,
    CertAlumnoRegular,
    // Vaccination / serology certificates
    HepbCert,
    VaricelaIgg,
    InfluenzaCert,
    SarsCov2Mevacuno,
    // Courses
    CursoIntroCovid,
    CursoEpp,
    CursoIaas,
    CursoRcpBls,
    InduccionCc,
    // Certificates backing medical fields
    AlergiasCert,
    EnfermedadesCert,
    MedicamentosCert,
    OtrosAntecedentesCert,
}

impl DocumentSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CiFrente => "CI_FRENTE",
            Self::CiReverso => "CI_REVERSO",
            Self::AutorizacionMedica => "AUTORIZACION_MEDICA",
            Self::CertAlumnoRegular => "CERT_ALUMNO_REGULAR",
            Self::HepbCert => "HEPB_CERT",
            Self::VaricelaIgg => "VARICELA_IGG",
            Self::InfluenzaCert => "INFLUENZA_CERT",
            Self::SarsCov2Mevacuno => "SARS_COV_2_MEVACUNO",
            Self::CursoIntroCovid => "CURSO_INTRO_COVID",
            Self::CursoEpp => "CURSO_EPP",
            Self::CursoIaas => "CURSO_IAAS",
            Self::CursoRcpBls => "CURSO_RCP_BLS",
            Self::InduccionCc => "INDUCCION_CC",
            Self::AlergiasCert => "ALERGIAS_CERT",
            Self::EnfermedadesCert => "ENFERMEDADES_CERT",
            Self::MedicamentosCert => "MEDICAMENTOS_CERT",
            Self::OtrosAntecedentesCert => "OTROS_ANTECEDENTES_CERT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CI_FRENTE" => Some(Self::CiFrente),
            "CI_REVERSO" => Some(Self::CiReverso),
            "AUTORIZACION_MEDICA" => Some(Self::AutorizacionMedica),
            "CERT_ALUMNO_REGULAR" => Some(Self::CertAlumnoRegular),
            "HEPB_CERT" => Some(Self::HepbCert),
            "VARICELA_IGG" => Some(Self::VaricelaIgg),
            "INFLUENZA_CERT" => Some(Self::InfluenzaCert),
            "SARS_COV_2_MEVACUNO" => Some(Self::SarsCov2Mevacuno),
            "CURSO_INTRO_COVID" => Some(Self::CursoIntroCovid),
            "CURSO_EPP" => Some(Self::CursoEpp),
            "CURSO_IAAS" => Some(Self::CursoIaas),
            "CURSO_RCP_BLS" => Some(Self::CursoRcpBls),
            "INDUCCION_CC" => Some(Self::InduccionCc),
            "ALERGIAS_CERT" => Some(Self::AlergiasCert),
            "ENFERMEDADES_CERT" => Some(Self::EnfermedadesCert),
            "MEDICAMENTOS_CERT" => Some(Self::MedicamentosCert),
            "OTROS_ANTECEDENTES_CERT" => Some(Self::OtrosAntecedentesCert),
            _ => None,
        }
    }

    /// Section a slot belongs to.
    pub fn section(&self) -> DocumentSection {
        match self {
            Self::CiFrente | Self::CiReverso | Self::CertAlumnoRegular => {
                DocumentSection::Generales
            }
            Self::AutorizacionMedica
            | Self::AlergiasCert
            | Self::EnfermedadesCert
            | Self::MedicamentosCert
            | Self::OtrosAntecedentesCert => DocumentSection::Morbidos,
            Self::HepbCert | Self::VaricelaIgg | Self::InfluenzaCert | Self::SarsCov2Mevacuno => {
                DocumentSection::Vacunas
            }
            Self::CursoIntroCovid
            | Self::CursoEpp
            | Self::CursoIaas
            | Self::CursoRcpBls
            | Self::InduccionCc => DocumentSection::Adjunta,
        }
    }

    /// The two ID-card slots share a combined cap of two documents per ficha.
    pub fn is_identification(&self) -> bool {
        matches!(self, Self::CiFrente | Self::CiReverso)
    }

    pub const IDENTIFICATION_SLOTS: [DocumentSlot; 2] = [Self::CiFrente, Self::CiReverso];
}

impl std::fmt::Display for DocumentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Document row as listed in ficha detail responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub section: DocumentSection,
    pub slot: DocumentSlot,
    pub file_name: String,
    pub mime: Option<String>,
    pub size_bytes: i64,
    pub sha256: String,
    pub review_status: DocumentReviewStatus,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub uploaded_at: DateTime<Utc>,
}

/// Response after attaching a document.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttachResponse {
    pub document_id: Uuid,
    pub slot: DocumentSlot,
    pub file_name: String,
    pub size_bytes: i64,
    pub sha256: String,
    /// True when the upload superseded a previous document in the slot.
    pub replaced: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_round_trip() {
        for s in [
            DocumentSlot::CiFrente,
            DocumentSlot::CiReverso,
            DocumentSlot::HepbCert,
            DocumentSlot::CursoRcpBls,
            DocumentSlot::OtrosAntecedentesCert,
        ] {
            assert_eq!(DocumentSlot::parse(s.as_str()), Some(s));
        }
        assert_eq!(DocumentSlot::parse("PASAPORTE"), None);
    }

    #[test]
    fn test_identification_slots() {
        assert!(DocumentSlot::CiFrente.is_identification());
        assert!(DocumentSlot::CiReverso.is_identification());
        assert!(!DocumentSlot::HepbCert.is_identification());
    }

    #[test]
    fn test_slot_section_mapping() {
        assert_eq!(DocumentSlot::CiFrente.section(), DocumentSection::Generales);
        assert_eq!(
            DocumentSlot::AlergiasCert.section(),
            DocumentSection::Morbidos
        );
        assert_eq!(DocumentSlot::HepbCert.section(), DocumentSection::Vacunas);
        assert_eq!(DocumentSlot::CursoEpp.section(), DocumentSection::Adjunta);
    }
}
