//! Review statuses, decision requests and the notification payload.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-field review status. `OK` / `NOT_OK` are a wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldReviewStatus {
    Ok,
    NotOk,
}

impl FieldReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NotOk => "NOT_OK",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OK" => Some(Self::Ok),
            "NOT_OK" => Some(Self::NotOk),
            _ => None,
        }
    }
}

/// Per-document review status. Reproduced exactly as the review UI expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentReviewStatus {
    Attached,
    ReviewedNotOk,
    ReviewedOk,
}

impl DocumentReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attached => "ATTACHED",
            Self::ReviewedNotOk => "REVIEWED_NOT_OK",
            Self::ReviewedOk => "REVIEWED_OK",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ATTACHED" => Some(Self::Attached),
            "REVIEWED_NOT_OK" => Some(Self::ReviewedNotOk),
            "REVIEWED_OK" => Some(Self::ReviewedOk),
            _ => None,
        }
    }
}

/// Reviewer decision on a single field, upserted by (ficha, field_key).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FieldDecisionRequest {
    pub section: String,
    pub field_key: String,
    pub status: FieldReviewStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Reviewer decision on a document.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DocumentDecisionRequest {
    pub status: DocumentReviewStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Finalize request carrying the reviewer's free-text comment.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FinalizeRequest {
    #[serde(default)]
    pub global_notes: Option<String>,
}

/// Observe request (send back to the student with notes).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ObserveRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

/// Current pill state for one field, keyed by field_key in detail responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldReviewPill {
    pub status: FieldReviewStatus,
    pub notes: Option<String>,
}

/// One rejected field in the consolidated report and notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RejectedField {
    pub section: String,
    pub field_key: String,
    /// Human label from [`field_label`], for rendering by consumers.
    pub label: String,
    pub notes: Option<String>,
}

/// Payload handed to the notification dispatcher after finalize commits.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResultNotification {
    pub ficha_id: Uuid,
    pub student_email: String,
    pub approved: bool,
    pub rejected_fields: Vec<RejectedField>,
    pub global_notes: Option<String>,
    pub dashboard_link: String,
}

/// Human label for a field_key, used in notification payloads.
pub fn field_label(field_key: &str) -> &str {
    match field_key {
        "nombre_legal" => "Nombre legal",
        "rut" => "RUT",
        "genero" => "Género",
        "fecha_nacimiento" => "Fecha de nacimiento",
        "telefono_celular" => "Teléfono",
        "direccion_actual" => "Dirección actual",
        "direccion_origen" => "Dirección de origen",
        "contacto_emergencia" => "Contacto de emergencia",
        "centro_salud" => "Centro de salud",
        "seguro" => "Seguro",
        "nombre_social" => "Nombre social",
        "carrera" => "Carrera",
        "anio_cursa" => "Año que cursa",
        "asignatura" => "Asignatura",
        "correo_institucional" => "Correo institucional",
        "correo_personal" => "Correo personal",
        "alergias_detalle" => "Alergias",
        "grupo_sanguineo" => "Grupo sanguíneo",
        "cronicas_detalle" => "Enfermedades crónicas",
        "medicamentos_detalle" => "Medicamentos diarios",
        "otros_antecedentes" => "Otros antecedentes",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_status_round_trip() {
        assert_eq!(FieldReviewStatus::parse("OK"), Some(FieldReviewStatus::Ok));
        assert_eq!(
            FieldReviewStatus::parse("NOT_OK"),
            Some(FieldReviewStatus::NotOk)
        );
        assert_eq!(FieldReviewStatus::parse("OBSERVADO"), None);
    }

    #[test]
    fn test_document_status_wire_values() {
        assert_eq!(DocumentReviewStatus::Attached.as_str(), "ATTACHED");
        assert_eq!(
            DocumentReviewStatus::ReviewedNotOk.as_str(),
            "REVIEWED_NOT_OK"
        );
        assert_eq!(DocumentReviewStatus::ReviewedOk.as_str(), "REVIEWED_OK");
    }

    #[test]
    fn test_field_label_falls_back_to_key() {
        assert_eq!(field_label("rut"), "RUT");
        assert_eq!(field_label("campo_desconocido"), "campo_desconocido");
    }
}
