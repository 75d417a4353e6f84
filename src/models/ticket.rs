//! Support ticket ("mesa de ayuda") DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Abierto,
    Cerrado,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Abierto => "ABIERTO",
            Self::Cerrado => "CERRADO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ABIERTO" => Some(Self::Abierto),
            "CERRADO" => Some(Self::Cerrado),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTicketRequest {
    pub tipo_consulta: String,
    pub asunto: String,
    pub detalle: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RespondTicketRequest {
    pub respuesta: String,
    /// Close the ticket together with the answer (default true).
    #[serde(default = "default_close")]
    pub cerrar: bool,
}

fn default_close() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketSummary {
    pub id: Uuid,
    pub student_email: String,
    pub ficha_id: Uuid,
    pub tipo_consulta: String,
    pub asunto: String,
    pub detalle: String,
    pub respuesta_admin: Option<String>,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
