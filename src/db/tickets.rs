//! Database operations for support tickets.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::support_ticket::{self, Entity as SupportTicket};
use crate::error::AppResult;
use crate::models::TicketStatus;

pub async fn insert(
    db: &DatabaseConnection,
    user_id: Uuid,
    ficha_id: Uuid,
    tipo_consulta: &str,
    asunto: &str,
    detalle: &str,
) -> AppResult<support_ticket::Model> {
    let now = Utc::now();

    let model = support_ticket::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        ficha_id: Set(ficha_id),
        tipo_consulta: Set(tipo_consulta.to_string()),
        asunto: Set(asunto.to_string()),
        detalle: Set(detalle.to_string()),
        respuesta_admin: Set(None),
        status: Set(TicketStatus::Abierto.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let result = model.insert(db).await?;
    Ok(result)
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> AppResult<Option<support_ticket::Model>> {
    let result = SupportTicket::find_by_id(id).one(db).await?;
    Ok(result)
}

pub async fn list_open(db: &DatabaseConnection) -> AppResult<Vec<support_ticket::Model>> {
    let result = SupportTicket::find()
        .filter(support_ticket::Column::Status.eq(TicketStatus::Abierto.as_str()))
        .order_by_asc(support_ticket::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(result)
}

pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<support_ticket::Model>> {
    let result = SupportTicket::find()
        .filter(support_ticket::Column::UserId.eq(user_id))
        .order_by_desc(support_ticket::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(result)
}

pub async fn respond(
    db: &DatabaseConnection,
    ticket: support_ticket::Model,
    respuesta: &str,
    close: bool,
) -> AppResult<support_ticket::Model> {
    let mut active: support_ticket::ActiveModel = ticket.into();
    active.respuesta_admin = Set(Some(respuesta.to_string()));
    if close {
        active.status = Set(TicketStatus::Cerrado.as_str().to_string());
    }
    active.updated_at = Set(Utc::now());

    let result = active.update(db).await?;
    Ok(result)
}
