//! Support ticket ("mesa de ayuda") endpoints.

use actix_web::{HttpResponse, get, post, web};
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use crate::auth::TokenAuth;
use crate::db;
use crate::entity::support_ticket;
use crate::error::{AppError, AppResult};
use crate::models::{CreateTicketRequest, RespondTicketRequest, Role, TicketStatus, TicketSummary};
use crate::services::lifecycle;

async fn to_summary(
    db: &DatabaseConnection,
    ticket: support_ticket::Model,
) -> AppResult<TicketSummary> {
    let student = db::users::find_by_id(db, ticket.user_id).await?;
    let status = TicketStatus::parse(&ticket.status)
        .ok_or_else(|| AppError::Database(format!("Unknown ticket status '{}'", ticket.status)))?;
    Ok(TicketSummary {
        id: ticket.id,
        student_email: student.map(|u| u.email).unwrap_or_default(),
        ficha_id: ticket.ficha_id,
        tipo_consulta: ticket.tipo_consulta,
        asunto: ticket.asunto,
        detalle: ticket.detalle,
        respuesta_admin: ticket.respuesta_admin,
        status,
        created_at: ticket.created_at,
        updated_at: ticket.updated_at,
    })
}

/// Open a support ticket tied to the caller's active ficha.
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    tag = "Tickets",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket opened", body = TicketSummary),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[post("/tickets")]
pub async fn create_ticket(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateTicketRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    if req.asunto.trim().is_empty() || req.detalle.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "asunto and detalle are required".to_string(),
        ));
    }

    let ficha = lifecycle::get_or_create_active(db.get_ref(), auth.user.id).await?;
    let ticket = db::tickets::insert(
        db.get_ref(),
        auth.user.id,
        ficha.id,
        req.tipo_consulta.trim(),
        req.asunto.trim(),
        req.detalle.trim(),
    )
    .await?;

    info!(ticket_id = %ticket.id, user_id = %auth.user.id, "Ticket opened");

    let summary = to_summary(db.get_ref(), ticket).await?;
    Ok(HttpResponse::Created().json(summary))
}

/// List tickets: open tickets for reviewers and admins, the caller's own
/// tickets for students.
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    tag = "Tickets",
    responses(
        (status = 200, description = "Tickets", body = Vec<TicketSummary>)
    ),
    security(("access_token" = []))
)]
#[get("/tickets")]
pub async fn list_tickets(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
) -> AppResult<HttpResponse> {
    let tickets = if auth.user.role.can_review() {
        db::tickets::list_open(db.get_ref()).await?
    } else {
        db::tickets::list_for_user(db.get_ref(), auth.user.id).await?
    };

    let mut out = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        out.push(to_summary(db.get_ref(), ticket).await?);
    }
    Ok(HttpResponse::Ok().json(out))
}

/// Answer a ticket, closing it unless the answer says otherwise.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/respond",
    tag = "Tickets",
    params(
        ("id" = Uuid, Path, description = "Ticket id")
    ),
    request_body = RespondTicketRequest,
    responses(
        (status = 200, description = "Ticket answered", body = TicketSummary),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorResponse),
        (status = 404, description = "Ticket not found", body = crate::error::ErrorResponse)
    ),
    security(("access_token" = []))
)]
#[post("/tickets/{id}/respond")]
pub async fn respond_ticket(
    auth: TokenAuth,
    db: web::Data<DatabaseConnection>,
    path: web::Path<String>,
    body: web::Json<RespondTicketRequest>,
) -> AppResult<HttpResponse> {
    if auth.user.role != Role::Admin {
        return Err(AppError::Forbidden(
            "Answering tickets requires the ADMIN role".to_string(),
        ));
    }

    let ticket_id = Uuid::parse_str(&path.into_inner())?;
    let req = body.into_inner();
    if req.respuesta.trim().is_empty() {
        return Err(AppError::InvalidInput("respuesta is required".to_string()));
    }

    let ticket = db::tickets::find_by_id(db.get_ref(), ticket_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {}", ticket_id)))?;

    let updated = db::tickets::respond(db.get_ref(), ticket, req.respuesta.trim(), req.cerrar).await?;

    info!(ticket_id = %ticket_id, closed = req.cerrar, "Ticket answered");

    let summary = to_summary(db.get_ref(), updated).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Configure ticket routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_ticket)
        .service(list_tickets)
        .service(respond_ticket);
}
