//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::config::{ACCESS_TOKEN_HEADER, ADMIN_KEY_HEADER};
use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ficha Server",
        version = "0.3.0",
        description = "Student clinical-placement health record intake with field-level review workflow"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // User management
        api::users::create_user,
        api::users::revoke_tokens,
        // Student ficha endpoints
        api::fichas::get_active,
        api::fichas::list_own,
        api::fichas::submit,
        api::fichas::activate,
        api::fichas::update_general,
        api::fichas::update_academic,
        api::fichas::update_medical,
        api::fichas::update_vaccines,
        api::fichas::update_declaration,
        api::fichas::upload_photo,
        // Documents
        api::documents::attach_document,
        api::documents::download_document,
        // Review workflow
        api::review::queue,
        api::review::detail,
        api::review::document_log,
        api::review::decide_field,
        api::review::decide_document,
        api::review::finalize_review,
        api::review::approve,
        api::review::observe,
        // Support tickets
        api::tickets::create_ticket,
        api::tickets::list_tickets,
        api::tickets::respond_ticket,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            error::ValidationErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Users
            models::Role,
            models::CreateUserRequest,
            models::CreateUserResponse,
            // Fichas
            models::FichaStatus,
            models::FichaSummary,
            models::FichaDetail,
            models::StatusResponse,
            models::GeneralSectionView,
            models::AcademicSectionView,
            models::MedicalSectionView,
            models::DeclarationSectionView,
            models::VaccineDoseView,
            models::SerologyView,
            // Section updates
            models::GeneralUpdate,
            models::AcademicUpdate,
            models::MedicalUpdate,
            models::DeclarationUpdate,
            models::VaccinesUpdate,
            models::SerologyEntry,
            // Documents
            models::DocumentSection,
            models::DocumentSlot,
            models::DocumentSummary,
            models::AttachResponse,
            // Review
            models::FieldReviewStatus,
            models::DocumentReviewStatus,
            models::FieldDecisionRequest,
            models::DocumentDecisionRequest,
            models::FinalizeRequest,
            models::ObserveRequest,
            models::FieldReviewPill,
            models::RejectedField,
            api::review::DocumentReviewLogEntry,
            // Tickets
            models::TicketStatus,
            models::CreateTicketRequest,
            models::RespondTicketRequest,
            models::TicketSummary,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Users", description = "Account registration (admin key)"),
        (name = "Fichas", description = "Student ficha lifecycle and sections"),
        (name = "Documents", description = "Document attachment and download"),
        (name = "Review", description = "Field-level review workflow"),
        (name = "Tickets", description = "Support tickets")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Register the token and admin-key security schemes.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "access_token",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(ACCESS_TOKEN_HEADER),
                    ),
                ),
            );
            components.add_security_scheme(
                "admin_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new(ADMIN_KEY_HEADER),
                    ),
                ),
            );
        }
    }
}
