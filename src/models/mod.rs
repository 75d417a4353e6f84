//! Domain models and DTOs.

pub mod document;
pub mod ficha;
pub mod review;
pub mod section;
pub mod ticket;
pub mod user;

pub use document::{AttachResponse, DocumentSection, DocumentSlot, DocumentSummary};
pub use ficha::{
    AcademicSectionView, DeclarationSectionView, FichaDetail, FichaStatus, FichaSummary,
    GeneralSectionView, MedicalSectionView, SerologyView, StatusResponse, VaccineDoseView,
};
pub use review::{
    DocumentDecisionRequest, DocumentReviewStatus, FieldDecisionRequest, FieldReviewPill,
    FieldReviewStatus, FinalizeRequest, ObserveRequest, RejectedField, ReviewResultNotification,
    field_label,
};
pub use section::{
    AcademicUpdate, BloodGroup, DeclarationUpdate, GeneralUpdate, Insurance, MedicalUpdate,
    SerologyEntry, SerologyResultType, VaccineType, VaccinesUpdate,
};
pub use ticket::{CreateTicketRequest, RespondTicketRequest, TicketStatus, TicketSummary};
pub use user::{AuthenticatedUser, CreateUserRequest, CreateUserResponse, Role};
