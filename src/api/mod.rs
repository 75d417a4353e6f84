//! API endpoint modules.

pub mod documents;
pub mod fichas;
pub mod health;
pub mod openapi;
pub mod review;
pub mod tickets;
pub mod users;

pub use documents::configure_routes as configure_document_routes;
pub use fichas::configure_routes as configure_ficha_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use review::configure_routes as configure_review_routes;
pub use tickets::configure_routes as configure_ticket_routes;
pub use users::configure_routes as configure_user_routes;
