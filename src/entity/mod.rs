//! SeaORM entity definitions for PostgreSQL database.

pub mod academic;
pub mod access_token;
pub mod declaration;
pub mod document;
pub mod document_blob;
pub mod document_review_log;
pub mod ficha;
pub mod field_review;
pub mod general;
pub mod general_photo_blob;
pub mod medical;
pub mod serology_result;
pub mod support_ticket;
pub mod user;
pub mod vaccine_dose;
