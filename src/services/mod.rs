//! Business logic services.

pub mod access_token;
pub mod documents;
pub mod finalize;
pub mod lifecycle;
pub mod notify;
pub mod review;
pub mod sections;
pub mod storage;
