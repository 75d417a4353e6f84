//! Actix-web extractors for token and admin-key authentication.
//!
//! Header secrets are wrapped in `SecretString` the moment they leave the
//! request so they are never logged and are zeroized on drop.

use std::future::{Future, Ready, ready};
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use sea_orm::DatabaseConnection;
use secrecy::{ExposeSecret, SecretString};

use super::AdminKey;
use crate::config::{ACCESS_TOKEN_HEADER, ADMIN_KEY_HEADER};
use crate::error::AppError;
use crate::models::AuthenticatedUser;
use crate::services::access_token;

fn extract_secret_header(req: &HttpRequest, header_name: &str) -> Option<SecretString> {
    req.headers()
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(|s| SecretString::from(s.to_string()))
}

/// Extractor resolving `X-Access-Token` to the owning user.
///
/// ```ignore
/// async fn handler(auth: TokenAuth) -> impl Responder {
///     // auth.user.id, auth.user.role
/// }
/// ```
pub struct TokenAuth {
    pub user: AuthenticatedUser,
}

impl FromRequest for TokenAuth {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let db = req
            .app_data::<web::Data<DatabaseConnection>>()
            .map(|d| d.clone());
        let token = extract_secret_header(req, ACCESS_TOKEN_HEADER);

        Box::pin(async move {
            let db = db.ok_or_else(|| {
                AppError::Database("Database connection not configured".to_string())
            })?;
            let token = token.ok_or_else(|| {
                AppError::Unauthorized(format!(
                    "Missing access token. Provide the {} header.",
                    ACCESS_TOKEN_HEADER
                ))
            })?;

            let user = access_token::authenticate(db.get_ref(), &token).await?;
            Ok(TokenAuth { user })
        })
    }
}

/// Extractor gating an endpoint behind the bootstrap admin key.
pub struct AdminGate;

impl FromRequest for AdminGate {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let stored = req.app_data::<web::Data<AdminKey>>();
        let provided = extract_secret_header(req, ADMIN_KEY_HEADER);

        let ok = match (stored, &provided) {
            (Some(key), Some(p)) => key.verify(p.expose_secret()),
            _ => false,
        };

        if ok {
            ready(Ok(AdminGate))
        } else {
            ready(Err(AppError::Unauthorized(format!(
                "Invalid or missing {} header",
                ADMIN_KEY_HEADER
            ))))
        }
    }
}
