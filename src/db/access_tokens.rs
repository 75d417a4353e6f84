//! Database operations for personal access tokens.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::access_token::{self, Entity as AccessToken};
use crate::entity::user;
use crate::error::AppResult;

/// Insert a new token record (stores the hash, not the raw token).
pub async fn insert(
    db: &DatabaseConnection,
    user_id: Uuid,
    token_hash: &str,
    token_prefix: &str,
) -> AppResult<()> {
    let model = access_token::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        token_hash: Set(token_hash.to_string()),
        token_prefix: Set(token_prefix.to_string()),
        created_at: Set(Utc::now()),
        expires_at: Set(None),
        revoked_at: Set(None),
    };

    AccessToken::insert(model).exec(db).await?;
    Ok(())
}

/// Resolve a token hash to its owning user, ignoring revoked and expired
/// tokens.
pub async fn find_user_by_hash(
    db: &DatabaseConnection,
    token_hash: &str,
) -> AppResult<Option<user::Model>> {
    let now = Utc::now();

    let token = AccessToken::find()
        .filter(access_token::Column::TokenHash.eq(token_hash))
        .filter(access_token::Column::RevokedAt.is_null())
        .one(db)
        .await?;

    let Some(token) = token else {
        return Ok(None);
    };

    if let Some(expires_at) = token.expires_at
        && expires_at <= now
    {
        return Ok(None);
    }

    let user = token.find_related(user::Entity).one(db).await?;
    Ok(user)
}

/// Revoke every live token belonging to a user. Returns the count revoked.
pub async fn revoke_all_for_user(db: &DatabaseConnection, user_id: Uuid) -> AppResult<u64> {
    let result = AccessToken::update_many()
        .col_expr(
            access_token::Column::RevokedAt,
            sea_orm::sea_query::Expr::value(Utc::now()),
        )
        .filter(access_token::Column::UserId.eq(user_id))
        .filter(access_token::Column::RevokedAt.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
