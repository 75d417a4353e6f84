//! Migration: Create access tokens table.
//!
//! Tokens are stored as SHA-256 hashes. The short prefix column is for
//! log correlation only and is not unique.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE access_token (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES app_user(id) ON DELETE CASCADE,
                    token_hash VARCHAR(64) NOT NULL UNIQUE,
                    token_prefix VARCHAR(16) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    expires_at TIMESTAMPTZ,
                    revoked_at TIMESTAMPTZ
                );

                CREATE INDEX idx_access_token_user_id ON access_token(user_id);

                -- Lookup path for request authentication (live tokens only)
                CREATE INDEX idx_access_token_hash_live ON access_token(token_hash)
                    WHERE revoked_at IS NULL;
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS access_token CASCADE;")
            .await?;

        Ok(())
    }
}
