//! Migration: Create the field review table.
//!
//! The (ficha_id, field_key) unique constraint is the upsert target for
//! reviewer decisions.

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
                CREATE TABLE field_review (
                    id UUID PRIMARY KEY,
                    ficha_id UUID NOT NULL REFERENCES student_ficha(id) ON DELETE CASCADE,
                    section VARCHAR(20) NOT NULL,
                    field_key VARCHAR(100) NOT NULL,
                    status VARCHAR(10) NOT NULL CHECK (status IN ('OK', 'NOT_OK')),
                    notes TEXT,
                    reviewed_by UUID NOT NULL REFERENCES app_user(id) ON DELETE CASCADE,
                    reviewed_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    CONSTRAINT uniq_field_review_per_field UNIQUE (ficha_id, field_key)
                );

                CREATE INDEX idx_field_review_ficha ON field_review(ficha_id);
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS field_review CASCADE;")
            .await?;

        Ok(())
    }
}
