//! Migration: Create the ficha table.
//!
//! The partial unique index enforces at most one active ficha per user;
//! racing creators get a unique violation instead of a duplicate.

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
                CREATE TABLE student_ficha (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES app_user(id) ON DELETE CASCADE,
                    is_activa BOOLEAN NOT NULL DEFAULT TRUE,
                    estado_global VARCHAR(20) NOT NULL DEFAULT 'DRAFT'
                        CHECK (estado_global IN ('DRAFT', 'SUBMITTED', 'UNDER_REVIEW',
                                                 'OBSERVED', 'APPROVED', 'REJECTED')),
                    observaciones_globales TEXT,
                    revisado_por UUID REFERENCES app_user(id) ON DELETE SET NULL,
                    revisado_en TIMESTAMPTZ,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- One active ficha per user
                CREATE UNIQUE INDEX uniq_ficha_activa_por_usuario
                    ON student_ficha(user_id)
                    WHERE is_activa;

                CREATE INDEX idx_student_ficha_user_id ON student_ficha(user_id);

                -- Reviewer queue: pending fichas, oldest first
                CREATE INDEX idx_student_ficha_estado ON student_ficha(estado_global, created_at);

                CREATE TRIGGER update_student_ficha_updated_at
                    BEFORE UPDATE ON student_ficha
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_student_ficha_updated_at ON student_ficha;
                DROP TABLE IF EXISTS student_ficha CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
