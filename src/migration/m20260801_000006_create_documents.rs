//! Migration: Create document, document blob, and review audit tables.

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
                CREATE TABLE student_document (
                    id UUID PRIMARY KEY,
                    ficha_id UUID NOT NULL REFERENCES student_ficha(id) ON DELETE CASCADE,
                    section VARCHAR(20) NOT NULL
                        CHECK (section IN ('GENERALES', 'ACADEMICOS', 'MORBIDOS', 'VACUNAS', 'ADJUNTA')),
                    slot VARCHAR(40) NOT NULL,
                    file_name VARCHAR(255) NOT NULL,
                    file_mime VARCHAR(100) NOT NULL,
                    review_status VARCHAR(20) NOT NULL DEFAULT 'ATTACHED'
                        CHECK (review_status IN ('ATTACHED', 'REVIEWED_NOT_OK', 'REVIEWED_OK')),
                    review_notes TEXT,
                    reviewed_by UUID REFERENCES app_user(id) ON DELETE SET NULL,
                    reviewed_at TIMESTAMPTZ,
                    uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- One document per slot; replacement deletes then reinserts
                CREATE UNIQUE INDEX uniq_student_document_ficha_slot
                    ON student_document(ficha_id, slot);

                CREATE TABLE document_blob (
                    id UUID PRIMARY KEY,
                    document_id UUID NOT NULL UNIQUE REFERENCES student_document(id) ON DELETE CASCADE,
                    object_key VARCHAR(512) NOT NULL,
                    size_bytes BIGINT NOT NULL,
                    sha256 VARCHAR(64) NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                -- Append-only audit of document review decisions
                CREATE TABLE document_review_log (
                    id UUID PRIMARY KEY,
                    document_id UUID NOT NULL REFERENCES student_document(id) ON DELETE CASCADE,
                    old_status VARCHAR(20),
                    new_status VARCHAR(20) NOT NULL,
                    notes TEXT,
                    reviewed_by UUID NOT NULL REFERENCES app_user(id) ON DELETE CASCADE,
                    reviewed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_document_review_log_document
                    ON document_review_log(document_id, reviewed_at DESC);
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
                DROP TABLE IF EXISTS document_review_log CASCADE;
                DROP TABLE IF EXISTS document_blob CASCADE;
                DROP TABLE IF EXISTS student_document CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
