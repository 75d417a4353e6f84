//! Migration: Create vaccine dose and serology tables.
//!
//! Saving the vaccines section deletes and reinserts all rows for the
//! ficha, so there is no per-dose identity to preserve.

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
                CREATE TABLE vaccine_dose (
                    id UUID PRIMARY KEY,
                    ficha_id UUID NOT NULL REFERENCES student_ficha(id) ON DELETE CASCADE,
                    vaccine_type VARCHAR(20) NOT NULL
                        CHECK (vaccine_type IN ('COVID_19', 'HEPATITIS_B', 'VARICELA', 'INFLUENZA')),
                    dose_index SMALLINT NOT NULL CHECK (dose_index >= 1),
                    dose_label VARCHAR(50) NOT NULL,
                    fecha DATE NOT NULL
                );

                CREATE INDEX idx_vaccine_dose_ficha ON vaccine_dose(ficha_id, vaccine_type, dose_index);

                CREATE TABLE serology_result (
                    id UUID PRIMARY KEY,
                    ficha_id UUID NOT NULL REFERENCES student_ficha(id) ON DELETE CASCADE,
                    vaccine_type VARCHAR(20) NOT NULL
                        CHECK (vaccine_type IN ('COVID_19', 'HEPATITIS_B', 'VARICELA', 'INFLUENZA')),
                    resultado VARCHAR(20) NOT NULL
                        CHECK (resultado IN ('POSITIVA', 'NEGATIVA', 'INDETERMINADA')),
                    fecha DATE NOT NULL
                );

                CREATE INDEX idx_serology_result_ficha ON serology_result(ficha_id);
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
                DROP TABLE IF EXISTS serology_result CASCADE;
                DROP TABLE IF EXISTS vaccine_dose CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
