//! Migration: Create the support ticket table.

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
                CREATE TABLE support_ticket (
                    id UUID PRIMARY KEY,
                    user_id UUID NOT NULL REFERENCES app_user(id) ON DELETE CASCADE,
                    ficha_id UUID NOT NULL REFERENCES student_ficha(id) ON DELETE CASCADE,
                    tipo_consulta VARCHAR(50) NOT NULL,
                    asunto VARCHAR(200) NOT NULL,
                    detalle TEXT NOT NULL,
                    respuesta_admin TEXT,
                    status VARCHAR(10) NOT NULL DEFAULT 'ABIERTO'
                        CHECK (status IN ('ABIERTO', 'CERRADO')),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_support_ticket_status ON support_ticket(status, created_at DESC);
                CREATE INDEX idx_support_ticket_user ON support_ticket(user_id);

                CREATE TRIGGER update_support_ticket_updated_at
                    BEFORE UPDATE ON support_ticket
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
                DROP TRIGGER IF EXISTS update_support_ticket_updated_at ON support_ticket;
                DROP TABLE IF EXISTS support_ticket CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
