//! Migration: Create the one-per-ficha section record tables and the
//! photo metadata table.

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
                CREATE TABLE ficha_general (
                    id UUID PRIMARY KEY,
                    ficha_id UUID NOT NULL UNIQUE REFERENCES student_ficha(id) ON DELETE CASCADE,
                    nombre_legal VARCHAR(200),
                    rut VARCHAR(20),
                    genero VARCHAR(30),
                    fecha_nacimiento DATE,
                    telefono_celular VARCHAR(30),
                    direccion_actual VARCHAR(255),
                    direccion_origen VARCHAR(255),
                    contacto_emergencia_nombre VARCHAR(150),
                    contacto_emergencia_parentesco VARCHAR(100),
                    contacto_emergencia_telefono VARCHAR(30),
                    centro_salud VARCHAR(150),
                    seguro VARCHAR(20)
                        CHECK (seguro IS NULL OR seguro IN ('FONASA_A', 'FONASA_B', 'FONASA_C',
                                                            'FONASA_D', 'ISAPRE', 'FUERZAS_ARMADAS',
                                                            'OTRO')),
                    seguro_detalle VARCHAR(200),
                    correo_institucional VARCHAR(254),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TRIGGER update_ficha_general_updated_at
                    BEFORE UPDATE ON ficha_general
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TABLE general_photo_blob (
                    id UUID PRIMARY KEY,
                    general_id UUID NOT NULL UNIQUE REFERENCES ficha_general(id) ON DELETE CASCADE,
                    mime VARCHAR(100) NOT NULL,
                    object_key VARCHAR(512) NOT NULL,
                    size_bytes BIGINT NOT NULL,
                    sha256 VARCHAR(64) NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TRIGGER update_general_photo_blob_updated_at
                    BEFORE UPDATE ON general_photo_blob
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TABLE ficha_academic (
                    id UUID PRIMARY KEY,
                    ficha_id UUID NOT NULL UNIQUE REFERENCES student_ficha(id) ON DELETE CASCADE,
                    nombre_social VARCHAR(200),
                    carrera VARCHAR(150),
                    anio_cursa SMALLINT CHECK (anio_cursa IS NULL OR (anio_cursa >= 1 AND anio_cursa <= 7)),
                    estado VARCHAR(50),
                    asignatura VARCHAR(150),
                    correo_institucional VARCHAR(254),
                    correo_personal VARCHAR(254),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TRIGGER update_ficha_academic_updated_at
                    BEFORE UPDATE ON ficha_academic
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TABLE ficha_medical (
                    id UUID PRIMARY KEY,
                    ficha_id UUID NOT NULL UNIQUE REFERENCES student_ficha(id) ON DELETE CASCADE,
                    alergias_detalle TEXT,
                    grupo_sanguineo VARCHAR(3)
                        CHECK (grupo_sanguineo IS NULL OR grupo_sanguineo IN
                               ('A+', 'A-', 'B+', 'B-', 'AB+', 'AB-', 'O+', 'O-')),
                    cronicas_detalle TEXT,
                    medicamentos_detalle TEXT,
                    otros_antecedentes TEXT,
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TRIGGER update_ficha_medical_updated_at
                    BEFORE UPDATE ON ficha_medical
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TABLE ficha_declaration (
                    id UUID PRIMARY KEY,
                    ficha_id UUID NOT NULL UNIQUE REFERENCES student_ficha(id) ON DELETE CASCADE,
                    nombre_estudiante VARCHAR(200),
                    rut VARCHAR(20),
                    firma VARCHAR(200),
                    fecha DATE,
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TRIGGER update_ficha_declaration_updated_at
                    BEFORE UPDATE ON ficha_declaration
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
                DROP TABLE IF EXISTS ficha_declaration CASCADE;
                DROP TABLE IF EXISTS ficha_medical CASCADE;
                DROP TABLE IF EXISTS ficha_academic CASCADE;
                DROP TABLE IF EXISTS general_photo_blob CASCADE;
                DROP TABLE IF EXISTS ficha_general CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
