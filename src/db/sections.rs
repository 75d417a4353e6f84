//! Database operations for ficha section records.
//!
//! Section rows are created lazily on the first write; a ficha nobody has
//! saved into has none. Updates are partial: absent fields keep their value.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::{
    academic, declaration, general, general_photo_blob, medical, serology_result, vaccine_dose,
};
use crate::error::{AppError, AppResult};
use crate::models::{AcademicUpdate, DeclarationUpdate, GeneralUpdate, MedicalUpdate};

fn empty_general(ficha_id: Uuid) -> general::ActiveModel {
    general::ActiveModel {
        id: Set(Uuid::new_v4()),
        ficha_id: Set(ficha_id),
        nombre_legal: Set(None),
        rut: Set(None),
        genero: Set(None),
        fecha_nacimiento: Set(None),
        telefono_celular: Set(None),
        direccion_actual: Set(None),
        direccion_origen: Set(None),
        contacto_emergencia_nombre: Set(None),
        contacto_emergencia_parentesco: Set(None),
        contacto_emergencia_telefono: Set(None),
        centro_salud: Set(None),
        seguro: Set(None),
        seguro_detalle: Set(None),
        correo_institucional: Set(None),
        updated_at: Set(Utc::now()),
    }
}

fn empty_academic(ficha_id: Uuid) -> academic::ActiveModel {
    academic::ActiveModel {
        id: Set(Uuid::new_v4()),
        ficha_id: Set(ficha_id),
        nombre_social: Set(None),
        carrera: Set(None),
        anio_cursa: Set(None),
        estado: Set(None),
        asignatura: Set(None),
        correo_institucional: Set(None),
        correo_personal: Set(None),
        updated_at: Set(Utc::now()),
    }
}

fn empty_medical(ficha_id: Uuid) -> medical::ActiveModel {
    medical::ActiveModel {
        id: Set(Uuid::new_v4()),
        ficha_id: Set(ficha_id),
        alergias_detalle: Set(None),
        grupo_sanguineo: Set(None),
        cronicas_detalle: Set(None),
        medicamentos_detalle: Set(None),
        otros_antecedentes: Set(None),
        updated_at: Set(Utc::now()),
    }
}

fn empty_declaration(ficha_id: Uuid) -> declaration::ActiveModel {
    declaration::ActiveModel {
        id: Set(Uuid::new_v4()),
        ficha_id: Set(ficha_id),
        nombre_estudiante: Set(None),
        rut: Set(None),
        firma: Set(None),
        fecha: Set(None),
        updated_at: Set(Utc::now()),
    }
}

fn section_row_vanished(section: &str, ficha_id: Uuid) -> AppError {
    AppError::Database(format!(
        "{} section row vanished for ficha {}",
        section, ficha_id
    ))
}

pub async fn find_general<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<Option<general::Model>> {
    let result = general::Entity::find()
        .filter(general::Column::FichaId.eq(ficha_id))
        .one(db)
        .await?;
    Ok(result)
}

pub async fn find_academic<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<Option<academic::Model>> {
    let result = academic::Entity::find()
        .filter(academic::Column::FichaId.eq(ficha_id))
        .one(db)
        .await?;
    Ok(result)
}

pub async fn find_medical<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<Option<medical::Model>> {
    let result = medical::Entity::find()
        .filter(medical::Column::FichaId.eq(ficha_id))
        .one(db)
        .await?;
    Ok(result)
}

pub async fn find_declaration<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<Option<declaration::Model>> {
    let result = declaration::Entity::find()
        .filter(declaration::Column::FichaId.eq(ficha_id))
        .one(db)
        .await?;
    Ok(result)
}

/// Fetch the general section row, inserting an empty one on first touch.
/// Racing first writes collide on the unique ficha_id index; the loser
/// re-selects the winner's row.
pub async fn ensure_general<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<general::Model> {
    if let Some(row) = find_general(db, ficha_id).await? {
        return Ok(row);
    }
    match empty_general(ficha_id).insert(db).await {
        Ok(row) => Ok(row),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_general(db, ficha_id)
                .await?
                .ok_or_else(|| section_row_vanished("General", ficha_id))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn ensure_academic<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<academic::Model> {
    if let Some(row) = find_academic(db, ficha_id).await? {
        return Ok(row);
    }
    match empty_academic(ficha_id).insert(db).await {
        Ok(row) => Ok(row),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_academic(db, ficha_id)
                .await?
                .ok_or_else(|| section_row_vanished("Academic", ficha_id))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn ensure_medical<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<medical::Model> {
    if let Some(row) = find_medical(db, ficha_id).await? {
        return Ok(row);
    }
    match empty_medical(ficha_id).insert(db).await {
        Ok(row) => Ok(row),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_medical(db, ficha_id)
                .await?
                .ok_or_else(|| section_row_vanished("Medical", ficha_id))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn ensure_declaration<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<declaration::Model> {
    if let Some(row) = find_declaration(db, ficha_id).await? {
        return Ok(row);
    }
    match empty_declaration(ficha_id).insert(db).await {
        Ok(row) => Ok(row),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_declaration(db, ficha_id)
                .await?
                .ok_or_else(|| section_row_vanished("Declaration", ficha_id))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn update_general<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
    update: &GeneralUpdate,
) -> AppResult<general::Model> {
    let row = ensure_general(db, ficha_id).await?;

    let mut active: general::ActiveModel = row.into();
    if let Some(ref v) = update.nombre_legal {
        active.nombre_legal = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.rut {
        active.rut = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.genero {
        active.genero = Set(Some(v.clone()));
    }
    if let Some(v) = update.fecha_nacimiento {
        active.fecha_nacimiento = Set(Some(v));
    }
    if let Some(ref v) = update.telefono_celular {
        active.telefono_celular = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.direccion_actual {
        active.direccion_actual = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.direccion_origen {
        active.direccion_origen = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.contacto_emergencia_nombre {
        active.contacto_emergencia_nombre = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.contacto_emergencia_parentesco {
        active.contacto_emergencia_parentesco = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.contacto_emergencia_telefono {
        active.contacto_emergencia_telefono = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.centro_salud {
        active.centro_salud = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.seguro {
        active.seguro = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.seguro_detalle {
        active.seguro_detalle = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.correo_institucional {
        active.correo_institucional = Set(Some(v.clone()));
    }
    active.updated_at = Set(Utc::now());

    let result = active.update(db).await?;
    Ok(result)
}

pub async fn update_academic<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
    update: &AcademicUpdate,
) -> AppResult<academic::Model> {
    let row = ensure_academic(db, ficha_id).await?;

    let mut active: academic::ActiveModel = row.into();
    if let Some(ref v) = update.nombre_social {
        active.nombre_social = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.carrera {
        active.carrera = Set(Some(v.clone()));
    }
    if let Some(v) = update.anio_cursa {
        active.anio_cursa = Set(Some(v));
    }
    if let Some(ref v) = update.estado {
        active.estado = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.asignatura {
        active.asignatura = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.correo_institucional {
        active.correo_institucional = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.correo_personal {
        active.correo_personal = Set(Some(v.clone()));
    }
    active.updated_at = Set(Utc::now());

    let result = active.update(db).await?;
    Ok(result)
}

pub async fn update_medical<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
    update: &MedicalUpdate,
) -> AppResult<medical::Model> {
    let row = ensure_medical(db, ficha_id).await?;

    let mut active: medical::ActiveModel = row.into();
    if let Some(ref v) = update.alergias_detalle {
        active.alergias_detalle = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.grupo_sanguineo {
        active.grupo_sanguineo = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.cronicas_detalle {
        active.cronicas_detalle = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.medicamentos_detalle {
        active.medicamentos_detalle = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.otros_antecedentes {
        active.otros_antecedentes = Set(Some(v.clone()));
    }
    active.updated_at = Set(Utc::now());

    let result = active.update(db).await?;
    Ok(result)
}

pub async fn update_declaration<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
    update: &DeclarationUpdate,
) -> AppResult<declaration::Model> {
    let row = ensure_declaration(db, ficha_id).await?;

    let mut active: declaration::ActiveModel = row.into();
    if let Some(ref v) = update.nombre_estudiante {
        active.nombre_estudiante = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.rut {
        active.rut = Set(Some(v.clone()));
    }
    if let Some(ref v) = update.firma {
        active.firma = Set(Some(v.clone()));
    }
    if let Some(v) = update.fecha {
        active.fecha = Set(Some(v));
    }
    active.updated_at = Set(Utc::now());

    let result = active.update(db).await?;
    Ok(result)
}

pub async fn find_photo<C: ConnectionTrait>(
    db: &C,
    general_id: Uuid,
) -> AppResult<Option<general_photo_blob::Model>> {
    let result = general_photo_blob::Entity::find()
        .filter(general_photo_blob::Column::GeneralId.eq(general_id))
        .one(db)
        .await?;
    Ok(result)
}

/// Insert or replace the photo metadata for a general section row.
pub async fn upsert_photo<C: ConnectionTrait>(
    db: &C,
    general_id: Uuid,
    mime: &str,
    object_key: &str,
    size_bytes: i64,
    sha256: &str,
) -> AppResult<general_photo_blob::Model> {
    let now = Utc::now();

    match find_photo(db, general_id).await? {
        Some(existing) => {
            let mut active: general_photo_blob::ActiveModel = existing.into();
            active.mime = Set(mime.to_string());
            active.object_key = Set(object_key.to_string());
            active.size_bytes = Set(size_bytes);
            active.sha256 = Set(sha256.to_string());
            active.updated_at = Set(now);
            let result = active.update(db).await?;
            Ok(result)
        }
        None => {
            let model = general_photo_blob::ActiveModel {
                id: Set(Uuid::new_v4()),
                general_id: Set(general_id),
                mime: Set(mime.to_string()),
                object_key: Set(object_key.to_string()),
                size_bytes: Set(size_bytes),
                sha256: Set(sha256.to_string()),
                updated_at: Set(now),
            };
            let result = model.insert(db).await?;
            Ok(result)
        }
    }
}

/// A dose row ready for insertion, already labelled.
#[derive(Debug, Clone)]
pub struct NewDose {
    pub vaccine_type: String,
    pub dose_index: i16,
    pub dose_label: String,
    pub fecha: chrono::NaiveDate,
}

/// A serology row ready for insertion.
#[derive(Debug, Clone)]
pub struct NewSerology {
    pub vaccine_type: String,
    pub resultado: String,
    pub fecha: chrono::NaiveDate,
}

/// Replace the whole vaccine section: delete every dose and serology row
/// for the ficha, then insert the new set. Runs inside the caller's
/// transaction.
pub async fn replace_vaccines<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
    doses: &[NewDose],
    serologies: &[NewSerology],
) -> AppResult<()> {
    vaccine_dose::Entity::delete_many()
        .filter(vaccine_dose::Column::FichaId.eq(ficha_id))
        .exec(db)
        .await?;

    serology_result::Entity::delete_many()
        .filter(serology_result::Column::FichaId.eq(ficha_id))
        .exec(db)
        .await?;

    for dose in doses {
        vaccine_dose::ActiveModel {
            id: Set(Uuid::new_v4()),
            ficha_id: Set(ficha_id),
            vaccine_type: Set(dose.vaccine_type.clone()),
            dose_index: Set(dose.dose_index),
            dose_label: Set(dose.dose_label.clone()),
            fecha: Set(dose.fecha),
        }
        .insert(db)
        .await?;
    }

    for serology in serologies {
        serology_result::ActiveModel {
            id: Set(Uuid::new_v4()),
            ficha_id: Set(ficha_id),
            vaccine_type: Set(serology.vaccine_type.clone()),
            resultado: Set(serology.resultado.clone()),
            fecha: Set(serology.fecha),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

pub async fn list_vaccine_doses<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<Vec<vaccine_dose::Model>> {
    let result = vaccine_dose::Entity::find()
        .filter(vaccine_dose::Column::FichaId.eq(ficha_id))
        .order_by_asc(vaccine_dose::Column::VaccineType)
        .order_by_asc(vaccine_dose::Column::DoseIndex)
        .all(db)
        .await?;
    Ok(result)
}

pub async fn list_serologies<C: ConnectionTrait>(
    db: &C,
    ficha_id: Uuid,
) -> AppResult<Vec<serology_result::Model>> {
    let result = serology_result::Entity::find()
        .filter(serology_result::Column::FichaId.eq(ficha_id))
        .all(db)
        .await?;
    Ok(result)
}
