//! Section editing: per-field validation, partial updates, the photo blob
//! and the whole-replace vaccine section.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::db::sections as db;
use crate::db::sections::{NewDose, NewSerology};
use crate::entity::ficha;
use crate::error::{AppError, AppResult};
use crate::models::{
    AcademicUpdate, BloodGroup, DeclarationUpdate, GeneralUpdate, Insurance, MedicalUpdate,
    SerologyResultType, VaccineType, VaccinesUpdate,
};
use crate::services::lifecycle::parse_status;
use crate::services::storage::Storage;

fn require_editable(ficha: &ficha::Model) -> AppResult<()> {
    let status = parse_status(ficha)?;
    if !status.is_editable_by_student() {
        return Err(AppError::InvariantViolation(format!(
            "Ficha in status {} is not editable",
            status
        )));
    }
    Ok(())
}

fn looks_like_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Chilean RUT shape: digits (with optional dots) plus a dash and a
/// verifier digit or K.
fn looks_like_rut(s: &str) -> bool {
    let Some((body, verifier)) = s.rsplit_once('-') else {
        return false;
    };
    let digits: String = body.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 7 || digits.len() > 8 {
        return false;
    }
    if !body.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }
    let mut chars = verifier.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.is_ascii_digit() || c == 'K' || c == 'k',
        _ => false,
    }
}

fn validate_general(update: &GeneralUpdate) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();

    if let Some(ref rut) = update.rut
        && !rut.is_empty()
        && !looks_like_rut(rut)
    {
        errors.insert("rut".to_string(), "Formato de RUT inválido".to_string());
    }

    if let Some(fecha) = update.fecha_nacimiento
        && fecha >= Utc::now().date_naive()
    {
        errors.insert(
            "fecha_nacimiento".to_string(),
            "La fecha de nacimiento debe estar en el pasado".to_string(),
        );
    }

    if let Some(ref seguro) = update.seguro
        && Insurance::parse(seguro).is_none()
    {
        errors.insert("seguro".to_string(), "Seguro desconocido".to_string());
    }

    if let Some(ref correo) = update.correo_institucional
        && !correo.is_empty()
        && !looks_like_email(correo)
    {
        errors.insert(
            "correo_institucional".to_string(),
            "Correo inválido".to_string(),
        );
    }

    errors
}

fn validate_academic(update: &AcademicUpdate) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();

    if let Some(anio) = update.anio_cursa
        && !(1..=7).contains(&anio)
    {
        errors.insert(
            "anio_cursa".to_string(),
            "El año cursado debe estar entre 1 y 7".to_string(),
        );
    }

    for (key, value) in [
        ("correo_institucional", &update.correo_institucional),
        ("correo_personal", &update.correo_personal),
    ] {
        if let Some(correo) = value
            && !correo.is_empty()
            && !looks_like_email(correo)
        {
            errors.insert(key.to_string(), "Correo inválido".to_string());
        }
    }

    errors
}

fn validate_medical(update: &MedicalUpdate) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();

    if let Some(ref grupo) = update.grupo_sanguineo
        && !grupo.is_empty()
        && BloodGroup::parse(grupo).is_none()
    {
        errors.insert(
            "grupo_sanguineo".to_string(),
            "Grupo sanguíneo desconocido".to_string(),
        );
    }

    errors
}

fn validate_declaration(update: &DeclarationUpdate) -> BTreeMap<String, String> {
    let mut errors = BTreeMap::new();

    if let Some(ref rut) = update.rut
        && !rut.is_empty()
        && !looks_like_rut(rut)
    {
        errors.insert("rut".to_string(), "Formato de RUT inválido".to_string());
    }

    if let Some(fecha) = update.fecha
        && fecha > Utc::now().date_naive()
    {
        errors.insert(
            "fecha".to_string(),
            "La fecha de la declaración no puede ser futura".to_string(),
        );
    }

    errors
}

fn check(errors: BTreeMap<String, String>) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

pub async fn update_general(
    db: &DatabaseConnection,
    ficha: &ficha::Model,
    update: &GeneralUpdate,
) -> AppResult<()> {
    require_editable(ficha)?;
    check(validate_general(update))?;
    db::update_general(db, ficha.id, update).await?;
    Ok(())
}

pub async fn update_academic(
    db: &DatabaseConnection,
    ficha: &ficha::Model,
    update: &AcademicUpdate,
) -> AppResult<()> {
    require_editable(ficha)?;
    check(validate_academic(update))?;
    db::update_academic(db, ficha.id, update).await?;
    Ok(())
}

pub async fn update_medical(
    db: &DatabaseConnection,
    ficha: &ficha::Model,
    update: &MedicalUpdate,
) -> AppResult<()> {
    require_editable(ficha)?;
    check(validate_medical(update))?;
    db::update_medical(db, ficha.id, update).await?;
    Ok(())
}

pub async fn update_declaration(
    db: &DatabaseConnection,
    ficha: &ficha::Model,
    update: &DeclarationUpdate,
) -> AppResult<()> {
    require_editable(ficha)?;
    check(validate_declaration(update))?;
    db::update_declaration(db, ficha.id, update).await?;
    Ok(())
}

/// Display label for the n-th dose (1-based) of a vaccine.
///
/// COVID doses past the third are boosters; influenza is a yearly shot
/// labelled by its year.
pub fn dose_label(vaccine: VaccineType, index: usize, fecha: NaiveDate) -> String {
    match vaccine {
        VaccineType::Covid19 => {
            if index <= 3 {
                format!("Dosis {}", index)
            } else {
                format!("Refuerzo {}", index - 3)
            }
        }
        VaccineType::HepatitisB | VaccineType::Varicela => format!("Dosis {}", index),
        VaccineType::Influenza => format!("Influenza {}", fecha.year()),
    }
}

fn collect_doses(vaccine: VaccineType, fechas: &[NaiveDate], out: &mut Vec<NewDose>) {
    let mut sorted = fechas.to_vec();
    sorted.sort();
    for (i, fecha) in sorted.iter().enumerate() {
        let index = i + 1;
        out.push(NewDose {
            vaccine_type: vaccine.as_str().to_string(),
            dose_index: index as i16,
            dose_label: dose_label(vaccine, index, *fecha),
            fecha: *fecha,
        });
    }
}

/// Replace the vaccine section wholesale: stored doses and serologies are
/// dropped and reinserted from the payload inside one transaction.
pub async fn update_vaccines(
    db: &DatabaseConnection,
    ficha: &ficha::Model,
    update: &VaccinesUpdate,
) -> AppResult<()> {
    require_editable(ficha)?;

    let mut errors = BTreeMap::new();
    let mut serologies = Vec::new();

    if let Some(ref entry) = update.varicela_serologia {
        match (SerologyResultType::parse(&entry.resultado), entry.fecha) {
            (Some(resultado), Some(fecha)) => serologies.push(NewSerology {
                vaccine_type: VaccineType::Varicela.as_str().to_string(),
                resultado: resultado.as_str().to_string(),
                fecha,
            }),
            (None, _) => {
                errors.insert(
                    "varicela_serologia.resultado".to_string(),
                    "Resultado de serología desconocido".to_string(),
                );
            }
            (_, None) => {
                errors.insert(
                    "varicela_serologia.fecha".to_string(),
                    "La serología requiere fecha".to_string(),
                );
            }
        }
    }

    check(errors)?;

    let mut doses = Vec::new();
    collect_doses(VaccineType::Covid19, &update.covid_fechas, &mut doses);
    collect_doses(VaccineType::HepatitisB, &update.hepb_fechas, &mut doses);
    collect_doses(VaccineType::Varicela, &update.varicela_fechas, &mut doses);
    if let Some(fecha) = update.influenza_fecha {
        doses.push(NewDose {
            vaccine_type: VaccineType::Influenza.as_str().to_string(),
            dose_index: 1,
            dose_label: dose_label(VaccineType::Influenza, 1, fecha),
            fecha,
        });
    }

    let txn = db.begin().await?;
    db::replace_vaccines(&txn, ficha.id, &doses, &serologies).await?;
    txn.commit().await?;

    info!(
        ficha_id = %ficha.id,
        doses = doses.len(),
        serologies = serologies.len(),
        "Vaccine section replaced"
    );

    Ok(())
}

const PHOTO_MIMES: [&str; 2] = ["image/png", "image/jpeg"];

/// Store or replace the section photo. Bytes go to the attachment store
/// under a stable per-ficha key; the metadata row is upserted.
pub async fn upsert_photo(
    db: &DatabaseConnection,
    storage: &Storage,
    ficha: &ficha::Model,
    mime: &str,
    data: Vec<u8>,
) -> AppResult<()> {
    require_editable(ficha)?;

    if !PHOTO_MIMES.contains(&mime) {
        return Err(AppError::InvalidInput(format!(
            "Unsupported photo type '{}'; expected png or jpeg",
            mime
        )));
    }
    if data.is_empty() {
        return Err(AppError::InvalidInput("Empty photo upload".to_string()));
    }

    // The photo may arrive before any general field was saved.
    let general = db::ensure_general(db, ficha.id).await?;

    let sha256 = hex::encode(Sha256::digest(&data));
    let size_bytes = data.len() as i64;
    let key = Storage::photo_key(ficha.id);

    storage.put(&key, data, Some(mime)).await?;
    db::upsert_photo(db, general.id, mime, &key, size_bytes, &sha256).await?;

    info!(ficha_id = %ficha.id, size_bytes, "Photo stored");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rut_shapes() {
        assert!(looks_like_rut("12345678-5"));
        assert!(looks_like_rut("12.345.678-K"));
        assert!(looks_like_rut("1234567-0"));
        assert!(!looks_like_rut("12345678"));
        assert!(!looks_like_rut("abc-5"));
        assert!(!looks_like_rut("12345678-X"));
    }

    #[test]
    fn test_email_shapes() {
        assert!(looks_like_email("ana@uni.cl"));
        assert!(!looks_like_email("ana"));
        assert!(!looks_like_email("ana@"));
        assert!(!looks_like_email("@uni.cl"));
    }

    #[test]
    fn test_general_validation_collects_all_errors() {
        let update = GeneralUpdate {
            rut: Some("no-es-rut".to_string()),
            seguro: Some("FONASA_Z".to_string()),
            correo_institucional: Some("sin-arroba".to_string()),
            ..Default::default()
        };
        let errors = validate_general(&update);
        assert_eq!(errors.len(), 3);
        assert!(errors.contains_key("rut"));
        assert!(errors.contains_key("seguro"));
        assert!(errors.contains_key("correo_institucional"));
    }

    #[test]
    fn test_academic_year_bounds() {
        let ok = AcademicUpdate {
            anio_cursa: Some(5),
            ..Default::default()
        };
        assert!(validate_academic(&ok).is_empty());

        let bad = AcademicUpdate {
            anio_cursa: Some(9),
            ..Default::default()
        };
        assert!(validate_academic(&bad).contains_key("anio_cursa"));
    }

    #[test]
    fn test_covid_dose_labels() {
        let d = date(2021, 6, 1);
        assert_eq!(dose_label(VaccineType::Covid19, 1, d), "Dosis 1");
        assert_eq!(dose_label(VaccineType::Covid19, 3, d), "Dosis 3");
        assert_eq!(dose_label(VaccineType::Covid19, 4, d), "Refuerzo 1");
        assert_eq!(dose_label(VaccineType::Covid19, 6, d), "Refuerzo 3");
    }

    #[test]
    fn test_influenza_labelled_by_year() {
        assert_eq!(
            dose_label(VaccineType::Influenza, 1, date(2024, 4, 15)),
            "Influenza 2024"
        );
    }

    #[test]
    fn test_collect_doses_sorts_by_date() {
        let mut out = Vec::new();
        collect_doses(
            VaccineType::HepatitisB,
            &[date(2022, 5, 1), date(2021, 1, 1)],
            &mut out,
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].fecha, date(2021, 1, 1));
        assert_eq!(out[0].dose_label, "Dosis 1");
        assert_eq!(out[1].dose_label, "Dosis 2");
    }
}
