//! Document attachment: canonical naming, replace-on-upload and download.

use sea_orm::{DatabaseConnection, SqlErr, TransactionTrait};
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::documents as db;
use crate::entity::ficha;
use crate::error::{AppError, AppResult};
use crate::models::{AttachResponse, DocumentSlot};
use crate::services::lifecycle::parse_status;
use crate::services::storage::Storage;

/// Combined cap for the two identification slots (CI front and back).
const IDENTIFICATION_CAP: usize = 2;

/// ASCII-fold and slugify a string: accents stripped, lowercased,
/// spaces collapsed to hyphens, anything else outside `[a-z0-9_-]` dropped.
pub fn slugify(input: &str) -> String {
    let folded: String = input
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' | 'Á' | 'À' | 'Ä' | 'Â' => 'a',
            'é' | 'è' | 'ë' | 'ê' | 'É' | 'È' | 'Ë' | 'Ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' | 'Í' | 'Ì' | 'Ï' | 'Î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'Ó' | 'Ò' | 'Ö' | 'Ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' | 'Ú' | 'Ù' | 'Ü' | 'Û' => 'u',
            'ñ' | 'Ñ' => 'n',
            _ => c,
        })
        .collect();

    let mut slug = String::with_capacity(folded.len());
    let mut last_dash = false;
    for c in folded.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
            last_dash = false;
        } else if (c == ' ' || c == '-') && !last_dash && !slug.is_empty() {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Extension for the stored file: `.pdf` when the declared mime is PDF,
/// otherwise whatever the original name carries, `.bin` as a last resort.
pub fn extension_for(mime: &str, original_name: &str) -> String {
    if mime == "application/pdf" {
        return ".pdf".to_string();
    }

    if let Some((_, ext)) = original_name.rsplit_once('.') {
        let ext = ext.to_lowercase();
        if !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return format!(".{}", ext);
        }
    }

    ".bin".to_string()
}

/// Canonical stored file name, independent of whatever the student named
/// the upload.
pub fn canonical_file_name(
    slot: DocumentSlot,
    user_id: Uuid,
    ficha_id: Uuid,
    mime: &str,
    original_name: &str,
) -> String {
    let base = slugify(&format!(
        "{}__uid{}__fid{}",
        slot.section().title(),
        user_id,
        ficha_id
    ));
    format!("{}{}", base, extension_for(mime, original_name))
}

/// Attach a document to a slot, replacing whatever the slot held.
///
/// Rows are deleted and reinserted inside one transaction. A unique index
/// on (ficha, slot) holds replacement down to one row even when uploads
/// race: the loser's insert fails with a unique violation and the attempt
/// is retried against the winner's committed row. The object is written to
/// storage before commit and stale objects are deleted best-effort
/// afterwards.
pub async fn attach(
    db: &DatabaseConnection,
    storage: &Storage,
    ficha: &ficha::Model,
    slot: DocumentSlot,
    original_name: &str,
    mime: &str,
    data: Vec<u8>,
) -> AppResult<AttachResponse> {
    let status = parse_status(ficha)?;
    if !status.is_editable_by_student() {
        return Err(AppError::InvariantViolation(format!(
            "Ficha in status {} does not accept uploads",
            status
        )));
    }
    if data.is_empty() {
        return Err(AppError::InvalidInput("Empty upload".to_string()));
    }

    let file_name = canonical_file_name(slot, ficha.user_id, ficha.id, mime, original_name);
    let sha256 = hex::encode(Sha256::digest(&data));
    let size_bytes = data.len() as i64;
    let document_id = Uuid::new_v4();
    let object_key = Storage::document_key(ficha.id, document_id, &file_name);

    // Written before the row commits; an aborted transaction leaves at
    // worst an orphan object, never a row without bytes.
    storage.put(&object_key, data, Some(mime)).await?;

    let mut attempts = 0;
    let (replaced, stale_keys) = loop {
        attempts += 1;
        let txn = db.begin().await?;

        let existing = db::list_for_slot(&txn, ficha.id, slot).await?;
        let replaced = !existing.is_empty();
        let mut keys = Vec::new();
        for doc in &existing {
            if let Some(key) = db::delete(&txn, doc.id).await? {
                keys.push(key);
            }
        }

        if slot.is_identification() {
            let mut id_count = 1; // the row about to be inserted
            for other in DocumentSlot::IDENTIFICATION_SLOTS {
                if other != slot {
                    id_count += db::list_for_slot(&txn, ficha.id, other).await?.len();
                }
            }
            if id_count > IDENTIFICATION_CAP {
                txn.rollback().await.ok();
                storage.delete(&object_key).await.ok();
                return Err(AppError::InvariantViolation(format!(
                    "At most {} identification documents per ficha",
                    IDENTIFICATION_CAP
                )));
            }
        }

        match db::insert(
            &txn,
            document_id,
            ficha.id,
            slot.section(),
            slot,
            &file_name,
            mime,
            &object_key,
            size_bytes,
            &sha256,
        )
        .await
        {
            Ok(_) => {
                txn.commit().await?;
                break (replaced, keys);
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                // A concurrent upload to the slot committed first. Its row
                // is visible to the next attempt and gets replaced there.
                txn.rollback().await.ok();
                if attempts >= 2 {
                    storage.delete(&object_key).await.ok();
                    return Err(AppError::InvariantViolation(format!(
                        "Slot {} is being replaced concurrently",
                        slot
                    )));
                }
            }
            Err(e) => {
                txn.rollback().await.ok();
                storage.delete(&object_key).await.ok();
                return Err(e.into());
            }
        }
    };

    for key in stale_keys {
        if let Err(e) = storage.delete(&key).await {
            warn!(key = %key, error = %e, "Failed to delete replaced object");
        }
    }

    info!(
        ficha_id = %ficha.id,
        slot = %slot,
        size_bytes,
        replaced,
        "Document attached"
    );

    Ok(AttachResponse {
        document_id,
        slot,
        file_name,
        size_bytes,
        sha256,
        replaced,
    })
}

/// Fetch a document's bytes with its stored name and mime.
pub async fn download(
    db: &DatabaseConnection,
    storage: &Storage,
    document_id: Uuid,
) -> AppResult<(String, String, Vec<u8>)> {
    let doc = db::find_by_id(db, document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Document {}", document_id)))?;

    let blob = db::find_blob(db, document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Blob of document {}", document_id)))?;

    let (data, _) = storage.get(&blob.object_key).await?;

    Ok((doc.file_name, doc.file_mime, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_strips_accents_and_keeps_underscores() {
        assert_eq!(
            slugify("Antecedentes Académicos__uid5__fid7"),
            "antecedentes-academicos__uid5__fid7"
        );
        assert_eq!(slugify("Vacunas / Serología"), "vacunas-serologia");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("a  -  b"), "a-b");
        assert_eq!(slugify("--hola--"), "hola");
    }

    #[test]
    fn test_extension_prefers_pdf_mime() {
        assert_eq!(extension_for("application/pdf", "foto.png"), ".pdf");
        assert_eq!(extension_for("image/png", "foto.PNG"), ".png");
        assert_eq!(extension_for("image/png", "sin_extension"), ".bin");
        assert_eq!(extension_for("image/png", "raro.tar.gz"), ".gz");
    }

    #[test]
    fn test_canonical_file_name() {
        let user = Uuid::nil();
        let ficha = Uuid::nil();
        let name = canonical_file_name(
            DocumentSlot::CiFrente,
            user,
            ficha,
            "application/pdf",
            "cedula frente.jpeg",
        );
        assert!(name.starts_with("antecedentes-generales__uid"));
        assert!(name.ends_with(".pdf"));
        assert!(!name.contains(' '));
    }

    #[test]
    fn test_identification_slots_fit_the_cap() {
        // With one row per (ficha, slot) enforced by the database, the cap
        // holds as long as the slot list itself does not exceed it.
        assert_eq!(DocumentSlot::IDENTIFICATION_SLOTS.len(), IDENTIFICATION_CAP);
        for slot in DocumentSlot::IDENTIFICATION_SLOTS {
            assert!(slot.is_identification());
        }
    }

    #[test]
    fn test_canonical_name_is_stable_per_slot_section() {
        let user = Uuid::nil();
        let ficha = Uuid::nil();
        let a = canonical_file_name(DocumentSlot::HepbCert, user, ficha, "image/png", "a.png");
        let b = canonical_file_name(DocumentSlot::VaricelaIgg, user, ficha, "image/png", "b.png");
        // Both vaccination slots share the section title.
        assert_eq!(a, b);
    }
}
