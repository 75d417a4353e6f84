//! Attached document entity. One row per stored file; identification photos
//! (CI front and back) may have up to two rows per slot, every other slot is
//! replace-on-attach.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ficha_id: Uuid,
    pub section: String,
    pub slot: String,
    pub file_name: String,
    pub file_mime: String,
    pub review_status: String,
    pub review_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTimeUtc>,
    pub uploaded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ficha::Entity",
        from = "Column::FichaId",
        to = "super::ficha::Column::Id"
    )]
    Ficha,
    #[sea_orm(has_one = "super::document_blob::Entity")]
    Blob,
    #[sea_orm(has_many = "super::document_review_log::Entity")]
    ReviewLogs,
}

impl Related<super::ficha::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ficha.def()
    }
}

impl Related<super::document_blob::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blob.def()
    }
}

impl Related<super::document_review_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
