//! Photo metadata for the general section. Bytes live in object storage.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "general_photo_blob")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub general_id: Uuid,
    pub mime: String,
    pub object_key: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::general::Entity",
        from = "Column::GeneralId",
        to = "super::general::Column::Id"
    )]
    General,
}

impl Related<super::general::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::General.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
