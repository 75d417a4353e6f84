//! Declaration section record, one per ficha.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ficha_declaration")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub ficha_id: Uuid,
    pub nombre_estudiante: Option<String>,
    pub rut: Option<String>,
    pub firma: Option<String>,
    pub fecha: Option<Date>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ficha::Entity",
        from = "Column::FichaId",
        to = "super::ficha::Column::Id"
    )]
    Ficha,
}

impl Related<super::ficha::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ficha.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
