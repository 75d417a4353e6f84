//! Academic section record, one per ficha.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ficha_academic")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub ficha_id: Uuid,
    pub nombre_social: Option<String>,
    pub carrera: Option<String>,
    pub anio_cursa: Option<i16>,
    pub estado: Option<String>,
    pub asignatura: Option<String>,
    pub correo_institucional: Option<String>,
    pub correo_personal: Option<String>,
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
