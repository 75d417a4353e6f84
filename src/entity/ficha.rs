//! Ficha entity: the container record for one submission cycle.
//!
//! A partial unique index (`uniq_ficha_activa_por_usuario`) guarantees at
//! most one row per user with `is_activa = true`.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_ficha")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub is_activa: bool,
    pub estado_global: String,
    pub observaciones_globales: Option<String>,
    pub revisado_por: Option<Uuid>,
    pub revisado_en: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::document::Entity")]
    Documents,
    #[sea_orm(has_many = "super::field_review::Entity")]
    FieldReviews,
    #[sea_orm(has_many = "super::vaccine_dose::Entity")]
    VaccineDoses,
    #[sea_orm(has_many = "super::serology_result::Entity")]
    Serologies,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::field_review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FieldReviews.def()
    }
}

impl Related<super::vaccine_dose::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VaccineDoses.def()
    }
}

impl Related<super::serology_result::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Serologies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
