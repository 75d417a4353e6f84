//! General (personal) section record, one per ficha.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ficha_general")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub ficha_id: Uuid,
    pub nombre_legal: Option<String>,
    pub rut: Option<String>,
    pub genero: Option<String>,
    pub fecha_nacimiento: Option<Date>,
    pub telefono_celular: Option<String>,
    pub direccion_actual: Option<String>,
    pub direccion_origen: Option<String>,
    pub contacto_emergencia_nombre: Option<String>,
    pub contacto_emergencia_parentesco: Option<String>,
    pub contacto_emergencia_telefono: Option<String>,
    pub centro_salud: Option<String>,
    pub seguro: Option<String>,
    pub seguro_detalle: Option<String>,
    pub correo_institucional: Option<String>,
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
    #[sea_orm(has_one = "super::general_photo_blob::Entity")]
    Photo,
}

impl Related<super::ficha::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ficha.def()
    }
}

impl Related<super::general_photo_blob::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
