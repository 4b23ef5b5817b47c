use sea_orm::{Set, entity::prelude::*};
use serde::Serialize;

use super::NaturalKey;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "countries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub code: String,
    pub name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movie::Entity")]
    Movie,
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl NaturalKey for Entity {
    const KIND: &'static str = "country";

    fn key_column() -> Column {
        Column::Code
    }

    fn id_column() -> Column {
        Column::Id
    }

    fn id(model: &Model) -> i32 {
        model.id
    }

    fn with_key(key: &str) -> ActiveModel {
        ActiveModel { code: Set(key.to_string()), name: Set(None), ..Default::default() }
    }
}
