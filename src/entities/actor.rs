use sea_orm::{Set, entity::prelude::*};
use serde::Serialize;

use super::NaturalKey;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "actors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl NaturalKey for Entity {
    const KIND: &'static str = "actor";

    fn key_column() -> Column {
        Column::Name
    }

    fn id_column() -> Column {
        Column::Id
    }

    fn id(model: &Model) -> i32 {
        model.id
    }

    fn with_key(key: &str) -> ActiveModel {
        ActiveModel { name: Set(key.to_string()), ..Default::default() }
    }
}
