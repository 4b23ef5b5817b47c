use sea_orm::{Set, entity::prelude::*};

use super::MovieLink;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movies_languages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub movie_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub language_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movie::Entity",
        from = "Column::MovieId",
        to = "super::movie::Column::Id",
        on_delete = "Cascade"
    )]
    Movie,
    #[sea_orm(
        belongs_to = "super::language::Entity",
        from = "Column::LanguageId",
        to = "super::language::Column::Id",
        on_delete = "Cascade"
    )]
    Language,
}

impl ActiveModelBehavior for ActiveModel {}

impl MovieLink for Entity {
    type Tag = super::language::Entity;

    fn movie_column() -> Column {
        Column::MovieId
    }

    fn tag_id(model: &Model) -> i32 {
        model.language_id
    }

    fn link(movie_id: i32, tag_id: i32) -> ActiveModel {
        ActiveModel { movie_id: Set(movie_id), language_id: Set(tag_id) }
    }
}
