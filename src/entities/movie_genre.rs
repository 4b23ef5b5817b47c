use sea_orm::{Set, entity::prelude::*};

use super::MovieLink;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "movies_genres")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub movie_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub genre_id: i32,
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
        belongs_to = "super::genre::Entity",
        from = "Column::GenreId",
        to = "super::genre::Column::Id",
        on_delete = "Cascade"
    )]
    Genre,
}

impl ActiveModelBehavior for ActiveModel {}

impl MovieLink for Entity {
    type Tag = super::genre::Entity;

    fn movie_column() -> Column {
        Column::MovieId
    }

    fn tag_id(model: &Model) -> i32 {
        model.genre_id
    }

    fn link(movie_id: i32, tag_id: i32) -> ActiveModel {
        ActiveModel { movie_id: Set(movie_id), genre_id: Set(tag_id) }
    }
}
