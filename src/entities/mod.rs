pub mod actor;
pub mod country;
pub mod genre;
pub mod language;
pub mod movie;
pub mod movie_actor;
pub mod movie_genre;
pub mod movie_language;

use sea_orm::EntityTrait;

/// Reference entity addressed by a unique, human-meaningful key (a country
/// code or a tag name) and created on first use.
pub trait NaturalKey: EntityTrait {
    const KIND: &'static str;

    fn key_column() -> Self::Column;

    fn id_column() -> Self::Column;

    fn id(model: &Self::Model) -> i32;

    /// A fresh row carrying only the natural key.
    fn with_key(key: &str) -> Self::ActiveModel;
}

/// Junction between a movie and one tag entity, keyed on both ids.
pub trait MovieLink: EntityTrait {
    type Tag: NaturalKey;

    fn movie_column() -> Self::Column;

    fn tag_id(model: &Self::Model) -> i32;

    fn link(movie_id: i32, tag_id: i32) -> Self::ActiveModel;
}
