use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_link_table(
            manager,
            MoviesGenres::Table,
            MoviesGenres::MovieId,
            MoviesGenres::GenreId,
            Genres::Table,
            Genres::Id,
        )
        .await?;

        create_link_table(
            manager,
            ActorsMovies::Table,
            ActorsMovies::MovieId,
            ActorsMovies::ActorId,
            Actors::Table,
            Actors::Id,
        )
        .await?;

        create_link_table(
            manager,
            MoviesLanguages::Table,
            MoviesLanguages::MovieId,
            MoviesLanguages::LanguageId,
            Languages::Table,
            Languages::Id,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MoviesLanguages::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(ActorsMovies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MoviesGenres::Table).to_owned()).await?;
        Ok(())
    }
}

/// Junction keyed on (movie, tag). Rows go away with either side.
async fn create_link_table<L, T>(
    manager: &SchemaManager<'_>,
    table: L,
    movie_id: L,
    tag_id: L,
    tag_table: T,
    tag_pk: T,
) -> Result<(), DbErr>
where
    L: Iden + Copy + 'static,
    T: Iden + Copy + 'static,
{
    manager
        .create_table(
            Table::create()
                .table(table)
                .if_not_exists()
                .col(integer(movie_id))
                .col(integer(tag_id))
                .primary_key(Index::create().col(movie_id).col(tag_id))
                .foreign_key(
                    ForeignKey::create()
                        .from(table, movie_id)
                        .to(Movies::Table, Movies::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .from(table, tag_id)
                        .to(tag_table, tag_pk)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
}

#[derive(Clone, Copy, DeriveIden)]
enum Genres {
    Table,
    Id,
}

#[derive(Clone, Copy, DeriveIden)]
enum Actors {
    Table,
    Id,
}

#[derive(Clone, Copy, DeriveIden)]
enum Languages {
    Table,
    Id,
}

#[derive(Clone, Copy, DeriveIden)]
enum MoviesGenres {
    Table,
    MovieId,
    GenreId,
}

#[derive(Clone, Copy, DeriveIden)]
enum ActorsMovies {
    Table,
    MovieId,
    ActorId,
}

#[derive(Clone, Copy, DeriveIden)]
enum MoviesLanguages {
    Table,
    MovieId,
    LanguageId,
}
