use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Countries::Table)
                    .if_not_exists()
                    .col(pk_auto(Countries::Id))
                    .col(string_len(Countries::Code, 3))
                    .col(string_len_null(Countries::Name, 255))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_countries_code_unique")
                    .table(Countries::Table)
                    .col(Countries::Code)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        create_tag_table(manager, Genres::Table, Genres::Id, Genres::Name, "idx_genres_name_unique")
            .await?;
        create_tag_table(manager, Actors::Table, Actors::Id, Actors::Name, "idx_actors_name_unique")
            .await?;
        create_tag_table(
            manager,
            Languages::Table,
            Languages::Id,
            Languages::Name,
            "idx_languages_name_unique",
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string_len(Movies::Name, 255))
                    .col(string_len(Movies::Date, 10))
                    .col(double_null(Movies::Score))
                    .col(text_null(Movies::Overview))
                    .col(string_len(Movies::Status, 32))
                    .col(double_null(Movies::Budget))
                    .col(double_null(Movies::Revenue))
                    .col(integer_null(Movies::CountryId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_country_id")
                            .from(Movies::Table, Movies::CountryId)
                            .to(Countries::Table, Countries::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("unique_movie_constraint")
                    .table(Movies::Table)
                    .col(Movies::Name)
                    .col(Movies::Date)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Languages::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Actors::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genres::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Countries::Table).to_owned()).await?;
        Ok(())
    }
}

async fn create_tag_table<I>(
    manager: &SchemaManager<'_>,
    table: I,
    id: I,
    name: I,
    index_name: &str,
) -> Result<(), DbErr>
where
    I: Iden + Copy + 'static,
{
    manager
        .create_table(
            Table::create()
                .table(table)
                .if_not_exists()
                .col(pk_auto(id))
                .col(string_len(name, 255))
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name(index_name)
                .table(table)
                .col(name)
                .unique()
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum Countries {
    Table,
    Id,
    Code,
    Name,
}

#[derive(Clone, Copy, DeriveIden)]
enum Genres {
    Table,
    Id,
    Name,
}

#[derive(Clone, Copy, DeriveIden)]
enum Actors {
    Table,
    Id,
    Name,
}

#[derive(Clone, Copy, DeriveIden)]
enum Languages {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Name,
    Date,
    Score,
    Overview,
    Status,
    Budget,
    Revenue,
    CountryId,
}
