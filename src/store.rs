use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RuntimeErr, SqlErr,
    Statement, TransactionTrait, sea_query::Expr, sqlx,
};

use crate::entities::{
    MovieLink, NaturalKey, movie, movie_actor, movie_genre, movie_language,
};

/// Unique-index rejections are reported separately from other storage
/// failures so callers can re-read or answer with a conflict.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// The database refused the statement because another connection holds the
/// write lock. Extended codes such as `SQLITE_BUSY_SNAPSHOT` count too.
pub fn is_busy(err: &DbErr) -> bool {
    let runtime = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return false,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db_err)) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED)),
        _ => false,
    }
}

/// Opens a transaction that holds the SQLite write lock from its first
/// statement, the way `BEGIN IMMEDIATE` does. Concurrent writers queue on the
/// busy timeout instead of failing to upgrade a read snapshot mid-transaction.
pub async fn begin_write(db: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    let txn = db.begin().await?;
    if txn.get_database_backend() == DatabaseBackend::Sqlite {
        txn.execute(Statement::from_string(DatabaseBackend::Sqlite, "DELETE FROM movies WHERE 0"))
            .await?;
    }
    Ok(txn)
}

pub async fn find_movie<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<movie::Model>, DbErr> {
    movie::Entity::find_by_id(id).one(conn).await
}

pub async fn find_movie_by_key<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    date: &str,
) -> Result<Option<movie::Model>, DbErr> {
    movie::Entity::find()
        .filter(movie::Column::Name.eq(name))
        .filter(movie::Column::Date.eq(date))
        .one(conn)
        .await
}

pub async fn count_movies<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    movie::Entity::find().count(conn).await
}

/// Newest first.
pub async fn movie_page<C: ConnectionTrait>(
    conn: &C,
    offset: u64,
    limit: u64,
) -> Result<Vec<movie::Model>, DbErr> {
    movie::Entity::find()
        .order_by_desc(movie::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(conn)
        .await
}

pub async fn find_by_key<T, C>(conn: &C, key: &str) -> Result<Option<T::Model>, DbErr>
where
    T: NaturalKey,
    C: ConnectionTrait,
{
    T::find().filter(T::key_column().eq(key)).one(conn).await
}

/// Tags attached to a movie through junction `L`, in the order they were
/// linked. One query per relation, so rows never multiply across relations.
pub async fn linked_tags<L, C>(
    conn: &C,
    movie_id: i32,
) -> Result<Vec<<L::Tag as EntityTrait>::Model>, DbErr>
where
    L: MovieLink,
    C: ConnectionTrait,
{
    let tag_ids: Vec<i32> = L::find()
        .filter(L::movie_column().eq(movie_id))
        .order_by_asc(Expr::cust("rowid"))
        .all(conn)
        .await?
        .iter()
        .map(L::tag_id)
        .collect();

    if tag_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut tags = <L::Tag as EntityTrait>::find()
        .filter(<L::Tag as NaturalKey>::id_column().is_in(tag_ids.clone()))
        .all(conn)
        .await?;
    tags.sort_by_key(|tag| {
        let id = <L::Tag as NaturalKey>::id(tag);
        tag_ids.iter().position(|&linked| linked == id)
    });
    Ok(tags)
}

/// Replaces the whole association set of `movie_id` in junction `L`.
pub async fn replace_links<L, C>(conn: &C, movie_id: i32, tag_ids: &[i32]) -> Result<(), DbErr>
where
    L: MovieLink,
    C: ConnectionTrait,
    L::Model: IntoActiveModel<L::ActiveModel>,
{
    L::delete_many().filter(L::movie_column().eq(movie_id)).exec(conn).await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    L::insert_many(tag_ids.iter().map(|&tag_id| L::link(movie_id, tag_id)))
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// Removes a movie with its junction rows. Referenced tags stay.
pub async fn delete_movie_cascade<C: ConnectionTrait>(conn: &C, movie_id: i32) -> Result<u64, DbErr> {
    replace_links::<movie_genre::Entity, _>(conn, movie_id, &[]).await?;
    replace_links::<movie_actor::Entity, _>(conn, movie_id, &[]).await?;
    replace_links::<movie_language::Entity, _>(conn, movie_id, &[]).await?;

    let res = movie::Entity::delete_by_id(movie_id).exec(conn).await?;
    Ok(res.rows_affected)
}
