use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    ModelTrait, Set,
};
use tracing::{debug, info};

use crate::{
    entities::{actor, country, genre, language, movie, movie_actor, movie_genre, movie_language},
    error::{AppError, AppResult},
    models::{Clearable, MovieCreate, MovieDetail, MovieListResponse, MovieSummary, MovieUpdate},
    pagination::{PageRequest, PageWindow},
    reconcile::{self, ids},
    store,
};

#[derive(Clone)]
pub struct MovieService {
    db: DatabaseConnection,
    listing_path: String,
}

impl MovieService {
    /// `listing_path` is the public path of the list endpoint, used in page links.
    pub fn new(db: DatabaseConnection, listing_path: impl Into<String>) -> Self {
        Self { db, listing_path: listing_path.into() }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(store::count_movies(&self.db).await?)
    }

    pub async fn list(&self, req: PageRequest) -> AppResult<MovieListResponse> {
        let total_items = store::count_movies(&self.db).await?;
        let window = PageWindow::compute(req, total_items, &self.listing_path)?;

        let rows = if window.is_empty() {
            Vec::new()
        } else {
            store::movie_page(&self.db, window.offset, window.limit).await?
        };

        debug!(
            page = req.page,
            per_page = req.per_page,
            total_items,
            returned = rows.len(),
            "listed movies"
        );

        Ok(MovieListResponse {
            movies: rows.into_iter().map(MovieSummary::from_model).collect::<AppResult<_>>()?,
            prev_page: window.prev_page,
            next_page: window.next_page,
            total_pages: window.total_pages,
            total_items: window.total_items,
        })
    }

    pub async fn get(&self, id: i32) -> AppResult<MovieDetail> {
        let movie = store::find_movie(&self.db, id).await?.ok_or_else(|| movie_not_found(id))?;
        load_detail(&self.db, movie).await
    }

    pub async fn create(&self, input: MovieCreate) -> AppResult<MovieDetail> {
        input.validate(today())?;

        let date = input.release_date.to_string();
        let txn = store::begin_write(&self.db).await?;

        if store::find_movie_by_key(&txn, &input.name, &date).await?.is_some() {
            return Err(duplicate_movie(&input.name, &date));
        }

        let country = reconcile::resolve_country(&txn, input.country.as_deref()).await?;
        let genres = reconcile::resolve_all::<genre::Entity>(&txn, &input.genres).await?;
        let actors = reconcile::resolve_all::<actor::Entity>(&txn, &input.actors).await?;
        let languages = reconcile::resolve_all::<language::Entity>(&txn, &input.languages).await?;

        let model = movie::ActiveModel {
            name: Set(input.name.clone()),
            date: Set(date.clone()),
            score: Set(input.score),
            overview: Set(input.overview),
            status: Set(input.status.as_str().to_string()),
            budget: Set(input.budget),
            revenue: Set(input.revenue),
            country_id: Set(country.as_ref().map(|c| c.id)),
            ..Default::default()
        };

        let inserted = movie::Entity::insert(model).exec_with_returning(&txn).await;
        let movie = match inserted {
            Ok(movie) => movie,
            Err(err) if store::is_unique_violation(&err) => {
                return Err(duplicate_movie(&input.name, &date));
            },
            Err(err) => return Err(err.into()),
        };

        store::replace_links::<movie_genre::Entity, _>(&txn, movie.id, &ids::<genre::Entity>(&genres))
            .await?;
        store::replace_links::<movie_actor::Entity, _>(&txn, movie.id, &ids::<actor::Entity>(&actors))
            .await?;
        store::replace_links::<movie_language::Entity, _>(
            &txn,
            movie.id,
            &ids::<language::Entity>(&languages),
        )
        .await?;

        let detail = load_detail(&txn, movie).await?;
        txn.commit().await?;

        info!(movie_id = detail.id, name = %detail.name, date = %detail.date, "movie created");
        Ok(detail)
    }

    pub async fn update(&self, id: i32, patch: MovieUpdate) -> AppResult<MovieDetail> {
        patch.validate(today())?;

        let txn = store::begin_write(&self.db).await?;
        let existing = store::find_movie(&txn, id).await?.ok_or_else(|| movie_not_found(id))?;

        let name = patch.name.clone().unwrap_or_else(|| existing.name.clone());
        let date = patch.release_date.map(|d| d.to_string()).unwrap_or_else(|| existing.date.clone());

        if name != existing.name || date != existing.date {
            if let Some(other) = store::find_movie_by_key(&txn, &name, &date).await? {
                if other.id != id {
                    return Err(duplicate_movie(&name, &date));
                }
            }
        }

        let country_id = match &patch.country {
            Clearable::Unchanged => existing.country_id,
            Clearable::Clear => None,
            Clearable::Set(code) => {
                reconcile::resolve_country(&txn, Some(code)).await?.map(|c| c.id)
            },
        };

        let mut active = existing.clone().into_active_model();
        active.name = Set(name.clone());
        active.date = Set(date.clone());
        if let Some(status) = patch.status {
            active.status = Set(status.as_str().to_string());
        }
        active.score = Set(patch.score.resolve(existing.score));
        active.overview = Set(patch.overview.resolve(existing.overview.clone()));
        active.budget = Set(patch.budget.resolve(existing.budget));
        active.revenue = Set(patch.revenue.resolve(existing.revenue));
        active.country_id = Set(country_id);

        let movie = match active.update(&txn).await {
            Ok(movie) => movie,
            Err(err) if store::is_unique_violation(&err) => {
                return Err(duplicate_movie(&name, &date));
            },
            Err(err) => return Err(err.into()),
        };

        if let Some(genres) = &patch.genres {
            let genres = reconcile::resolve_all::<genre::Entity>(&txn, genres).await?;
            store::replace_links::<movie_genre::Entity, _>(&txn, id, &ids::<genre::Entity>(&genres))
                .await?;
        }
        if let Some(actors) = &patch.actors {
            let actors = reconcile::resolve_all::<actor::Entity>(&txn, actors).await?;
            store::replace_links::<movie_actor::Entity, _>(&txn, id, &ids::<actor::Entity>(&actors))
                .await?;
        }
        if let Some(languages) = &patch.languages {
            let languages = reconcile::resolve_all::<language::Entity>(&txn, languages).await?;
            store::replace_links::<movie_language::Entity, _>(
                &txn,
                id,
                &ids::<language::Entity>(&languages),
            )
            .await?;
        }

        let detail = load_detail(&txn, movie).await?;
        txn.commit().await?;

        info!(movie_id = id, "movie updated");
        Ok(detail)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let txn = store::begin_write(&self.db).await?;
        if store::find_movie(&txn, id).await?.is_none() {
            return Err(movie_not_found(id));
        }

        store::delete_movie_cascade(&txn, id).await?;
        txn.commit().await?;

        info!(movie_id = id, "movie deleted");
        Ok(())
    }

}

async fn load_detail<C: ConnectionTrait>(conn: &C, movie: movie::Model) -> AppResult<MovieDetail> {
    let country = match movie.country_id {
        Some(_) => movie.find_related(country::Entity).one(conn).await?,
        None => None,
    };
    let genres = store::linked_tags::<movie_genre::Entity, _>(conn, movie.id).await?;
    let actors = store::linked_tags::<movie_actor::Entity, _>(conn, movie.id).await?;
    let languages = store::linked_tags::<movie_language::Entity, _>(conn, movie.id).await?;

    MovieDetail::assemble(movie, country, genres, actors, languages)
}

fn today() -> jiff::civil::Date {
    jiff::Zoned::now().into()
}

fn movie_not_found(id: i32) -> AppError {
    AppError::not_found(format!("Movie with id {id} was not found."))
}

fn duplicate_movie(name: &str, date: &str) -> AppError {
    AppError::conflict(format!(
        "A movie with the name '{name}' and release date '{date}' already exists."
    ))
}
