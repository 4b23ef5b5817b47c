use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{ListQuery, MovieCreate, MovieDetail, MovieListResponse, MovieUpdate},
    pagination::PageRequest,
};

pub fn router(state: Arc<AppState>) -> Router {
    let movies = Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/", get(list_movies).post(create_movie))
        .route("/movies/{id}", get(get_movie).patch(update_movie).delete(delete_movie))
        .route("/movies/{id}/", get(get_movie).patch(update_movie).delete(delete_movie));

    let api = if state.config.api_prefix.is_empty() {
        movies
    } else {
        Router::new().nest(&state.config.api_prefix, movies)
    };

    Router::new().route("/health", get(health)).merge(api).with_state(state)
}

fn invalid_request(err: impl std::fmt::Display) -> AppError {
    tracing::debug!(error = %err, "rejected request");
    AppError::invalid_input("Invalid input data.")
}

pub async fn health(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    state.movies.db().ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> AppResult<Json<MovieListResponse>> {
    let Query(q) = query.map_err(invalid_request)?;
    let req = PageRequest::new(q.page, q.per_page)?;
    Ok(Json(state.movies.list(req).await?))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<Json<MovieDetail>> {
    let Path(id) = id.map_err(invalid_request)?;
    Ok(Json(state.movies.get(id).await?))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MovieCreate>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MovieDetail>)> {
    let Json(input) = payload.map_err(invalid_request)?;
    let movie = state.movies.create(input).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<MovieUpdate>, JsonRejection>,
) -> AppResult<Json<MovieDetail>> {
    let Path(id) = id.map_err(invalid_request)?;
    let Json(patch) = payload.map_err(invalid_request)?;
    Ok(Json(state.movies.update(id, patch).await?))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id.map_err(invalid_request)?;
    state.movies.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, Response},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{config::Config, db, service::MovieService};

    const PREFIX: &str = "/api/v1/theater";

    async fn app() -> Router {
        let config = Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            api_prefix: PREFIX.to_string(),
            seed_csv: None,
        };
        let db = db::memory().await;
        let movies = MovieService::new(db, format!("{PREFIX}/movies/"));
        router(Arc::new(AppState { config: Arc::new(config), movies }))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(resp: Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn movie(name: &str) -> Value {
        json!({
            "name": name,
            "release_date": "1999-03-31",
            "status": "Released",
            "score": 87.5,
            "overview": "A hacker learns the truth.",
            "budget": 63000000.0,
            "revenue": 467222728.0,
            "country": "USA",
            "genres": ["Action", "Sci-Fi"],
            "actors": ["Keanu Reeves", "Carrie-Anne Moss"],
            "languages": ["English"]
        })
    }

    #[tokio::test]
    async fn create_get_round_trip() {
        let app = app().await;

        let resp = send(&app, Method::POST, "/api/v1/theater/movies/", Some(movie("The Matrix"))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = json_body(resp).await;
        let id = created["id"].as_i64().unwrap();

        let resp = send(&app, Method::GET, &format!("/api/v1/theater/movies/{id}/"), None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let fetched = json_body(resp).await;

        assert_eq!(fetched, created);
        assert_eq!(fetched["name"], "The Matrix");
        assert_eq!(fetched["date"], "1999-03-31");
        assert_eq!(fetched["score"], 87.5);
        assert_eq!(fetched["status"], "Released");
        assert_eq!(fetched["overview"], "A hacker learns the truth.");
        assert_eq!(fetched["budget"], 63000000.0);
        assert_eq!(fetched["country"]["code"], "USA");
        assert_eq!(fetched["languages"][0]["name"], "English");
        assert_eq!(fetched["genres"].as_array().unwrap().len(), 2);
        assert_eq!(fetched["actors"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_create_is_409() {
        let app = app().await;
        send(&app, Method::POST, "/api/v1/theater/movies/", Some(movie("The Matrix"))).await;

        let resp = send(&app, Method::POST, "/api/v1/theater/movies/", Some(movie("The Matrix"))).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body = json_body(resp).await;
        assert_eq!(body["error"], "conflict");
        assert!(body["detail"].as_str().unwrap().contains("The Matrix"));
    }

    #[tokio::test]
    async fn invalid_payloads_are_400() {
        let app = app().await;

        let mut bad_score = movie("Bad Score");
        bad_score["score"] = json!(101);
        let resp = send(&app, Method::POST, "/api/v1/theater/movies/", Some(bad_score)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["error"], "invalid_input");

        let mut bad_date = movie("Far Future");
        bad_date["release_date"] = json!("2999-01-01");
        let resp = send(&app, Method::POST, "/api/v1/theater/movies/", Some(bad_date)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp =
            send(&app, Method::POST, "/api/v1/theater/movies/", Some(json!({ "name": "No date" })))
                .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["detail"], "Invalid input data.");

        let resp = send(&app, Method::GET, "/api/v1/theater/movies/abc/", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_updates_and_validates() {
        let app = app().await;
        let created =
            json_body(send(&app, Method::POST, "/api/v1/theater/movies/", Some(movie("The Matrix"))).await)
                .await;
        let uri = format!("/api/v1/theater/movies/{}/", created["id"]);

        let resp = send(&app, Method::PATCH, &uri, Some(json!({ "score": 150 }))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({ "score": 90, "budget": null, "genres": ["Cyberpunk"] })),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let updated = json_body(resp).await;
        assert_eq!(updated["score"], 90.0);
        assert!(updated["budget"].is_null());
        assert_eq!(updated["revenue"], created["revenue"]);
        assert_eq!(updated["genres"], json!([{ "id": 3, "name": "Cyberpunk" }]));
        assert_eq!(updated["actors"], created["actors"]);

        let resp =
            send(&app, Method::PATCH, "/api/v1/theater/movies/999/", Some(json!({ "score": 1 }))).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_is_204_then_404() {
        let app = app().await;
        let created =
            json_body(send(&app, Method::POST, "/api/v1/theater/movies/", Some(movie("The Matrix"))).await)
                .await;
        let uri = format!("/api/v1/theater/movies/{}/", created["id"]);

        let resp = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());

        assert_eq!(send(&app, Method::GET, &uri, None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&app, Method::DELETE, &uri, None).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listing_contract() {
        let app = app().await;

        let resp = send(&app, Method::GET, "/api/v1/theater/movies/", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let empty = json_body(resp).await;
        assert_eq!(
            empty,
            json!({
                "movies": [],
                "prev_page": null,
                "next_page": null,
                "total_pages": 0,
                "total_items": 0
            })
        );

        for i in 0..3 {
            send(&app, Method::POST, "/api/v1/theater/movies/", Some(movie(&format!("Matrix {i}"))))
                .await;
        }

        let resp =
            send(&app, Method::GET, "/api/v1/theater/movies/?page=2&per_page=2", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page = json_body(resp).await;
        assert_eq!(page["total_items"], 3);
        assert_eq!(page["total_pages"], 2);
        assert_eq!(page["prev_page"], "/api/v1/theater/movies/?page=1&per_page=2");
        assert!(page["next_page"].is_null());
        let movies = page["movies"].as_array().unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0]["name"], "Matrix 0");
        assert!(movies[0].get("genres").is_none());

        let resp =
            send(&app, Method::GET, "/api/v1/theater/movies/?page=3&per_page=2", None).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = send(&app, Method::GET, "/api/v1/theater/movies/?per_page=21", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = send(&app, Method::GET, "/api/v1/theater/movies/?page=0", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let resp = send(&app, Method::GET, "/api/v1/theater/movies/?page=x", None).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_pings_the_database() {
        let app = app().await;
        let resp = send(&app, Method::GET, "/health", None).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, json!({ "status": "ok" }));
    }
}
