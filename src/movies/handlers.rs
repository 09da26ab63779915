use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use mongodb::bson::oid::ObjectId;

use super::types::*;
use crate::db::{DirectorRepo, Movie, MovieRepo};
use crate::server::AppState;

/// A path value that is not ObjectId-shaped can never match a stored movie,
/// so it reads as "not found" rather than an input error.
fn parse_movie_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::NotFound)
}

/// Explicit join step: after the primary fetch, resolve the director
/// reference against the `directors` collection. Dangling references
/// expand to `None`; only a store failure is an error.
async fn expand_director(state: &AppState, movie: Movie) -> Result<MovieDetail, ApiError> {
    let director = match movie.director {
        Some(id) => state.db.get_director(id).await?,
        None => None,
    };
    Ok(MovieDetail::new(movie, director))
}

/// List all movies with director references expanded.
#[utoipa::path(
    get,
    path = "/api/movies",
    tag = "movies",
    responses(
        (status = 200, description = "All movies, director expanded", body = [MovieDetail]),
        (status = 500, description = "Store failure", body = ErrorMessage),
    )
)]
pub async fn list_movies(
    State(state): State<AppState>,
) -> Result<Json<Vec<MovieDetail>>, ApiError> {
    let movies = state.db.list_movies().await?;
    let mut details = Vec::with_capacity(movies.len());
    for movie in movies {
        details.push(expand_director(&state, movie).await?);
    }
    Ok(Json(details))
}

/// Fetch a single movie by id with its director expanded.
#[utoipa::path(
    get,
    path = "/api/movies/{id}",
    tag = "movies",
    params(("id" = String, Path, description = "Movie id")),
    responses(
        (status = 200, description = "The movie, director expanded", body = MovieDetail),
        (status = 404, description = "No movie with this id", body = StatusMessage),
        (status = 500, description = "Store failure", body = ErrorMessage),
    )
)]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieDetail>, ApiError> {
    let id = parse_movie_id(&id)?;
    let movie = state.db.get_movie(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(expand_director(&state, movie).await?))
}

/// Create a movie. `title` is required; the director reference is stored
/// unchecked and returned raw.
#[utoipa::path(
    post,
    path = "/api/movies",
    tag = "movies",
    request_body = MoviePayload,
    responses(
        (status = 201, description = "Movie created", body = MovieResponse),
        (status = 400, description = "Validation failure", body = ErrorMessage),
    )
)]
pub async fn create_movie(
    State(state): State<AppState>,
    payload: Result<Json<MoviePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<MovieResponse>), ApiError> {
    let Json(payload) = payload.map_err(|err| ApiError::Validation(err.body_text()))?;
    let movie = payload.into_new_movie()?;
    let created = state.db.create_movie(movie).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Partially update a movie. Omitted fields keep their prior values;
/// the response is the post-image.
#[utoipa::path(
    put,
    path = "/api/movies/{id}",
    tag = "movies",
    params(("id" = String, Path, description = "Movie id")),
    request_body = MoviePayload,
    responses(
        (status = 200, description = "Movie after the update", body = MovieResponse),
        (status = 400, description = "Validation failure", body = ErrorMessage),
        (status = 404, description = "No movie with this id", body = StatusMessage),
    )
)]
pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MoviePayload>, JsonRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    let id = parse_movie_id(&id)?;
    let Json(payload) = payload.map_err(|err| ApiError::Validation(err.body_text()))?;
    let update = payload.into_update()?;
    let updated = state
        .db
        .update_movie(id, update)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(updated.into()))
}

/// Permanently delete a movie.
#[utoipa::path(
    delete,
    path = "/api/movies/{id}",
    tag = "movies",
    params(("id" = String, Path, description = "Movie id")),
    responses(
        (status = 200, description = "Movie deleted", body = StatusMessage),
        (status = 404, description = "No movie with this id", body = StatusMessage),
        (status = 500, description = "Store failure", body = ErrorMessage),
    )
)]
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusMessage>, ApiError> {
    let id = parse_movie_id(&id)?;
    if !state.db.delete_movie(id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(StatusMessage {
        msg: "Movie deleted".to_string(),
    }))
}
