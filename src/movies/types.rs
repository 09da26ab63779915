use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::db::{DbError, Director, Movie, MovieUpdate};

/// Movie as returned by Create and Update: the `director` reference stays
/// a raw id. List and Get return [`MovieDetail`] instead.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieResponse {
    /// Store-assigned identifier, 24 hex characters.
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub genre: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        Self {
            id: movie.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: movie.title,
            director: movie.director.map(|id| id.to_hex()),
            year: movie.year,
            genre: movie.genre,
            rating: movie.rating,
        }
    }
}

/// Movie read model with the director reference expanded. A reference that
/// does not resolve expands to `null`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub director: Option<DirectorResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    pub genre: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

impl MovieDetail {
    pub fn new(movie: Movie, director: Option<Director>) -> Self {
        Self {
            id: movie.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: movie.title,
            director: director.map(DirectorResponse::from),
            year: movie.year,
            genre: movie.genre,
            rating: movie.rating,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DirectorResponse {
    pub id: String,
    pub name: String,
}

impl From<Director> for DirectorResponse {
    fn from(director: Director) -> Self {
        Self {
            id: director.id.to_hex(),
            name: director.name,
        }
    }
}

/// Fixed-message acknowledgment body, e.g. `{"msg": "Movie deleted"}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusMessage {
    pub msg: String,
}

/// Error body for 400 and 500 responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorMessage {
    pub error: String,
}

/// Wraps the deserialized value in `Some` so a field that was present but
/// `null` lands as `Some(None)` instead of collapsing into `None`.
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Request body for Create and Update. Every field is optional so that
/// validation failures surface as 400 with a message rather than a
/// deserialization rejection, and so Update can tell "omitted" apart from
/// "explicitly cleared".
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MoviePayload {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub director: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Vec<String>>)]
    pub genre: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<f64>)]
    pub rating: Option<Option<f64>>,
}

impl MoviePayload {
    /// Candidate record for Create. `title` is the one required field;
    /// everything else defaults.
    pub fn into_new_movie(self) -> Result<Movie, ApiError> {
        let title = match self.title.flatten() {
            Some(title) if !title.trim().is_empty() => title,
            _ => return Err(title_required()),
        };
        let director = self
            .director
            .flatten()
            .map(|raw| parse_director_id(&raw))
            .transpose()?;
        Ok(Movie {
            id: None,
            title,
            director,
            year: self.year.flatten(),
            genre: self.genre.flatten().unwrap_or_default(),
            rating: self.rating.flatten(),
        })
    }

    /// Partial update for an existing record. Explicitly clearing `title`
    /// (null or empty) is rejected; omitting it keeps the prior value.
    pub fn into_update(self) -> Result<MovieUpdate, ApiError> {
        let title = match self.title {
            None => None,
            Some(Some(title)) if !title.trim().is_empty() => Some(title),
            Some(_) => return Err(title_required()),
        };
        let director = match self.director {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(Some(parse_director_id(&raw)?)),
        };
        Ok(MovieUpdate {
            title,
            director,
            year: self.year,
            genre: self.genre,
            rating: self.rating,
        })
    }
}

fn title_required() -> ApiError {
    ApiError::Validation("Movie validation failed: title: Path `title` is required.".to_string())
}

fn parse_director_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| {
        ApiError::Validation(format!(
            "Cast to ObjectId failed for value \"{raw}\" at path \"director\""
        ))
    })
}

/// Request-level error taxonomy. Maps one-to-one onto the wire contract:
/// 400 `{"error": msg}`, 404 `{"msg": "Movie not found"}`, 500 `{"error": msg}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Movie not found")]
    NotFound,
    #[error("{0}")]
    Internal(String),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(_) => ApiError::NotFound,
            DbError::Validation(msg) => ApiError::Validation(msg),
            DbError::Mongo(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorMessage { error: msg }),
            )
                .into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(StatusMessage {
                    msg: "Movie not found".to_string(),
                }),
            )
                .into_response(),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorMessage { error: msg }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> MoviePayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_payload_tracks_field_presence() {
        let p = payload(r#"{"title": "Dune", "year": null}"#);
        assert_eq!(p.title, Some(Some("Dune".to_string())));
        assert_eq!(p.year, Some(None));
        assert_eq!(p.rating, None);
        assert_eq!(p.director, None);
    }

    #[test]
    fn test_create_requires_title() {
        let err = payload(r#"{"year": 2021}"#).into_new_movie().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = payload(r#"{"title": ""}"#).into_new_movie().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = payload(r#"{"title": null}"#).into_new_movie().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_create_defaults_genre_to_empty_list() {
        let movie = payload(r#"{"title": "Dune", "year": 2021}"#)
            .into_new_movie()
            .unwrap();
        assert_eq!(movie.title, "Dune");
        assert_eq!(movie.year, Some(2021));
        assert!(movie.genre.is_empty());
        assert!(movie.id.is_none());
    }

    #[test]
    fn test_create_rejects_malformed_director_id() {
        let err = payload(r#"{"title": "Dune", "director": "not-an-id"}"#)
            .into_new_movie()
            .unwrap_err();
        match err {
            ApiError::Validation(msg) => assert!(msg.contains("ObjectId")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_accepts_well_formed_director_id() {
        let id = ObjectId::new();
        let movie = payload(&format!(r#"{{"title": "Dune", "director": "{}"}}"#, id.to_hex()))
            .into_new_movie()
            .unwrap();
        assert_eq!(movie.director, Some(id));
    }

    #[test]
    fn test_update_keeps_omitted_title() {
        let update = payload(r#"{"rating": 8.5}"#).into_update().unwrap();
        assert_eq!(update.title, None);
        assert_eq!(update.rating, Some(Some(8.5)));
    }

    #[test]
    fn test_update_rejects_cleared_title() {
        assert!(payload(r#"{"title": null}"#).into_update().is_err());
        assert!(payload(r#"{"title": "  "}"#).into_update().is_err());
    }

    #[test]
    fn test_update_distinguishes_clear_from_omit() {
        let update = payload(r#"{"director": null}"#).into_update().unwrap();
        assert_eq!(update.director, Some(None));
        assert_eq!(update.year, None);
    }

    #[test]
    fn test_empty_update_payload_is_a_noop() {
        let update = payload("{}").into_update().unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_movie_response_serializes_raw_reference() {
        let director = ObjectId::new();
        let movie = Movie {
            id: Some(ObjectId::new()),
            title: "Dune".to_string(),
            director: Some(director),
            year: Some(2021),
            genre: vec!["scifi".to_string()],
            rating: None,
        };
        let body = serde_json::to_value(MovieResponse::from(movie)).unwrap();
        assert_eq!(body["director"], director.to_hex());
        assert_eq!(body["genre"], serde_json::json!(["scifi"]));
        assert!(body.get("rating").is_none());
    }

    #[test]
    fn test_movie_detail_expands_unresolvable_reference_to_null() {
        let movie = Movie {
            id: Some(ObjectId::new()),
            title: "Dune".to_string(),
            director: Some(ObjectId::new()),
            year: None,
            genre: vec![],
            rating: None,
        };
        let body = serde_json::to_value(MovieDetail::new(movie, None)).unwrap();
        assert_eq!(body["director"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_api_error_wire_contract() {
        let resp = ApiError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"msg":"Movie not found"}"#);

        let resp = ApiError::Validation("bad".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"error":"bad"}"#);

        let resp = ApiError::Internal("down".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
