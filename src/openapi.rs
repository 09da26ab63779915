use utoipa::OpenApi;

use crate::movies::{DirectorResponse, ErrorMessage, MovieDetail, MoviePayload, MovieResponse, StatusMessage};

/// OpenAPI description of the movie API, served at /api-docs.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MovieHub API",
        version = "0.1.0",
        description = "CRUD API over a movie catalog backed by MongoDB"
    ),
    paths(
        crate::movies::handlers::list_movies,
        crate::movies::handlers::get_movie,
        crate::movies::handlers::create_movie,
        crate::movies::handlers::update_movie,
        crate::movies::handlers::delete_movie,
    ),
    components(schemas(
        MovieDetail,
        MovieResponse,
        MoviePayload,
        DirectorResponse,
        StatusMessage,
        ErrorMessage,
    )),
    tags(
        (name = "movies", description = "Movie catalog management")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_covers_every_route() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/movies"));
        assert!(paths.contains_key("/api/movies/{id}"));
    }
}
