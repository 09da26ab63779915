use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection, Database};
use tracing::info;

use super::model::*;
use super::repo::*;

/// One client per process, created at startup and shared by every request.
/// The driver multiplexes its own connection pool underneath.
pub struct MongoRepository {
    client: Client,
    db: Database,
}

impl MongoRepository {
    pub async fn new(url: &str, database: &str) -> DbResult<Self> {
        let client = Client::with_uri_str(url).await?;
        let db = client.database(database);

        info!("Database handle opened for {} at {}", database, url);

        Ok(Self { client, db })
    }

    fn movies(&self) -> Collection<Movie> {
        self.db.collection("movies")
    }

    fn directors(&self) -> Collection<Director> {
        self.db.collection("directors")
    }

    /// Graceful teardown. Called once after the HTTP listener has stopped.
    pub async fn close(&self) {
        self.client.clone().shutdown().await;
        info!("Database handle closed");
    }
}

#[async_trait]
impl MovieRepo for MongoRepository {
    async fn list_movies(&self) -> DbResult<Vec<Movie>> {
        let mut cursor = self.movies().find(doc! {}).await?;
        let mut movies = Vec::new();
        while let Some(movie) = cursor.try_next().await? {
            movies.push(movie);
        }
        Ok(movies)
    }

    async fn get_movie(&self, id: ObjectId) -> DbResult<Option<Movie>> {
        Ok(self.movies().find_one(doc! { "_id": id }).await?)
    }

    async fn create_movie(&self, movie: Movie) -> DbResult<Movie> {
        let result = self.movies().insert_one(&movie).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| DbError::Validation("store did not assign an object id".to_string()))?;
        Ok(Movie {
            id: Some(id),
            ..movie
        })
    }

    async fn update_movie(&self, id: ObjectId, update: MovieUpdate) -> DbResult<Option<Movie>> {
        if update.is_empty() {
            // Nothing to write; the store rejects an empty update document.
            return self.get_movie(id).await;
        }
        Ok(self
            .movies()
            .find_one_and_update(doc! { "_id": id }, update.into_document())
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_movie(&self, id: ObjectId) -> DbResult<bool> {
        let deleted = self.movies().find_one_and_delete(doc! { "_id": id }).await?;
        Ok(deleted.is_some())
    }
}

#[async_trait]
impl DirectorRepo for MongoRepository {
    async fn get_director(&self, id: ObjectId) -> DbResult<Option<Director>> {
        Ok(self.directors().find_one(doc! { "_id": id }).await?)
    }
}

impl Repository for MongoRepository {}
