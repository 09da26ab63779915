use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use super::model::*;

#[async_trait]
pub trait MovieRepo: Send + Sync {
    /// All movies in store-native order. Not guaranteed stable across calls.
    async fn list_movies(&self) -> DbResult<Vec<Movie>>;
    async fn get_movie(&self, id: ObjectId) -> DbResult<Option<Movie>>;
    /// Persists the movie and returns it with the store-assigned id.
    async fn create_movie(&self, movie: Movie) -> DbResult<Movie>;
    /// Applies a partial update and returns the post-image, or `None` when
    /// the id does not resolve.
    async fn update_movie(&self, id: ObjectId, update: MovieUpdate) -> DbResult<Option<Movie>>;
    /// Returns whether a record existed and was removed.
    async fn delete_movie(&self, id: ObjectId) -> DbResult<bool>;
}

#[async_trait]
pub trait DirectorRepo: Send + Sync {
    /// `None` for dangling references; referential integrity is not enforced.
    async fn get_director(&self, id: ObjectId) -> DbResult<Option<Director>>;
}

pub trait Repository: MovieRepo + DirectorRepo + Send + Sync {}
