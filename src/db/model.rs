use mongodb::bson::oid::ObjectId;
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};

/// Write model for the `movies` collection. `id` is assigned by the store
/// on insert and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// Record in the `directors` collection. This service only reads directors
/// to expand movie references; it never writes to the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Director {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

/// Partial update with field-presence tracking. The outer `Option` is
/// "was the field in the payload at all"; the inner one is "set vs clear".
/// `title` has no clear form, an update may only overwrite it.
#[derive(Debug, Clone, Default)]
pub struct MovieUpdate {
    pub title: Option<String>,
    pub director: Option<Option<ObjectId>>,
    pub year: Option<Option<i32>>,
    pub genre: Option<Option<Vec<String>>>,
    pub rating: Option<Option<f64>>,
}

impl MovieUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.director.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.rating.is_none()
    }

    /// Build the `$set`/`$unset` update document. Fields absent from the
    /// payload do not appear at all, so the store keeps their prior values.
    /// Clearing `genre` resets it to the empty list rather than unsetting,
    /// so reads keep seeing an array.
    pub fn into_document(self) -> Document {
        let mut set = Document::new();
        let mut unset = Document::new();

        if let Some(title) = self.title {
            set.insert("title", title);
        }
        match self.director {
            Some(Some(id)) => {
                set.insert("director", id);
            }
            Some(None) => {
                unset.insert("director", "");
            }
            None => {}
        }
        match self.year {
            Some(Some(year)) => {
                set.insert("year", year);
            }
            Some(None) => {
                unset.insert("year", "");
            }
            None => {}
        }
        if let Some(genre) = self.genre {
            set.insert("genre", genre.unwrap_or_default());
        }
        match self.rating {
            Some(Some(rating)) => {
                set.insert("rating", rating);
            }
            Some(None) => {
                unset.insert("rating", "");
            }
            None => {}
        }

        let mut update = Document::new();
        if !set.is_empty() {
            update.insert("$set", set);
        }
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }
        update
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
}

pub type DbResult<T> = Result<T, DbError>;
