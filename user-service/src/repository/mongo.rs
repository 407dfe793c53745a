//! MongoDB-backed user repository.

use super::{Backend, ListQuery, RepositoryError, UserRepository};
use crate::models::User;
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::FindOptions;
use mongodb::{Client, Collection};
use serde::Deserialize;
use tracing::{instrument, Span};

/// Stored shape of a user. Field names map one-to-one onto [`User`]; other
/// fields such as `_id` are ignored.
#[derive(Debug, Deserialize)]
struct UserDocument {
    id: i64,
    name: String,
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        User {
            id: doc.id,
            name: doc.name,
        }
    }
}

pub struct MongoUserRepository {
    client: Client,
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(client: Client, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection(collection);
        Self { client, collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    fn backend(&self) -> Backend {
        Backend::Mongo
    }

    #[instrument(skip(self), fields(backend = "mongo", user.count = tracing::field::Empty))]
    async fn fetch_page(&self, query: ListQuery) -> Result<Vec<User>, RepositoryError> {
        let find_options = FindOptions::builder()
            .sort(doc! { "id": 1 })
            .limit(query.limit())
            .build();

        // Dropping the cursor kills it server-side, so every early return
        // below releases it.
        let mut cursor = self
            .collection
            .find(doc! {}, find_options)
            .await
            .map_err(|e| RepositoryError::query(Backend::Mongo, "find users", e))?;

        let mut users = Vec::new();
        while cursor
            .advance()
            .await
            .map_err(|e| RepositoryError::cursor(Backend::Mongo, users.len(), e))?
        {
            let doc = cursor
                .deserialize_current()
                .map_err(|e| RepositoryError::decode(Backend::Mongo, e))?;
            users.push(User::from(doc));
        }

        Span::current().record("user.count", users.len());
        tracing::debug!(count = users.len(), "Fetched users from MongoDB");
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| RepositoryError::query(Backend::Mongo, "ping", e))?;
        Ok(())
    }

    async fn close(&self) {
        tracing::info!("Shutting down MongoDB client");
        self.client.clone().shutdown().await;
    }
}
