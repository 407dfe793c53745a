//! PostgreSQL-backed user repository.

use super::{Backend, ListQuery, RepositoryError, UserRepository};
use crate::models::User;
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::{instrument, Span};

// `id` is widened so SERIAL and BIGSERIAL tables decode the same way.
const LIST_USERS_SQL: &str = "SELECT id::BIGINT AS id, name FROM users ORDER BY id ASC LIMIT $1";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    #[instrument(skip(self), fields(backend = "postgres", user.count = tracing::field::Empty))]
    async fn fetch_page(&self, query: ListQuery) -> Result<Vec<User>, RepositoryError> {
        // The row stream owns a pooled connection until it is dropped, on
        // every return path below.
        let mut rows = sqlx::query(LIST_USERS_SQL)
            .bind(query.limit())
            .fetch(&self.pool);

        let mut users = Vec::new();
        loop {
            let row = match rows.try_next().await {
                Ok(Some(row)) => row,
                Ok(None) => break,
                Err(e) if users.is_empty() => {
                    return Err(RepositoryError::query(Backend::Postgres, "select users", e));
                }
                Err(e) => {
                    return Err(RepositoryError::cursor(Backend::Postgres, users.len(), e));
                }
            };
            let user = decode_row(&row).map_err(|e| RepositoryError::decode(Backend::Postgres, e))?;
            users.push(user);
        }

        Span::current().record("user.count", users.len());
        tracing::debug!(count = users.len(), "Fetched users from PostgreSQL");
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::query(Backend::Postgres, "ping", e))?;
        Ok(())
    }

    async fn close(&self) {
        tracing::info!("Closing PostgreSQL connection pool");
        self.pool.close().await;
    }
}
