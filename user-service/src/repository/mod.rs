//! User repository capability and its storage adapters.
//!
//! [`UserRepository`] is the only data-access contract the HTTP layer knows.
//! Adapters implement [`UserRepository::fetch_page`]; callers go through the
//! provided [`UserRepository::list`], which runs the fetch under the caller's
//! [`RequestContext`] and checks the listing postcondition before any result
//! leaves the repository.

pub mod mongo;
pub mod postgres;

use crate::context::{Interrupted, RequestContext};
use crate::models::User;
use async_trait::async_trait;
use metrics::counter;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use mongo::MongoUserRepository;
pub use postgres::PostgresUserRepository;

/// Maximum number of users a single listing returns.
pub const LIST_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Postgres,
    Mongo,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::Mongo => "mongo",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported DB_BACKEND '{0}' (expected postgres or mongo)")]
pub struct UnknownBackend(pub String);

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "relational" => Ok(Backend::Postgres),
            "mongo" | "mongodb" | "document-store" => Ok(Backend::Mongo),
            _ => Err(UnknownBackend(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{backend}: {operation} failed: {source}")]
    Query {
        backend: Backend,
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("{backend}: failed to decode user record: {source}")]
    Decode {
        backend: Backend,
        #[source]
        source: anyhow::Error,
    },

    #[error("{backend}: cursor failed after {fetched} record(s): {source}")]
    Cursor {
        backend: Backend,
        fetched: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Interrupted(#[from] Interrupted),

    #[error("{backend}: listing contract violated: {reason}")]
    ContractViolation { backend: Backend, reason: String },
}

impl RepositoryError {
    pub fn query(
        backend: Backend,
        operation: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RepositoryError::Query {
            backend,
            operation,
            source: anyhow::Error::new(source),
        }
    }

    pub fn decode(backend: Backend, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        RepositoryError::Decode {
            backend,
            source: anyhow::Error::new(source),
        }
    }

    pub fn cursor(
        backend: Backend,
        fetched: usize,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        RepositoryError::Cursor {
            backend,
            fetched,
            source: anyhow::Error::new(source),
        }
    }
}

/// Parameters of a single listing: the first `limit` users by ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    limit: i64,
}

impl ListQuery {
    pub const fn first_page() -> Self {
        Self { limit: LIST_LIMIT }
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Rejects adapter output that is longer than the limit or not ordered by
    /// ascending id.
    pub fn verify(&self, backend: Backend, users: Vec<User>) -> Result<Vec<User>, RepositoryError> {
        let len = users.len() as i64;
        if len > self.limit {
            return Err(RepositoryError::ContractViolation {
                backend,
                reason: format!("returned {} users, limit is {}", len, self.limit),
            });
        }

        if let Some(pair) = users.windows(2).find(|pair| pair[0].id > pair[1].id) {
            return Err(RepositoryError::ContractViolation {
                backend,
                reason: format!("id {} precedes id {}", pair[0].id, pair[1].id),
            });
        }

        Ok(users)
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::first_page()
    }
}

/// Read-only access to users.
///
/// Implementations hold an already-connected, internally pooled client handle
/// and must be safe to call from many requests at once. They never retry.
#[async_trait]
pub trait UserRepository: Send + Sync {
    fn backend(&self) -> Backend;

    /// Fetches at most `query.limit()` users ordered by ascending id. Must
    /// either return the complete bounded set or an error, never a prefix.
    async fn fetch_page(&self, query: ListQuery) -> Result<Vec<User>, RepositoryError>;

    /// Round trip to the backend without reading data.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Releases the underlying pool or client. Called once at shutdown.
    async fn close(&self);

    /// Lists the first page of users under `ctx`.
    ///
    /// Returns an empty vector when the store is empty. Interruption by `ctx`
    /// drops the in-flight fetch and yields [`RepositoryError::Interrupted`].
    /// Adapters should not override this.
    async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>, RepositoryError> {
        let backend = self.backend();
        let query = ListQuery::first_page();

        let result = match ctx.run(self.fetch_page(query)).await {
            Ok(fetched) => fetched.and_then(|users| query.verify(backend, users)),
            Err(interrupted) => Err(interrupted.into()),
        };

        let outcome = match &result {
            Ok(_) => "ok",
            Err(RepositoryError::Interrupted(_)) => "interrupted",
            Err(_) => "error",
        };
        counter!(
            "user_repository_list_total",
            "backend" => backend.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        result
    }
}
