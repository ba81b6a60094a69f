//! Statement Graph Storage Layer
//!
//! Implements the `GraphStore` trait over a property-graph backend.
//!
//! # Architecture
//!
//! - [`SqliteGraphStore`]: nodes and relationships as SQLite tables (default backend)
//! - `Neo4jGraphStore`: Cypher over Bolt, enabled with the `neo4j` cargo feature
//! - [`GraphBackend`]: runtime selection between the two from [`StoreSettings`]
//!
//! Topic labels are unique by their normalized key on every backend, and
//! statement-to-topic links are idempotent.
//!
//! # Examples
//!
//! ```no_run
//! use statement_graph_store::SqliteGraphStore;
//!
//! let store = SqliteGraphStore::new(":memory:").unwrap();
//! // Store is now ready for graph operations
//! ```

#![warn(missing_docs)]

#[cfg(feature = "neo4j")]
mod neo4j;
mod sqlite;

use serde::{Deserialize, Serialize};
use statement_graph_domain::traits::GraphStore;
use statement_graph_domain::{
    NewStatement, NewTopic, Statement, StatementFilter, StatementId, Topic, TopicId,
};
use thiserror::Error;

#[cfg(feature = "neo4j")]
pub use neo4j::Neo4jGraphStore;
pub use sqlite::SqliteGraphStore;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Neo4j error
    #[cfg(feature = "neo4j")]
    #[error("Neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),

    /// Referenced node does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Node kind ("statement" or "topic")
        kind: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Stored data could not be mapped back to domain values
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Configured backend is not available in this build
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether this error reports a missing node
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Backend selection and connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreSettings {
    /// SQLite database file (or `:memory:`)
    Sqlite {
        /// Path to the database file
        #[serde(default = "default_sqlite_path")]
        path: String,
    },

    /// Neo4j server reachable over Bolt
    Neo4j {
        /// Bolt URI, e.g. `neo4j+s://example.databases.neo4j.io`
        uri: String,
        /// Username
        username: String,
        /// Password
        password: String,
    },
}

/// Default SQLite database location
pub const DEFAULT_SQLITE_PATH: &str = "statement-graph.db";

fn default_sqlite_path() -> String {
    DEFAULT_SQLITE_PATH.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings::Sqlite { path: default_sqlite_path() }
    }
}

impl StoreSettings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StoreSettings::Sqlite { path } if path.trim().is_empty() => {
                Err("sqlite path must not be empty".to_string())
            }
            StoreSettings::Neo4j { uri, username, .. } => {
                if uri.trim().is_empty() {
                    return Err("neo4j uri must not be empty".to_string());
                }
                if username.trim().is_empty() {
                    return Err("neo4j username must not be empty".to_string());
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Short backend name for logging
    pub fn backend_name(&self) -> &'static str {
        match self {
            StoreSettings::Sqlite { .. } => "sqlite",
            StoreSettings::Neo4j { .. } => "neo4j",
        }
    }
}

/// Graph store selected at runtime
pub enum GraphBackend {
    /// SQLite backend
    Sqlite(SqliteGraphStore),

    /// Neo4j backend
    #[cfg(feature = "neo4j")]
    Neo4j(Neo4jGraphStore),
}

impl GraphBackend {
    /// Open the backend described by `settings`
    pub async fn open(settings: &StoreSettings) -> Result<Self, StoreError> {
        match settings {
            StoreSettings::Sqlite { path } => {
                tracing::info!("Opening SQLite graph store at {}", path);
                Ok(GraphBackend::Sqlite(SqliteGraphStore::new(path)?))
            }
            #[cfg(feature = "neo4j")]
            StoreSettings::Neo4j { uri, username, password } => {
                tracing::info!("Connecting to Neo4j at {}", uri);
                let store = Neo4jGraphStore::connect(uri, username, password).await?;
                Ok(GraphBackend::Neo4j(store))
            }
            #[cfg(not(feature = "neo4j"))]
            StoreSettings::Neo4j { .. } => Err(StoreError::Unavailable(
                "built without the `neo4j` feature".to_string(),
            )),
        }
    }
}

impl GraphStore for GraphBackend {
    type Error = StoreError;

    async fn create_statement(&self, statement: NewStatement) -> Result<Statement, StoreError> {
        match self {
            GraphBackend::Sqlite(s) => s.create_statement(statement).await,
            #[cfg(feature = "neo4j")]
            GraphBackend::Neo4j(s) => s.create_statement(statement).await,
        }
    }

    async fn create_topic(&self, topic: NewTopic) -> Result<Topic, StoreError> {
        match self {
            GraphBackend::Sqlite(s) => s.create_topic(topic).await,
            #[cfg(feature = "neo4j")]
            GraphBackend::Neo4j(s) => s.create_topic(topic).await,
        }
    }

    async fn link_statement_to_topic(
        &self,
        statement_id: StatementId,
        topic_id: TopicId,
    ) -> Result<(), StoreError> {
        match self {
            GraphBackend::Sqlite(s) => s.link_statement_to_topic(statement_id, topic_id).await,
            #[cfg(feature = "neo4j")]
            GraphBackend::Neo4j(s) => s.link_statement_to_topic(statement_id, topic_id).await,
        }
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError> {
        match self {
            GraphBackend::Sqlite(s) => s.list_topics().await,
            #[cfg(feature = "neo4j")]
            GraphBackend::Neo4j(s) => s.list_topics().await,
        }
    }

    async fn find_statements(&self, filter: &StatementFilter) -> Result<Vec<Statement>, StoreError> {
        match self {
            GraphBackend::Sqlite(s) => s.find_statements(filter).await,
            #[cfg(feature = "neo4j")]
            GraphBackend::Neo4j(s) => s.find_statements(filter).await,
        }
    }

    async fn topics_for_statement(&self, statement_id: StatementId) -> Result<Vec<Topic>, StoreError> {
        match self {
            GraphBackend::Sqlite(s) => s.topics_for_statement(statement_id).await,
            #[cfg(feature = "neo4j")]
            GraphBackend::Neo4j(s) => s.topics_for_statement(statement_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_sqlite() {
        let settings = StoreSettings::default();
        assert_eq!(settings.backend_name(), "sqlite");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_deserialize() {
        let settings: StoreSettings = serde_json::from_str(
            r#"{"backend": "neo4j", "uri": "bolt://localhost:7687", "username": "neo4j", "password": "pw"}"#,
        )
        .unwrap();
        assert_eq!(settings.backend_name(), "neo4j");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let settings = StoreSettings::Sqlite { path: " ".to_string() };
        assert!(settings.validate().is_err());

        let settings = StoreSettings::Neo4j {
            uri: String::new(),
            username: "neo4j".to_string(),
            password: String::new(),
        };
        assert!(settings.validate().is_err());
    }

    #[tokio::test]
    async fn test_open_sqlite_backend() {
        let settings = StoreSettings::Sqlite { path: ":memory:".to_string() };
        let backend = GraphBackend::open(&settings).await.unwrap();
        assert!(backend.list_topics().await.unwrap().is_empty());
    }

    #[cfg(not(feature = "neo4j"))]
    #[tokio::test]
    async fn test_open_neo4j_without_feature() {
        let settings = StoreSettings::Neo4j {
            uri: "bolt://localhost:7687".to_string(),
            username: "neo4j".to_string(),
            password: "pw".to_string(),
        };
        let result = GraphBackend::open(&settings).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
