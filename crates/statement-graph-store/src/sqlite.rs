//! SQLite-backed property graph
//!
//! Nodes live in the `statements` and `topics` tables and the `BELONGS_TO`
//! relationship in `statement_topics`. Insertion order is the rowid order.

use crate::StoreError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use statement_graph_domain::time::now_millis;
use statement_graph_domain::traits::GraphStore;
use statement_graph_domain::{
    NewStatement, NewTopic, Statement, StatementFilter, StatementId, Topic, TopicId,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

const STATEMENT_COLUMNS: &str = "id, label, subject, predicate, object, context, created_at";
const TOPIC_COLUMNS: &str = "id, label, description, created_at";

/// SQLite implementation of [`GraphStore`]
///
/// The connection is guarded by a mutex so a single store can be shared
/// between request handlers. It is closed when the store is dropped.
///
/// Every query runs on the blocking thread pool, so a caller waiting on a
/// locked database can give up on the returned future without stalling the
/// async runtime.
pub struct SqliteGraphStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteGraphStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use statement_graph_store::SqliteGraphStore;
    ///
    /// let store = SqliteGraphStore::new("statement-graph.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    async fn blocking<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::InvalidData(format!("connection lock poisoned: {}", e)))?;
            work(&conn)
        })
        .await
        .map_err(|e| StoreError::InvalidData(format!("store task failed: {}", e)))?
    }

    fn statement_from_row(row: &Row<'_>) -> rusqlite::Result<Statement> {
        let id: String = row.get(0)?;
        let id = StatementId::parse(&id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Statement {
            id,
            label: row.get(1)?,
            subject: row.get(2)?,
            predicate: row.get(3)?,
            object: row.get(4)?,
            context: row.get(5)?,
            created_at: row.get::<_, i64>(6)? as u64,
        })
    }

    fn topic_from_row(row: &Row<'_>) -> rusqlite::Result<Topic> {
        let id: String = row.get(0)?;
        let id = TopicId::parse(&id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Topic {
            id,
            label: row.get(1)?,
            description: row.get(2)?,
            created_at: row.get::<_, i64>(3)? as u64,
        })
    }

    fn exists(conn: &Connection, table: &str, id: &str) -> Result<bool, StoreError> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?1", table);
        let found = conn
            .query_row(&sql, params![id], |_| Ok(true))
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }

    fn insert_statement(conn: &Connection, statement: NewStatement) -> Result<Statement, StoreError> {
        let statement = statement.into_statement(StatementId::new(), now_millis());

        conn.execute(
            "INSERT INTO statements (id, label, subject, predicate, object, context, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                statement.id.to_string(),
                &statement.label,
                &statement.subject,
                &statement.predicate,
                &statement.object,
                &statement.context,
                statement.created_at as i64,
            ],
        )?;

        debug!("Created statement {}", statement.id);
        Ok(statement)
    }

    fn upsert_topic(conn: &Connection, topic: NewTopic) -> Result<Topic, StoreError> {
        let key = topic.label.key().to_string();
        let candidate = topic.into_topic(TopicId::new(), now_millis());

        let inserted = conn.execute(
            "INSERT INTO topics (id, label, label_key, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(label_key) DO NOTHING",
            params![
                candidate.id.to_string(),
                &candidate.label,
                &key,
                &candidate.description,
                candidate.created_at as i64,
            ],
        )?;

        if inserted == 1 {
            debug!("Created topic '{}' ({})", candidate.label, candidate.id);
            return Ok(candidate);
        }

        let sql = format!("SELECT {} FROM topics WHERE label_key = ?1", TOPIC_COLUMNS);
        let existing = conn.query_row(&sql, params![&key], Self::topic_from_row)?;
        Ok(existing)
    }

    fn insert_link(
        conn: &Connection,
        statement_id: StatementId,
        topic_id: TopicId,
    ) -> Result<(), StoreError> {
        let statement_id = statement_id.to_string();
        let topic_id = topic_id.to_string();

        if !Self::exists(conn, "statements", &statement_id)? {
            return Err(StoreError::NotFound { kind: "statement", id: statement_id });
        }
        if !Self::exists(conn, "topics", &topic_id)? {
            return Err(StoreError::NotFound { kind: "topic", id: topic_id });
        }

        conn.execute(
            "INSERT OR IGNORE INTO statement_topics (statement_id, topic_id, created_at)
             VALUES (?1, ?2, ?3)",
            params![&statement_id, &topic_id, now_millis() as i64],
        )?;

        Ok(())
    }

    fn select_topics(conn: &Connection) -> Result<Vec<Topic>, StoreError> {
        let sql = format!("SELECT {} FROM topics ORDER BY rowid", TOPIC_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let topics = stmt
            .query_map([], Self::topic_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(topics)
    }

    fn select_statements(conn: &Connection, filter: &StatementFilter) -> Result<Vec<Statement>, StoreError> {
        let mut sql = format!("SELECT {} FROM statements WHERE 1=1", STATEMENT_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(id) = filter.id {
            sql.push_str(" AND id = ?");
            params.push(Box::new(id.to_string()));
        }

        for (column, value) in [
            ("label", &filter.label),
            ("subject", &filter.subject),
            ("predicate", &filter.predicate),
            ("object", &filter.object),
            ("context", &filter.context),
        ] {
            if let Some(value) = value {
                sql.push_str(&format!(" AND {} = ?", column));
                params.push(Box::new(value.clone()));
            }
        }

        sql.push_str(" ORDER BY rowid");

        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let statements = stmt
            .query_map(&param_refs[..], Self::statement_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(statements)
    }

    fn select_topics_for(conn: &Connection, statement_id: StatementId) -> Result<Vec<Topic>, StoreError> {
        let mut stmt = conn.prepare(
            "SELECT t.id, t.label, t.description, t.created_at
             FROM topics t
             JOIN statement_topics st ON st.topic_id = t.id
             WHERE st.statement_id = ?1
             ORDER BY st.rowid",
        )?;

        let topics = stmt
            .query_map(params![statement_id.to_string()], Self::topic_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(topics)
    }
}

impl GraphStore for SqliteGraphStore {
    type Error = StoreError;

    async fn create_statement(&self, statement: NewStatement) -> Result<Statement, StoreError> {
        self.blocking(move |conn| Self::insert_statement(conn, statement)).await
    }

    async fn create_topic(&self, topic: NewTopic) -> Result<Topic, StoreError> {
        self.blocking(move |conn| Self::upsert_topic(conn, topic)).await
    }

    async fn link_statement_to_topic(
        &self,
        statement_id: StatementId,
        topic_id: TopicId,
    ) -> Result<(), StoreError> {
        self.blocking(move |conn| Self::insert_link(conn, statement_id, topic_id)).await
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError> {
        self.blocking(Self::select_topics).await
    }

    async fn find_statements(&self, filter: &StatementFilter) -> Result<Vec<Statement>, StoreError> {
        let filter = filter.clone();
        self.blocking(move |conn| Self::select_statements(conn, &filter)).await
    }

    async fn topics_for_statement(&self, statement_id: StatementId) -> Result<Vec<Topic>, StoreError> {
        self.blocking(move |conn| Self::select_topics_for(conn, statement_id)).await
    }
}
