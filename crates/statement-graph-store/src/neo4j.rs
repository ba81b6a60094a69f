//! Neo4j-backed property graph
//!
//! `(:Statement)-[:BELONGS_TO]->(:Topic)`, with uniqueness constraints on
//! statement ids, topic ids and topic label keys.

use crate::StoreError;
use neo4rs::{query, Graph, Query, Row};
use statement_graph_domain::time::now_millis;
use statement_graph_domain::traits::GraphStore;
use statement_graph_domain::{
    NewStatement, NewTopic, Statement, StatementFilter, StatementId, Topic, TopicId,
};
use tracing::{debug, info};

const CONSTRAINTS: [&str; 3] = [
    "CREATE CONSTRAINT statement_id IF NOT EXISTS FOR (s:Statement) REQUIRE s.id IS UNIQUE",
    "CREATE CONSTRAINT topic_id IF NOT EXISTS FOR (t:Topic) REQUIRE t.id IS UNIQUE",
    "CREATE CONSTRAINT topic_label_key IF NOT EXISTS FOR (t:Topic) REQUIRE t.label_key IS UNIQUE",
];

const STATEMENT_RETURN: &str = "s.id AS id, s.label AS label, s.subject AS subject, \
     s.predicate AS predicate, s.object AS object, s.context AS context, \
     s.created_at AS created_at";

const TOPIC_RETURN: &str =
    "t.id AS id, t.label AS label, t.description AS description, t.created_at AS created_at";

/// Neo4j implementation of [`GraphStore`]
pub struct Neo4jGraphStore {
    graph: Graph,
}

impl Neo4jGraphStore {
    /// Connect and make sure the schema constraints exist
    pub async fn connect(uri: &str, username: &str, password: &str) -> Result<Self, StoreError> {
        let graph = Graph::new(uri, username, password).await?;
        for constraint in CONSTRAINTS {
            graph.run(query(constraint)).await?;
        }
        info!("Connected to Neo4j at {}", uri);
        Ok(Self { graph })
    }

    async fn fetch_all(&self, q: Query) -> Result<Vec<Row>, StoreError> {
        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn node_exists(&self, label: &str, id: &str) -> Result<bool, StoreError> {
        let q = query(&format!("MATCH (n:{} {{id: $id}}) RETURN count(n) AS n", label))
            .param("id", id);
        let rows = self.fetch_all(q).await?;
        let count = match rows.first() {
            Some(row) => field::<i64>(row, "n")?,
            None => 0,
        };
        Ok(count > 0)
    }
}

fn field<T>(row: &Row, key: &str) -> Result<T, StoreError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    row.get::<T>(key)
        .map_err(|e| StoreError::InvalidData(format!("column {}: {}", key, e)))
}

fn statement_from_row(row: &Row) -> Result<Statement, StoreError> {
    let id: String = field(row, "id")?;
    Ok(Statement {
        id: StatementId::parse(&id).map_err(|e| StoreError::InvalidData(e.to_string()))?,
        label: field(row, "label")?,
        subject: field(row, "subject")?,
        predicate: field(row, "predicate")?,
        object: field(row, "object")?,
        context: field::<Option<String>>(row, "context")?.unwrap_or_default(),
        created_at: field::<i64>(row, "created_at")? as u64,
    })
}

fn topic_from_row(row: &Row) -> Result<Topic, StoreError> {
    let id: String = field(row, "id")?;
    Ok(Topic {
        id: TopicId::parse(&id).map_err(|e| StoreError::InvalidData(e.to_string()))?,
        label: field(row, "label")?,
        description: field::<Option<String>>(row, "description")?.unwrap_or_default(),
        created_at: field::<i64>(row, "created_at")? as u64,
    })
}

impl GraphStore for Neo4jGraphStore {
    type Error = StoreError;

    async fn create_statement(&self, statement: NewStatement) -> Result<Statement, StoreError> {
        let statement = statement.into_statement(StatementId::new(), now_millis());

        let q = query(
            "CREATE (s:Statement {
                id: $id,
                label: $label,
                subject: $subject,
                predicate: $predicate,
                object: $object,
                context: $context,
                created_at: $created_at
            })",
        )
        .param("id", statement.id.to_string())
        .param("label", statement.label.as_str())
        .param("subject", statement.subject.as_str())
        .param("predicate", statement.predicate.as_str())
        .param("object", statement.object.as_str())
        .param("context", statement.context.as_str())
        .param("created_at", statement.created_at as i64);

        self.graph.run(q).await?;
        debug!("Created statement {}", statement.id);
        Ok(statement)
    }

    async fn create_topic(&self, topic: NewTopic) -> Result<Topic, StoreError> {
        let key = topic.label.key().to_string();
        let candidate = topic.into_topic(TopicId::new(), now_millis());

        let q = query(&format!(
            "MERGE (t:Topic {{label_key: $label_key}})
             ON CREATE SET t.id = $id,
                           t.label = $label,
                           t.description = $description,
                           t.created_at = $created_at
             RETURN {}",
            TOPIC_RETURN
        ))
        .param("label_key", key.as_str())
        .param("id", candidate.id.to_string())
        .param("label", candidate.label.as_str())
        .param("description", candidate.description.as_str())
        .param("created_at", candidate.created_at as i64);

        let rows = self.fetch_all(q).await?;
        let row = rows
            .first()
            .ok_or_else(|| StoreError::InvalidData("topic merge returned no rows".to_string()))?;
        topic_from_row(row)
    }

    async fn link_statement_to_topic(
        &self,
        statement_id: StatementId,
        topic_id: TopicId,
    ) -> Result<(), StoreError> {
        let statement_id = statement_id.to_string();
        let topic_id = topic_id.to_string();

        if !self.node_exists("Statement", &statement_id).await? {
            return Err(StoreError::NotFound { kind: "statement", id: statement_id });
        }
        if !self.node_exists("Topic", &topic_id).await? {
            return Err(StoreError::NotFound { kind: "topic", id: topic_id });
        }

        let q = query(
            "MATCH (s:Statement {id: $statement_id}), (t:Topic {id: $topic_id})
             MERGE (s)-[r:BELONGS_TO]->(t)
             ON CREATE SET r.created_at = $created_at",
        )
        .param("statement_id", statement_id.as_str())
        .param("topic_id", topic_id.as_str())
        .param("created_at", now_millis() as i64);

        self.graph.run(q).await?;
        Ok(())
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StoreError> {
        let q = query(&format!(
            "MATCH (t:Topic) RETURN {} ORDER BY t.created_at, t.id",
            TOPIC_RETURN
        ));
        self.fetch_all(q).await?.iter().map(topic_from_row).collect()
    }

    async fn find_statements(&self, filter: &StatementFilter) -> Result<Vec<Statement>, StoreError> {
        let mut conditions = Vec::new();
        let mut bindings: Vec<(&str, String)> = Vec::new();

        if let Some(id) = filter.id {
            conditions.push("s.id = $id");
            bindings.push(("id", id.to_string()));
        }

        for (column, condition, value) in [
            ("label", "s.label = $label", &filter.label),
            ("subject", "s.subject = $subject", &filter.subject),
            ("predicate", "s.predicate = $predicate", &filter.predicate),
            ("object", "s.object = $object", &filter.object),
            ("context", "s.context = $context", &filter.context),
        ] {
            if let Some(value) = value {
                conditions.push(condition);
                bindings.push((column, value.clone()));
            }
        }

        let mut cypher = String::from("MATCH (s:Statement)");
        if !conditions.is_empty() {
            cypher.push_str(" WHERE ");
            cypher.push_str(&conditions.join(" AND "));
        }
        cypher.push_str(&format!(" RETURN {} ORDER BY s.created_at, s.id", STATEMENT_RETURN));
        if filter.limit.is_some() {
            cypher.push_str(" LIMIT $limit");
        }

        let mut q = query(&cypher);
        for (key, value) in bindings {
            q = q.param(key, value);
        }
        if let Some(limit) = filter.limit {
            q = q.param("limit", limit as i64);
        }

        self.fetch_all(q).await?.iter().map(statement_from_row).collect()
    }

    async fn topics_for_statement(&self, statement_id: StatementId) -> Result<Vec<Topic>, StoreError> {
        let q = query(&format!(
            "MATCH (s:Statement {{id: $id}})-[r:BELONGS_TO]->(t:Topic)
             RETURN {} ORDER BY r.created_at",
            TOPIC_RETURN
        ))
        .param("id", statement_id.to_string());

        self.fetch_all(q).await?.iter().map(topic_from_row).collect()
    }
}
