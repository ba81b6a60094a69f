//! Topic matcher: batched LLM topic assignment with partial-failure isolation

use crate::batching::{batch_count, partition};
use crate::config::PipelineConfig;
use crate::result::{BatchFailure, MatchReport, TopicMatch};
use statement_graph_domain::traits::{GraphStore, LlmProvider};
use statement_graph_domain::{NewTopic, Statement, StatementId, Topic, TopicLabel};
use statement_graph_extractor::ExtractionClient;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// A store call that failed or ran out of time
#[derive(Debug)]
pub(crate) enum StoreCallError<E> {
    Failed(E),
    TimedOut(&'static str, Duration),
}

impl<E: fmt::Display> fmt::Display for StoreCallError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreCallError::Failed(e) => write!(f, "store error: {}", e),
            StoreCallError::TimedOut(operation, after) => {
                write!(f, "store operation '{}' timed out after {:?}", operation, after)
            }
        }
    }
}

/// Run a store future under `limit`
pub(crate) async fn bounded<T, E, F>(
    limit: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, StoreCallError<E>>
where
    F: Future<Output = Result<T, E>>,
{
    match timeout(limit, call).await {
        Ok(result) => result.map_err(StoreCallError::Failed),
        Err(_) => Err(StoreCallError::TimedOut(operation, limit)),
    }
}

/// Topics visible to the batches of one request
///
/// Holds the candidate list shown to the LLM and a label-key cache of every
/// topic resolved so far, so each label hits the store at most once.
struct TopicBook {
    candidates: Vec<Topic>,
    by_key: HashMap<String, Topic>,
}

impl TopicBook {
    fn new(candidates: Vec<Topic>) -> Self {
        let mut book = Self {
            candidates: Vec::with_capacity(candidates.len()),
            by_key: HashMap::new(),
        };
        for topic in candidates {
            book.add(topic);
        }
        book
    }

    fn get(&self, label: &TopicLabel) -> Option<&Topic> {
        self.by_key.get(label.key())
    }

    fn add(&mut self, topic: Topic) {
        let key = topic.label_key();
        if !self.by_key.contains_key(&key) {
            self.candidates.push(topic.clone());
            self.by_key.insert(key, topic);
        }
    }
}

/// Why a batch stopped, and which of its statements were not linked
struct BatchError {
    unlinked: Vec<StatementId>,
    reason: String,
}

/// Assigns thematic topics to statements, batch by batch
///
/// Batches run sequentially. Topics resolved by a batch are added to the
/// candidate list of every later batch. A failing batch leaves its remaining
/// statements unmatched and does not affect other batches.
pub struct TopicMatcher<'a, S, L: LlmProvider> {
    store: &'a S,
    client: &'a ExtractionClient<L>,
    batch_size: NonZeroUsize,
    store_timeout: Duration,
}

impl<'a, S, L> TopicMatcher<'a, S, L>
where
    S: GraphStore,
    L: LlmProvider,
{
    /// Create a matcher for one request
    pub fn new(store: &'a S, client: &'a ExtractionClient<L>, config: &PipelineConfig) -> Self {
        Self {
            store,
            client,
            batch_size: config.batch_size,
            store_timeout: config.store_timeout(),
        }
    }

    /// Match `statements` against `candidates` and the topics created on the way
    pub async fn run(
        &self,
        statements: &[Statement],
        candidates: Vec<Topic>,
        intent: Option<&str>,
    ) -> MatchReport {
        let total = batch_count(statements.len(), self.batch_size);
        let mut book = TopicBook::new(candidates);
        let mut report = MatchReport {
            batches: total,
            ..MatchReport::default()
        };

        info!(
            "Matching {} statements in {} batches of at most {}",
            statements.len(),
            total,
            self.batch_size
        );

        for (index, batch) in partition(statements, self.batch_size).into_iter().enumerate() {
            info!("Processing batch {}/{} with {} statements", index + 1, total, batch.len());

            if let Err(failure) = self.run_batch(batch, &mut book, &mut report.matches, intent).await {
                warn!(
                    batch = index,
                    statement_ids = ?failure.unlinked,
                    "Batch {} failed: {}",
                    index,
                    failure.reason
                );
                report.unmatched.extend(failure.unlinked.iter().copied());
                report.failures.push(BatchFailure {
                    index,
                    statement_ids: failure.unlinked,
                    reason: failure.reason,
                });
            }
        }

        info!(
            "Matching complete: {} matched, {} unmatched, {} failed batches",
            report.matches.len(),
            report.unmatched.len(),
            report.failures.len()
        );
        report
    }

    async fn run_batch(
        &self,
        batch: &[Statement],
        book: &mut TopicBook,
        matches: &mut Vec<TopicMatch>,
        intent: Option<&str>,
    ) -> Result<(), BatchError> {
        let assignments = self
            .client
            .match_topics(batch, &book.candidates, intent)
            .await
            .map_err(|e| BatchError {
                unlinked: batch.iter().map(|s| s.id).collect(),
                reason: e.to_string(),
            })?;

        for (position, assignment) in assignments.into_iter().enumerate() {
            let linked = self.resolve_and_link(assignment.statement_id, assignment.topic, book).await;
            match linked {
                Ok(topic_match) => matches.push(topic_match),
                Err(reason) => {
                    return Err(BatchError {
                        unlinked: batch[position..].iter().map(|s| s.id).collect(),
                        reason,
                    })
                }
            }
        }

        Ok(())
    }

    async fn resolve_and_link(
        &self,
        statement_id: StatementId,
        label: TopicLabel,
        book: &mut TopicBook,
    ) -> Result<TopicMatch, String> {
        let topic = match book.get(&label) {
            Some(topic) => topic.clone(),
            None => {
                let created = bounded(
                    self.store_timeout,
                    "create_topic",
                    self.store.create_topic(NewTopic::new(label)),
                )
                .await
                .map_err(|e| e.to_string())?;
                debug!("Resolved topic '{}' ({})", created.label, created.id);
                book.add(created.clone());
                created
            }
        };

        bounded(
            self.store_timeout,
            "link_statement_to_topic",
            self.store.link_statement_to_topic(statement_id, topic.id),
        )
        .await
        .map_err(|e| e.to_string())?;

        Ok(TopicMatch {
            statement_id,
            topic_id: topic.id,
            topic_label: topic.label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(label: &str) -> Topic {
        NewTopic::new(TopicLabel::new(label).unwrap()).into_topic(statement_graph_domain::TopicId::new(), 0)
    }

    #[test]
    fn test_topic_book_dedupes_by_key() {
        let mut book = TopicBook::new(vec![topic("Pets"), topic("pets ")]);
        assert_eq!(book.candidates.len(), 1);

        book.add(topic("Science"));
        book.add(topic("SCIENCE"));
        assert_eq!(book.candidates.len(), 2);
        assert!(book.get(&TopicLabel::new("science").unwrap()).is_some());
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, std::io::Error>(())
        };
        let result = bounded(Duration::from_millis(10), "slow_call", slow).await;
        assert!(matches!(result, Err(StoreCallError::TimedOut("slow_call", _))));
    }
}
