//! Per-request stage machine
//!
//! `Received → Extracting → Persisting → Matching → Completed`, with `Failed`
//! reachable from every non-terminal stage.

use std::fmt;
use tracing::{error, info};

/// Stage of an ingestion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Request accepted
    Received,
    /// Waiting for statement extraction
    Extracting,
    /// Writing statements
    Persisting,
    /// Matching statements to topics
    Matching,
    /// Finished successfully
    Completed,
    /// Aborted
    Failed,
}

impl Stage {
    /// Whether no further transitions are allowed
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Completed | Stage::Failed)
    }

    /// Whether `self → next` is a legal transition
    pub fn can_transition_to(self, next: Stage) -> bool {
        use Stage::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Received, Extracting)
            | (Extracting, Persisting)
            | (Persisting, Matching)
            | (Matching, Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Rejected stage change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal stage transition {from} -> {to}")]
pub struct IllegalTransition {
    /// Current stage
    pub from: Stage,
    /// Requested stage
    pub to: Stage,
}

/// Tracks and logs the stage of one request
#[derive(Debug)]
pub struct StageTracker {
    request: String,
    current: Stage,
}

impl StageTracker {
    /// Start in `Received`
    pub fn new(request: impl Into<String>) -> Self {
        let request = request.into();
        info!("Ingestion {}: {}", request, Stage::Received);
        Self { request, current: Stage::Received }
    }

    /// Current stage
    pub fn current(&self) -> Stage {
        self.current
    }

    /// Move to `next`
    pub fn advance(&mut self, next: Stage) -> Result<(), IllegalTransition> {
        if !self.current.can_transition_to(next) {
            return Err(IllegalTransition { from: self.current, to: next });
        }
        info!("Ingestion {}: {} -> {}", self.request, self.current, next);
        self.current = next;
        Ok(())
    }

    /// Move to `Failed`, logging the reason
    ///
    /// A tracker that already finished keeps its stage.
    pub fn fail(&mut self, reason: &dyn fmt::Display) {
        if self.current.is_terminal() {
            return;
        }
        error!("Ingestion {} failed during {}: {}", self.request, self.current, reason);
        self.current = Stage::Failed;
    }
}
