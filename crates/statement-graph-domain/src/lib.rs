//! Statement Graph Domain Layer
//!
//! This crate contains the core domain model for the statement graph. It depends
//! only on `uuid` and defines the value objects, validation rules, and trait
//! interfaces that the store, LLM, and pipeline crates build upon.
//!
//! ## Key Concepts
//!
//! - **Statement**: An atomic extracted fact (subject / predicate / object) with context
//! - **Topic**: A named category that statements belong to
//! - **Draft**: An LLM-proposed statement that has not been persisted yet
//! - **Topic label**: Normalized label whose lowercase key is unique across topics
//!
//! ## Architecture
//!
//! - Validated constructors guard every value that reaches a store
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions (graph store, LLM provider)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod id;
pub mod statement;
pub mod time;
pub mod topic;
pub mod traits;
pub mod validation;

// Re-exports for convenience
pub use statement::{NewStatement, Statement, StatementDraft, StatementFilter, StatementId};
pub use topic::{NewTopic, Topic, TopicId, TopicLabel};
pub use validation::ValidationError;
