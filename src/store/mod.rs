//! Persistence layer.
//!
//! # Data Flow
//! ```text
//! handler (ids already validated)
//!     → ForumStore trait object held in AppState
//!     → postgres.rs (one parameterized statement per call)
//!       or memory.rs (same semantics, in-process)
//! ```
//!
//! # Design Decisions
//! - The store is constructed once and injected; there is no global handle
//! - Single-row operations return `Option` and leave the "not found" policy
//!   to the HTTP layer
//! - Concurrency control belongs to the database (upvote is one UPDATE)

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryStore;
pub use models::{Course, Question};
pub use postgres::PgStore;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// The referenced course does not exist (foreign key violation).
    #[error("Course {0} does not exist")]
    CourseNotFound(i32),
}

/// Storage backend for courses and questions.
#[async_trait]
pub trait ForumStore: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>>;

    async fn get_course(&self, id: i32) -> Result<Option<Course>>;

    async fn create_course(&self, name: &str) -> Result<Course>;

    /// Delete a course. Its questions go with it.
    async fn delete_course(&self, id: i32) -> Result<Option<Course>>;

    async fn list_questions(&self, course_id: i32) -> Result<Vec<Question>>;

    /// Insert a question with zero upvotes.
    async fn create_question(&self, course_id: i32, title: &str, text: &str) -> Result<Question>;

    /// Add one upvote to the question matching both ids.
    async fn upvote_question(&self, course_id: i32, question_id: i32) -> Result<Option<Question>>;

    async fn delete_question(&self, course_id: i32, question_id: i32) -> Result<Option<Question>>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<()>;
}
