//! PostgreSQL backend built on an sqlx connection pool.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::store::{Course, ForumStore, Question, Result, StoreError};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect using the configured credentials.
    ///
    /// Fails fast when the database is unreachable. Migrations run when
    /// `run_migrations` is set.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            max_connections = config.max_connections,
            "Connected to PostgreSQL"
        );

        let store = Self::from_pool(pool);
        if config.run_migrations {
            store.migrate().await?;
        }
        Ok(store)
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ForumStore for PgStore {
    async fn list_courses(&self) -> Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>("SELECT id, name FROM courses ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(courses)
    }

    async fn get_course(&self, id: i32) -> Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>("SELECT id, name FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(course)
    }

    async fn create_course(&self, name: &str) -> Result<Course> {
        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO courses (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(course)
    }

    async fn delete_course(&self, id: i32) -> Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            "DELETE FROM courses WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(course)
    }

    async fn list_questions(&self, course_id: i32) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, title, text, upvotes, course_id FROM questions \
             WHERE course_id = $1 ORDER BY id",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn create_question(&self, course_id: i32, title: &str, text: &str) -> Result<Question> {
        let inserted = sqlx::query_as::<_, Question>(
            "INSERT INTO questions (course_id, title, text) VALUES ($1, $2, $3) \
             RETURNING id, title, text, upvotes, course_id",
        )
        .bind(course_id)
        .bind(title)
        .bind(text)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(question) => Ok(question),
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                Err(StoreError::CourseNotFound(course_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn upvote_question(&self, course_id: i32, question_id: i32) -> Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(
            "UPDATE questions SET upvotes = upvotes + 1 \
             WHERE id = $1 AND course_id = $2 \
             RETURNING id, title, text, upvotes, course_id",
        )
        .bind(question_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }

    async fn delete_question(&self, course_id: i32, question_id: i32) -> Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(
            "DELETE FROM questions WHERE id = $1 AND course_id = $2 \
             RETURNING id, title, text, upvotes, course_id",
        )
        .bind(question_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(question)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
