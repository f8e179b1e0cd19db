//! Typed HTTP client for the forum API.
//!
//! Works against the API service directly or through the edge proxy; both
//! expose the same `/api` paths.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{Course, Question};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub ok: bool,
    pub service: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct ForumClient {
    client: Client,
    base_url: String,
}

impl ForumClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        decode(self.client.get(self.url("/health")).send().await?).await
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, ClientError> {
        decode(self.client.get(self.url("/courses")).send().await?).await
    }

    /// `None` when the course does not exist.
    pub async fn get_course(&self, id: i32) -> Result<Option<Course>, ClientError> {
        decode_optional(self.client.get(self.url(&format!("/courses/{}", id))).send().await?).await
    }

    pub async fn create_course(&self, name: &str) -> Result<Course, ClientError> {
        let res = self
            .client
            .post(self.url("/courses"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        decode(res).await
    }

    pub async fn delete_course(&self, id: i32) -> Result<Option<Course>, ClientError> {
        decode_optional(self.client.delete(self.url(&format!("/courses/{}", id))).send().await?).await
    }

    pub async fn list_questions(&self, course_id: i32) -> Result<Vec<Question>, ClientError> {
        let url = self.url(&format!("/courses/{}/questions", course_id));
        decode(self.client.get(url).send().await?).await
    }

    pub async fn add_question(&self, course_id: i32, title: &str, text: &str) -> Result<Question, ClientError> {
        let res = self
            .client
            .post(self.url(&format!("/courses/{}/questions", course_id)))
            .json(&serde_json::json!({ "title": title, "text": text }))
            .send()
            .await?;
        decode(res).await
    }

    pub async fn upvote_question(&self, course_id: i32, question_id: i32) -> Result<Option<Question>, ClientError> {
        let url = self.url(&format!("/courses/{}/questions/{}/upvote", course_id, question_id));
        decode_optional(self.client.post(url).send().await?).await
    }

    pub async fn delete_question(&self, course_id: i32, question_id: i32) -> Result<Option<Question>, ClientError> {
        let url = self.url(&format!("/courses/{}/questions/{}", course_id, question_id));
        decode_optional(self.client.delete(url).send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if !status.is_success() {
        let text = res.text().await?;
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(res.json().await?)
}

/// Like `decode`, but a 404 or a `null` body means "no such row".
async fn decode_optional<T: DeserializeOwned>(res: Response) -> Result<Option<T>, ClientError> {
    if res.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    decode::<Option<T>>(res).await
}
