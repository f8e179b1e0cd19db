//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use discussion_forum::config::ForumConfig;
use discussion_forum::store::{self, Course, ForumStore, MemoryStore, Question};
use discussion_forum::{ApiServer, EdgeProxy, Shutdown};

/// Memory store that counts every call that reaches it.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
    list_delay: Duration,
}

impl CountingStore {
    /// A store whose `list_courses` takes `delay` to answer.
    pub fn slow(delay: Duration) -> Self {
        Self {
            list_delay: delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ForumStore for CountingStore {
    async fn list_courses(&self) -> store::Result<Vec<Course>> {
        self.hit();
        if !self.list_delay.is_zero() {
            tokio::time::sleep(self.list_delay).await;
        }
        self.inner.list_courses().await
    }

    async fn get_course(&self, id: i32) -> store::Result<Option<Course>> {
        self.hit();
        self.inner.get_course(id).await
    }

    async fn create_course(&self, name: &str) -> store::Result<Course> {
        self.hit();
        self.inner.create_course(name).await
    }

    async fn delete_course(&self, id: i32) -> store::Result<Option<Course>> {
        self.hit();
        self.inner.delete_course(id).await
    }

    async fn list_questions(&self, course_id: i32) -> store::Result<Vec<Question>> {
        self.hit();
        self.inner.list_questions(course_id).await
    }

    async fn create_question(&self, course_id: i32, title: &str, text: &str) -> store::Result<Question> {
        self.hit();
        self.inner.create_question(course_id, title, text).await
    }

    async fn upvote_question(&self, course_id: i32, question_id: i32) -> store::Result<Option<Question>> {
        self.hit();
        self.inner.upvote_question(course_id, question_id).await
    }

    async fn delete_question(&self, course_id: i32, question_id: i32) -> store::Result<Option<Question>> {
        self.hit();
        self.inner.delete_question(course_id, question_id).await
    }

    async fn ping(&self) -> store::Result<()> {
        self.hit();
        Ok(())
    }
}

/// HTTP client that ignores any proxy settings from the environment.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

/// Start the API service on an ephemeral port with an in-memory store.
pub async fn spawn_api(config: ForumConfig, shutdown: &Shutdown) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = ApiServer::new(config, Arc::new(MemoryStore::new()));
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    addr
}

/// Start the edge proxy on an ephemeral port, forwarding to `upstream`.
pub async fn spawn_proxy(config: ForumConfig, upstream: SocketAddr, shutdown: &Shutdown) -> SocketAddr {
    spawn_proxy_to(config, &format!("http://{}", upstream), shutdown).await
}

/// Start the edge proxy on an ephemeral port with an explicit upstream URL.
pub async fn spawn_proxy_to(mut config: ForumConfig, upstream: &str, shutdown: &Shutdown) -> SocketAddr {
    config.proxy.upstream = upstream.to_string();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let proxy = EdgeProxy::new(config).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = proxy.run(listener, rx).await;
    });
    addr
}

/// Backend that answers every request with a JSON description of it.
///
/// `/api/slow` sleeps before answering; `/api/teapot` answers 418 with a
/// custom header.
pub async fn start_echo_backend(shutdown: &Shutdown) -> SocketAddr {
    async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> (StatusCode, HeaderMap, Json<Value>) {
        if uri.path() == "/api/slow" {
            tokio::time::sleep(Duration::from_secs(3)).await;
        }

        let mut response_headers = HeaderMap::new();
        let status = if uri.path() == "/api/teapot" {
            response_headers.insert("x-backend", "echo".parse().unwrap());
            StatusCode::IM_A_TEAPOT
        } else {
            StatusCode::OK
        };

        let received: serde_json::Map<String, Value> = headers
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v.to_str().unwrap_or_default())))
            .collect();

        (
            status,
            response_headers,
            Json(json!({
                "method": method.as_str(),
                "path": uri.path(),
                "query": uri.query(),
                "headers": received,
                "body": String::from_utf8_lossy(&body),
            })),
        )
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(echo);
    let mut rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.recv().await;
            })
            .await;
    });
    addr
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
