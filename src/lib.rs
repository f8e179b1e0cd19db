//! Discussion forum: REST API service, edge proxy and client.

pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod store;

pub use client::ForumClient;
pub use config::ForumConfig;
pub use http::ApiServer;
pub use lifecycle::Shutdown;
pub use proxy::EdgeProxy;
