//! REST API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handlers/ (validation.rs checks ids and text first)
//!     → store (one statement per request)
//!     → response.rs (JSON rows or {"error": ...})
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;
pub mod validation;

pub use request::X_REQUEST_ID;
pub use response::ApiError;
pub use server::{ApiServer, AppState};
