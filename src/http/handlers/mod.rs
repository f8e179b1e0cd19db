//! Route handlers for the REST API.
//!
//! Each handler validates its inputs, issues a single store call and renders
//! the row(s) as JSON.

pub mod courses;
pub mod health;
pub mod questions;
