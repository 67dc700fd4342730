//! Task API client
//!
//! Thin REST client for the project-management backend: create tasks in a
//! project, fetch a project and list users.

pub mod client;
pub mod models;

pub use client::TaskApiClient;
