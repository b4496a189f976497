//! Roster Server Library
//!
//! HTTP service that ingests bulk employee files and serves the resulting
//! records.
//!
//! # Architecture
//!
//! - **features**: CQRS slices. Commands (upload, update) change state,
//!   queries (get, list, duplicates) only read. Each slice owns its routes.
//! - **ingest**: the transactional upsert of a validated batch. Parsing,
//!   batch validation and the concurrent-upload guard live in `roster-ingest`.
//! - **store**: the [`store::EmployeeStore`] contract with PostgreSQL and
//!   in-memory implementations.
//! - **api** / **middleware**: router assembly, response envelopes, CORS and
//!   request tracing.
//!
//! # Example
//!
//! ```no_run
//! use roster_server::{api, config::Config, features::FeatureState, store::InMemoryEmployeeStore};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let state = FeatureState::new(Arc::new(InMemoryEmployeeStore::new()));
//! let app = api::create_router(state, &config);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod cqrs;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;
pub mod store;

pub use error::AppError;
