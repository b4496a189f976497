//! Feature slices of the Roster API
//!
//! Each slice follows the CQRS layout:
//! - `commands/` - write operations (upload, update)
//! - `queries/` - read operations (get, list, duplicate pre-flight)
//! - `routes.rs` - HTTP route definitions
//!
//! Commands and queries implement `mediator::Request` and are registered in
//! [`crate::cqrs::build_mediator`].

pub mod employees;
pub mod shared;

use axum::Router;
use roster_ingest::UploadGuard;
use std::sync::Arc;

use crate::store::EmployeeStore;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Employee persistence
    pub store: Arc<dyn EmployeeStore>,
    /// Declared names of uploads currently running
    pub uploads: UploadGuard,
}

impl FeatureState {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self {
            store,
            uploads: UploadGuard::new(),
        }
    }
}

/// Creates the API router with all feature routes mounted
///
/// - `/employees` - upload, listing, lookup, update, duplicate pre-flight
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().nest("/employees", employees::employees_routes().with_state(state))
}
