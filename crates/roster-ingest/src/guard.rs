//! In-flight upload registry
//!
//! Uploads are keyed by their declared name. While a name is registered any
//! other upload declaring it is turned away; different names never block each
//! other. Registration is released when the [`UploadPermit`] is dropped, so
//! every exit path of an upload clears its entry.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Another upload with the same declared name is still running
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Another upload is already in progress. Please try again later.")]
pub struct ConcurrentUploadError {
    pub name: String,
}

/// Process-wide set of declared names currently being uploaded.
///
/// Cloning is cheap and every clone shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct UploadGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl UploadGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`, or fail if it is already registered.
    pub fn begin(&self, name: &str) -> Result<UploadPermit, ConcurrentUploadError> {
        if !self.registry().insert(name.to_string()) {
            debug!(upload = %name, "Upload already in flight");
            return Err(ConcurrentUploadError {
                name: name.to_string(),
            });
        }

        debug!(upload = %name, "Upload registered");
        Ok(UploadPermit {
            guard: self.clone(),
            name: name.to_string(),
        })
    }

    /// Remove `name` from the registry. Removing an absent name is a no-op.
    pub fn end(&self, name: &str) {
        if self.registry().remove(name) {
            debug!(upload = %name, "Upload released");
        }
    }

    pub fn is_in_flight(&self, name: &str) -> bool {
        self.registry().contains(name)
    }

    pub fn in_flight_count(&self) -> usize {
        self.registry().len()
    }

    // A panic while holding the lock cannot leave the set half-updated.
    fn registry(&self) -> MutexGuard<'_, HashSet<String>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Proof that an upload holds its declared name. Dropping it calls
/// [`UploadGuard::end`].
#[derive(Debug)]
#[must_use = "the upload is released as soon as the permit is dropped"]
pub struct UploadPermit {
    guard: UploadGuard,
    name: String,
}

impl UploadPermit {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for UploadPermit {
    fn drop(&mut self) {
        self.guard.end(&self.name);
    }
}
