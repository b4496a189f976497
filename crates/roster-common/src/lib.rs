//! Roster Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the Roster workspace.
//!
//! - **types**: the [`Employee`] record exchanged by the parser, the store and the API
//! - **checksum**: payload fingerprints reported back to uploaders
//! - **logging**: tracing initialization shared by every binary
//!
//! # Example
//!
//! ```
//! use roster_common::checksum::sha256_hex;
//!
//! let fingerprint = sha256_hex(b"id,login,name,salary\n");
//! assert_eq!(fingerprint.len(), 64);
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

pub use error::{Result, RosterError};
pub use types::Employee;
