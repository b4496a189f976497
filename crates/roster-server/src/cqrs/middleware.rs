//! Marker traits separating writes from reads
//!
//! Commands change store state and are logged at `info`; queries only read.

/// A request that modifies state
pub trait Command: Send + 'static {}

/// A request that only reads state
pub trait Query: Send + 'static {}
