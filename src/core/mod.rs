//! Core primitives.
//!
//! Framework-free building blocks the engine is assembled from.

pub mod observable;
pub mod scheduler;

// Re-export core types
pub use observable::{Observable, SubscriptionId};
pub use scheduler::{DeferredQueue, Generation, Scheduled};
