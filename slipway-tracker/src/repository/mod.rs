//! Repository layer
//!
//! Persistence seam for job records. The tracker only ever needs create,
//! read-back, and two field-level updates; both mutations with an invariant
//! attached (append-only output, write-once exit status) are enforced here
//! so callers cannot race around them.
//!
//! The store is trait-based to enable testing and mocking.

mod jobs;

// Re-export trait
pub use jobs::JobStore;

// Re-export implementations
pub use jobs::InMemoryJobStore;
pub use jobs::PgJobStore;
