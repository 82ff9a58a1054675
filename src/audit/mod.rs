//! Append-only audit trail
//!
//! Every create, update and delete performed through the services is
//! recorded as one JSON line in `audit.log`, with the entity state before
//! and after the change and a short summary of which fields moved.

mod diff;
mod entry;
mod logger;

pub use diff::summarize_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
