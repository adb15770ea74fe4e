//! Collaborator seam for directory and policy-export retrieval.
//!
//! The engine performs no I/O of its own. Everything slow (directory lookups,
//! export parsing) lives behind [`PolicySource`]; the in-memory backend is the
//! reference implementation used by tests, the CLI and embedded callers.

mod memory;
mod traits;

pub use memory::{InMemoryPolicySource, ScopeFixture};
pub use traits::PolicySource;
