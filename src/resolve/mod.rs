//! The resolution pipeline.
//!
//! Links are normalized, each link's export is extracted into assertions,
//! assertions are grouped by identity, divergent groups get a winner and the
//! result is flattened into a [`ConflictReport`].

pub mod detector;
pub mod extractor;
pub mod index;
pub mod normalizer;
pub mod report;
pub mod winner;

pub use detector::{detect_conflicts, ConflictGroup};
pub use extractor::{extract_all, extract_assertions, Extraction};
pub use index::IdentityIndex;
pub use normalizer::normalize_links;
pub use report::{build_report, ConflictRecord, ConflictReport};
pub use winner::{is_conflicting, resolve_winners, select_winner};
