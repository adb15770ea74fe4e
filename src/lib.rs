//! # policyscope - Explainable policy conflict analysis
//!
//! policyscope takes the policy objects linked to one directory scope (for
//! example an organizational unit), pulls the key/value settings each of
//! them asserts, and reports every setting that two or more of them assert
//! with different values: who asserts what, which value takes effect, and
//! which contributors are overridden.
//!
//! ## Core Concepts
//!
//! - **PolicyLink**: a policy object's association with the scope, with
//!   enabled/enforced flags and a precedence rank
//! - **SettingAssertion**: one `(context, key path, value name) = value` fact
//!   from one policy object
//! - **Identity**: the `(context, key path, value name)` key grouping
//!   assertions about the same setting
//! - **ConflictReport**: the flattened, deterministically ordered result of a run
//!
//! The lowest precedence rank wins a conflict; the enforced flag is reported
//! but does not change the winner.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use policyscope::{
//!     InMemoryPolicySource, PolicyLink, RawSetting, ResolveConfig, Resolver, SettingContext,
//! };
//!
//! let mode = |value| {
//!     RawSetting::new(SettingContext::Machine, r"HKLM\Software\X", "Mode", "REG_SZ", value)
//! };
//! let source = Arc::new(InMemoryPolicySource::new());
//! source.insert_scope("OU=Lab", vec![PolicyLink::new("{A}", 1), PolicyLink::new("{B}", 2)])?;
//! source.insert_export("{A}", vec![mode("on")])?;
//! source.insert_export("{B}", vec![mode("off")])?;
//!
//! let report = Resolver::new(source).resolve("OU=Lab", &ResolveConfig::default())?;
//! assert_eq!(report.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod resolve;
pub mod setting;
pub mod source;

// Re-export primary types at crate root for convenience
pub use config::{CompiledConfig, ResolveConfig, ResolveConfigBuilder};
pub use engine::Resolver;
pub use error::{
    ConfigError, ExtractionWarning, ResolveError, ResolveResult, SourceError, WarningKind,
};
pub use policy::{PolicyId, PolicyLink};
pub use resolve::{ConflictGroup, ConflictRecord, ConflictReport, IdentityIndex};
pub use setting::{
    ContextSet, Identity, IdentityFolding, RawSetting, SettingAssertion, SettingContext,
};
pub use source::{InMemoryPolicySource, PolicySource, ScopeFixture};
