//! Run configuration.
//!
//! [`ResolveConfig`] is plain data so it can be loaded from JSON; it is
//! validated into a [`CompiledConfig`] before any collaborator is called.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::setting::{ContextSet, IdentityFolding};

/// Options for one resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Only analyze enforced links.
    pub enforced_only: bool,
    /// Include machine settings.
    pub include_machine: bool,
    /// Include user settings.
    pub include_user: bool,
    /// Regex a key path must match to be analyzed.
    pub key_filter: Option<String>,
    /// How identities compare key paths and value names.
    pub identity_folding: IdentityFolding,
    /// Number of threads fetching exports (1 = sequential).
    pub extraction_workers: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            enforced_only: false,
            include_machine: true,
            include_user: true,
            key_filter: None,
            identity_folding: IdentityFolding::Exact,
            extraction_workers: 1,
        }
    }
}

impl ResolveConfig {
    /// Starts a builder from the defaults.
    #[must_use]
    pub fn builder() -> ResolveConfigBuilder {
        ResolveConfigBuilder::default()
    }

    /// Returns the selected contexts.
    #[must_use]
    pub const fn contexts(&self) -> ContextSet {
        ContextSet {
            machine: self.include_machine,
            user: self.include_user,
        }
    }

    /// Validates the options and compiles the key filter.
    ///
    /// # Errors
    /// - `NoContextSelected` if both contexts are excluded
    /// - `InvalidKeyFilter` if `key_filter` is not a valid regex
    /// - `InvalidWorkerCount` if `extraction_workers` is zero
    pub fn compile(&self) -> Result<CompiledConfig, ConfigError> {
        let contexts = self.contexts();
        if contexts.is_empty() {
            return Err(ConfigError::NoContextSelected);
        }
        if self.extraction_workers == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }

        // Spellings grouped as one identity must all pass or all fail the filter.
        let fold_case = self.identity_folding == IdentityFolding::AsciiCaseInsensitive;
        let key_filter = match self.key_filter.as_deref() {
            Some(pattern) => Some(
                RegexBuilder::new(pattern)
                    .case_insensitive(fold_case)
                    .build()
                    .map_err(|e| ConfigError::InvalidKeyFilter {
                        pattern: pattern.to_string(),
                        reason: e.to_string(),
                    })?,
            ),
            None => None,
        };

        Ok(CompiledConfig {
            enforced_only: self.enforced_only,
            contexts,
            key_filter,
            identity_folding: self.identity_folding,
            extraction_workers: self.extraction_workers,
        })
    }
}

/// A validated configuration, ready to drive a run.
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    /// Only analyze enforced links.
    pub enforced_only: bool,
    /// Contexts to extract.
    pub contexts: ContextSet,
    /// Compiled key-path filter.
    pub key_filter: Option<Regex>,
    /// Identity comparison mode.
    pub identity_folding: IdentityFolding,
    /// Extraction thread count.
    pub extraction_workers: usize,
}

impl CompiledConfig {
    /// Returns true if a key path passes the filter.
    #[must_use]
    pub fn accepts_key(&self, key_path: &str) -> bool {
        self.key_filter
            .as_ref()
            .map_or(true, |re| re.is_match(key_path))
    }
}

/// Builder for [`ResolveConfig`].
///
/// # Example
/// ```rust,ignore
/// let config = ResolveConfig::builder()
///     .enforced_only()
///     .exclude_user()
///     .key_filter(r"(?i)^HKLM\\Software\\Policies\\")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResolveConfigBuilder {
    config: ResolveConfig,
}

impl ResolveConfigBuilder {
    /// Only analyze enforced links.
    #[must_use]
    pub fn enforced_only(mut self) -> Self {
        self.config.enforced_only = true;
        self
    }

    /// Skip machine settings.
    #[must_use]
    pub fn exclude_machine(mut self) -> Self {
        self.config.include_machine = false;
        self
    }

    /// Skip user settings.
    #[must_use]
    pub fn exclude_user(mut self) -> Self {
        self.config.include_user = false;
        self
    }

    /// Restrict analysis to key paths matching `pattern`.
    #[must_use]
    pub fn key_filter(mut self, pattern: impl Into<String>) -> Self {
        self.config.key_filter = Some(pattern.into());
        self
    }

    /// Select identity comparison.
    #[must_use]
    pub fn identity_folding(mut self, folding: IdentityFolding) -> Self {
        self.config.identity_folding = folding;
        self
    }

    /// Fetch exports on `workers` threads.
    #[must_use]
    pub fn extraction_workers(mut self, workers: usize) -> Self {
        self.config.extraction_workers = workers;
        self
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    /// Same conditions as [`ResolveConfig::compile`].
    pub fn build(self) -> Result<ResolveConfig, ConfigError> {
        self.config.compile()?;
        Ok(self.config)
    }
}
