//! Setting assertions and their identities.
//!
//! A [`SettingAssertion`] is one `(context, key path, value name) = value`
//! fact contributed by one policy object. Assertions that share an
//! [`Identity`] refer to the same setting and may conflict.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::policy::{PolicyId, PolicyLink};

/// The half of a policy object a setting belongs to.
///
/// `Machine` orders before `User`; reports are sorted accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingContext {
    /// Machine-wide (computer configuration).
    Machine,
    /// User-wide (user configuration).
    User,
}

impl SettingContext {
    /// Returns a short stable identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Machine => "machine",
            Self::User => "user",
        }
    }
}

impl fmt::Display for SettingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "machine" | "computer" => Ok(Self::Machine),
            "user" => Ok(Self::User),
            other => Err(other.to_string()),
        }
    }
}

/// The set of contexts a run analyzes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSet {
    /// Include machine settings.
    pub machine: bool,
    /// Include user settings.
    pub user: bool,
}

impl ContextSet {
    /// Both contexts.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            machine: true,
            user: true,
        }
    }

    /// Returns true if `context` is part of the set.
    #[must_use]
    pub const fn contains(self, context: SettingContext) -> bool {
        match context {
            SettingContext::Machine => self.machine,
            SettingContext::User => self.user,
        }
    }

    /// Returns true if no context is selected.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.machine && !self.user
    }
}

impl Default for ContextSet {
    fn default() -> Self {
        Self::all()
    }
}

/// How key paths and value names are compared when grouping assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityFolding {
    /// Byte-equal comparison.
    #[default]
    Exact,
    /// ASCII case-insensitive comparison.
    AsciiCaseInsensitive,
}

impl IdentityFolding {
    fn fold(self, s: &str) -> String {
        match self {
            Self::Exact => s.to_string(),
            Self::AsciiCaseInsensitive => s.to_ascii_lowercase(),
        }
    }
}

/// The composite key grouping assertions about the same setting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Setting context.
    pub context: SettingContext,
    /// Registry-style key path.
    pub key_path: String,
    /// Value name under the key (empty for the key's default value).
    pub value_name: String,
}

impl Identity {
    /// Creates an identity.
    #[must_use]
    pub fn new(
        context: SettingContext,
        key_path: impl Into<String>,
        value_name: impl Into<String>,
    ) -> Self {
        Self {
            context,
            key_path: key_path.into(),
            value_name: value_name.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.context, self.key_path, self.value_name)
    }
}

/// One setting asserted by one policy object, stamped with its link's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingAssertion {
    /// Setting context.
    pub context: SettingContext,
    /// Key path as exported.
    pub key_path: String,
    /// Value name as exported.
    pub value_name: String,
    /// Registry data type, opaque to the engine.
    pub data_type: String,
    /// Serialized value, compared byte-for-byte.
    pub value: String,
    /// Policy object that asserted the setting.
    pub source_policy_id: PolicyId,
    /// Display name of that policy object.
    pub source_display_name: String,
    /// Precedence rank of the asserting link.
    pub source_precedence_rank: i64,
    /// Whether the asserting link is enforced.
    pub source_enforced: bool,
}

impl SettingAssertion {
    /// Builds an assertion from a validated setting and the link it came from.
    #[must_use]
    pub fn from_link(
        link: &PolicyLink,
        context: SettingContext,
        key_path: String,
        value_name: String,
        data_type: String,
        value: String,
    ) -> Self {
        Self {
            context,
            key_path,
            value_name,
            data_type,
            value,
            source_policy_id: link.policy_id.clone(),
            source_display_name: link.display_name.clone(),
            source_precedence_rank: link.precedence_rank,
            source_enforced: link.enforced,
        }
    }

    /// Returns the grouping identity under the given folding.
    #[must_use]
    pub fn identity(&self, folding: IdentityFolding) -> Identity {
        Identity {
            context: self.context,
            key_path: folding.fold(&self.key_path),
            value_name: folding.fold(&self.value_name),
        }
    }
}

/// One exported setting as handed over by the collaborator, not yet validated.
///
/// Scalar JSON values (numbers, booleans) are accepted for `value` and kept
/// in their JSON text form; `null` is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSetting {
    /// `machine`/`computer` or `user`.
    #[serde(default)]
    pub context: Option<String>,
    /// Key path.
    #[serde(default)]
    pub key_path: Option<String>,
    /// Value name.
    #[serde(default)]
    pub value_name: Option<String>,
    /// Data type, e.g. `REG_DWORD`.
    #[serde(default)]
    pub data_type: Option<String>,
    /// Serialized value.
    #[serde(default, deserialize_with = "deserialize_scalar")]
    pub value: Option<String>,
}

impl RawSetting {
    /// Creates a fully populated raw setting.
    #[must_use]
    pub fn new(
        context: SettingContext,
        key_path: impl Into<String>,
        value_name: impl Into<String>,
        data_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            context: Some(context.name().to_string()),
            key_path: Some(key_path.into()),
            value_name: Some(value_name.into()),
            data_type: Some(data_type.into()),
            value: Some(value.into()),
        }
    }
}

fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
