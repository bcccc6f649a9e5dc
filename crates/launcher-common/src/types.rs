//! Domain value types shared by the composition engine and its consumers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A host directory bound into the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeBinding {
    /// Path on the host.
    pub host: String,
    /// Path inside the container.
    pub guest: String,
}

impl VolumeBinding {
    /// Creates a binding from host and container paths.
    #[must_use]
    pub fn new(host: impl Into<String>, guest: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            guest: guest.into(),
        }
    }
}

impl fmt::Display for VolumeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.guest)
    }
}

/// A link to another container, reachable under an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDefinition {
    /// Target container name.
    pub name: String,
    /// Alias the target is reachable under.
    pub alias: String,
}

impl LinkDefinition {
    /// Creates a link from a target name and alias.
    #[must_use]
    pub fn new(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
        }
    }
}

impl fmt::Display for LinkDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.alias)
    }
}

/// How a hook operation modifies the named hook's step list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookAction {
    /// Add the step to the end.
    #[default]
    Append,
    /// Drop steps from earlier layers, then add the step.
    Replace,
    /// Splice the step immediately before the target step.
    InsertBefore,
    /// Splice the step immediately after the target step.
    InsertAfter,
}

impl HookAction {
    /// Whether the action needs a target step key.
    pub const fn is_splice(self) -> bool {
        matches!(self, Self::InsertBefore | Self::InsertAfter)
    }
}

impl fmt::Display for HookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => write!(f, "append"),
            Self::Replace => write!(f, "replace"),
            Self::InsertBefore => write!(f, "insert-before"),
            Self::InsertAfter => write!(f, "insert-after"),
        }
    }
}
