//! Callers, roles and capabilities.
//!
//! The gate only needs to know whether a caller is authenticated. The admin
//! surface additionally checks a single configurable capability.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A permission an operator may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Change site-wide options
    ManageOptions,
    /// Edit content authored by others
    EditOthersContent,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManageOptions => write!(f, "manage_options"),
            Self::EditOthersContent => write!(f, "edit_others_content"),
        }
    }
}

/// Operator role, mapped to a fixed capability set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Holds every capability
    Administrator,
    /// Content editing only
    Editor,
}

impl Role {
    /// Capabilities granted by this role.
    #[must_use]
    pub const fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::Administrator => &[Capability::ManageOptions, Capability::EditOthersContent],
            Self::Editor => &[Capability::EditOthersContent],
        }
    }
}

/// Identity attached to a single request.
///
/// The default value is the anonymous caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Caller {
    operator: Option<Operator>,
}

/// An authenticated operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operator {
    /// Display name used in logs
    pub name: String,
    /// Role determining capabilities
    pub role: Role,
}

impl Caller {
    /// The anonymous caller.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { operator: None }
    }

    /// A signed-in operator.
    #[must_use]
    pub const fn operator(operator: Operator) -> Self {
        Self {
            operator: Some(operator),
        }
    }

    /// Whether the caller is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.operator.is_some()
    }

    /// Operator name, if signed in.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.operator.as_ref().map(|op| op.name.as_str())
    }

    /// Whether the caller holds `capability`.
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        self.operator
            .as_ref()
            .is_some_and(|op| op.role.capabilities().contains(&capability))
    }
}
