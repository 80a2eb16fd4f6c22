//! Operator configuration loaded from environment variables.
//!
//! Operators sign in with a static token. `GATE_ADMIN_TOKEN` grants the
//! administrator role and `GATE_EDITOR_TOKEN` the editor role. Both are
//! optional; with neither set every caller is anonymous.

use crate::core::access::{Caller, Operator, Role};
use std::collections::HashMap;

/// Token lookup table for signed-in operators.
#[derive(Clone, Debug, Default)]
pub struct OperatorDirectory {
    by_token: HashMap<String, Operator>,
}

impl OperatorDirectory {
    /// Builds the directory from `GATE_ADMIN_TOKEN` and `GATE_EDITOR_TOKEN`.
    #[must_use]
    pub fn from_env() -> Self {
        let mut directory = Self::default();

        if let Ok(token) = std::env::var("GATE_ADMIN_TOKEN") {
            directory.insert(token, "administrator", Role::Administrator);
        }

        if let Ok(token) = std::env::var("GATE_EDITOR_TOKEN") {
            directory.insert(token, "editor", Role::Editor);
        }

        directory
    }

    /// Registers a token. Empty tokens are ignored so a blank variable
    /// cannot authenticate an empty header.
    pub fn insert(&mut self, token: String, name: &str, role: Role) {
        let token = token.trim().to_string();
        if token.is_empty() {
            return;
        }
        self.by_token.insert(
            token,
            Operator {
                name: name.to_string(),
                role,
            },
        );
    }

    /// Number of configured operators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    /// Whether no operator is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }

    /// Resolves a presented token to a caller; unknown tokens are anonymous.
    #[must_use]
    pub fn authenticate(&self, token: Option<&str>) -> Caller {
        token
            .and_then(|t| self.by_token.get(t.trim()))
            .cloned()
            .map_or_else(Caller::anonymous, Caller::operator)
    }
}
