use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Invoice operations a role may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Cancel,
    View,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Create, Action::Update, Action::Cancel, Action::View];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Cancel => "cancel",
            Self::View => "view",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether a role may perform an action on invoices.
pub trait PermissionGate: Send + Sync {
    fn allows(&self, role: &str, action: Action) -> bool;
}

/// Role → granted actions. Unknown roles are denied everything.
///
/// Deserializes from a plain map, e.g. `{"admin": ["create", "cancel"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleTable {
    grants: HashMap<String, HashSet<Action>>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(mut self, role: impl Into<String>, actions: impl IntoIterator<Item = Action>) -> Self {
        self.grants.entry(role.into()).or_default().extend(actions);
        self
    }
}

impl PermissionGate for RoleTable {
    fn allows(&self, role: &str, action: Action) -> bool {
        self.grants
            .get(role)
            .is_some_and(|actions| actions.contains(&action))
    }
}

/// Grants everything; for tools and tests that have already authorized the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PermissionGate for AllowAll {
    fn allows(&self, _role: &str, _action: Action) -> bool {
        true
    }
}
