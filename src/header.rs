//! Header label heuristics.
//!
//! Roles are resolved by a left-to-right fold over the header labels, so when
//! several labels match a role the rightmost one wins. Roles nobody matched
//! fall back to fixed positions.

use std::collections::HashMap;

use log::{info, warn};

const IDENTIFIER_SYNONYMS: [&str; 2] = ["no", "id"];
const MODEL_SYNONYMS: [&str; 2] = ["model", "型式"];

pub const DEFAULT_IDENTIFIER_INDEX: usize = 0;
pub const DEFAULT_MODEL_INDEX: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Identifier,
    ModelNumber,
}

impl Role {
    fn synonyms(self) -> &'static [&'static str] {
        match self {
            Role::Identifier => &IDENTIFIER_SYNONYMS,
            Role::ModelNumber => &MODEL_SYNONYMS,
        }
    }

    fn default_index(self) -> usize {
        match self {
            Role::Identifier => DEFAULT_IDENTIFIER_INDEX,
            Role::ModelNumber => DEFAULT_MODEL_INDEX,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Role::Identifier => "identifier",
            Role::ModelNumber => "model number",
        }
    }

    pub const ALL: [Role; 2] = [Role::Identifier, Role::ModelNumber];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleIndex {
    pub index: usize,
    pub detected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoleMap {
    roles: HashMap<Role, RoleIndex>,
}

impl ColumnRoleMap {
    pub fn index(&self, role: Role) -> usize {
        self.roles
            .get(&role)
            .map(|entry| entry.index)
            .unwrap_or_else(|| role.default_index())
    }

    pub fn was_detected(&self, role: Role) -> bool {
        self.roles.get(&role).is_some_and(|entry| entry.detected)
    }

    pub fn identifier(&self) -> usize {
        self.index(Role::Identifier)
    }

    pub fn model_number(&self) -> usize {
        self.index(Role::ModelNumber)
    }

    pub fn log_summary(&self) {
        for role in Role::ALL {
            if self.was_detected(role) {
                info!("{} column detected at index {}", role.describe(), self.index(role));
            } else {
                warn!(
                    "No {} column found; using index {}",
                    role.describe(),
                    self.index(role)
                );
            }
        }
    }
}

pub fn resolve_roles<S: AsRef<str>>(headers: &[S]) -> ColumnRoleMap {
    let mut roles = headers
        .iter()
        .enumerate()
        .fold(HashMap::new(), |mut roles, (idx, header)| {
            let normalized = header.as_ref().trim().to_lowercase();
            for role in Role::ALL {
                if role
                    .synonyms()
                    .iter()
                    .any(|synonym| normalized.contains(synonym))
                {
                    roles.insert(
                        role,
                        RoleIndex {
                            index: idx,
                            detected: true,
                        },
                    );
                }
            }
            roles
        });
    for role in Role::ALL {
        roles.entry(role).or_insert(RoleIndex {
            index: role.default_index(),
            detected: false,
        });
    }
    ColumnRoleMap { roles }
}

/// Exact-label lookup for the named catalog columns. Duplicate labels resolve
/// to the rightmost column.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.as_ref().to_string(), idx))
            .collect();
        Self { positions }
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// The value of column `label` in `row`, or `None` when the header lacks it.
    pub fn get<'a>(&self, row: &'a [String], label: &str) -> Option<&'a str> {
        self.position(label)
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
    }
}
