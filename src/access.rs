use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

/// Role
///
/// The closed set of roles a user can be assigned through the `user_roles` table.
/// A user may hold several rows; authorization always works on the single
/// effective role computed by [`effective_role`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Admin,
    Editor,
}

impl Role {
    /// Lower value wins when a user holds more than one role.
    pub const fn priority(self) -> u8 {
        match self {
            Role::Admin => 0,
            Role::Editor => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Roles allowed to create, update and delete site content (and upload media).
pub const CONTENT_EDITORS: &[Role] = &[Role::Admin, Role::Editor];

/// Roles allowed to manage user accounts and role assignments.
pub const USER_ADMINS: &[Role] = &[Role::Admin];

/// effective_role
///
/// Collapses the assigned roles into the one used for access decisions.
/// Returns `None` for a user without any role row, which is a valid state.
pub fn effective_role(assigned: &[Role]) -> Option<Role> {
    assigned.iter().copied().min_by_key(|role| role.priority())
}

/// Why an access decision denied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    /// No effective role is present.
    #[error("no role resolved for the request")]
    Unauthenticated,
    /// A role is present but not on the operation's allow-list.
    #[error("role {0} is not allowed for this operation")]
    Forbidden(Role),
}

/// authorize
///
/// The access decision for a single operation: allows when the effective role
/// is on the allow-list and returns the role that was accepted.
/// Pure; never performs I/O.
pub fn authorize(role: Option<Role>, allowed: &[Role]) -> Result<Role, AccessDenied> {
    let role = role.ok_or(AccessDenied::Unauthenticated)?;
    if allowed.contains(&role) {
        Ok(role)
    } else {
        Err(AccessDenied::Forbidden(role))
    }
}
