use serde::{Deserialize, Serialize};

use crate::api::UserId;

/// Role tags stored on a user record.
///
/// These are the *base* roles; the effective role set is computed on demand
/// from live team/panel membership (see [`crate::engine::roles`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Guide,
    Panel,
    Coordinator,
    Admin,
    Student,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Guide => "guide",
            Role::Panel => "panel",
            Role::Coordinator => "coordinator",
            Role::Admin => "admin",
            Role::Student => "student",
        };
        f.write_str(name)
    }
}

/// Internal/external classification, only meaningful for the panel role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Internal,
    External,
}

/// A faculty or student account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub roles: Vec<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_type: Option<MemberType>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_external(&self) -> bool {
        self.member_type == Some(MemberType::External)
    }
}
