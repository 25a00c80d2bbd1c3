//! Identity and permission records for platform operators. These records come
//! from the login endpoint and are persisted with the session, so every field
//! that older payloads may omit has a default rather than failing to decode.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Operator role. `Owner` bypasses permission checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    Owner,
    SuperAdmin,
    Admin,
    Moderator,
    Support,
    #[serde(other)]
    Unknown,
}

impl AdminRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Support => "support",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resources covered by a sub-admin permission set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Resource {
    Users,
    Templates,
    Creators,
    Transactions,
    Moderation,
    Wallet,
    AiConfig,
    Finance,
    Reports,
    Settings,
    Admins,
}

impl Resource {
    pub const ALL: [Self; 11] = [
        Self::Users,
        Self::Templates,
        Self::Creators,
        Self::Transactions,
        Self::Moderation,
        Self::Wallet,
        Self::AiConfig,
        Self::Finance,
        Self::Reports,
        Self::Settings,
        Self::Admins,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Templates => "templates",
            Self::Creators => "creators",
            Self::Transactions => "transactions",
            Self::Moderation => "moderation",
            Self::Wallet => "wallet",
            Self::AiConfig => "aiConfig",
            Self::Finance => "finance",
            Self::Reports => "reports",
            Self::Settings => "settings",
            Self::Admins => "admins",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `resource:action` requirement, e.g. `users:delete`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permission {
    pub resource: Resource,
    pub action: String,
}

impl Permission {
    #[must_use]
    pub fn new(resource: Resource, action: impl Into<String>) -> Self {
        Self {
            resource,
            action: action.into(),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

/// Resource → {action → granted}. Missing resources or actions are denied.
///
/// Keys are kept as strings so resources added by the backend later survive a
/// persist/restore cycle instead of failing the whole record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeMap<String, BTreeMap<String, bool>>);

impl PermissionSet {
    #[must_use]
    pub fn allows(&self, resource: Resource, action: &str) -> bool {
        self.0
            .get(resource.as_str())
            .and_then(|actions| actions.get(action))
            .copied()
            .unwrap_or(false)
    }

    /// Grants or revokes one action, creating the resource entry if needed.
    pub fn set(&mut self, resource: Resource, action: &str, granted: bool) {
        self.0
            .entry(resource.as_str().to_string())
            .or_default()
            .insert(action.to_string(), granted);
    }

    #[must_use]
    pub fn with(mut self, resource: Resource, action: &str, granted: bool) -> Self {
        self.set(resource, action, granted);
        self
    }

    /// Permissions handed to a freshly created sub-admin.
    #[must_use]
    pub fn sub_admin_default() -> Self {
        Self::default()
            .with(Resource::Users, "view", true)
            .with(Resource::Users, "edit", false)
            .with(Resource::Users, "delete", false)
            .with(Resource::Templates, "view", true)
            .with(Resource::Templates, "edit", true)
            .with(Resource::Templates, "approve", false)
            .with(Resource::Creators, "view", true)
            .with(Resource::Creators, "approve", false)
            .with(Resource::Transactions, "view", true)
            .with(Resource::Transactions, "refund", false)
            .with(Resource::Moderation, "view", true)
            .with(Resource::Moderation, "action", true)
            .with(Resource::Wallet, "view", true)
            .with(Resource::Wallet, "adjust", false)
            .with(Resource::AiConfig, "view", false)
            .with(Resource::AiConfig, "edit", false)
            .with(Resource::Finance, "view", true)
            .with(Resource::Finance, "export", false)
            .with(Resource::Reports, "view", true)
            .with(Resource::Reports, "export", false)
            .with(Resource::Settings, "view", false)
            .with(Resource::Settings, "edit", false)
            .with(Resource::Admins, "view", false)
            .with(Resource::Admins, "create", false)
    }
}

fn default_active() -> bool {
    true
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// An explicit `null` decodes like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn null_as_active<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Option::<bool>::deserialize(deserializer).map(|active| active.unwrap_or_else(default_active))
}

fn null_as_now<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(|created| created.unwrap_or_else(now_rfc3339))
}

/// Identity record of a signed-in operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
    #[serde(default = "default_active", deserialize_with = "null_as_active")]
    pub is_active: bool,
    #[serde(default = "now_rfc3339", deserialize_with = "null_as_now")]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Admin {
    /// True when the record carries the fields a session needs: id and email.
    #[must_use]
    pub fn is_identified(&self) -> bool {
        !self.id.trim().is_empty() && !self.email.trim().is_empty()
    }

    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.role == Some(AdminRole::Owner)
    }

    /// Owner bypasses the permission set; everyone else needs an explicit grant.
    #[must_use]
    pub fn can(&self, resource: Resource, action: &str) -> bool {
        if self.is_owner() {
            return true;
        }
        self.permissions
            .as_ref()
            .is_some_and(|permissions| permissions.allows(resource, action))
    }

    #[must_use]
    pub fn has(&self, permission: &Permission) -> bool {
        self.can(permission.resource, &permission.action)
    }
}
