//! Role model and the path allow-list table

use serde::{Deserialize, Serialize};

/// Login surface every denial is sent to
pub const LOGIN_PATH: &str = "/login";

/// Profile page every authenticated role may reach
pub const PROFILE_PATH: &str = "/profile";

/// Roles known to the application, by their numeric id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    Coordinator,
    Technician,
    EndUser,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Administrator,
        Role::Coordinator,
        Role::Technician,
        Role::EndUser,
    ];

    /// Map a `role_id` claim to a role
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Role::Administrator),
            2 => Some(Role::Coordinator),
            3 => Some(Role::Technician),
            4 => Some(Role::EndUser),
            _ => None,
        }
    }

    pub fn id(self) -> i64 {
        match self {
            Role::Administrator => 1,
            Role::Coordinator => 2,
            Role::Technician => 3,
            Role::EndUser => 4,
        }
    }
}

/// Allow-list for one role. Order matters: the first prefix is the role's
/// landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAccess {
    pub role_id: i64,
    pub prefixes: Vec<String>,
}

/// Which paths are protected and which roles may reach them
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    protected: Vec<String>,
    roles: Vec<RoleAccess>,
    login_path: String,
}

impl AccessPolicy {
    pub fn new(protected: Vec<String>, roles: Vec<RoleAccess>, login_path: impl Into<String>) -> Self {
        Self {
            protected,
            roles,
            login_path: login_path.into(),
        }
    }

    /// The SIGESTEI table, access narrowing from administrator to end user
    pub fn sigestei() -> Self {
        fn list(prefixes: &[&str]) -> Vec<String> {
            prefixes.iter().map(|p| p.to_string()).collect()
        }

        let protected = list(&[
            "/dashboard",
            "/viewInventory",
            "/addEquipment",
            "/viewRequests",
            "/createRequest",
            "/viewUsers",
            "/createUser",
            "/auditLog",
            PROFILE_PATH,
        ]);

        let roles = vec![
            RoleAccess {
                role_id: Role::Administrator.id(),
                prefixes: protected.clone(),
            },
            RoleAccess {
                role_id: Role::Coordinator.id(),
                prefixes: list(&[
                    "/dashboard",
                    "/viewInventory",
                    "/addEquipment",
                    "/viewRequests",
                    "/createRequest",
                    "/viewUsers",
                    PROFILE_PATH,
                ]),
            },
            RoleAccess {
                role_id: Role::Technician.id(),
                prefixes: list(&["/viewRequests", "/viewInventory", PROFILE_PATH]),
            },
            RoleAccess {
                role_id: Role::EndUser.id(),
                prefixes: list(&["/viewRequests", "/createRequest", PROFILE_PATH]),
            },
        ];

        Self::new(protected, roles, LOGIN_PATH)
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn protected_prefixes(&self) -> &[String] {
        &self.protected
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Allow-list of `role_id`; unknown roles get an empty list
    pub fn allowed_prefixes(&self, role_id: i64) -> &[String] {
        self.roles
            .iter()
            .find(|entry| entry.role_id == role_id)
            .map(|entry| entry.prefixes.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_allowed(&self, role_id: i64, path: &str) -> bool {
        self.allowed_prefixes(role_id)
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Where an authenticated but unauthorized role is sent. Falls back to
    /// the login path when the role has nothing to land on, which would
    /// otherwise loop.
    pub fn landing_path(&self, role_id: i64) -> &str {
        self.allowed_prefixes(role_id)
            .first()
            .map(String::as_str)
            .unwrap_or(self.login_path.as_str())
    }

    /// Protected prefixes that no role lists, i.e. silent lock-outs
    pub fn unreachable_prefixes(&self) -> Vec<&str> {
        self.protected
            .iter()
            .filter(|prefix| {
                !self
                    .roles
                    .iter()
                    .any(|entry| entry.prefixes.contains(*prefix))
            })
            .map(String::as_str)
            .collect()
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::sigestei()
    }
}
