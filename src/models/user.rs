//! Staff identity models

use serde::{Deserialize, Serialize};

/// Staff role as reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Operator,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Operator => "operator",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Human-readable label for lists.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Operator => "Operator",
            Role::SuperAdmin => "Super admin",
        }
    }
}

/// Staff presence status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Online,
    Offline,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Online => "online",
            Presence::Offline => "offline",
        }
    }

    /// The opposite status, used by the status toggle.
    pub fn toggled(self) -> Self {
        match self {
            Presence::Online => Presence::Offline,
            Presence::Offline => Presence::Online,
        }
    }
}

/// Authenticated staff member (operator or super admin)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub status: Presence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}

/// Payload for creating a new employee account
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewEmployee {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl std::fmt::Debug for NewEmployee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewEmployee")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_gateway_json() {
        let json = r#"{"id": 7, "username": "anna", "role": "super_admin", "status": "offline",
                       "created_at": "2024-05-01T10:00:00"}"#;
        let user: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.role, Role::SuperAdmin);
        assert_eq!(user.status, Presence::Offline);
        assert!(user.is_admin());
    }

    #[test]
    fn test_presence_toggle() {
        assert_eq!(Presence::Online.toggled(), Presence::Offline);
        assert_eq!(Presence::Offline.toggled(), Presence::Online);
        assert_eq!(Presence::Online.as_str(), "online");
    }

    #[test]
    fn test_new_employee_debug_hides_password() {
        let emp = NewEmployee {
            username: "bob".into(),
            password: "hunter2".into(),
            role: Role::Operator,
        };
        let dbg = format!("{:?}", emp);
        assert!(!dbg.contains("hunter2"));
        let json = serde_json::to_value(&emp).unwrap();
        assert_eq!(json["role"], "operator");
        assert_eq!(json["password"], "hunter2");
    }
}
