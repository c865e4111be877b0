use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Global role of a user.
///
/// Variants are declared from least to most privileged, so the derived
/// ordering doubles as the capability order used by [`Role::satisfies`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super-admin",
        }
    }

    /// True when this role grants at least the capabilities of `required`.
    /// A super-admin satisfies every check.
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super-admin" => Ok(Role::SuperAdmin),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_satisfies_every_role() {
        for required in [Role::User, Role::Admin, Role::SuperAdmin] {
            assert!(Role::SuperAdmin.satisfies(required));
        }
        assert!(Role::Admin.satisfies(Role::User));
        assert!(!Role::Admin.satisfies(Role::SuperAdmin));
        assert!(!Role::User.satisfies(Role::Admin));
    }

    #[test]
    fn role_wire_names() {
        assert_eq!("super-admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("manager".parse::<Role>().is_err());
        assert_eq!(serde_json::to_value(Role::SuperAdmin).unwrap(), "super-admin");
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: "usr_1".to_string(),
            email: "a@acme.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: Role::User,
            created_at: 1,
            updated_at: 1,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["createdAt"], 1);
    }
}
