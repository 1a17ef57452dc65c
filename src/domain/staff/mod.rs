//! Staff module - accounts that can log in.

use serde::Serialize;

use crate::domain::foundation::{AuthenticatedUser, Role, Timestamp, UserId, ValidationError};

/// A login-capable account. The password is only ever held hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffAccount {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub active: bool,
    pub created_at: Timestamp,
}

impl StaffAccount {
    pub fn new(
        email: &str,
        name: &str,
        role: Role,
        password_hash: String,
    ) -> Result<Self, ValidationError> {
        let email = normalize_email(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        Ok(Self {
            id: UserId::new(uuid::Uuid::new_v4().to_string())?,
            email,
            name: name.to_string(),
            role,
            password_hash,
            active: true,
            created_at: Timestamp::now(),
        })
    }

    pub fn identity(&self) -> AuthenticatedUser {
        AuthenticatedUser::new(self.id.clone(), self.name.clone(), self.role)
    }
}

/// Lowercased, trimmed, and shaped like `local@domain`.
pub fn normalize_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::empty_field("email"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(ValidationError::invalid_format("email", "expected name@domain")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalized() {
        assert_eq!(normalize_email("  Ana@Bistro.COM ").unwrap(), "ana@bistro.com");
        assert!(normalize_email("ana").is_err());
        assert!(normalize_email("@bistro.com").is_err());
        assert!(normalize_email("").is_err());
    }

    #[test]
    fn identity_carries_role_and_name() {
        let account =
            StaffAccount::new("chef@bistro.com", " Chef ", Role::Kitchen, "hash".into()).unwrap();
        let user = account.identity();
        assert_eq!(user.role, Role::Kitchen);
        assert_eq!(user.name, "Chef");
        assert!(account.active);
    }

    #[test]
    fn password_hash_never_serializes() {
        let account =
            StaffAccount::new("a@b.co", "Ana", Role::Waiter, "secret-hash".into()).unwrap();
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
