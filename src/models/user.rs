//! User roles and account DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed role set; checked at the boundary of every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Reviewer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Reviewer => "REVIEWER",
            Self::Admin => "ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "STUDENT" => Some(Self::Student),
            "REVIEWER" => Some(Self::Reviewer),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Reviewers and admins may use the review endpoints.
    pub fn can_review(&self) -> bool {
        matches!(self, Self::Reviewer | Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller identity resolved from an access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Request to register a new account (admin-key gated).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub rut: Option<String>,
}

/// Response after registering an account. The access token is shown once.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    /// Personal access token; only the SHA-256 hash is stored.
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Student, Role::Reviewer, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("SUPERVISOR"), None);
    }

    #[test]
    fn test_can_review() {
        assert!(!Role::Student.can_review());
        assert!(Role::Reviewer.can_review());
        assert!(Role::Admin.can_review());
    }
}
