//! User model, roles and JWT claims

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::store::{cell, cell_opt, Row};

/// Sheet columns for the users table.
pub const COLUMNS: &[&str] = &[
    "id",
    "username",
    "password_hash",
    "display_name",
    "role",
    "line_id",
    "assigned_activities",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Standard,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Standard => "standard",
        }
    }

    pub fn from_cell(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            _ => Role::Standard,
        }
    }
}

/// User account
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2 hash; never serialized out of the server.
    pub password_hash: Option<String>,
    pub display_name: String,
    pub role: Role,
    /// Federated identity reference, if the account came from LINE login.
    pub line_id: Option<String>,
    /// Activity ids this user is scoped to see in the dashboard.
    pub assigned_activities: Vec<String>,
}

impl User {
    pub fn from_row(row: &Row) -> Self {
        Self {
            id: cell(row, "id").to_string(),
            username: cell(row, "username").to_string(),
            password_hash: cell_opt(row, "password_hash"),
            display_name: cell(row, "display_name").to_string(),
            role: Role::from_cell(cell(row, "role")),
            line_id: cell_opt(row, "line_id"),
            assigned_activities: cell(row, "assigned_activities")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }

    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), self.id.clone());
        row.insert("username".into(), self.username.clone());
        row.insert(
            "password_hash".into(),
            self.password_hash.clone().unwrap_or_default(),
        );
        row.insert("display_name".into(), self.display_name.clone());
        row.insert("role".into(), self.role.as_str().into());
        row.insert("line_id".into(), self.line_id.clone().unwrap_or_default());
        row.insert(
            "assigned_activities".into(),
            self.assigned_activities.join(","),
        );
        row
    }
}

/// Public view of a user, safe to return to clients.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub role: Role,
    pub assigned_activities: Vec<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            assigned_activities: user.assigned_activities.clone(),
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub line_id: Option<String>,
    pub assigned_activities: Option<Vec<String>>,
}

/// Update user request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub line_id: Option<String>,
    pub assigned_activities: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_round_trip() {
        let user = User {
            id: "USR-1".into(),
            username: "somchai".into(),
            password_hash: Some("$argon2id$v=19$m=19456,t=2,p=1$abc$def".into()),
            display_name: "Somchai J.".into(),
            role: Role::Admin,
            line_id: None,
            assigned_activities: vec!["ACT-1".into(), "ACT-2".into()],
        };
        let restored = User::from_row(&user.to_row());
        assert_eq!(restored.username, "somchai");
        assert_eq!(restored.role, Role::Admin);
        assert_eq!(restored.assigned_activities, vec!["ACT-1", "ACT-2"]);
    }

    #[test]
    fn test_token_round_trip() {
        let claims = UserClaims {
            sub: "somchai".into(),
            user_id: "USR-1".into(),
            role: Role::Standard,
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: chrono::Utc::now().timestamp(),
        };
        let token = claims.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, "USR-1");
        assert!(parsed.require_admin().is_err());

        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }
}
