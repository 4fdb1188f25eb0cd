//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User, UserClaims, UserProfile},
    store::{next_id, RowStore},
};

#[derive(Clone)]
pub struct UsersService {
    store: RowStore,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(store: RowStore, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Authenticate by username and return a JWT token plus the profile.
    pub fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, UserProfile)> {
        let user = self
            .store
            .users
            .find_by_username(username)?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id.clone(),
            role: user.role,
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, UserProfile::from(&user)))
    }

    /// Public profile lookup, used by the client to validate a stored
    /// identity on startup.
    pub fn check(&self, user_id: &str) -> AppResult<UserProfile> {
        Ok(UserProfile::from(&self.store.users.get(user_id)?))
    }

    pub fn get(&self, user_id: &str) -> AppResult<User> {
        self.store.users.get(user_id)
    }

    pub fn list(&self) -> AppResult<Vec<UserProfile>> {
        Ok(self
            .store
            .users
            .list()?
            .iter()
            .map(UserProfile::from)
            .collect())
    }

    pub fn create(&self, req: CreateUser) -> AppResult<UserProfile> {
        req.validate()?;

        if self.store.users.find_by_username(&req.username)?.is_some() {
            return Err(AppError::Conflict(format!(
                "Username {} already exists",
                req.username
            )));
        }

        let password_hash = match req.password.as_deref() {
            Some(password) => Some(self.hash_password(password)?),
            None => None,
        };

        let user = User {
            id: next_id("USR"),
            display_name: req.display_name.unwrap_or_else(|| req.username.clone()),
            username: req.username,
            password_hash,
            role: req.role.unwrap_or(Role::Standard),
            line_id: req.line_id,
            assigned_activities: req.assigned_activities.unwrap_or_default(),
        };
        self.store.users.insert(&user)?;
        Ok(UserProfile::from(&user))
    }

    pub fn update(&self, id: &str, req: UpdateUser) -> AppResult<UserProfile> {
        req.validate()?;

        let mut user = self.store.users.get(id)?;
        if let Some(username) = req.username {
            if username != user.username
                && self.store.users.find_by_username(&username)?.is_some()
            {
                return Err(AppError::Conflict(format!(
                    "Username {} already exists",
                    username
                )));
            }
            user.username = username;
        }
        if let Some(password) = req.password.as_deref() {
            user.password_hash = Some(self.hash_password(password)?);
        }
        if let Some(display_name) = req.display_name {
            user.display_name = display_name;
        }
        if let Some(role) = req.role {
            user.role = role;
        }
        if let Some(line_id) = req.line_id {
            user.line_id = Some(line_id);
        }
        if let Some(assigned) = req.assigned_activities {
            user.assigned_activities = assigned;
        }

        self.store.users.update(&user)?;
        Ok(UserProfile::from(&user))
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.store.users.get(id)?;
        self.store.users.delete(id)
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        if let Some(ref hash) = user.password_hash {
            let parsed_hash = PasswordHash::new(hash)
                .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
            return Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok());
        }
        Ok(false)
    }

    /// Hash a password using Argon2
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> UsersService {
        UsersService::new(RowStore::in_memory(), AuthConfig::default())
    }

    fn create_req(username: &str) -> CreateUser {
        CreateUser {
            username: username.into(),
            password: Some("s3cret".into()),
            display_name: None,
            role: None,
            line_id: None,
            assigned_activities: None,
        }
    }

    #[test]
    fn test_authenticate_round_trip() {
        let service = service();
        let profile = service.create(create_req("somchai")).unwrap();

        let (token, logged_in) = service.authenticate("somchai", "s3cret").unwrap();
        assert_eq!(logged_in.id, profile.id);
        assert!(!token.is_empty());

        assert!(service.authenticate("somchai", "wrong").is_err());
        assert!(service.authenticate("nobody", "s3cret").is_err());
    }

    #[test]
    fn test_duplicate_username_conflicts() {
        let service = service();
        service.create(create_req("somchai")).unwrap();
        assert!(matches!(
            service.create(create_req("somchai")).unwrap_err(),
            AppError::Conflict(_)
        ));
    }

    #[test]
    fn test_password_never_leaves_as_plaintext() {
        let service = service();
        let profile = service.create(create_req("somchai")).unwrap();
        let stored = service.get(&profile.id).unwrap();
        let hash = stored.password_hash.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("s3cret"));
    }
}
