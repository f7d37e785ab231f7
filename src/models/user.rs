use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{optional, required};
use crate::error::{AppError, AppResult};

/// Base URL of the generated-avatar service
pub const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/initials/svg";
const AVATAR_BACKGROUND: &str = "9370DB";

pub const MAX_USERNAME_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_BIO_LEN: usize = 500;

/// Deterministic avatar URL seeded by username
pub fn default_avatar(username: &str) -> String {
    reqwest::Url::parse_with_params(
        AVATAR_BASE_URL,
        &[("seed", username), ("backgroundColor", AVATAR_BACKGROUND)],
    )
    .map(String::from)
    .unwrap_or_else(|_| AVATAR_BASE_URL.to_string())
}

/// A registered account
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
}

/// Login material for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Public profile attached one-to-one to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub avatar: String,
    pub bio: String,
}

impl Profile {
    pub fn for_username(username: &str) -> Self {
        Self {
            avatar: default_avatar(username),
            bio: String::new(),
        }
    }
}

/// A user together with their profile
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub user: User,
    pub profile: Profile,
}

/// Validated input for creating an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
}

/// Partial profile change; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Sign-up fields after validation; the password is still plain text here
#[derive(Debug)]
pub struct SignUp {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl CreateUserRequest {
    pub fn validate(self) -> AppResult<SignUp> {
        let username = required("username", self.username, MAX_USERNAME_LEN)?;
        let email = required("email", self.email, MAX_EMAIL_LEN)?;
        if !email.contains('@') {
            return Err(AppError::InvalidInput(
                "email: Enter a valid email address".to_string(),
            ));
        }
        // Passwords are not trimmed.
        let password = match self.password {
            Some(p) if !p.is_empty() => p,
            _ => {
                return Err(AppError::InvalidInput(
                    "password: This field is required".to_string(),
                ))
            }
        };

        Ok(SignUp {
            username,
            email,
            password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

impl UpdateProfileRequest {
    /// Validates the request for `username`. An empty avatar resets to the generated default.
    pub fn validate(self, username: &str) -> AppResult<ProfileUpdate> {
        let avatar = match self.avatar.map(|a| a.trim().to_string()) {
            None => None,
            Some(a) if a.is_empty() => Some(default_avatar(username)),
            Some(a) => {
                let parsed = reqwest::Url::parse(&a).map_err(|_| {
                    AppError::InvalidInput("avatar: Enter a valid URL".to_string())
                })?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(AppError::InvalidInput(
                        "avatar: Enter a valid URL".to_string(),
                    ));
                }
                Some(a)
            }
        };
        let bio = optional("bio", self.bio, MAX_BIO_LEN)?;

        Ok(ProfileUpdate { avatar, bio })
    }
}

/// Account view returned by sign-up and profile endpoints
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub profile: Profile,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.user.id,
            username: account.user.username,
            email: account.user.email,
            profile: account.profile,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}
