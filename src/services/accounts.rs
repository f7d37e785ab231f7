use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::Repository,
    error::{AppError, AppResult},
    models::{Account, NewUser, Profile, SignUp, TokenResponse, User},
};

const INVALID_CREDENTIALS: &str = "No active account found with the given credentials";

/// Verified against when the username is unknown, so both rejections cost one
/// Argon2 run. Parameters match `Argon2::default()`.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hashes a password into an Argon2id PHC string on the blocking pool
pub async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
}

/// Checks a password against a stored PHC string
pub async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&password_hash)
            .map_err(|e| AppError::Internal(format!("Stored password hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
}

/// Creates an account with a generated default profile
pub async fn sign_up(repository: &dyn Repository, sign_up: SignUp) -> AppResult<Account> {
    let password_hash = hash_password(sign_up.password).await?;
    let profile = Profile::for_username(&sign_up.username);

    let account = repository
        .create_user(NewUser {
            username: sign_up.username,
            email: sign_up.email,
            password_hash,
            profile,
        })
        .await?;

    tracing::info!(user_id = account.user.id, username = %account.user.username, "Account created");

    Ok(account)
}

/// Exchanges username and password for a bearer session
pub async fn login(
    repository: &dyn Repository,
    username: &str,
    password: String,
    session_ttl: chrono::Duration,
) -> AppResult<TokenResponse> {
    let (user_id, password_hash) = match repository.find_credentials(username).await? {
        Some(credentials) => (Some(credentials.id), credentials.password_hash),
        None => (None, DUMMY_PASSWORD_HASH.to_string()),
    };

    let verified = verify_password(password, password_hash).await?;
    let Some(user_id) = user_id.filter(|_| verified) else {
        tracing::info!(username = %username, "Rejected login");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let token = Uuid::new_v4();
    let expires_at = Utc::now() + session_ttl;
    repository.create_session(token, user_id, expires_at).await?;

    tracing::info!(user_id, "Session issued");

    Ok(TokenResponse {
        access: token.to_string(),
        token_type: "Bearer".to_string(),
        expires_at,
    })
}

/// Resolves a bearer token to its user
pub async fn authenticate(repository: &dyn Repository, token: &str) -> AppResult<(User, Uuid)> {
    let token = Uuid::parse_str(token.trim())
        .map_err(|_| AppError::Unauthorized("Given token not valid".to_string()))?;

    let user = repository
        .find_session_user(token, Utc::now())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Given token not valid".to_string()))?;

    Ok((user, token))
}

pub async fn logout(repository: &dyn Repository, token: Uuid) -> AppResult<()> {
    repository.delete_session(token).await
}
