use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    error::{AppError, AppResult},
    models::CustomUser,
    repository::RepositoryState,
    security::{Role, parse_authorities},
};

/// Credentials
///
/// Username and password decoded from an `Authorization: Basic ...` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Parses the raw header value. Returns `None` for any other scheme or a payload
    /// that is not base64 of `username:password`.
    pub fn from_basic_header(value: &str) -> Option<Self> {
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn to_basic_header(&self) -> String {
        format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{}", self.username, self.password))
        )
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Inserted into the request
/// extensions by the security middleware so handlers can read the principal.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub roles: Vec<Role>,
}

impl From<CustomUser> for AuthUser {
    fn from(user: CustomUser) -> Self {
        AuthUser {
            id: user.id,
            roles: parse_authorities(&user.authorities),
            username: user.username,
        }
    }
}

/// Hash a plaintext password with Argon2id and a random salt, returning the PHC string.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::PasswordHash(e.to_string()))
}

/// Verify a plaintext password against a stored PHC string. The hash parameters are
/// read from the string itself.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| AppError::PasswordHash(e.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::PasswordHash(e.to_string())),
    }
}

/// authenticate
///
/// Looks up the user and checks the password. Unknown users, wrong passwords and
/// unreadable stored hashes all collapse into `Unauthorized`; only storage failures
/// escape as other errors.
pub async fn authenticate(repo: &RepositoryState, credentials: &Credentials) -> AppResult<AuthUser> {
    let user = repo
        .find_user_by_username(&credentials.username)
        .await?
        .ok_or_else(|| {
            tracing::debug!(username = %credentials.username, "unknown user");
            AppError::Unauthorized
        })?;

    match verify_password(&credentials.password, &user.password) {
        Ok(true) => Ok(AuthUser::from(user)),
        Ok(false) => {
            tracing::debug!(username = %credentials.username, "bad credentials");
            Err(AppError::Unauthorized)
        }
        Err(e) => {
            tracing::warn!(username = %credentials.username, error = %e, "stored password hash is unreadable");
            Err(AppError::Unauthorized)
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Reuses the identity already placed in the extensions by the security middleware;
/// on routes the middleware let through anonymously it authenticates the `Authorization`
/// header itself. Rejects with 401 when no valid credentials are present.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let credentials = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(Credentials::from_basic_header)
            .ok_or(AppError::Unauthorized)?;

        let repo = RepositoryState::from_ref(state);
        authenticate(&repo, &credentials).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_header_round_trips() {
        let credentials = Credentials {
            username: "joao".to_string(),
            password: "123:456".to_string(),
        };
        let header = credentials.to_basic_header();
        assert_eq!(Credentials::from_basic_header(&header), Some(credentials));
    }

    #[test]
    fn basic_header_rejects_other_schemes_and_garbage() {
        assert_eq!(Credentials::from_basic_header("Bearer abc.def"), None);
        assert_eq!(Credentials::from_basic_header("Basic !!!"), None);
        // "nocolon" in base64
        assert_eq!(Credentials::from_basic_header("Basic bm9jb2xvbg=="), None);
    }

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("123456789").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("123456789", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("x", "{bcrypt}$2a$10$abc").is_err());
    }

    #[test]
    fn auth_user_roles_come_from_authorities() {
        let user = AuthUser::from(CustomUser {
            id: 2,
            username: "diego".to_string(),
            password: String::new(),
            name: "Diego".to_string(),
            authorities: "ROLE_USER,ROLE_ADMIN".to_string(),
        });
        assert_eq!(user.roles, vec![Role::User, Role::Admin]);
    }
}
