#![allow(dead_code)]

use anime_service::{
    AppConfig, AppState, InMemoryRepository, RepositoryState,
    models::NewCustomUser,
    repository::Repository,
};
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, Version};
use std::sync::Arc;

pub const PASSWORD: &str = "123456789";
// ROLE_USER only.
pub const USER: &str = "joao";
// ROLE_USER and ROLE_ADMIN.
pub const ADMIN: &str = "diego";
// ROLE_ADMIN without ROLE_USER.
pub const ADMIN_ONLY: &str = "boss";

/// Argon2id with the smallest legal cost, so the suites do not spend seconds per request
/// verifying passwords. Verification reads the parameters back out of the PHC string.
pub fn cheap_hash(password: &str) -> String {
    let params = Params::new(8, 1, 1, None).expect("valid argon2 params");
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .expect("hashing should succeed")
        .to_string()
}

pub async fn seeded_repo() -> Arc<InMemoryRepository> {
    let repo = Arc::new(InMemoryRepository::new());
    for (username, name, authorities) in [
        (USER, "Joao", "ROLE_USER"),
        (ADMIN, "Diego", "ROLE_USER,ROLE_ADMIN"),
        (ADMIN_ONLY, "Boss", "ROLE_ADMIN"),
    ] {
        repo.create_user(NewCustomUser {
            username: username.to_string(),
            password_hash: cheap_hash(PASSWORD),
            name: name.to_string(),
            authorities: authorities.to_string(),
        })
        .await
        .expect("seeding users");
    }
    repo
}

pub async fn seeded_state() -> (AppState, Arc<InMemoryRepository>) {
    let repo = seeded_repo().await;
    let state = AppState::new(repo.clone() as RepositoryState, AppConfig::default());
    (state, repo)
}
