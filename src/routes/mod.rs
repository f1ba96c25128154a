//! Router Module Index
//!
//! Routes are grouped by the access rule that guards them. The grouping is
//! documentation only: enforcement happens in the security middleware, which
//! evaluates `SecurityPolicy` against the full request path before any of these
//! routers is reached.

/// Open endpoints (`/actuator/**`).
pub mod public;

/// Anime endpoints that require the USER role (`/anime/**`).
pub mod authenticated;

/// Anime endpoints that require the ADMIN role (`/anime/admin/**`).
pub mod admin;
