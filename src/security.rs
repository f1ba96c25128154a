//! URL-pattern authorization policy.
//!
//! Access control is an ordered list of `(pattern, access)` rules evaluated
//! first-match-wins, so overlapping patterns must be listed most specific first.

use std::fmt;

/// Role
///
/// Granted through the `ROLE_*` entries of a user's authorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Parses a single authority such as `ROLE_ADMIN`. Unknown authorities yield `None`.
    pub fn from_authority(authority: &str) -> Option<Self> {
        match authority.trim() {
            "ROLE_USER" => Some(Role::User),
            "ROLE_ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("USER"),
            Role::Admin => f.write_str("ADMIN"),
        }
    }
}

/// Parses a comma-separated authority list, dropping unknown and duplicate entries.
pub fn parse_authorities(authorities: &str) -> Vec<Role> {
    let mut roles = Vec::new();
    for role in authorities.split(',').filter_map(Role::from_authority) {
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    roles
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    PermitAll,
    Authenticated,
    HasRole(Role),
}

/// PathPattern
///
/// Either an exact path or a `prefix/**` pattern. `/x/**` matches `/x` itself and
/// anything below it, but not `/xy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Prefix(String),
    Any,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern == "/**" {
            PathPattern::Any
        } else if let Some(prefix) = pattern.strip_suffix("/**") {
            PathPattern::Prefix(prefix.to_string())
        } else {
            PathPattern::Exact(pattern.to_string())
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Any => true,
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Prefix(prefix) => match path.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    pattern: PathPattern,
    access: Access,
}

/// Decision
///
/// Outcome of checking one request against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit,
    // No identity, or credentials failed: 401.
    Unauthenticated,
    // Identity present but lacking the required role: 403.
    Forbidden,
}

/// SecurityPolicy
///
/// The rule table. Paths that match no rule require an authenticated identity.
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    rules: Vec<Rule>,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        SecurityPolicy::new()
            .rule("/anime/admin/**", Access::HasRole(Role::Admin))
            .rule("/anime/**", Access::HasRole(Role::User))
            .rule("/actuator/**", Access::PermitAll)
            .rule("/**", Access::Authenticated)
    }
}

impl SecurityPolicy {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule; it is consulted after every rule added before it.
    pub fn rule(mut self, pattern: &str, access: Access) -> Self {
        self.rules.push(Rule {
            pattern: PathPattern::parse(pattern),
            access,
        });
        self
    }

    pub fn required_access(&self, path: &str) -> Access {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map(|rule| rule.access)
            .unwrap_or(Access::Authenticated)
    }

    /// `roles` is `None` for an anonymous caller.
    pub fn decide(&self, path: &str, roles: Option<&[Role]>) -> Decision {
        match (self.required_access(path), roles) {
            (Access::PermitAll, _) => Decision::Permit,
            (_, None) => Decision::Unauthenticated,
            (Access::Authenticated, Some(_)) => Decision::Permit,
            (Access::HasRole(role), Some(granted)) if granted.contains(&role) => Decision::Permit,
            (Access::HasRole(_), Some(_)) => Decision::Forbidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &[Role] = &[Role::User];
    const ADMIN: &[Role] = &[Role::User, Role::Admin];

    #[test]
    fn admin_rule_wins_over_user_rule() {
        let policy = SecurityPolicy::default();
        assert_eq!(
            policy.required_access("/anime/admin/3"),
            Access::HasRole(Role::Admin)
        );
        assert_eq!(policy.decide("/anime/admin/3", Some(USER)), Decision::Forbidden);
        assert_eq!(policy.decide("/anime/admin/3", Some(ADMIN)), Decision::Permit);
    }

    #[test]
    fn anime_paths_need_user_role() {
        let policy = SecurityPolicy::default();
        assert_eq!(policy.decide("/anime", Some(USER)), Decision::Permit);
        assert_eq!(policy.decide("/anime/find", Some(USER)), Decision::Permit);
        assert_eq!(policy.decide("/anime/1", Some(&[Role::Admin])), Decision::Forbidden);
        assert_eq!(policy.decide("/anime/1", None), Decision::Unauthenticated);
    }

    #[test]
    fn actuator_is_open_and_rest_needs_identity() {
        let policy = SecurityPolicy::default();
        assert_eq!(policy.decide("/actuator/health", None), Decision::Permit);
        assert_eq!(policy.decide("/swagger-ui", None), Decision::Unauthenticated);
        assert_eq!(policy.decide("/swagger-ui", Some(&[])), Decision::Permit);
    }

    #[test]
    fn prefix_pattern_respects_segment_boundaries() {
        let pattern = PathPattern::parse("/anime/**");
        assert!(pattern.matches("/anime"));
        assert!(pattern.matches("/anime/"));
        assert!(pattern.matches("/anime/admin/1"));
        assert!(!pattern.matches("/animedb"));
    }

    #[test]
    fn reversed_rules_make_admin_rule_unreachable() {
        let policy = SecurityPolicy::new()
            .rule("/anime/**", Access::HasRole(Role::User))
            .rule("/anime/admin/**", Access::HasRole(Role::Admin));
        assert_eq!(policy.decide("/anime/admin/1", Some(USER)), Decision::Permit);
    }

    #[test]
    fn authorities_are_parsed_leniently() {
        assert_eq!(parse_authorities("ROLE_USER,ROLE_ADMIN"), vec![Role::User, Role::Admin]);
        assert_eq!(parse_authorities(" ROLE_ADMIN , ROLE_ADMIN"), vec![Role::Admin]);
        assert!(parse_authorities("ROLE_GUEST").is_empty());
        assert!(parse_authorities("").is_empty());
    }
}
