//! Scope-based authorization policy.
//!
//! A small ordered rule table: the first rule whose method matches exactly and whose
//! path prefix covers the request path decides. Requests no rule covers are denied.
//!
//! The table is built once at startup and only read afterwards, so it is shared
//! across requests behind an `Arc` without locking.

use std::fmt;

use axum::http::Method;

use crate::services::auth::claims::GrantedScopes;

pub const READ_SCOPE: &str = "message.read";
pub const WRITE_SCOPE: &str = "message.write";

pub const PROFILES_PATH: &str = "/api/customer-profiles";
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// What a matching rule demands of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// No token needed.
    Public,
    /// Any verified token, regardless of scope.
    Authenticated,
    /// A verified token granting this scope.
    Scope(String),
}

/// Scope demanded of PATCH/DELETE on profiles.
///
/// `Authenticated` keeps the behavior of the system this server replaces, where only
/// GET and POST carried scope requirements. `Write` extends `message.write` to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationScope {
    #[default]
    Authenticated,
    Write,
}

#[derive(Debug, Clone)]
pub struct AuthorizationRule {
    method: Method,
    path_prefix: String,
    requirement: Requirement,
}

impl AuthorizationRule {
    pub fn new(method: Method, path_prefix: &str, requirement: Requirement) -> Self {
        // "/api/x/" and "/api/x" describe the same resource root
        let trimmed = path_prefix.trim_end_matches('/');
        Self {
            method,
            path_prefix: if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() },
            requirement,
        }
    }

    pub fn scope(method: Method, path_prefix: &str, scope: &str) -> Self {
        Self::new(method, path_prefix, Requirement::Scope(scope.to_string()))
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method == *method && covers(&self.path_prefix, path)
    }
}

// Segment-aware prefix match: "/api/a" covers "/api/a", "/api/a/", "/api/a/1"
// but not "/api/ab".
fn covers(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    InsufficientScope { required: String },
    NoMatchingRule,
}

impl DenyReason {
    /// Scope the caller would need, when one exists.
    pub fn required_scope(&self) -> Option<&str> {
        match self {
            Self::InsufficientScope { required } => Some(required),
            Self::NoMatchingRule => None,
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientScope { required } => {
                write!(f, "insufficient_scope (requires {})", required)
            }
            Self::NoMatchingRule => write!(f, "no authorization rule matches the request"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    rules: Vec<AuthorizationRule>,
}

impl AuthorizationPolicy {
    pub fn new(rules: Vec<AuthorizationRule>) -> Self {
        Self { rules }
    }

    /// Rule table for `/api/customer-profiles`, plus the public API description.
    ///
    /// HEAD follows GET, since the router answers HEAD with the GET handlers.
    pub fn customer_profiles(mutation_scope: MutationScope) -> Self {
        let mutation = match mutation_scope {
            MutationScope::Authenticated => Requirement::Authenticated,
            MutationScope::Write => Requirement::Scope(WRITE_SCOPE.to_string()),
        };

        Self::new(vec![
            AuthorizationRule::new(Method::GET, OPENAPI_PATH, Requirement::Public),
            AuthorizationRule::new(Method::HEAD, OPENAPI_PATH, Requirement::Public),
            AuthorizationRule::scope(Method::GET, PROFILES_PATH, READ_SCOPE),
            AuthorizationRule::scope(Method::HEAD, PROFILES_PATH, READ_SCOPE),
            AuthorizationRule::scope(Method::POST, PROFILES_PATH, WRITE_SCOPE),
            AuthorizationRule::new(Method::PATCH, PROFILES_PATH, mutation.clone()),
            AuthorizationRule::new(Method::DELETE, PROFILES_PATH, mutation),
        ])
    }

    /// First matching rule's requirement, if any.
    pub fn requirement_for(&self, method: &Method, path: &str) -> Option<&Requirement> {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| &rule.requirement)
    }

    pub fn is_public(&self, method: &Method, path: &str) -> bool {
        matches!(
            self.requirement_for(method, path),
            Some(Requirement::Public)
        )
    }

    pub fn evaluate(&self, method: &Method, path: &str, granted: &GrantedScopes) -> Decision {
        match self.requirement_for(method, path) {
            None => Decision::Deny(DenyReason::NoMatchingRule),
            Some(Requirement::Public) | Some(Requirement::Authenticated) => Decision::Allow,
            Some(Requirement::Scope(required)) if granted.contains(required) => Decision::Allow,
            Some(Requirement::Scope(required)) => Decision::Deny(DenyReason::InsufficientScope {
                required: required.clone(),
            }),
        }
    }
}
