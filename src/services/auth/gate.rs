//! Request gate: authenticate, then authorize, before a handler runs.
//!
//! ```text
//! Unauthenticated --(token verified)--> Authenticated --(Allow)--> Authorized
//!        |                                    |
//!        +--(missing/invalid token)-----------+--(Deny)--> Rejected
//! ```
//!
//! The gate knows nothing about axum; the access middleware feeds it the method, path
//! and `Authorization` header and turns a rejection into a response.

use std::sync::Arc;

use axum::http::Method;
use thiserror::Error;

use crate::services::auth::{
    access_jwt::{AccessJwtError, TokenVerifier},
    claims::ClaimSet,
    policy::{AuthorizationPolicy, Decision, DenyReason},
};

#[derive(Debug, Error)]
pub enum AuthenticationFailure {
    #[error("missing bearer token")]
    MissingToken,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] AccessJwtError),
}

#[derive(Debug, Error)]
pub enum GateRejection {
    #[error("authentication_failed: {0}")]
    AuthenticationFailed(#[from] AuthenticationFailure),
    #[error("authorization_failed: {0}")]
    AuthorizationFailed(DenyReason),
}

/// Outcome of a successful pass through the gate.
#[derive(Debug, Clone)]
pub enum Admission {
    /// Route is public; no token was inspected.
    Public,
    Authorized(ClaimSet),
}

pub struct RequestGate {
    verifier: Arc<dyn TokenVerifier>,
    policy: Arc<AuthorizationPolicy>,
}

impl std::fmt::Debug for RequestGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGate")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RequestGate {
    pub fn new(verifier: Arc<dyn TokenVerifier>, policy: Arc<AuthorizationPolicy>) -> Self {
        Self { verifier, policy }
    }

    /// Decide whether a request may reach its handler.
    ///
    /// `authorization` is the raw `Authorization` header value, if any.
    pub fn admit(
        &self,
        method: &Method,
        path: &str,
        authorization: Option<&str>,
    ) -> Result<Admission, GateRejection> {
        if self.policy.is_public(method, path) {
            return Ok(Admission::Public);
        }

        // Unauthenticated -> Authenticated
        let token = bearer_token(authorization)?;
        let claims = self
            .verifier
            .verify(token)
            .map_err(AuthenticationFailure::from)?;

        // Authenticated -> Authorized
        match self.policy.evaluate(method, path, &claims.scopes) {
            Decision::Allow => Ok(Admission::Authorized(claims)),
            Decision::Deny(reason) => Err(GateRejection::AuthorizationFailed(reason)),
        }
    }
}

// RFC 6750: `Authorization: Bearer <token>`, scheme is case-insensitive.
fn bearer_token(header: Option<&str>) -> Result<&str, AuthenticationFailure> {
    let header = header.ok_or(AuthenticationFailure::MissingToken)?;
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthenticationFailure::MalformedHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthenticationFailure::MalformedHeader);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthenticationFailure::MalformedHeader);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::Method;

    use super::*;
    use crate::services::auth::policy::{
        AuthorizationRule, MutationScope, READ_SCOPE, Requirement, WRITE_SCOPE,
    };
    use crate::testing::StaticVerifier;

    fn gate(policy: AuthorizationPolicy) -> RequestGate {
        RequestGate::new(Arc::new(StaticVerifier::default()), Arc::new(policy))
    }

    fn profiles_gate() -> RequestGate {
        gate(AuthorizationPolicy::customer_profiles(
            MutationScope::Authenticated,
        ))
    }

    #[test]
    fn missing_header_is_an_authentication_failure() {
        let err = profiles_gate()
            .admit(&Method::GET, "/api/customer-profiles/1", None)
            .unwrap_err();

        assert!(matches!(
            err,
            GateRejection::AuthenticationFailed(AuthenticationFailure::MissingToken)
        ));
    }

    #[test]
    fn non_bearer_schemes_are_malformed() {
        for header in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer    ", "token"] {
            let err = profiles_gate()
                .admit(&Method::GET, "/api/customer-profiles/1", Some(header))
                .unwrap_err();
            assert!(
                matches!(
                    err,
                    GateRejection::AuthenticationFailed(AuthenticationFailure::MalformedHeader)
                ),
                "header {header:?}"
            );
        }
    }

    #[test]
    fn invalid_token_is_rejected_before_policy() {
        // POST to an unmatched path would be a policy deny; authentication fails first
        let err = profiles_gate()
            .admit(&Method::POST, "/api/unknown", Some("Bearer expired"))
            .unwrap_err();

        assert!(matches!(
            err,
            GateRejection::AuthenticationFailed(AuthenticationFailure::InvalidToken(_))
        ));
    }

    #[test]
    fn insufficient_scope_is_an_authorization_failure() {
        let err = profiles_gate()
            .admit(&Method::POST, "/api/customer-profiles", Some("Bearer read"))
            .unwrap_err();

        match err {
            GateRejection::AuthorizationFailed(reason) => {
                assert_eq!(reason.required_scope(), Some(WRITE_SCOPE))
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }

    #[test]
    fn granted_scope_admits_with_claims() {
        let admission = profiles_gate()
            .admit(&Method::GET, "/api/customer-profiles/", Some("bearer read"))
            .unwrap();

        match admission {
            Admission::Authorized(claims) => assert!(claims.scopes.contains(READ_SCOPE)),
            Admission::Public => panic!("profiles are not public"),
        }
    }

    #[test]
    fn public_routes_skip_authentication() {
        let gate = gate(AuthorizationPolicy::new(vec![AuthorizationRule::new(
            Method::GET,
            "/api/status",
            Requirement::Public,
        )]));

        assert!(matches!(
            gate.admit(&Method::GET, "/api/status", None),
            Ok(Admission::Public)
        ));
        assert!(gate.admit(&Method::GET, "/api/other", None).is_err());
    }
}
