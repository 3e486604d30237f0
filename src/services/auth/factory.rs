/// Factory: build the `RequestGate` (verifier + rule table) from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::access_jwt::{AccessJwtError, JwtVerifier};
use crate::services::auth::gate::RequestGate;
use crate::services::auth::policy::AuthorizationPolicy;

pub fn build_request_gate(config: &Config) -> Result<Arc<RequestGate>, AccessJwtError> {
    let verifier = JwtVerifier::from_public_key_pem(
        &config.access_jwt_public_key_pem,
        config.access_jwt_algorithm,
        &config.auth_issuer,
        config.auth_audience.as_deref(),
        config.access_token_leeway_seconds,
    )?;

    let policy = AuthorizationPolicy::customer_profiles(config.mutation_scope);
    tracing::info!(
        mutation_scope = ?config.mutation_scope,
        "authorization rule table loaded"
    );

    Ok(Arc::new(RequestGate::new(
        Arc::new(verifier),
        Arc::new(policy),
    )))
}
