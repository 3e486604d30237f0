/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可、Auth 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use thiserror::Error;

use crate::services::auth::policy::MutationScope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub request_body_limit_bytes: usize,
    pub request_timeout: Duration,

    // None => in-memory store
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    pub auth_issuer: String,
    pub auth_audience: Option<String>,
    pub access_token_leeway_seconds: u64,
    pub access_jwt_public_key_pem: String,
    pub access_jwt_algorithm: Algorithm,

    pub mutation_scope: MutationScope,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup (env vars in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match non_empty("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_body_limit_bytes = non_empty("REQUEST_BODY_LIMIT_BYTES")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1024 * 1024);

        let request_timeout = non_empty("REQUEST_TIMEOUT_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let database_url = non_empty("DATABASE_URL");

        let database_max_connections = non_empty("DATABASE_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let auth_issuer = non_empty("AUTH_ISSUER").ok_or(ConfigError::Missing("AUTH_ISSUER"))?;

        let auth_audience = non_empty("AUTH_AUDIENCE");

        let access_token_leeway_seconds = non_empty("ACCESS_TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let access_jwt_public_key_pem = non_empty("ACCESS_JWT_PUBLIC_KEY_PEM")
            .ok_or(ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM"))?
            .replace("\\n", "\n");

        let access_jwt_algorithm = match non_empty("ACCESS_JWT_ALGORITHM") {
            Some(raw) => parse_algorithm(&raw)?,
            None => Algorithm::EdDSA,
        };

        let mutation_scope = match non_empty("AUTHZ_MUTATION_SCOPE")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("authenticated") => MutationScope::Authenticated,
            Some("write") => MutationScope::Write,
            Some(_) => return Err(ConfigError::Invalid("AUTHZ_MUTATION_SCOPE")),
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            request_body_limit_bytes,
            request_timeout,
            database_url,
            database_max_connections,
            auth_issuer,
            auth_audience,
            access_token_leeway_seconds,
            access_jwt_public_key_pem,
            access_jwt_algorithm,
            mutation_scope,
        })
    }
}

// Asymmetric algorithms only; the verifying side holds public keys.
fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    match raw.trim() {
        "EdDSA" => Ok(Algorithm::EdDSA),
        "RS256" => Ok(Algorithm::RS256),
        "ES256" => Ok(Algorithm::ES256),
        _ => Err(ConfigError::Invalid("ACCESS_JWT_ALGORITHM")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("AUTH_ISSUER", "http://localhost:9000"),
        ("ACCESS_JWT_PUBLIC_KEY_PEM", "-----BEGIN PUBLIC KEY-----\\nabc\\n-----END PUBLIC KEY-----"),
    ];

    #[test]
    fn defaults_apply_when_only_required_keys_are_set() {
        let config = Config::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.request_body_limit_bytes, 1024 * 1024);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 5);
        assert!(config.auth_audience.is_none());
        assert_eq!(config.access_token_leeway_seconds, 60);
        assert_eq!(config.access_jwt_algorithm, Algorithm::EdDSA);
        assert_eq!(config.mutation_scope, MutationScope::Authenticated);
        assert!(config.access_jwt_public_key_pem.contains('\n'));
    }

    #[test]
    fn missing_issuer_fails_startup() {
        let err = Config::from_lookup(lookup(&[REQUIRED[1]])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("AUTH_ISSUER"));
    }

    #[test]
    fn missing_public_key_fails_startup() {
        let err = Config::from_lookup(lookup(&[REQUIRED[0]])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("ACCESS_JWT_PUBLIC_KEY_PEM"));
    }

    #[test]
    fn reads_optional_settings() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("PORT", "8081"),
            ("APP_ENV", "prod"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("DATABASE_URL", "postgres://localhost/profiles"),
            ("AUTH_AUDIENCE", "customer-profiles"),
            ("ACCESS_JWT_ALGORITHM", "RS256"),
            ("AUTHZ_MUTATION_SCOPE", "WRITE"),
        ]);
        let config = Config::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.addr.port(), 8081);
        assert!(config.app_env.is_production());
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/profiles")
        );
        assert_eq!(config.auth_audience.as_deref(), Some("customer-profiles"));
        assert_eq!(config.access_jwt_algorithm, Algorithm::RS256);
        assert_eq!(config.mutation_scope, MutationScope::Write);
    }

    #[test]
    fn rejects_symmetric_algorithms_and_unknown_mutation_scope() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ACCESS_JWT_ALGORITHM", "HS256"));
        assert_eq!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Invalid("ACCESS_JWT_ALGORITHM")
        );

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("AUTHZ_MUTATION_SCOPE", "admin"));
        assert_eq!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Invalid("AUTHZ_MUTATION_SCOPE")
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "http"));
        assert_eq!(
            Config::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Invalid("PORT")
        );
    }
}
