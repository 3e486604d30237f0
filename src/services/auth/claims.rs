//! Claim set handed from token verification to the authorization layer.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Scopes granted to the caller for the duration of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantedScopes(BTreeSet<String>);

impl GrantedScopes {
    /// Parse an RFC 6749 style space-delimited scope string.
    pub fn from_delimited(raw: &str) -> Self {
        raw.split_whitespace().map(str::to_owned).collect()
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.contains(scope)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self)-> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for GrantedScopes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.trim().is_empty())
                .collect(),
        )
    }
}

impl fmt::Display for GrantedScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(" ");
        f.write_str(&joined)
    }
}

/// Raw `scope` / `scp` claim: authorization servers emit either form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScopeClaim {
    Delimited(String),
    List(Vec<String>),
}

impl ScopeClaim {
    pub fn into_scopes(self) -> GrantedScopes {
        match self {
            Self::Delimited(raw) => GrantedScopes::from_delimited(&raw),
            Self::List(list) => list.into_iter().collect(),
        }
    }
}

/// Verified claims the rest of the application works with.
#[derive(Debug, Clone)]
pub struct ClaimSet {
    pub subject: Option<String>,
    pub issuer: String,
    pub scopes: GrantedScopes,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimited_scope_collapses_whitespace() {
        let scopes = GrantedScopes::from_delimited("  message.read   message.write ");
        assert!(scopes.contains("message.read"));
        assert!(scopes.contains("message.write"));
        assert_eq!(scopes.iter().count(), 2);
    }

    #[test]
    fn empty_scope_string_grants_nothing() {
        assert_eq!(GrantedScopes::from_delimited("").iter().count(), 0);
        assert_eq!(GrantedScopes::from_delimited("   ").iter().count(), 0);
    }

    #[test]
    fn scope_matching_is_exact() {
        let scopes = GrantedScopes::from_delimited("message.readonly");
        assert!(!scopes.contains("message.read"));
    }

    #[test]
    fn scope_claim_accepts_string_and_array() {
        let delimited: ScopeClaim = serde_json::from_str(r#""openid message.read""#).unwrap();
        let list: ScopeClaim = serde_json::from_str(r#"["openid", "message.read", ""]"#).unwrap();

        assert_eq!(delimited.into_scopes(), list.into_scopes());
    }

    #[test]
    fn display_is_space_delimited() {
        let scopes: GrantedScopes = ["message.write", "message.read"].into_iter().collect();
        assert_eq!(scopes.to_string(), "message.read message.write");
    }
}
