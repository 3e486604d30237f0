//! Test doubles shared by unit and router tests.
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;

use crate::repos::profile_store::{ProfileStore, StoreResult};
use crate::services::auth::access_jwt::{AccessJwtError, TokenVerifier};
use crate::services::auth::claims::{ClaimSet, GrantedScopes};
use crate::services::profiles::{NewProfile, Profile, ProfileChanges};

/// Maps fixed bearer strings to claim sets:
/// `read`, `write`, `read-write`, `no-scope`; `expired` and anything else fail.
#[derive(Debug, Default)]
pub struct StaticVerifier;

impl TokenVerifier for StaticVerifier {
    fn verify(&self, token: &str) -> Result<ClaimSet, AccessJwtError> {
        let scopes = match token {
            "read" => "message.read",
            "write" => "message.write",
            "read-write" => "message.read message.write",
            "no-scope" => "",
            "expired" => return Err(AccessJwtError::Jwt(ErrorKind::ExpiredSignature.into())),
            _ => return Err(AccessJwtError::Jwt(ErrorKind::InvalidToken.into())),
        };

        Ok(ClaimSet {
            subject: Some("test-client".to_string()),
            issuer: "http://auth-server:9000".to_string(),
            scopes: GrantedScopes::from_delimited(scopes),
            expires_at: Utc::now() + Duration::hours(1),
        })
    }
}

/// Vec-backed store that records every call it receives.
///
/// Ids come from `next_ids` first, then a counter.
#[derive(Debug, Default)]
pub struct RecordingStore {
    profiles: Mutex<Vec<Profile>>,
    next_ids: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn with_ids<I: IntoIterator<Item = &'static str>>(ids: I) -> Self {
        let store = Self::default();
        store
            .next_ids
            .lock()
            .unwrap()
            .extend(ids.into_iter().map(str::to_owned));
        store
    }

    pub fn seeded(profiles: Vec<Profile>) -> Self {
        let store = Self::default();
        *store.profiles.lock().unwrap() = profiles;
        store
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn profile(id: &str, first_name: &str) -> Profile {
    Profile {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: "Doe".to_string(),
        email: format!("{}.doe@test.org", first_name.to_lowercase()),
    }
}

#[async_trait]
impl ProfileStore for RecordingStore {
    fn backend_name(&self) -> &'static str {
        "recording"
    }

    async fn insert(&self, profile: &NewProfile) -> StoreResult<String> {
        self.record("insert".to_string());
        let mut profiles = self.profiles.lock().unwrap();
        let id = self
            .next_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| format!("generated-{}", profiles.len() + 1));
        profiles.push(profile.clone().into_profile(id.clone()));
        Ok(id)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Profile>> {
        self.record(format!("find_by_id:{id}"));
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Profile>> {
        self.record("find_all".to_string());
        Ok(self.profiles.lock().unwrap().clone())
    }

    async fn update_partial(
        &self,
        id: &str,
        changes: &ProfileChanges,
    ) -> StoreResult<Option<Profile>> {
        self.record(format!("update_partial:{id}"));
        let mut profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter_mut().find(|p| p.id == id).map(|p| {
            changes.apply_to(p);
            p.clone()
        }))
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        self.record(format!("remove:{id}"));
        self.profiles.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }
}
