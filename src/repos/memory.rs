//! In-process profile store, used when no `DATABASE_URL` is configured.
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::repos::error::StoreError;
use crate::repos::profile_store::{ProfileStore, StoreResult};
use crate::services::profiles::model::{NewProfile, Profile, ProfileChanges};

/// Profiles kept in insertion order behind a single lock.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<Vec<Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, profile: &NewProfile) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let mut profiles = self.profiles.write().map_err(|_| StoreError::Poisoned)?;
        profiles.push(profile.clone().into_profile(id.clone()));
        Ok(id)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Profile>> {
        let profiles = self.profiles.read().map_err(|_| StoreError::Poisoned)?;
        Ok(profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Profile>> {
        let profiles = self.profiles.read().map_err(|_| StoreError::Poisoned)?;
        Ok(profiles.clone())
    }

    async fn update_partial(
        &self,
        id: &str,
        changes: &ProfileChanges,
    ) -> StoreResult<Option<Profile>> {
        // read-merge-write under one write guard
        let mut profiles = self.profiles.write().map_err(|_| StoreError::Poisoned)?;
        Ok(profiles.iter_mut().find(|p| p.id == id).map(|profile| {
            changes.apply_to(profile);
            profile.clone()
        }))
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        let mut profiles = self.profiles.write().map_err(|_| StoreError::Poisoned)?;
        profiles.retain(|p| p.id != id);
        Ok(())
    }
}
