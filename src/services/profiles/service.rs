//! Customer profile operations, independent of HTTP.
//!
//! "Not found" is a normal outcome here (`Ok(None)`); only store failures are errors.
use std::sync::Arc;

use crate::repos::ProfileStore;
use crate::repos::error::StoreError;
use crate::services::profiles::model::{NewProfile, Profile, ProfileChanges};

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl std::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileService")
            .field("store", &self.store.backend_name())
            .finish()
    }
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn create(&self, profile: NewProfile) -> Result<Profile, StoreError> {
        let id = self.store.insert(&profile).await?;
        tracing::info!(profile_id = %id, "customer profile created");
        Ok(profile.into_profile(id))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Profile>, StoreError> {
        if id.trim().is_empty() {
            return Ok(None);
        }
        self.store.find_by_id(id).await
    }

    /// Every profile, in the order the store yields them.
    pub async fn get_all(&self) -> Result<impl Iterator<Item = Profile>, StoreError> {
        Ok(self.store.find_all().await?.into_iter())
    }

    pub async fn change(
        &self,
        id: &str,
        changes: ProfileChanges,
    ) -> Result<Option<Profile>, StoreError> {
        if id.trim().is_empty() {
            return Ok(None);
        }
        if changes.is_empty() {
            // nothing to merge
            return self.store.find_by_id(id).await;
        }

        let updated = self.store.update_partial(id, &changes).await?;
        if updated.is_some() {
            tracing::info!(profile_id = %id, "customer profile changed");
        }
        Ok(updated)
    }

    /// Idempotent: succeeds whether or not `id` existed.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        if id.trim().is_empty() {
            return Ok(());
        }
        self.store.remove(id).await?;
        tracing::info!(profile_id = %id, "customer profile deleted");
        Ok(())
    }
}
