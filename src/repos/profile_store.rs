//! Persistence interface for customer profiles.
use async_trait::async_trait;

use crate::repos::error::StoreError;
use crate::services::profiles::model::{NewProfile, Profile, ProfileChanges};

pub type StoreResult<T> = Result<T, StoreError>;

/// A passive collection of profiles.
///
/// Implementations own consistency:
/// - `insert` must never hand out the same id twice, even under concurrent calls.
/// - `update_partial` must merge against a consistent prior state.
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    // Returns the store backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Persist a new profile and return the id assigned to it.
    async fn insert(&self, profile: &NewProfile) -> StoreResult<String>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Profile>>;

    // All profiles, in store-defined order.
    async fn find_all(&self) -> StoreResult<Vec<Profile>>;

    // Returns `None` when `id` is unknown.
    async fn update_partial(&self, id: &str, changes: &ProfileChanges)
    -> StoreResult<Option<Profile>>;

    // Removing an unknown id is not an error.
    async fn remove(&self, id: &str) -> StoreResult<()>;
}
