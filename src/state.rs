/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - profiles: ProfileService, gate: RequestGate (verifier + rule table)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::{auth::RequestGate, profiles::ProfileService};

#[derive(Clone, Debug)]
pub struct AppState {
    pub profiles: ProfileService,
    pub gate: Arc<RequestGate>,
}

impl AppState {
    pub fn new(profiles: ProfileService, gate: Arc<RequestGate>) -> Self {
        Self { profiles, gate }
    }
}
