/**
 * Responsibility
 * - store が上位に伝える意味の定義
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("migration error")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("store lock poisoned")]
    Poisoned,
}
