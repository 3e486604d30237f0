/*
 * Responsibility
 * - customer_profiles テーブル向け SQLx 操作
 * - PgPool を受け取り ProfileStore を実装
 * - DB エラーは StoreError に変換して返す
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::StoreError;
use crate::repos::profile_store::{ProfileStore, StoreResult};
use crate::services::profiles::model::{NewProfile, Profile, ProfileChanges};

#[derive(Debug, FromRow)]
struct ProfileRow {
    #[sqlx(rename = "profileId")]
    id: String,
    #[sqlx(rename = "firstName")]
    first_name: String,
    #[sqlx(rename = "lastName")]
    last_name: String,
    email: String,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, profile: &NewProfile) -> StoreResult<String> {
        // uuid v4: concurrent inserts cannot collide in practice, and the PK enforces it
        let id = sqlx::query_scalar::<_, String>(
            r#"
            INSERT INTO customer_profiles ("profileId", "firstName", "lastName", email)
            VALUES ($1, $2, $3, $4)
            RETURNING "profileId"
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(profile.first_name())
        .bind(profile.last_name())
        .bind(profile.email())
        .fetch_one(&self.db)
        .await?;

        Ok(id)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT "profileId", "firstName", "lastName", email
            FROM customer_profiles
            WHERE "profileId" = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn find_all(&self) -> StoreResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT "profileId", "firstName", "lastName", email
            FROM customer_profiles
            ORDER BY "createdAt", "profileId"
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Profile::from).collect())
    }

    async fn update_partial(
        &self,
        id: &str,
        changes: &ProfileChanges,
    ) -> StoreResult<Option<Profile>> {
        // Single statement: the merge sees the row as of the UPDATE's snapshot.
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE customer_profiles
            SET
                "firstName" = COALESCE($2, "firstName"),
                "lastName" = COALESCE($3, "lastName"),
                "updatedAt" = now()
            WHERE "profileId" = $1
            RETURNING "profileId", "firstName", "lastName", email
            "#,
        )
        .bind(id)
        .bind(changes.first_name())
        .bind(changes.last_name())
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn remove(&self, id: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            DELETE FROM customer_profiles
            WHERE "profileId" = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
