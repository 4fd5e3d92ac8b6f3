use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::dto::{StoredProfile, UpdateProfileRequest};

/// Lookup-by-id access to user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<StoredProfile>>;
    async fn upsert(
        &self,
        user_id: Uuid,
        profile: &UpdateProfileRequest,
    ) -> anyhow::Result<StoredProfile>;
}

#[derive(Clone)]
pub struct PgProfileStore {
    db: PgPool,
}

impl PgProfileStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<StoredProfile>> {
        let row = sqlx::query_as::<_, StoredProfile>(
            r#"
            SELECT user_id, age, gender, weight_kg, height_cm,
                   dietary_preference, activity_level, goal, updated_at
              FROM user_profiles
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("select user profile")?;
        Ok(row)
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        profile: &UpdateProfileRequest,
    ) -> anyhow::Result<StoredProfile> {
        let row = sqlx::query_as::<_, StoredProfile>(
            r#"
            INSERT INTO user_profiles
                (user_id, age, gender, weight_kg, height_cm,
                 dietary_preference, activity_level, goal, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
            ON CONFLICT (user_id) DO UPDATE SET
                age = EXCLUDED.age,
                gender = EXCLUDED.gender,
                weight_kg = EXCLUDED.weight_kg,
                height_cm = EXCLUDED.height_cm,
                dietary_preference = EXCLUDED.dietary_preference,
                activity_level = EXCLUDED.activity_level,
                goal = EXCLUDED.goal,
                updated_at = now()
            RETURNING user_id, age, gender, weight_kg, height_cm,
                      dietary_preference, activity_level, goal, updated_at
            "#,
        )
        .bind(user_id)
        .bind(profile.age)
        .bind(&profile.gender)
        .bind(profile.weight_kg)
        .bind(profile.height_cm)
        .bind(&profile.dietary_preference)
        .bind(&profile.activity_level)
        .bind(&profile.goal)
        .fetch_one(&self.db)
        .await
        .context("upsert user profile")?;
        Ok(row)
    }
}

#[cfg(test)]
pub use memory::MemoryProfileStore;
