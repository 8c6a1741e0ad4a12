use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{PreferenceProfile, UserId},
};

use super::ProfileStore;

/// Profile store kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<UserId, PreferenceProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find(&self, user_id: &UserId) -> AppResult<Option<PreferenceProfile>> {
        Ok(self.profiles.read().await.get(user_id).cloned())
    }

    async fn save(&self, profile: &PreferenceProfile) -> AppResult<()> {
        self.profiles
            .write()
            .await
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FitnessLevel, Preferences};
    use chrono::Utc;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    fn profile(user: &str, workout_ids: Vec<Uuid>) -> PreferenceProfile {
        PreferenceProfile {
            user_id: UserId::from(user),
            preferences: Preferences {
                fitness_level: FitnessLevel::Advanced,
                workout_preferences: BTreeSet::new(),
                dietary_restrictions: BTreeSet::new(),
                goals: BTreeSet::new(),
            },
            recommended_workout_ids: workout_ids,
            recommended_nutrition_ids: vec![],
            last_updated: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_find_missing_profile() {
        let store = InMemoryProfileStore::new();
        let found = store.find(&UserId::from("nobody")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_whole_profile() {
        let store = InMemoryProfileStore::new();
        let first = profile("u-1", vec![Uuid::new_v4(), Uuid::new_v4()]);
        let second = profile("u-1", vec![Uuid::new_v4()]);

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        let found = store.find(&UserId::from("u-1")).await.unwrap().unwrap();
        assert_eq!(found, second);
    }
}
