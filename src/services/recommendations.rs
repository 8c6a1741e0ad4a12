use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::{
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        NutritionContent, PreferenceSubmission, Preferences, RecommendationStrategy,
        Recommendations, UserId, WorkoutContent,
    },
};

use super::{
    catalog::{ContentCatalog, NutritionQuery, WorkoutQuery},
    locks::UserLocks,
    profiles::ProfileStore,
    ranking::{rank_by_score, rank_in_order, RankedResult, Scored},
    scorer::{score_nutrition, score_workout},
    selector::CandidateSelector,
};

/// Tunables of a recommendation run
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// Pool size per content type for [`RecommendationStrategy::Tiered`]
    pub tiered_limit: usize,
    /// Result size per content type for [`RecommendationStrategy::Scored`]
    pub scored_limit: usize,
    /// Budget for selection and scoring
    pub pipeline_timeout: Duration,
    /// TTL of cached recommendations, in seconds
    pub cache_ttl: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tiered_limit: 3,
            scored_limit: 5,
            pipeline_timeout: Duration::from_millis(5000),
            cache_ttl: 3600,
        }
    }
}

/// Turns preference submissions into persisted recommendations
///
/// A submission is validated, matched against the catalog, ranked, and stored as one
/// profile write. Runs for the same user are serialized; a run that fails at any point
/// before the write leaves the stored profile untouched.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<dyn ContentCatalog>,
    profiles: Arc<dyn ProfileStore>,
    cache: Option<Cache>,
    locks: UserLocks,
    settings: EngineSettings,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<dyn ContentCatalog>,
        profiles: Arc<dyn ProfileStore>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            catalog,
            profiles,
            cache: None,
            locks: UserLocks::new(),
            settings,
        }
    }

    /// Enables the read-through cache of hydrated recommendations
    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Validates `submission`, recomputes the user's recommendations and persists them
    ///
    /// Both recommendation arrays are replaced together. On any error nothing is written.
    /// With a cache, the user's entry is replaced before the call returns, so a following
    /// read sees the new result.
    pub async fn submit_preferences(
        &self,
        user_id: &UserId,
        submission: PreferenceSubmission,
        strategy: RecommendationStrategy,
    ) -> AppResult<Recommendations> {
        let preferences = submission.validate()?;

        let _guard = self.locks.acquire(user_id).await;
        let started_at = Utc::now();

        let (workouts, nutrition) = tokio::time::timeout(
            self.settings.pipeline_timeout,
            self.compute(&preferences, strategy),
        )
        .await
        .map_err(|_| {
            tracing::warn!(
                user_id = %user_id,
                strategy = strategy.as_str(),
                "Recommendation run timed out"
            );
            AppError::Timeout(self.settings.pipeline_timeout.as_millis())
        })??;

        let result = RankedResult {
            workouts,
            nutrition,
            started_at,
        };
        let key = CacheKey::Recommendations(user_id.clone());

        // The old entry goes before the profile changes; if it cannot be removed,
        // nothing is written.
        if let Some(cache) = &self.cache {
            cache.invalidate(&key).await?;
        }

        self.profiles
            .save(&result.to_profile(user_id, &preferences))
            .await?;

        let recommendations = result.into_recommendations();
        if let Some(cache) = &self.cache {
            if let Err(e) = cache
                .set(&key, &recommendations, self.settings.cache_ttl)
                .await
            {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to cache new recommendations");
            }
        }

        tracing::info!(
            user_id = %user_id,
            strategy = strategy.as_str(),
            workouts = recommendations.recommended_workouts.len(),
            nutrition = recommendations.recommended_nutrition.len(),
            "Recommendations updated"
        );

        Ok(recommendations)
    }

    /// Returns the stored recommendations, hydrated from the catalog
    ///
    /// Fails with `ProfileNotFound` until the user has submitted preferences once. Cache
    /// failures fall back to the profile store.
    pub async fn get_recommendations(&self, user_id: &UserId) -> AppResult<Recommendations> {
        let Some(cache) = &self.cache else {
            return self.load_recommendations(user_id).await;
        };

        let key = CacheKey::Recommendations(user_id.clone());
        match cache.get_from_cache::<Recommendations>(&key).await {
            Ok(Some(cached)) => {
                tracing::debug!(user_id = %user_id, "Recommendations served from cache");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Cache read failed, loading from store");
            }
        }

        // Filling under the user lock keeps a slow fill from clobbering a newer submission.
        let _guard = self.locks.acquire(user_id).await;
        crate::cached!(
            cache,
            key,
            self.settings.cache_ttl,
            self.load_recommendations(user_id)
        )
    }

    async fn compute(
        &self,
        preferences: &Preferences,
        strategy: RecommendationStrategy,
    ) -> AppResult<(Vec<WorkoutContent>, Vec<NutritionContent>)> {
        match strategy {
            RecommendationStrategy::Tiered => {
                let limit = self.settings.tiered_limit;
                let selector = CandidateSelector::new(self.catalog.as_ref(), limit);
                let (workouts, nutrition) = tokio::try_join!(
                    selector.select_workouts(preferences),
                    selector.select_nutrition(preferences)
                )?;
                Ok((
                    rank_in_order(workouts, limit),
                    rank_in_order(nutrition, limit),
                ))
            }
            RecommendationStrategy::Scored => {
                let limit = self.settings.scored_limit;
                let workout_query = WorkoutQuery::everything();
                let nutrition_query = NutritionQuery::everything();
                let (workouts, nutrition) = tokio::try_join!(
                    self.catalog.list_workouts(&workout_query),
                    self.catalog.list_nutrition(&nutrition_query)
                )?;

                let workouts = workouts
                    .into_iter()
                    .map(|w| Scored::new(score_workout(&w, preferences), w))
                    .collect();
                let nutrition = nutrition
                    .into_iter()
                    .map(|n| Scored::new(score_nutrition(&n, preferences), n))
                    .collect();

                Ok((
                    rank_by_score(workouts, limit),
                    rank_by_score(nutrition, limit),
                ))
            }
        }
    }

    async fn load_recommendations(&self, user_id: &UserId) -> AppResult<Recommendations> {
        let profile = self
            .profiles
            .find(user_id)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(user_id.clone()))?;

        let (workouts, nutrition) = tokio::try_join!(
            self.catalog.workouts_by_ids(&profile.recommended_workout_ids),
            self.catalog.nutrition_by_ids(&profile.recommended_nutrition_ids)
        )?;

        let missing = profile.recommended_workout_ids.len().saturating_sub(workouts.len())
            + profile
                .recommended_nutrition_ids
                .len()
                .saturating_sub(nutrition.len());
        if missing > 0 {
            tracing::warn!(
                user_id = %user_id,
                catalog = self.catalog.name(),
                missing,
                "Recommended content no longer in catalog"
            );
        }

        Ok(Recommendations {
            recommended_workouts: workouts,
            recommended_nutrition: nutrition,
            last_updated: profile.last_updated,
        })
    }
}
