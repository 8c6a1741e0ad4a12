use chrono::{DateTime, Utc};

use crate::models::{
    NutritionContent, PreferenceProfile, Preferences, Recommendations, UserId, WorkoutContent,
};

/// A candidate paired with its match score
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub score: u32,
    pub item: T,
}

impl<T> Scored<T> {
    pub fn new(score: u32, item: T) -> Self {
        Self { score, item }
    }
}

/// Keeps candidates in the order they arrived and cuts the list at `limit`
pub fn rank_in_order<T>(mut candidates: Vec<T>, limit: usize) -> Vec<T> {
    candidates.truncate(limit);
    candidates
}

/// Orders candidates by descending score and cuts the list at `limit`
///
/// The sort is stable, so equal scores keep their catalog order.
pub fn rank_by_score<T>(mut candidates: Vec<Scored<T>>, limit: usize) -> Vec<T> {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates
        .into_iter()
        .take(limit)
        .map(|scored| scored.item)
        .collect()
}

/// The outcome of one recommendation run, ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub workouts: Vec<WorkoutContent>,
    pub nutrition: Vec<NutritionContent>,
    pub started_at: DateTime<Utc>,
}

impl RankedResult {
    /// Profile that replaces whatever is stored for the user
    pub fn to_profile(&self, user_id: &UserId, preferences: &Preferences) -> PreferenceProfile {
        PreferenceProfile {
            user_id: user_id.clone(),
            preferences: preferences.clone(),
            recommended_workout_ids: self.workouts.iter().map(|w| w.id).collect(),
            recommended_nutrition_ids: self.nutrition.iter().map(|n| n.id).collect(),
            last_updated: self.started_at,
        }
    }

    pub fn into_recommendations(self) -> Recommendations {
        Recommendations {
            recommended_workouts: self.workouts,
            recommended_nutrition: self.nutrition,
            last_updated: self.started_at,
        }
    }
}
