use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NutritionContent, WorkoutContent};

/// How a recommendation run picks and orders its candidates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStrategy {
    /// Progressive relaxation passes; output keeps pass order
    #[default]
    Tiered,
    /// Scores the whole catalog and keeps the best matches
    Scored,
}

impl RecommendationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationStrategy::Tiered => "tiered",
            RecommendationStrategy::Scored => "scored",
        }
    }
}

/// Hydrated recommendations returned to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub recommended_workouts: Vec<WorkoutContent>,
    pub recommended_nutrition: Vec<NutritionContent>,
    pub last_updated: DateTime<Utc>,
}

impl Recommendations {
    pub fn workout_ids(&self) -> Vec<uuid::Uuid> {
        self.recommended_workouts.iter().map(|w| w.id).collect()
    }

    pub fn nutrition_ids(&self) -> Vec<uuid::Uuid> {
        self.recommended_nutrition.iter().map(|n| n.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_serialization() {
        assert_eq!(
            serde_json::to_string(&RecommendationStrategy::Tiered).unwrap(),
            "\"tiered\""
        );
        let scored: RecommendationStrategy = serde_json::from_str("\"scored\"").unwrap();
        assert_eq!(scored, RecommendationStrategy::Scored);
        assert_eq!(RecommendationStrategy::default(), RecommendationStrategy::Tiered);
    }
}
