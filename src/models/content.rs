use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;
use uuid::Uuid;

use super::{FitnessLevel, Goal, WorkoutType};

/// Identifier of a catalog entity
pub type ContentId = Uuid;

/// Difficulty grade of a nutrition plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NutritionDifficulty {
    Easy,
    Medium,
    Hard,
}

impl NutritionDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            NutritionDifficulty::Easy => "easy",
            NutritionDifficulty::Medium => "medium",
            NutritionDifficulty::Hard => "hard",
        }
    }
}

impl FromStr for NutritionDifficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(NutritionDifficulty::Easy),
            "medium" => Ok(NutritionDifficulty::Medium),
            "hard" => Ok(NutritionDifficulty::Hard),
            other => Err(format!("unknown nutrition difficulty '{}'", other)),
        }
    }
}

impl Display for NutritionDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A workout plan from the content catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutContent {
    pub id: ContentId,
    pub title: String,
    pub difficulty_level: FitnessLevel,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub target_goals: BTreeSet<Goal>,
}

impl WorkoutContent {
    /// Creates a workout with a fresh identifier
    pub fn new(
        title: impl Into<String>,
        difficulty_level: FitnessLevel,
        workout_type: WorkoutType,
        target_goals: impl IntoIterator<Item = Goal>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            difficulty_level,
            workout_type,
            target_goals: target_goals.into_iter().collect(),
        }
    }
}

/// A nutrition plan from the content catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionContent {
    pub id: ContentId,
    pub title: String,
    pub difficulty: NutritionDifficulty,
    pub target_goals: BTreeSet<Goal>,
    /// Ingredients and other tags a dietary restriction can match against
    #[serde(default)]
    pub restriction_tags: BTreeSet<String>,
}

impl NutritionContent {
    /// Creates a nutrition plan with a fresh identifier
    pub fn new(
        title: impl Into<String>,
        difficulty: NutritionDifficulty,
        target_goals: impl IntoIterator<Item = Goal>,
        restriction_tags: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            difficulty,
            target_goals: target_goals.into_iter().collect(),
            restriction_tags: restriction_tags.into_iter().collect(),
        }
    }

    /// True when any of the given restrictions appears among this plan's tags
    pub fn conflicts_with<'a>(&self, restrictions: impl IntoIterator<Item = &'a String>) -> bool {
        restrictions.into_iter().any(|restriction| {
            self.restriction_tags
                .iter()
                .any(|tag| tag.eq_ignore_ascii_case(restriction))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workout() {
        let workout = WorkoutContent::new(
            "Tempo Run",
            FitnessLevel::Intermediate,
            WorkoutType::Cardio,
            [Goal::Endurance, Goal::WeightLoss],
        );
        assert_eq!(workout.title, "Tempo Run");
        assert_eq!(workout.target_goals.len(), 2);
    }

    #[test]
    fn test_workout_serializes_type_field() {
        let workout = WorkoutContent::new(
            "Sun Salutation",
            FitnessLevel::Beginner,
            WorkoutType::Yoga,
            [Goal::Maintenance],
        );
        let json = serde_json::to_value(&workout).unwrap();
        assert_eq!(json["type"], "yoga");
        assert_eq!(json["difficultyLevel"], "beginner");
        assert_eq!(json["targetGoals"][0], "maintenance");
    }

    #[test]
    fn test_conflicts_with_is_case_insensitive() {
        let plan = NutritionContent::new(
            "Satay Bowl",
            NutritionDifficulty::Medium,
            [Goal::MuscleGain],
            ["Peanuts".to_string(), "rice".to_string()],
        );
        let restrictions = vec!["peanuts".to_string()];
        assert!(plan.conflicts_with(&restrictions));

        let restrictions = vec!["gluten".to_string()];
        assert!(!plan.conflicts_with(&restrictions));

        let none: Vec<String> = vec![];
        assert!(!plan.conflicts_with(&none));
    }

    #[test]
    fn test_nutrition_difficulty_from_str() {
        assert_eq!(
            "Hard".parse::<NutritionDifficulty>().unwrap(),
            NutritionDifficulty::Hard
        );
        assert!("extreme".parse::<NutritionDifficulty>().is_err());
    }
}
