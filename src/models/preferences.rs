use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

use super::NutritionDifficulty;

/// Self-declared training level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FitnessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessLevel::Beginner => "beginner",
            FitnessLevel::Intermediate => "intermediate",
            FitnessLevel::Advanced => "advanced",
        }
    }

    /// Nutrition plans are graded on their own scale; this is the one-way mapping onto it
    pub fn nutrition_difficulty(&self) -> NutritionDifficulty {
        match self {
            FitnessLevel::Beginner => NutritionDifficulty::Easy,
            FitnessLevel::Intermediate => NutritionDifficulty::Medium,
            FitnessLevel::Advanced => NutritionDifficulty::Hard,
        }
    }
}

impl FromStr for FitnessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(FitnessLevel::Beginner),
            "intermediate" => Ok(FitnessLevel::Intermediate),
            "advanced" => Ok(FitnessLevel::Advanced),
            other => Err(format!("unknown fitness level '{}'", other)),
        }
    }
}

impl Display for FitnessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workout type tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Cardio,
    Strength,
    Flexibility,
    Hiit,
    Yoga,
}

impl WorkoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Cardio => "cardio",
            WorkoutType::Strength => "strength",
            WorkoutType::Flexibility => "flexibility",
            WorkoutType::Hiit => "hiit",
            WorkoutType::Yoga => "yoga",
        }
    }
}

impl FromStr for WorkoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cardio" => Ok(WorkoutType::Cardio),
            "strength" => Ok(WorkoutType::Strength),
            "flexibility" => Ok(WorkoutType::Flexibility),
            "hiit" => Ok(WorkoutType::Hiit),
            "yoga" => Ok(WorkoutType::Yoga),
            other => Err(format!("unknown workout type '{}'", other)),
        }
    }
}

impl Display for WorkoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Training or nutrition goal tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    WeightLoss,
    MuscleGain,
    Maintenance,
    Endurance,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::WeightLoss => "weight_loss",
            Goal::MuscleGain => "muscle_gain",
            Goal::Maintenance => "maintenance",
            Goal::Endurance => "endurance",
        }
    }
}

impl FromStr for Goal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weight_loss" => Ok(Goal::WeightLoss),
            "muscle_gain" => Ok(Goal::MuscleGain),
            "maintenance" => Ok(Goal::Maintenance),
            "endurance" => Ok(Goal::Endurance),
            other => Err(format!("unknown goal '{}'", other)),
        }
    }
}

impl Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Preference payload as submitted by the client, before validation
///
/// Every field is optional at this level so that a missing field surfaces as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSubmission {
    #[serde(default)]
    pub fitness_level: Option<String>,
    #[serde(default)]
    pub workout_preferences: Option<Vec<String>>,
    #[serde(default)]
    pub dietary_restrictions: Option<Vec<String>>,
    #[serde(default)]
    pub goals: Option<Vec<String>>,
}

impl PreferenceSubmission {
    /// Validates the payload into typed preferences
    ///
    /// `fitnessLevel`, `workoutPreferences` and `goals` are required; `dietaryRestrictions`
    /// defaults to empty. Unknown tags are rejected. Duplicate tags collapse.
    pub fn validate(self) -> AppResult<Preferences> {
        let fitness_level = self
            .fitness_level
            .ok_or_else(|| missing("fitnessLevel"))?
            .parse::<FitnessLevel>()
            .map_err(AppError::Validation)?;

        let workout_preferences = parse_tags::<WorkoutType>(
            self.workout_preferences
                .ok_or_else(|| missing("workoutPreferences"))?,
        )?;

        let goals = parse_tags::<Goal>(self.goals.ok_or_else(|| missing("goals"))?)?;

        let mut dietary_restrictions = BTreeSet::new();
        for restriction in self.dietary_restrictions.unwrap_or_default() {
            let normalized = restriction.trim().to_lowercase();
            if normalized.is_empty() {
                return Err(AppError::Validation(
                    "dietaryRestrictions must not contain blank entries".to_string(),
                ));
            }
            dietary_restrictions.insert(normalized);
        }

        Ok(Preferences {
            fitness_level,
            workout_preferences,
            dietary_restrictions,
            goals,
        })
    }
}

fn missing(field: &str) -> AppError {
    AppError::Validation(format!("missing required field '{}'", field))
}

fn parse_tags<T>(raw: Vec<String>) -> AppResult<BTreeSet<T>>
where
    T: FromStr<Err = String> + Ord,
{
    raw.iter()
        .map(|tag| tag.parse::<T>().map_err(AppError::Validation))
        .collect()
}

/// Validated preferences of a single user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub fitness_level: FitnessLevel,
    pub workout_preferences: BTreeSet<WorkoutType>,
    pub dietary_restrictions: BTreeSet<String>,
    pub goals: BTreeSet<Goal>,
}

impl Preferences {
    /// True when at least one of `target_goals` is among the user's goals
    pub fn shares_goal(&self, target_goals: &BTreeSet<Goal>) -> bool {
        !self.goals.is_disjoint(target_goals)
    }

    pub fn prefers(&self, workout_type: WorkoutType) -> bool {
        self.workout_preferences.contains(&workout_type)
    }
}
