//! Content catalog abstraction
//!
//! The catalog is owned by another part of the system; the engine only reads from it.
//! Each query carries the selection criteria of one pass, the identifiers already picked
//! by earlier passes, and the remaining quota.

use std::collections::BTreeSet;

use crate::{
    error::AppResult,
    models::{
        ContentId, FitnessLevel, Goal, NutritionContent, NutritionDifficulty, Preferences,
        WorkoutContent, WorkoutType,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCatalog;
pub use postgres::PostgresCatalog;

/// The three workout conditions derived from a preference profile
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutMatch {
    pub difficulty: FitnessLevel,
    pub types: BTreeSet<WorkoutType>,
    pub goals: BTreeSet<Goal>,
}

impl WorkoutMatch {
    pub fn from_preferences(preferences: &Preferences) -> Self {
        Self {
            difficulty: preferences.fitness_level,
            types: preferences.workout_preferences.clone(),
            goals: preferences.goals.clone(),
        }
    }

    fn conditions(&self, workout: &WorkoutContent) -> [bool; 3] {
        [
            workout.difficulty_level == self.difficulty,
            self.types.contains(&workout.workout_type),
            !self.goals.is_disjoint(&workout.target_goals),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkoutCriteria {
    /// Every condition must hold
    AllOf(WorkoutMatch),
    /// At least one condition must hold
    AnyOf(WorkoutMatch),
    /// Only the difficulty level is checked
    Difficulty(FitnessLevel),
    /// The whole catalog
    Everything,
}

impl WorkoutCriteria {
    pub fn matches(&self, workout: &WorkoutContent) -> bool {
        match self {
            WorkoutCriteria::AllOf(wanted) => wanted.conditions(workout).iter().all(|c| *c),
            WorkoutCriteria::AnyOf(wanted) => wanted.conditions(workout).iter().any(|c| *c),
            WorkoutCriteria::Difficulty(level) => workout.difficulty_level == *level,
            WorkoutCriteria::Everything => true,
        }
    }
}

/// The two nutrition conditions
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionMatch {
    pub difficulty: NutritionDifficulty,
    pub goals: BTreeSet<Goal>,
}

impl NutritionMatch {
    fn conditions(&self, plan: &NutritionContent) -> [bool; 2] {
        [
            plan.difficulty == self.difficulty,
            !self.goals.is_disjoint(&plan.target_goals),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NutritionCriteria {
    AllOf(NutritionMatch),
    AnyOf(NutritionMatch),
    Everything,
}

impl NutritionCriteria {
    pub fn matches(&self, plan: &NutritionContent) -> bool {
        match self {
            NutritionCriteria::AllOf(wanted) => wanted.conditions(plan).iter().all(|c| *c),
            NutritionCriteria::AnyOf(wanted) => wanted.conditions(plan).iter().any(|c| *c),
            NutritionCriteria::Everything => true,
        }
    }
}

/// A filtered read of the workout catalog
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutQuery {
    pub criteria: WorkoutCriteria,
    pub exclude: Vec<ContentId>,
    pub limit: Option<usize>,
}

impl WorkoutQuery {
    pub fn new(criteria: WorkoutCriteria) -> Self {
        Self {
            criteria,
            exclude: Vec::new(),
            limit: None,
        }
    }

    pub fn everything() -> Self {
        Self::new(WorkoutCriteria::Everything)
    }

    pub fn excluding(mut self, ids: Vec<ContentId>) -> Self {
        self.exclude = ids;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn admits(&self, workout: &WorkoutContent) -> bool {
        !self.exclude.contains(&workout.id) && self.criteria.matches(workout)
    }
}

/// A filtered read of the nutrition catalog
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionQuery {
    pub criteria: NutritionCriteria,
    pub exclude: Vec<ContentId>,
    pub limit: Option<usize>,
}

impl NutritionQuery {
    pub fn new(criteria: NutritionCriteria) -> Self {
        Self {
            criteria,
            exclude: Vec::new(),
            limit: None,
        }
    }

    pub fn everything() -> Self {
        Self::new(NutritionCriteria::Everything)
    }

    pub fn excluding(mut self, ids: Vec<ContentId>) -> Self {
        self.exclude = ids;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn admits(&self, plan: &NutritionContent) -> bool {
        !self.exclude.contains(&plan.id) && self.criteria.matches(plan)
    }
}

/// Read access to workout and nutrition content
///
/// List operations return matches in catalog order, honoring `exclude` and `limit`.
/// Lookups by id return entities in the order the ids were given and skip ids that
/// no longer exist. Any collaborator failure is reported as `CatalogUnavailable`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContentCatalog: Send + Sync {
    async fn list_workouts(&self, query: &WorkoutQuery) -> AppResult<Vec<WorkoutContent>>;

    async fn list_nutrition(&self, query: &NutritionQuery) -> AppResult<Vec<NutritionContent>>;

    async fn workouts_by_ids(&self, ids: &[ContentId]) -> AppResult<Vec<WorkoutContent>>;

    async fn nutrition_by_ids(&self, ids: &[ContentId]) -> AppResult<Vec<NutritionContent>>;

    /// Catalog name for logging and debugging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wanted() -> WorkoutMatch {
        WorkoutMatch {
            difficulty: FitnessLevel::Intermediate,
            types: BTreeSet::from([WorkoutType::Cardio]),
            goals: BTreeSet::from([Goal::Endurance]),
        }
    }

    #[test]
    fn test_workout_all_of_requires_every_condition() {
        let exact = WorkoutContent::new(
            "Intervals",
            FitnessLevel::Intermediate,
            WorkoutType::Cardio,
            [Goal::Endurance],
        );
        let wrong_level = WorkoutContent::new(
            "Easy Jog",
            FitnessLevel::Beginner,
            WorkoutType::Cardio,
            [Goal::Endurance],
        );

        let criteria = WorkoutCriteria::AllOf(wanted());
        assert!(criteria.matches(&exact));
        assert!(!criteria.matches(&wrong_level));
    }

    #[test]
    fn test_workout_any_of_accepts_single_condition() {
        let goal_only = WorkoutContent::new(
            "Rowing",
            FitnessLevel::Advanced,
            WorkoutType::Strength,
            [Goal::Endurance],
        );
        let nothing = WorkoutContent::new(
            "Deadlifts",
            FitnessLevel::Advanced,
            WorkoutType::Strength,
            [Goal::MuscleGain],
        );

        let criteria = WorkoutCriteria::AnyOf(wanted());
        assert!(criteria.matches(&goal_only));
        assert!(!criteria.matches(&nothing));
    }

    #[test]
    fn test_query_excludes_ids() {
        let workout = WorkoutContent::new(
            "Stretch",
            FitnessLevel::Beginner,
            WorkoutType::Flexibility,
            [Goal::Maintenance],
        );
        let query = WorkoutQuery::new(WorkoutCriteria::Difficulty(FitnessLevel::Beginner));
        assert!(query.admits(&workout));

        let query = query.excluding(vec![workout.id]);
        assert!(!query.admits(&workout));
    }

    #[test]
    fn test_nutrition_criteria() {
        let plan = NutritionContent::new(
            "Oats",
            NutritionDifficulty::Easy,
            [Goal::WeightLoss],
            Vec::<String>::new(),
        );
        let wanted = NutritionMatch {
            difficulty: NutritionDifficulty::Medium,
            goals: BTreeSet::from([Goal::WeightLoss]),
        };

        assert!(!NutritionCriteria::AllOf(wanted.clone()).matches(&plan));
        assert!(NutritionCriteria::AnyOf(wanted).matches(&plan));
        assert!(NutritionCriteria::Everything.matches(&plan));
    }
}
