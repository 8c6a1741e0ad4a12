use crate::{
    error::AppResult,
    models::{FitnessLevel, NutritionContent, NutritionDifficulty, Preferences, WorkoutContent},
    services::catalog::{
        ContentCatalog, NutritionCriteria, NutritionMatch, NutritionQuery, WorkoutCriteria,
        WorkoutMatch, WorkoutQuery,
    },
};

/// One step of the progressive relaxation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPass {
    /// Every preference condition matches
    Exact,
    /// At least one preference condition matches
    Relaxed,
    /// Beginner content, regardless of preferences
    Fallback,
}

impl SelectionPass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPass::Exact => "exact",
            SelectionPass::Relaxed => "relaxed",
            SelectionPass::Fallback => "fallback",
        }
    }
}

/// Picks up to `limit` candidates per content type by widening the filter pass by pass
///
/// A pass only reaches the catalog while the pool is still short. Later passes exclude
/// everything already picked and append to the pool, so earlier picks keep their place.
pub struct CandidateSelector<'a> {
    catalog: &'a dyn ContentCatalog,
    limit: usize,
}

impl<'a> CandidateSelector<'a> {
    pub fn new(catalog: &'a dyn ContentCatalog, limit: usize) -> Self {
        Self { catalog, limit }
    }

    fn workout_passes(preferences: &Preferences) -> [(SelectionPass, WorkoutCriteria); 3] {
        let wanted = WorkoutMatch::from_preferences(preferences);
        [
            (SelectionPass::Exact, WorkoutCriteria::AllOf(wanted.clone())),
            (SelectionPass::Relaxed, WorkoutCriteria::AnyOf(wanted)),
            (
                SelectionPass::Fallback,
                WorkoutCriteria::Difficulty(FitnessLevel::Beginner),
            ),
        ]
    }

    // Nutrition has no fallback pass; the relaxed pass loosens difficulty to medium.
    fn nutrition_passes(preferences: &Preferences) -> [(SelectionPass, NutritionCriteria); 2] {
        [
            (
                SelectionPass::Exact,
                NutritionCriteria::AllOf(NutritionMatch {
                    difficulty: preferences.fitness_level.nutrition_difficulty(),
                    goals: preferences.goals.clone(),
                }),
            ),
            (
                SelectionPass::Relaxed,
                NutritionCriteria::AnyOf(NutritionMatch {
                    difficulty: NutritionDifficulty::Medium,
                    goals: preferences.goals.clone(),
                }),
            ),
        ]
    }

    pub async fn select_workouts(&self, preferences: &Preferences) -> AppResult<Vec<WorkoutContent>> {
        let mut selected: Vec<WorkoutContent> = Vec::with_capacity(self.limit);

        for (pass, criteria) in Self::workout_passes(preferences) {
            let remaining = self.limit.saturating_sub(selected.len());
            if remaining == 0 {
                break;
            }

            let query = WorkoutQuery::new(criteria)
                .excluding(selected.iter().map(|w| w.id).collect())
                .limit(remaining);
            let found = self.catalog.list_workouts(&query).await?;

            let before = selected.len();
            for workout in found {
                if selected.len() == self.limit {
                    break;
                }
                // The catalog is external; do not trust it to honor exclude.
                if !selected.iter().any(|w| w.id == workout.id) {
                    selected.push(workout);
                }
            }

            tracing::debug!(
                pass = pass.as_str(),
                added = selected.len() - before,
                total = selected.len(),
                "Workout selection pass"
            );
        }

        Ok(selected)
    }

    pub async fn select_nutrition(
        &self,
        preferences: &Preferences,
    ) -> AppResult<Vec<NutritionContent>> {
        let mut selected: Vec<NutritionContent> = Vec::with_capacity(self.limit);

        for (pass, criteria) in Self::nutrition_passes(preferences) {
            let remaining = self.limit.saturating_sub(selected.len());
            if remaining == 0 {
                break;
            }

            let query = NutritionQuery::new(criteria)
                .excluding(selected.iter().map(|n| n.id).collect())
                .limit(remaining);
            let found = self.catalog.list_nutrition(&query).await?;

            let before = selected.len();
            for plan in found {
                if selected.len() == self.limit {
                    break;
                }
                if !selected.iter().any(|n| n.id == plan.id) {
                    selected.push(plan);
                }
            }

            tracing::debug!(
                pass = pass.as_str(),
                added = selected.len() - before,
                total = selected.len(),
                "Nutrition selection pass"
            );
        }

        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{Goal, WorkoutType};
    use crate::services::catalog::{InMemoryCatalog, MockContentCatalog};
    use std::collections::BTreeSet;

    fn preferences(level: FitnessLevel, types: &[WorkoutType], goals: &[Goal]) -> Preferences {
        Preferences {
            fitness_level: level,
            workout_preferences: types.iter().copied().collect(),
            dietary_restrictions: BTreeSet::new(),
            goals: goals.iter().copied().collect(),
        }
    }

    fn beginner_strength(title: &str) -> WorkoutContent {
        WorkoutContent::new(
            title,
            FitnessLevel::Beginner,
            WorkoutType::Strength,
            [Goal::WeightLoss],
        )
    }

    #[tokio::test]
    async fn test_exact_match_first_then_beginner_fallback() {
        let mut workouts: Vec<WorkoutContent> =
            (1..=5).map(|i| beginner_strength(&format!("Starter {}", i))).collect();
        let exact = WorkoutContent::new(
            "Tempo Run",
            FitnessLevel::Intermediate,
            WorkoutType::Cardio,
            [Goal::Endurance],
        );
        workouts.push(exact.clone());

        let catalog = InMemoryCatalog::new(workouts, vec![]);
        let selector = CandidateSelector::new(&catalog, 3);
        let prefs = preferences(
            FitnessLevel::Intermediate,
            &[WorkoutType::Cardio],
            &[Goal::Endurance],
        );

        let picked = selector.select_workouts(&prefs).await.unwrap();

        assert_eq!(picked.len(), 3);
        assert_eq!(picked[0].id, exact.id);
        // None of the starters share a condition with these preferences,
        // so the remaining slots come from the beginner fallback.
        assert!(picked[1..]
            .iter()
            .all(|w| w.difficulty_level == FitnessLevel::Beginner));
        assert_eq!(catalog.workout_reads(), 3);
    }

    #[tokio::test]
    async fn test_relaxed_pass_fills_from_partial_matches() {
        let mut workouts: Vec<WorkoutContent> =
            (1..=5).map(|i| beginner_strength(&format!("Starter {}", i))).collect();
        let exact = WorkoutContent::new(
            "Tempo Run",
            FitnessLevel::Intermediate,
            WorkoutType::Cardio,
            [Goal::Endurance],
        );
        workouts.push(exact.clone());

        let catalog = InMemoryCatalog::new(workouts.clone(), vec![]);
        let selector = CandidateSelector::new(&catalog, 3);
        let prefs = preferences(
            FitnessLevel::Intermediate,
            &[WorkoutType::Cardio, WorkoutType::Strength],
            &[Goal::Endurance],
        );

        let picked = selector.select_workouts(&prefs).await.unwrap();

        assert_eq!(picked.len(), 3);
        assert_eq!(picked[0].id, exact.id);
        assert_eq!(picked[1].id, workouts[0].id);
        assert_eq!(picked[2].id, workouts[1].id);
        // Fallback never ran
        assert_eq!(catalog.workout_reads(), 2);
    }

    #[tokio::test]
    async fn test_exact_pass_alone_stops_widening() {
        let mut catalog = MockContentCatalog::new();
        catalog
            .expect_list_workouts()
            .withf(|query| matches!(query.criteria, WorkoutCriteria::AllOf(_)))
            .times(1)
            .returning(|query| {
                Ok((0..query.limit.unwrap_or(0))
                    .map(|i| {
                        WorkoutContent::new(
                            format!("Exact {}", i),
                            FitnessLevel::Advanced,
                            WorkoutType::Hiit,
                            [Goal::MuscleGain],
                        )
                    })
                    .collect())
            });

        let selector = CandidateSelector::new(&catalog, 3);
        let prefs = preferences(FitnessLevel::Advanced, &[WorkoutType::Hiit], &[Goal::MuscleGain]);

        let picked = selector.select_workouts(&prefs).await.unwrap();
        assert_eq!(picked.len(), 3);
    }

    #[tokio::test]
    async fn test_later_pass_excludes_earlier_picks() {
        let first = beginner_strength("Only One");
        let returned = first.clone();

        let mut catalog = MockContentCatalog::new();
        let mut seq = mockall::Sequence::new();
        catalog
            .expect_list_workouts()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(vec![returned.clone()]));
        let expected_id = first.id;
        catalog
            .expect_list_workouts()
            .times(2)
            .in_sequence(&mut seq)
            .withf(move |query| query.exclude == vec![expected_id] && query.limit == Some(2))
            .returning(|_| Ok(vec![]));

        let selector = CandidateSelector::new(&catalog, 3);
        let prefs = preferences(FitnessLevel::Beginner, &[WorkoutType::Strength], &[Goal::WeightLoss]);

        let picked = selector.select_workouts(&prefs).await.unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id, first.id);
    }

    #[tokio::test]
    async fn test_duplicates_from_catalog_are_dropped() {
        let repeated = beginner_strength("Echo");
        let returned = repeated.clone();

        let mut catalog = MockContentCatalog::new();
        catalog
            .expect_list_workouts()
            .returning(move |_| Ok(vec![returned.clone(), returned.clone()]));

        let selector = CandidateSelector::new(&catalog, 3);
        let prefs = preferences(FitnessLevel::Beginner, &[], &[]);

        let picked = selector.select_workouts(&prefs).await.unwrap();
        assert_eq!(picked.len(), 1);
    }

    #[tokio::test]
    async fn test_underfilled_catalog_is_not_an_error() {
        let catalog = InMemoryCatalog::new(vec![beginner_strength("Lonely")], vec![]);
        let selector = CandidateSelector::new(&catalog, 3);
        let prefs = preferences(FitnessLevel::Advanced, &[WorkoutType::Yoga], &[Goal::Endurance]);

        let picked = selector.select_workouts(&prefs).await.unwrap();
        assert_eq!(picked.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_failure_propagates() {
        let mut catalog = MockContentCatalog::new();
        catalog
            .expect_list_nutrition()
            .returning(|_| Err(AppError::CatalogUnavailable("down".to_string())));

        let selector = CandidateSelector::new(&catalog, 3);
        let prefs = preferences(FitnessLevel::Beginner, &[], &[Goal::WeightLoss]);

        let result = selector.select_nutrition(&prefs).await;
        assert!(matches!(result, Err(AppError::CatalogUnavailable(_))));
    }

    #[tokio::test]
    async fn test_nutrition_two_passes() {
        let exact = NutritionContent::new(
            "Protein Oats",
            NutritionDifficulty::Hard,
            [Goal::MuscleGain],
            Vec::<String>::new(),
        );
        let medium_off_goal = NutritionContent::new(
            "Veggie Stir Fry",
            NutritionDifficulty::Medium,
            [Goal::Maintenance],
            Vec::<String>::new(),
        );
        let easy_on_goal = NutritionContent::new(
            "Chicken Wrap",
            NutritionDifficulty::Easy,
            [Goal::MuscleGain],
            Vec::<String>::new(),
        );
        let easy_off_goal = NutritionContent::new(
            "Fruit Cup",
            NutritionDifficulty::Easy,
            [Goal::WeightLoss],
            Vec::<String>::new(),
        );

        let catalog = InMemoryCatalog::new(
            vec![],
            vec![
                easy_off_goal.clone(),
                medium_off_goal.clone(),
                easy_on_goal.clone(),
                exact.clone(),
            ],
        );
        let selector = CandidateSelector::new(&catalog, 4);
        let prefs = preferences(FitnessLevel::Advanced, &[], &[Goal::MuscleGain]);

        let picked = selector.select_nutrition(&prefs).await.unwrap();

        let ids: Vec<_> = picked.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![exact.id, medium_off_goal.id, easy_on_goal.id]);
        // No beginner-style fallback for nutrition
        assert_eq!(catalog.nutrition_reads(), 2);
    }
}
