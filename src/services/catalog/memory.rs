use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    error::AppResult,
    models::{ContentId, NutritionContent, WorkoutContent},
};

use super::{ContentCatalog, NutritionQuery, WorkoutQuery};

/// Catalog backed by an immutable in-process snapshot
///
/// Vector order is catalog order. Every list call is counted so callers can verify how
/// many selection passes actually reached the catalog.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    workouts: Vec<WorkoutContent>,
    nutrition: Vec<NutritionContent>,
    workout_reads: AtomicUsize,
    nutrition_reads: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new(workouts: Vec<WorkoutContent>, nutrition: Vec<NutritionContent>) -> Self {
        Self {
            workouts,
            nutrition,
            workout_reads: AtomicUsize::new(0),
            nutrition_reads: AtomicUsize::new(0),
        }
    }

    /// Number of `list_workouts` calls served so far
    pub fn workout_reads(&self) -> usize {
        self.workout_reads.load(Ordering::SeqCst)
    }

    /// Number of `list_nutrition` calls served so far
    pub fn nutrition_reads(&self) -> usize {
        self.nutrition_reads.load(Ordering::SeqCst)
    }
}

fn pick_by_ids<T: Clone>(items: &[T], ids: &[ContentId], id_of: impl Fn(&T) -> ContentId) -> Vec<T> {
    let index: HashMap<ContentId, &T> = items.iter().map(|item| (id_of(item), item)).collect();
    ids.iter()
        .filter_map(|id| index.get(id).map(|item| (*item).clone()))
        .collect()
}

#[async_trait::async_trait]
impl ContentCatalog for InMemoryCatalog {
    async fn list_workouts(&self, query: &WorkoutQuery) -> AppResult<Vec<WorkoutContent>> {
        self.workout_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .workouts
            .iter()
            .filter(|workout| query.admits(workout))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn list_nutrition(&self, query: &NutritionQuery) -> AppResult<Vec<NutritionContent>> {
        self.nutrition_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .nutrition
            .iter()
            .filter(|plan| query.admits(plan))
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn workouts_by_ids(&self, ids: &[ContentId]) -> AppResult<Vec<WorkoutContent>> {
        Ok(pick_by_ids(&self.workouts, ids, |w| w.id))
    }

    async fn nutrition_by_ids(&self, ids: &[ContentId]) -> AppResult<Vec<NutritionContent>> {
        Ok(pick_by_ids(&self.nutrition, ids, |n| n.id))
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FitnessLevel, Goal, WorkoutType};
    use crate::services::catalog::WorkoutCriteria;
    use uuid::Uuid;

    fn workouts() -> Vec<WorkoutContent> {
        vec![
            WorkoutContent::new("A", FitnessLevel::Beginner, WorkoutType::Yoga, [Goal::Maintenance]),
            WorkoutContent::new("B", FitnessLevel::Advanced, WorkoutType::Hiit, [Goal::WeightLoss]),
            WorkoutContent::new("C", FitnessLevel::Beginner, WorkoutType::Cardio, [Goal::Endurance]),
        ]
    }

    #[tokio::test]
    async fn test_list_keeps_catalog_order_and_limit() {
        let items = workouts();
        let catalog = InMemoryCatalog::new(items.clone(), vec![]);

        let query = WorkoutQuery::new(WorkoutCriteria::Difficulty(FitnessLevel::Beginner)).limit(1);
        let found = catalog.list_workouts(&query).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, items[0].id);
        assert_eq!(catalog.workout_reads(), 1);
    }

    #[tokio::test]
    async fn test_list_honors_exclude() {
        let items = workouts();
        let catalog = InMemoryCatalog::new(items.clone(), vec![]);

        let query = WorkoutQuery::new(WorkoutCriteria::Difficulty(FitnessLevel::Beginner))
            .excluding(vec![items[0].id]);
        let found = catalog.list_workouts(&query).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, items[2].id);
    }

    #[tokio::test]
    async fn test_by_ids_follows_requested_order_and_skips_unknown() {
        let items = workouts();
        let catalog = InMemoryCatalog::new(items.clone(), vec![]);

        let ids = vec![items[2].id, Uuid::new_v4(), items[0].id];
        let found = catalog.workouts_by_ids(&ids).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].id, items[2].id);
        assert_eq!(found[1].id, items[0].id);
        assert_eq!(catalog.workout_reads(), 0);
    }
}
