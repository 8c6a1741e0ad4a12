use std::collections::{BTreeSet, HashMap};

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{ContentId, Goal, NutritionContent, WorkoutContent},
};

use super::{ContentCatalog, NutritionCriteria, NutritionQuery, WorkoutCriteria, WorkoutQuery};

const WORKOUT_COLUMNS: &str =
    "SELECT id, title, difficulty_level, workout_type, target_goals FROM workouts";
const NUTRITION_COLUMNS: &str =
    "SELECT id, title, difficulty, target_goals, restriction_tags FROM nutrition_plans";

/// Catalog read from the shared Postgres content tables
///
/// Catalog order is the `catalog_position` column. Pass criteria are pushed down into
/// the `WHERE` clause so each pass is a single round trip.
#[derive(Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WorkoutRow {
    id: Uuid,
    title: String,
    difficulty_level: String,
    workout_type: String,
    target_goals: Vec<String>,
}

impl TryFrom<WorkoutRow> for WorkoutContent {
    type Error = AppError;

    fn try_from(row: WorkoutRow) -> Result<Self, Self::Error> {
        let malformed = |e: String| {
            AppError::CatalogUnavailable(format!("malformed workout {}: {}", row.id, e))
        };

        Ok(WorkoutContent {
            id: row.id,
            difficulty_level: row.difficulty_level.parse().map_err(malformed)?,
            workout_type: row.workout_type.parse().map_err(malformed)?,
            target_goals: parse_goals(&row.target_goals).map_err(malformed)?,
            title: row.title,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NutritionRow {
    id: Uuid,
    title: String,
    difficulty: String,
    target_goals: Vec<String>,
    restriction_tags: Vec<String>,
}

impl TryFrom<NutritionRow> for NutritionContent {
    type Error = AppError;

    fn try_from(row: NutritionRow) -> Result<Self, Self::Error> {
        let malformed = |e: String| {
            AppError::CatalogUnavailable(format!("malformed nutrition plan {}: {}", row.id, e))
        };

        Ok(NutritionContent {
            id: row.id,
            difficulty: row.difficulty.parse().map_err(malformed)?,
            target_goals: parse_goals(&row.target_goals).map_err(malformed)?,
            restriction_tags: row.restriction_tags.into_iter().collect(),
            title: row.title,
        })
    }
}

fn parse_goals(raw: &[String]) -> Result<BTreeSet<Goal>, String> {
    raw.iter().map(|goal| goal.parse::<Goal>()).collect()
}

fn tags<T: ToString>(items: impl IntoIterator<Item = T>) -> Vec<String> {
    items.into_iter().map(|item| item.to_string()).collect()
}

fn unavailable(e: sqlx::Error) -> AppError {
    tracing::error!(error = %e, "Catalog query failed");
    AppError::CatalogUnavailable(e.to_string())
}

fn push_exclude_and_limit(
    builder: &mut QueryBuilder<'_, Postgres>,
    exclude: &[ContentId],
    limit: Option<usize>,
) {
    if !exclude.is_empty() {
        builder
            .push(" AND NOT (id = ANY(")
            .push_bind(exclude.to_vec())
            .push("))");
    }
    builder.push(" ORDER BY catalog_position");
    if let Some(limit) = limit {
        builder.push(" LIMIT ").push_bind(limit as i64);
    }
}

fn workout_sql(query: &WorkoutQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(WORKOUT_COLUMNS);
    builder.push(" WHERE ");

    match &query.criteria {
        WorkoutCriteria::AllOf(wanted) | WorkoutCriteria::AnyOf(wanted) => {
            let joiner = if matches!(query.criteria, WorkoutCriteria::AllOf(_)) {
                " AND "
            } else {
                " OR "
            };
            builder
                .push("(difficulty_level = ")
                .push_bind(wanted.difficulty.as_str())
                .push(joiner)
                .push("workout_type = ANY(")
                .push_bind(tags(wanted.types.iter()))
                .push(")")
                .push(joiner)
                .push("target_goals && ")
                .push_bind(tags(wanted.goals.iter()))
                .push(")");
        }
        WorkoutCriteria::Difficulty(level) => {
            builder.push("difficulty_level = ").push_bind(level.as_str());
        }
        WorkoutCriteria::Everything => {
            builder.push("TRUE");
        }
    }

    push_exclude_and_limit(&mut builder, &query.exclude, query.limit);
    builder
}

fn nutrition_sql(query: &NutritionQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(NUTRITION_COLUMNS);
    builder.push(" WHERE ");

    match &query.criteria {
        NutritionCriteria::AllOf(wanted) | NutritionCriteria::AnyOf(wanted) => {
            let joiner = if matches!(query.criteria, NutritionCriteria::AllOf(_)) {
                " AND "
            } else {
                " OR "
            };
            builder
                .push("(target_goals && ")
                .push_bind(tags(wanted.goals.iter()))
                .push(joiner)
                .push("difficulty = ")
                .push_bind(wanted.difficulty.as_str())
                .push(")");
        }
        NutritionCriteria::Everything => {
            builder.push("TRUE");
        }
    }

    push_exclude_and_limit(&mut builder, &query.exclude, query.limit);
    builder
}

/// Reorders fetched rows to match the requested id order
fn in_requested_order<T>(ids: &[ContentId], items: Vec<T>, id_of: impl Fn(&T) -> ContentId) -> Vec<T> {
    let mut by_id: HashMap<ContentId, T> = items.into_iter().map(|item| (id_of(&item), item)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

#[async_trait::async_trait]
impl ContentCatalog for PostgresCatalog {
    async fn list_workouts(&self, query: &WorkoutQuery) -> AppResult<Vec<WorkoutContent>> {
        let rows: Vec<WorkoutRow> = workout_sql(query)
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        tracing::debug!(rows = rows.len(), criteria = ?query.criteria, "Workout catalog read");

        rows.into_iter().map(WorkoutContent::try_from).collect()
    }

    async fn list_nutrition(&self, query: &NutritionQuery) -> AppResult<Vec<NutritionContent>> {
        let rows: Vec<NutritionRow> = nutrition_sql(query)
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        tracing::debug!(rows = rows.len(), criteria = ?query.criteria, "Nutrition catalog read");

        rows.into_iter().map(NutritionContent::try_from).collect()
    }

    async fn workouts_by_ids(&self, ids: &[ContentId]) -> AppResult<Vec<WorkoutContent>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, WorkoutRow>(&format!("{} WHERE id = ANY($1)", WORKOUT_COLUMNS))
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;

        let workouts = rows
            .into_iter()
            .map(WorkoutContent::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(in_requested_order(ids, workouts, |w| w.id))
    }

    async fn nutrition_by_ids(&self, ids: &[ContentId]) -> AppResult<Vec<NutritionContent>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, NutritionRow>(&format!(
            "{} WHERE id = ANY($1)",
            NUTRITION_COLUMNS
        ))
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)?;

        let plans = rows
            .into_iter()
            .map(NutritionContent::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(in_requested_order(ids, plans, |n| n.id))
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
