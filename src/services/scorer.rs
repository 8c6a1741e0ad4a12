use crate::models::{NutritionContent, Preferences, WorkoutContent};

/// Points for a workout at the user's own fitness level
pub const DIFFICULTY_MATCH_POINTS: u32 = 5;
/// Points for a workout of a preferred type
pub const TYPE_MATCH_POINTS: u32 = 3;
/// Points for content sharing at least one goal with the user
pub const GOAL_MATCH_POINTS: u32 = 4;
/// Points for a nutrition plan that touches none of the user's dietary restrictions
pub const RESTRICTION_SAFE_POINTS: u32 = 5;

pub const MAX_WORKOUT_SCORE: u32 = DIFFICULTY_MATCH_POINTS + TYPE_MATCH_POINTS + GOAL_MATCH_POINTS;
pub const MAX_NUTRITION_SCORE: u32 = RESTRICTION_SAFE_POINTS + GOAL_MATCH_POINTS;

fn points(condition: bool, value: u32) -> u32 {
    if condition {
        value
    } else {
        0
    }
}

/// Scores a workout against a preference profile
pub fn score_workout(workout: &WorkoutContent, preferences: &Preferences) -> u32 {
    points(
        workout.difficulty_level == preferences.fitness_level,
        DIFFICULTY_MATCH_POINTS,
    ) + points(preferences.prefers(workout.workout_type), TYPE_MATCH_POINTS)
        + points(preferences.shares_goal(&workout.target_goals), GOAL_MATCH_POINTS)
}

/// Scores a nutrition plan against a preference profile
pub fn score_nutrition(plan: &NutritionContent, preferences: &Preferences) -> u32 {
    points(
        !plan.conflicts_with(&preferences.dietary_restrictions),
        RESTRICTION_SAFE_POINTS,
    ) + points(preferences.shares_goal(&plan.target_goals), GOAL_MATCH_POINTS)
}
