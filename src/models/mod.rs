use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod content;
pub mod preferences;
pub mod profile;
pub mod recommendation;

pub use content::{ContentId, NutritionContent, NutritionDifficulty, WorkoutContent};
pub use preferences::{FitnessLevel, Goal, PreferenceSubmission, Preferences, WorkoutType};
pub use profile::PreferenceProfile;
pub use recommendation::{RecommendationStrategy, Recommendations};

/// Opaque user identifier supplied by the auth collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_display() {
        let id = UserId::new("athlete-7");
        assert_eq!(format!("{}", id), "athlete-7");
        assert_eq!(id.as_str(), "athlete-7");
    }

    #[test]
    fn test_user_id_serde_transparent() {
        let id = UserId::from("athlete-7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""athlete-7""#);
    }
}
