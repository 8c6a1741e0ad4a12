use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentId, Preferences, UserId};

/// A user's declared preferences together with the last computed recommendations
///
/// A profile only exists once a recommendation run has succeeded for its user, so
/// `last_updated` is always set. The two id lists are replaced together on every run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceProfile {
    pub user_id: UserId,
    #[serde(flatten)]
    pub preferences: Preferences,
    pub recommended_workout_ids: Vec<ContentId>,
    pub recommended_nutrition_ids: Vec<ContentId>,
    pub last_updated: DateTime<Utc>,
}
