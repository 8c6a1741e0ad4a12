//! Persistence of preference profiles and their cached recommendations

use crate::{
    error::AppResult,
    models::{PreferenceProfile, UserId},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryProfileStore;
pub use postgres::PostgresProfileStore;

/// Storage for one profile per user
///
/// `save` replaces the whole profile in a single atomic write: readers see either the
/// previous profile or the new one, never a mix of fields from both.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns `None` while the user has no profile yet
    async fn find(&self, user_id: &UserId) -> AppResult<Option<PreferenceProfile>>;

    /// Creates the profile or overwrites the existing one
    async fn save(&self, profile: &PreferenceProfile) -> AppResult<()>;
}
