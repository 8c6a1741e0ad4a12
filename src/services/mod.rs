pub mod catalog;
pub mod locks;
pub mod profiles;
pub mod ranking;
pub mod recommendations;
pub mod scorer;
pub mod selector;

pub use catalog::{ContentCatalog, InMemoryCatalog, PostgresCatalog};
pub use locks::UserLocks;
pub use profiles::{InMemoryProfileStore, PostgresProfileStore, ProfileStore};
pub use recommendations::{EngineSettings, RecommendationEngine};
