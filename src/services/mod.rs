//! Service layer: external integrations and the meal plan pipeline.
//!
//! Contains the completion and nutrition clients, prompt building, plan
//! generation, nutrition enrichment and the profile repository.

pub mod completion;
pub mod enricher;
pub mod generator;
pub mod nutrition;
pub mod profile_store;
pub mod prompt;
pub mod rate_limit;

pub use completion::{CompletionProvider, CompletionRequest, OpenAiClient};
pub use enricher::NutritionEnricher;
pub use generator::MealPlanGenerator;
pub use nutrition::{EdamamClient, NutritionProvider};
pub use profile_store::{PgProfileStore, ProfileStore};
pub use prompt::PlanPreferences;
pub use rate_limit::TokenBucket;
