//! Diet and exercise plan generation: targets, prompt, backend call, cleanup.

pub mod client;
pub mod metabolic;
pub mod orchestrator;
pub mod prompt;
pub mod sanitize;

pub use orchestrator::PlanOrchestrator;
