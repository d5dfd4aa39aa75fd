// Resume analysis: PDF intake, prompt building, the three reports, and match presentation.
// All model calls go through llm_client::TieredGenerator.

pub mod analyzer;
pub mod handlers;
pub mod presenter;
pub mod prompts;
pub mod resume;
pub mod settings;
