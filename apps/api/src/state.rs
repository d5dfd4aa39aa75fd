use crate::llm_client::TieredGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Tiered generation client. Backend and tier policy are fixed at startup.
    pub generator: TieredGenerator,
    /// Request body cap for resume uploads.
    pub max_upload_bytes: usize,
}
