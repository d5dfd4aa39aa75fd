//! Tiered model fallback.
//!
//! A `Tier` is a named model configuration with its own retry count and backoff.
//! `TieredGenerator` walks the tiers in order: provider failures are retried within
//! a tier until its attempts run out, then the next tier takes over. When the last
//! tier is exhausted its final error is returned.
//!
//! Default policy: the primary tier gets one attempt and no backoff; the fallback
//! tier gets `N + 1` attempts with a linear `1.5s × attempt` wait in between.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{GenerationRequest, LlmError, ModelBackend};

/// Wait inserted between two attempts on the same tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    None,
    /// `step × n` after the n-th failed attempt.
    Linear { step: Duration },
}

impl Backoff {
    /// Delay after the `attempt`-th failure (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self {
            Backoff::None => Duration::ZERO,
            Backoff::Linear { step } => step.saturating_mul(attempt),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    pub name: String,
    pub model: String,
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Tier {
    /// Single attempt, no backoff. A failure moves straight on to the next tier.
    pub fn primary(model: impl Into<String>) -> Self {
        Self {
            name: "primary".to_string(),
            model: model.into(),
            max_retries: 0,
            backoff: Backoff::None,
        }
    }

    pub fn fallback(model: impl Into<String>, max_retries: u32, step: Duration) -> Self {
        Self {
            name: "fallback".to_string(),
            model: model.into(),
            max_retries,
            backoff: Backoff::Linear { step },
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Generation entry point shared by every request handler.
#[derive(Clone)]
pub struct TieredGenerator {
    backend: Arc<dyn ModelBackend>,
    tiers: Arc<[Tier]>,
}

impl TieredGenerator {
    pub fn new(backend: Arc<dyn ModelBackend>, tiers: Vec<Tier>) -> Self {
        Self {
            backend,
            tiers: tiers.into(),
        }
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for (index, tier) in self.tiers.iter().enumerate() {
            let attempts = tier.attempts();

            for attempt in 1..=attempts {
                match self.backend.generate(&tier.model, request).await {
                    Ok(text) => {
                        debug!(
                            tier = %tier.name,
                            model = %tier.model,
                            attempt,
                            chars = text.len(),
                            "Generation succeeded"
                        );
                        return Ok(text);
                    }
                    Err(e) if e.is_provider_failure() => {
                        warn!(
                            tier = %tier.name,
                            model = %tier.model,
                            attempt,
                            attempts,
                            error = %e,
                            "Generation attempt failed"
                        );
                        last_error = Some(e);

                        if attempt < attempts {
                            let delay = tier.backoff.delay_after(attempt);
                            if !delay.is_zero() {
                                debug!(
                                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                                    "Backing off"
                                );
                                tokio::time::sleep(delay).await;
                            }
                        }
                    }
                    Err(e) => return Err(e),
                }
            }

            if let Some(next) = self.tiers.get(index + 1) {
                info!(
                    from = %tier.model,
                    to = %next.model,
                    "Tier exhausted, falling back"
                );
            }
        }

        Err(last_error.unwrap_or(LlmError::NoTiers))
    }
}
