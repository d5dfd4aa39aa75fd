use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;
pub const TEMPERATURE_STEP: f32 = 0.05;

pub const DEFAULT_MAX_RESUME_CHARS: usize = 15_000;
pub const MIN_MAX_RESUME_CHARS: usize = 2_000;
pub const MAX_MAX_RESUME_CHARS: usize = 50_000;
pub const MAX_RESUME_CHARS_STEP: usize = 1_000;

/// User-tunable knobs for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    pub temperature: f32,
    pub max_resume_chars: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_resume_chars: DEFAULT_MAX_RESUME_CHARS,
        }
    }
}

impl AnalysisSettings {
    /// Builds settings from optional raw form values, falling back to defaults.
    pub fn from_form(
        temperature: Option<&str>,
        max_resume_chars: Option<&str>,
    ) -> Result<Self, AppError> {
        let mut settings = Self::default();

        if let Some(raw) = temperature.map(str::trim).filter(|s| !s.is_empty()) {
            settings.temperature = raw.parse::<f32>().map_err(|_| {
                AppError::Validation(format!("temperature must be a number, got '{raw}'"))
            })?;
        }
        if let Some(raw) = max_resume_chars.map(str::trim).filter(|s| !s.is_empty()) {
            settings.max_resume_chars = raw.parse::<usize>().map_err(|_| {
                AppError::Validation(format!(
                    "max_resume_chars must be a whole number, got '{raw}'"
                ))
            })?;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(AppError::Validation(format!(
                "temperature must be between {MIN_TEMPERATURE} and {MAX_TEMPERATURE}"
            )));
        }
        if !(MIN_MAX_RESUME_CHARS..=MAX_MAX_RESUME_CHARS).contains(&self.max_resume_chars) {
            return Err(AppError::Validation(format!(
                "max_resume_chars must be between {MIN_MAX_RESUME_CHARS} and {MAX_MAX_RESUME_CHARS}"
            )));
        }
        Ok(())
    }
}

/// Defaults and bounds, served to the page so its controls match server validation.
#[derive(Debug, Serialize)]
pub struct SettingsDescriptor {
    pub temperature: RangeDescriptor<f32>,
    pub max_resume_chars: RangeDescriptor<usize>,
}

#[derive(Debug, Serialize)]
pub struct RangeDescriptor<T> {
    pub default: T,
    pub min: T,
    pub max: T,
    pub step: T,
}

pub fn describe_settings() -> SettingsDescriptor {
    SettingsDescriptor {
        temperature: RangeDescriptor {
            default: DEFAULT_TEMPERATURE,
            min: MIN_TEMPERATURE,
            max: MAX_TEMPERATURE,
            step: TEMPERATURE_STEP,
        },
        max_resume_chars: RangeDescriptor {
            default: DEFAULT_MAX_RESUME_CHARS,
            min: MIN_MAX_RESUME_CHARS,
            max: MAX_MAX_RESUME_CHARS,
            step: MAX_RESUME_CHARS_STEP,
        },
    }
}
