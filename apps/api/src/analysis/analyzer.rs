//! Analysis orchestration.
//!
//! Flow: truncate resume → build prompt → tiered generate → present, once per
//! report, strictly in order (review, advice, match). A failed report is carried
//! in its own panel; the remaining reports still run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::presenter::{present_match, MatchSeverity};
use crate::analysis::prompts::{advice_prompt, match_prompt, review_prompt};
use crate::analysis::resume::truncate_chars;
use crate::analysis::settings::AnalysisSettings;
use crate::llm_client::{GenerationRequest, TieredGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Review,
    Advice,
    Match,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::Review, ReportKind::Advice, ReportKind::Match];

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Review => "Resume Review",
            ReportKind::Advice => "Skill Advice",
            ReportKind::Match => "ATS Match %",
        }
    }

    fn prompt(&self, jd: &str, resume: &str) -> String {
        match self {
            ReportKind::Review => review_prompt(jd, resume),
            ReportKind::Advice => advice_prompt(jd, resume),
            ReportKind::Match => match_prompt(jd, resume),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReportOutcome {
    Ready { text: String },
    Failed { message: String },
}

/// Highlighted match figure, shown above the match report text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchHighlight {
    pub percent: u64,
    pub severity: MatchSeverity,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub title: &'static str,
    #[serde(flatten)]
    pub outcome: ReportOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<MatchHighlight>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub analysis_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub resume_chars_used: usize,
    pub resume_truncated: bool,
    pub settings: AnalysisSettings,
    pub reports: Vec<Report>,
}

pub async fn run_analysis(
    generator: &TieredGenerator,
    job_description: &str,
    resume_text: &str,
    settings: AnalysisSettings,
) -> AnalysisResponse {
    let analysis_id = Uuid::new_v4();
    let resume = truncate_chars(resume_text, settings.max_resume_chars);
    let resume_chars_used = resume.text.chars().count();

    info!(
        %analysis_id,
        jd_chars = job_description.chars().count(),
        resume_chars = resume_chars_used,
        truncated = resume.truncated,
        temperature = settings.temperature,
        "Starting resume analysis"
    );

    let mut reports = Vec::with_capacity(ReportKind::ALL.len());
    for kind in ReportKind::ALL {
        let request = GenerationRequest::single(
            kind.prompt(job_description, &resume.text),
            settings.temperature,
        );

        let report = match generator.generate(&request).await {
            Ok(text) => build_report(kind, &text),
            Err(e) => {
                error!(%analysis_id, report = ?kind, error = %e, "Report generation failed");
                Report {
                    kind,
                    title: kind.title(),
                    outcome: ReportOutcome::Failed {
                        message: e.to_string(),
                    },
                    highlight: None,
                }
            }
        };
        reports.push(report);
    }

    info!(
        %analysis_id,
        failed = reports
            .iter()
            .filter(|r| matches!(r.outcome, ReportOutcome::Failed { .. }))
            .count(),
        "Resume analysis finished"
    );

    AnalysisResponse {
        analysis_id,
        generated_at: Utc::now(),
        resume_chars_used,
        resume_truncated: resume.truncated,
        settings,
        reports,
    }
}

fn build_report(kind: ReportKind, text: &str) -> Report {
    let (text, highlight) = match kind {
        ReportKind::Match => {
            let presented = present_match(text);
            let highlight = presented.found.then_some(MatchHighlight {
                percent: presented.percent,
                severity: presented.severity,
                color: presented.color,
            });
            (presented.cleaned_text, highlight)
        }
        ReportKind::Review | ReportKind::Advice => (text.to_string(), None),
    };

    Report {
        kind,
        title: kind.title(),
        outcome: ReportOutcome::Ready { text },
        highlight,
    }
}
