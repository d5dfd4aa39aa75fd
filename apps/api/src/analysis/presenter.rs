//! Match presenter — pulls the match percentage out of the ATS report text.
//!
//! The first `<int>%` found is the headline figure and is classified into a
//! severity band. Every `<int>%` is then stripped from the text, since the
//! figure is displayed separately as a highlighted badge.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static PERCENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)%").expect("percent pattern is a valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSeverity {
    Low,
    Medium,
    High,
}

impl MatchSeverity {
    /// < 50 low, 50–79 medium, ≥ 80 high.
    pub fn from_percent(percent: u64) -> Self {
        match percent {
            0..=49 => MatchSeverity::Low,
            50..=79 => MatchSeverity::Medium,
            _ => MatchSeverity::High,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            MatchSeverity::Low => "red",
            MatchSeverity::Medium => "orange",
            MatchSeverity::High => "green",
        }
    }
}

/// Presenter output for the ATS match report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchPresentation {
    /// Whether any percentage was found. Without one there is nothing to highlight.
    pub found: bool,
    pub percent: u64,
    pub severity: MatchSeverity,
    pub color: &'static str,
    pub cleaned_text: String,
}

pub fn present_match(text: &str) -> MatchPresentation {
    let Some(captures) = PERCENT_PATTERN.captures(text) else {
        return MatchPresentation {
            found: false,
            percent: 0,
            severity: MatchSeverity::Low,
            color: MatchSeverity::Low.color(),
            cleaned_text: text.trim().to_string(),
        };
    };

    // The pattern is ASCII digits only, so a parse failure means overflow.
    let percent = captures[1].parse::<u64>().unwrap_or(u64::MAX);
    let severity = MatchSeverity::from_percent(percent);
    let cleaned = PERCENT_PATTERN.replace_all(text, "");

    MatchPresentation {
        found: true,
        percent,
        severity,
        color: severity.color(),
        cleaned_text: cleaned.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_band_removes_figure() {
        let result = present_match("Overall match 42% for this role");
        assert!(result.found);
        assert_eq!(result.percent, 42);
        assert_eq!(result.severity, MatchSeverity::Low);
        assert!(!result.cleaned_text.contains("42%"));
        assert_eq!(result.cleaned_text, "Overall match  for this role");
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(present_match("49%").severity, MatchSeverity::Low);
        assert_eq!(present_match("50%").severity, MatchSeverity::Medium);
        assert_eq!(present_match("79%").severity, MatchSeverity::Medium);
        assert_eq!(present_match("80%").severity, MatchSeverity::High);
        assert_eq!(present_match("100%").severity, MatchSeverity::High);
        assert_eq!(present_match("0%").severity, MatchSeverity::Low);
    }

    #[test]
    fn test_no_percentage_defaults_to_low_and_trims() {
        let result = present_match("  No figure given here.\n");
        assert!(!result.found);
        assert_eq!(result.percent, 0);
        assert_eq!(result.severity, MatchSeverity::Low);
        assert_eq!(result.cleaned_text, "No figure given here.");
    }

    #[test]
    fn test_all_figures_removed_first_one_wins() {
        let result = present_match("Match: 72%\nKeywords covered: 90%\nSkills: 15%");
        assert_eq!(result.percent, 72);
        assert_eq!(result.severity, MatchSeverity::Medium);
        assert!(!result.cleaned_text.contains('%'));
        assert_eq!(result.cleaned_text, "Match: \nKeywords covered: \nSkills:");
    }

    #[test]
    fn test_end_to_end_example() {
        let result = present_match("Match: 85% ... missing: Kubernetes");
        assert_eq!(result.severity, MatchSeverity::High);
        assert_eq!(result.percent, 85);
        assert_eq!(result.cleaned_text, "Match:  ... missing: Kubernetes");
        assert_eq!(result.color, "green");
    }

    #[test]
    fn test_percent_without_digits_is_ignored() {
        let result = present_match("About % of keywords");
        assert!(!result.found);
        assert_eq!(result.cleaned_text, "About % of keywords");
    }

    #[test]
    fn test_decimal_takes_fractional_digits() {
        // `[0-9]+%` anchors on the digits right before the sign.
        let result = present_match("Score 85.5%");
        assert_eq!(result.percent, 5);
        assert_eq!(result.cleaned_text, "Score 85.");
    }

    #[test]
    fn test_non_ascii_digits_are_not_a_percentage() {
        let fullwidth = present_match("Match: ４２%");
        assert!(!fullwidth.found);
        assert_eq!(fullwidth.percent, 0);
        assert_eq!(fullwidth.severity, MatchSeverity::Low);
        assert_eq!(fullwidth.cleaned_text, "Match: ４２%");

        let arabic_indic = present_match("Match: ٨٥% overall");
        assert!(!arabic_indic.found);
        assert_eq!(arabic_indic.severity, MatchSeverity::Low);
        assert_eq!(arabic_indic.cleaned_text, "Match: ٨٥% overall");
    }

    #[test]
    fn test_ascii_figure_wins_over_non_ascii_digits() {
        let result = present_match("Score ４２%, match 35%");
        assert!(result.found);
        assert_eq!(result.percent, 35);
        assert_eq!(result.severity, MatchSeverity::Low);
        assert_eq!(result.cleaned_text, "Score ４２%, match");
    }

    #[test]
    fn test_huge_number_saturates_to_high() {
        let result = present_match("99999999999999999999999%");
        assert_eq!(result.percent, u64::MAX);
        assert_eq!(result.severity, MatchSeverity::High);
        assert_eq!(result.cleaned_text, "");
    }

    #[test]
    fn test_severity_colors() {
        assert_eq!(MatchSeverity::Low.color(), "red");
        assert_eq!(MatchSeverity::Medium.color(), "orange");
        assert_eq!(MatchSeverity::High.color(), "green");
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&MatchSeverity::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
