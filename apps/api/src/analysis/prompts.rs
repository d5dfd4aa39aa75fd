// Prompt templates for the three reports.
// Each template takes `{jd}` and `{resume}`; build them through the functions below.

/// Resume review: strengths, weaknesses, final thoughts.
pub const REVIEW_PROMPT_TEMPLATE: &str = r#"
You are an experienced HR manager. Review the resume below against the job description.
Job Description: {jd}
Resume: {resume}
Provide strengths, weaknesses, and final thoughts in a clear text format.
"#;

/// Skill-improvement advice.
pub const ADVICE_PROMPT_TEMPLATE: &str = r#"
You are an experienced HR manager. Based on the resume and job description, provide personalized skill improvement advice in simple readable text.
Job Description: {jd}
Resume: {resume}
"#;

/// ATS-style match. The model is asked for a percentage, which the presenter extracts.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"
You are an ATS scanner. Compare the resume against the job description.
Job Description: {jd}
Resume: {resume}
Provide a readable output with percentage match, missing keywords, matched keywords, and final thoughts.
"#;

pub fn review_prompt(jd: &str, resume: &str) -> String {
    fill(REVIEW_PROMPT_TEMPLATE, jd, resume)
}

pub fn advice_prompt(jd: &str, resume: &str) -> String {
    fill(ADVICE_PROMPT_TEMPLATE, jd, resume)
}

pub fn match_prompt(jd: &str, resume: &str) -> String {
    fill(MATCH_PROMPT_TEMPLATE, jd, resume)
}

// Splits on the template's own placeholders so input text containing `{jd}`
// or `{resume}` is never substituted a second time.
fn fill(template: &str, jd: &str, resume: &str) -> String {
    match template.split_once("{resume}") {
        Some((head, tail)) => format!(
            "{}{}{}",
            head.replace("{jd}", jd),
            resume,
            tail.replace("{jd}", jd)
        ),
        None => template.replace("{jd}", jd),
    }
}
