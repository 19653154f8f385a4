// Prompt templates for the reasoning service. Placeholders in braces are
// filled in one pass over the template, so braces inside substituted text
// are never expanded again. Nothing here is escaped.

use crate::models::cover_letter::CoverLetterOptions;

/// Summarize prompt. Replace `{job_text}`.
pub const SUMMARIZE_PROMPT_TEMPLATE: &str = r#"Analyze this job description and extract key information in JSON format.

Job Description:
{job_text}

Return ONLY valid JSON in this exact format (no markdown, no code blocks):
{
  "roleOverview": "A 2-3 sentence summary of the role",
  "responsibilities": ["responsibility 1", "responsibility 2"],
  "requirements": ["requirement 1", "requirement 2"],
  "techAndTools": ["technology 1", "tool 2"]
}

Keep each array to the 5-8 most important items. Be concise."#;

/// Tailor prompt. Replace `{job_text}` and `{resume_text}`.
pub const TAILOR_PROMPT_TEMPLATE: &str = r#"You are an expert resume strategist. Tailor the resume below to the job posting while keeping the candidate's own voice and keeping every claim verifiable.

JOB DESCRIPTION:
{job_text}

MASTER RESUME:
{resume_text}

PROCESS:
1. Keyword analysis: pull required skills, tools and qualifications from the posting, including common alternate phrasings.
2. Voice: keep the candidate's writing style. Avoid generic, inflated or unverifiable phrasing.
3. Modifications: reorder bullets so the most relevant experience comes first, work keywords in only where they genuinely apply, use metrics from the ORIGINAL resume only.
4. Verification: NEVER invent metrics, titles, tools, timelines or scope. If a required skill is missing, list it as missing.

Return ONLY valid JSON with this exact structure:
{
  "tailored_resume": "The complete tailored resume in plain text",
  "tailored_resume_latex": "The complete tailored resume as a compilable LaTeX document",
  "changes_made": [
    {"change": "What changed", "rationale": "Why it improves alignment"}
  ],
  "keywords_matched": ["keyword"],
  "keywords_missing": ["keyword"],
  "keyword_variants_used": ["original term -> posting term"],
  "clarifying_questions": ["Question about experience the resume does not make clear"]
}

Give 3-5 changes, 5-10 matched keywords and 1-3 clarifying questions. Escape LaTeX backslashes so the JSON stays valid."#;

/// Cover letter prompt. Replace `{job_text}`, `{resume_text}`, `{company_name}`, `{job_title}`.
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"You are an expert cover letter writer. Write a personalized cover letter for the job posting below, based only on the candidate's resume.

JOB DESCRIPTION:
{job_text}

CANDIDATE'S RESUME:
{resume_text}

COMPANY NAME: {company_name}
JOB TITLE: {job_title}

GUIDELINES:
- 3-4 paragraphs, 250-350 words: an opening hook, 1-2 body paragraphs with the 2-3 most relevant achievements, a closing with a call to action.
- Professional but personable. Concrete, using numbers from the resume. No generic filler.
- Only use experience, skills and achievements present in the resume. Never invent metrics.

Return ONLY valid JSON with this exact structure:
{
  "cover_letter": "The complete cover letter in plain text",
  "cover_letter_latex": "The cover letter as a compilable LaTeX document using the letter class",
  "key_points_highlighted": ["Experience or skill emphasized"],
  "customization_notes": ["How the letter was customized for this role"]
}"#;

pub fn summarize_prompt(job_text: &str) -> String {
    fill(SUMMARIZE_PROMPT_TEMPLATE, &[("job_text", job_text)])
}

pub fn tailor_prompt(job_text: &str, resume_text: &str) -> String {
    fill(
        TAILOR_PROMPT_TEMPLATE,
        &[("job_text", job_text), ("resume_text", resume_text)],
    )
}

pub fn cover_letter_prompt(
    job_text: &str,
    resume_text: &str,
    options: &CoverLetterOptions,
) -> String {
    let company = or_placeholder(&options.company_name, "the company");
    let title = or_placeholder(&options.job_title, "the position");
    fill(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("job_text", job_text),
            ("resume_text", resume_text),
            ("company_name", company),
            ("job_title", title),
        ],
    )
}

/// Replaces each `{name}` in `template` with its value. Unknown braces (the
/// JSON examples) are copied through.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let matched = values.iter().find(|(name, _)| {
            tail.strip_prefix(name)
                .is_some_and(|after| after.starts_with('}'))
        });
        match matched {
            Some((name, value)) => {
                out.push_str(value);
                rest = &tail[name.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value.trim()
    }
}
