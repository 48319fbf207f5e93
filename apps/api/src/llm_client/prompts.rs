// Prompts for the editor's writing aids.

use serde_json::Value;

pub const SUGGESTION_SYSTEM: &str = "You are an experienced resume reviewer. \
    Give concise, concrete suggestions to improve the given resume section. \
    Respond in plain text as a short list. \
    Do NOT rewrite the whole section and do NOT invent facts.";

pub const ANALYSIS_SYSTEM: &str = "You are an experienced recruiter reviewing a resume. \
    Assess clarity, impact, structure and keyword coverage. \
    Respond in plain text with a brief overall assessment followed by strengths \
    and prioritized improvements.";

const SUGGESTION_TEMPLATE: &str = "\
Section: {section}

Current content:
\"\"\"
{content}
\"\"\"

Suggest improvements for this section.";

const ANALYSIS_TEMPLATE: &str = "\
Here is the resume as JSON:

{resume_json}

Analyze this resume.";

pub fn build_suggestion_prompt(section: &str, content: &str) -> String {
    SUGGESTION_TEMPLATE
        .replace("{section}", section.trim())
        .replace("{content}", content.trim())
}

/// The profile picture is dropped: it is a data URL and says nothing about the content.
pub fn build_analysis_prompt(resume_data: &Value) -> String {
    let mut data = resume_data.clone();
    if let Value::Object(fields) = &mut data {
        fields.remove("profilePicture");
    }
    let resume_json = serde_json::to_string_pretty(&data).unwrap_or_default();
    ANALYSIS_TEMPLATE.replace("{resume_json}", &resume_json)
}
