//! The resume document edited in the builder.
//!
//! The store never validates payloads against these types; they exist to
//! produce the blank document new resumes start from and to fill in missing
//! top-level keys when an older payload is loaded.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_FONT_FAMILY: &str = "Georgia, serif";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    pub name: String,
    pub position: String,
    pub font_family: String,
    pub contact_information: String,
    pub email: String,
    pub address: String,
    /// Data URL of the uploaded picture, empty when none.
    pub profile_picture: String,
    pub social_media: Vec<SocialMediaLink>,
    pub summary: String,
    pub education: Vec<EducationEntry>,
    pub work_experience: Vec<WorkExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub skills: Vec<SkillGroup>,
    pub languages: Vec<String>,
    pub certifications: Vec<Certification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMediaLink {
    pub social_media: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    pub school: String,
    pub degree: String,
    pub start_year: String,
    pub end_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceEntry {
    pub company: String,
    pub position: String,
    pub description: String,
    /// One achievement per line.
    pub key_achievements: String,
    pub start_year: String,
    pub end_year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub key_achievements: String,
    pub start_year: String,
    pub end_year: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub title: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,
    pub issuer: String,
}

impl Default for ResumeData {
    fn default() -> Self {
        let skill_group = |title: &str| SkillGroup {
            title: title.to_string(),
            skills: Vec::new(),
        };

        Self {
            name: String::new(),
            position: String::new(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            contact_information: String::new(),
            email: String::new(),
            address: String::new(),
            profile_picture: String::new(),
            social_media: Vec::new(),
            summary: String::new(),
            education: Vec::new(),
            work_experience: Vec::new(),
            projects: Vec::new(),
            skills: vec![
                skill_group("Technical Skills"),
                skill_group("Soft Skills"),
                skill_group("Additional Skills"),
            ],
            languages: Vec::new(),
            certifications: Vec::new(),
        }
    }
}

/// The blank document as JSON.
pub fn default_data() -> Value {
    serde_json::to_value(ResumeData::default()).unwrap_or_default()
}

/// Shallow merge with the blank document: top-level keys missing from `data`
/// are added, keys already present are kept as they are.
/// A payload that is not a JSON object is replaced by the blank document.
pub fn merge_defaults(data: Value) -> Value {
    let Value::Object(mut fields) = data else {
        return default_data();
    };
    if let Value::Object(defaults) = default_data() {
        for (key, value) in defaults {
            fields.entry(key).or_insert(value);
        }
    }
    Value::Object(fields)
}
