use serde::Serialize;
use serde_json::Value;

use crate::render::{escape_markup, format_inline, format_with_newlines};

/// A resume document with every text field converted to safe markup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDocument {
    pub name: String,
    pub position: String,
    pub font_family: String,
    pub contact_information: String,
    pub email: String,
    pub address: String,
    pub summary: String,
    pub social_media: Vec<PreviewLink>,
    pub education: Vec<PreviewEntry>,
    pub work_experience: Vec<PreviewEntry>,
    pub projects: Vec<PreviewEntry>,
    pub skills: Vec<PreviewSkillGroup>,
    pub languages: Vec<String>,
    pub certifications: Vec<PreviewEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreviewLink {
    pub label: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEntry {
    pub title: String,
    pub subtitle: String,
    pub start_year: String,
    pub end_year: String,
    pub description: String,
    /// One formatted item per non-blank line of `keyAchievements`.
    pub achievements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreviewSkillGroup {
    pub title: String,
    pub skills: Vec<String>,
}

/// Renders the preview of a resume payload. Missing or mistyped fields render empty.
pub fn render_preview(data: &Value) -> PreviewDocument {
    PreviewDocument {
        name: format_inline(text(data, "name")),
        position: format_inline(text(data, "position")),
        font_family: escape_markup(text(data, "fontFamily")),
        contact_information: escape_markup(text(data, "contactInformation")),
        email: escape_markup(text(data, "email")),
        address: escape_markup(text(data, "address")),
        summary: format_with_newlines(text(data, "summary")),
        social_media: items(data, "socialMedia")
            .iter()
            .map(|item| PreviewLink {
                label: escape_markup(text(item, "socialMedia")),
                link: escape_markup(text(item, "link")),
            })
            .collect(),
        education: items(data, "education")
            .iter()
            .map(|item| PreviewEntry {
                title: escape_markup(text(item, "school")),
                subtitle: escape_markup(text(item, "degree")),
                start_year: escape_markup(text(item, "startYear")),
                end_year: escape_markup(text(item, "endYear")),
                ..Default::default()
            })
            .collect(),
        work_experience: items(data, "workExperience")
            .iter()
            .map(|item| PreviewEntry {
                title: escape_markup(text(item, "position")),
                subtitle: escape_markup(text(item, "company")),
                start_year: escape_markup(text(item, "startYear")),
                end_year: escape_markup(text(item, "endYear")),
                description: format_with_newlines(text(item, "description")),
                achievements: achievements(text(item, "keyAchievements")),
                link: None,
            })
            .collect(),
        projects: items(data, "projects")
            .iter()
            .map(|item| PreviewEntry {
                title: escape_markup(text(item, "name")),
                subtitle: String::new(),
                start_year: escape_markup(text(item, "startYear")),
                end_year: escape_markup(text(item, "endYear")),
                description: format_with_newlines(text(item, "description")),
                achievements: achievements(text(item, "keyAchievements")),
                link: Some(escape_markup(text(item, "link"))).filter(|l| !l.is_empty()),
            })
            .collect(),
        skills: items(data, "skills")
            .iter()
            .map(|group| PreviewSkillGroup {
                title: escape_markup(text(group, "title")),
                skills: strings(group, "skills"),
            })
            .collect(),
        languages: strings(data, "languages"),
        certifications: items(data, "certifications")
            .iter()
            .map(|item| PreviewEntry {
                title: escape_markup(text(item, "name")),
                subtitle: escape_markup(text(item, "issuer")),
                ..Default::default()
            })
            .collect(),
    }
}

fn text<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn items<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn strings(value: &Value, key: &str) -> Vec<String> {
    items(value, key)
        .iter()
        .filter_map(Value::as_str)
        .map(escape_markup)
        .collect()
}

fn achievements(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(format_inline)
        .collect()
}
