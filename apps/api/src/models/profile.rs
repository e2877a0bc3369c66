use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
}

/// Dates are kept as the raw form strings (`YYYY-MM` or `YYYY-MM-DD`); only presence is checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub id: u32,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub id: u32,
    pub company: String,
    pub title: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

/// Accepted resume formats, serialized as their MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResumeKind {
    #[serde(rename = "application/pdf")]
    Pdf,
    #[serde(rename = "application/msword")]
    Doc,
    #[serde(rename = "application/vnd.openxmlformats-officedocument.wordprocessingml.document")]
    Docx,
}

impl ResumeKind {
    pub const ALL: [ResumeKind; 3] = [ResumeKind::Pdf, ResumeKind::Doc, ResumeKind::Docx];

    pub fn mime(self) -> &'static str {
        match self {
            ResumeKind::Pdf => "application/pdf",
            ResumeKind::Doc => "application/msword",
            ResumeKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ResumeKind::Pdf => "pdf",
            ResumeKind::Doc => "doc",
            ResumeKind::Docx => "docx",
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.mime().eq_ignore_ascii_case(mime))
    }

    /// Guesses the MIME type from a file name, for clients that send none.
    pub fn mime_for_file_name(name: &str) -> Option<&'static str> {
        let (_, ext) = name.rsplit_once('.')?;
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
            .map(ResumeKind::mime)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDescriptor {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: ResumeKind,
    /// Transient local reference for previews; no bytes are stored behind it.
    pub object_reference: String,
    pub last_modified: DateTime<Utc>,
}

/// The job-seeker profile assembled across the wizard steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    pub personal_info: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<String>,
    pub resume: Option<ResumeDescriptor>,
    pub completed: bool,
}

impl Default for ProfileDocument {
    /// A fresh session: one blank education and one blank experience entry, both with id 1.
    fn default() -> Self {
        ProfileDocument {
            personal_info: PersonalInfo::default(),
            education: vec![EducationEntry {
                id: 1,
                ..Default::default()
            }],
            experience: vec![ExperienceEntry {
                id: 1,
                ..Default::default()
            }],
            skills: Vec::new(),
            resume: None,
            completed: false,
        }
    }
}
