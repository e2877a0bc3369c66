use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Internship,
    Temporary,
}

impl EmploymentType {
    /// Wire label, as used in filters and postings.
    pub fn as_str(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full-time",
            EmploymentType::PartTime => "Part-time",
            EmploymentType::Contract => "Contract",
            EmploymentType::Internship => "Internship",
            EmploymentType::Temporary => "Temporary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "Entry-level")]
    EntryLevel,
    #[serde(rename = "Mid-level")]
    MidLevel,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::EntryLevel => "Entry-level",
            ExperienceLevel::MidLevel => "Mid-level",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Executive => "Executive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: u32,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: String,
    /// Free-form range, e.g. "$80,000 - $110,000".
    pub salary: String,
    #[serde(rename = "type")]
    pub employment_type: EmploymentType,
    pub experience_level: Option<ExperienceLevel>,
    pub posted_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: Uuid,
    pub job_id: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: String,
    pub submitted_at: DateTime<Utc>,
}
