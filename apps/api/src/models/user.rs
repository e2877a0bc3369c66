use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Jobseeker,
    Employer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Associates,
    Bachelors,
    Masters,
    Doctorate,
    Vocational,
    Certification,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceBand {
    /// 0-2 years
    Entry,
    /// 3-5 years
    Mid,
    /// 6-10 years
    Senior,
    /// 10+ years
    Executive,
}

/// Optional details collected when a job seeker registers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSeekerInfo {
    pub education: Option<EducationLevel>,
    pub experience: Option<ExperienceBand>,
    pub skills: Vec<String>,
}

/// Public view of an account. Never carries the password checksum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_seeker_info: Option<JobSeekerInfo>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_job_seeker(&self) -> bool {
        self.user_type == UserType::Jobseeker
    }
}
