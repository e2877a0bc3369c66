use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::{ApplicationRecord, EmploymentType, ExperienceLevel, Job};
use crate::validation::{is_valid_email, ValidationErrorMap};

/// Search filters. Every filter is optional and empty strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobQuery {
    pub query: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
    pub salary: Option<String>,
}

fn filter(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl JobQuery {
    /// All filters must hold.
    pub fn matches(&self, job: &Job) -> bool {
        let query = filter(&self.query).map_or(true, |q| {
            contains_ignore_case(&job.title, q)
                || contains_ignore_case(&job.company, q)
                || contains_ignore_case(&job.description, q)
        });
        let location =
            filter(&self.location).map_or(true, |l| contains_ignore_case(&job.location, l));
        let job_type =
            filter(&self.job_type).map_or(true, |t| job.employment_type.as_str() == t);
        let experience = filter(&self.experience_level).map_or(true, |level| {
            job.experience_level.map(ExperienceLevel::as_str) == Some(level)
        });
        let salary = filter(&self.salary).map_or(true, |s| job.salary.contains(s));
        query && location && job_type && experience && salary
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub requirements: String,
    pub salary: String,
    pub employment_type: Option<EmploymentType>,
    pub experience_level: Option<ExperienceLevel>,
}

impl JobPosting {
    pub fn validate(&self) -> ValidationErrorMap {
        let mut errors = ValidationErrorMap::new();
        let required = [
            ("title", &self.title, "Job title is required"),
            ("company", &self.company, "Company name is required"),
            ("location", &self.location, "Location is required"),
            ("description", &self.description, "Job description is required"),
        ];
        for (key, value, message) in required {
            if value.trim().is_empty() {
                errors.insert(key, message);
            }
        }
        if self.employment_type.is_none() {
            errors.insert("employmentType", "Employment type is required");
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: String,
    pub resume_attached: bool,
}

impl ApplicationRequest {
    pub fn validate(&self) -> ValidationErrorMap {
        let mut errors = ValidationErrorMap::new();
        if self.name.trim().is_empty() {
            errors.insert("name", "Name is required");
        }
        if self.email.is_empty() {
            errors.insert("email", "Email is required");
        } else if !is_valid_email(&self.email) {
            errors.insert("email", "Please enter a valid email address");
        }
        if !self.resume_attached {
            errors.insert("resume", "Please upload your resume");
        }
        errors
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationReceipt {
    pub application: ApplicationRecord,
    pub message: String,
}

/// In-memory job catalogue plus the applications submitted against it.
pub struct JobBoard {
    jobs: RwLock<Vec<Job>>,
    applications: RwLock<Vec<ApplicationRecord>>,
}

impl JobBoard {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            jobs: RwLock::new(jobs),
            applications: RwLock::new(Vec::new()),
        }
    }

    pub fn with_sample_jobs() -> Self {
        let sample = [
            (
                "Frontend Developer",
                "TechFlow Solutions",
                "New York, NY",
                "We're looking for a skilled Frontend Developer to join our growing team.",
                "$80,000 - $110,000",
                EmploymentType::FullTime,
                ExperienceLevel::MidLevel,
            ),
            (
                "Product Manager",
                "Innovate Inc",
                "San Francisco, CA",
                "Lead product development and strategy for our SaaS platform.",
                "$120,000 - $150,000",
                EmploymentType::FullTime,
                ExperienceLevel::Senior,
            ),
            (
                "Data Analyst",
                "DataViz Corp",
                "Chicago, IL (Remote)",
                "Analyze complex datasets and create meaningful visualizations.",
                "$70,000 - $95,000",
                EmploymentType::Contract,
                ExperienceLevel::EntryLevel,
            ),
        ];
        let jobs = sample
            .into_iter()
            .zip(1..)
            .map(
                |((title, company, location, description, salary, kind, level), id)| Job {
                    id,
                    title: title.to_string(),
                    company: company.to_string(),
                    location: location.to_string(),
                    description: description.to_string(),
                    requirements: String::new(),
                    salary: salary.to_string(),
                    employment_type: kind,
                    experience_level: Some(level),
                    posted_by: None,
                    created_at: Utc::now(),
                },
            )
            .collect();
        Self::new(jobs)
    }

    pub async fn search(&self, query: &JobQuery) -> Vec<Job> {
        self.jobs
            .read()
            .await
            .iter()
            .filter(|job| query.matches(job))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: u32) -> Option<Job> {
        self.jobs.read().await.iter().find(|j| j.id == id).cloned()
    }

    /// Publishes a posting under the next free id.
    pub async fn post(&self, posting: JobPosting, posted_by: Uuid) -> Result<Job, AppError> {
        posting
            .validate()
            .into_result()
            .map_err(AppError::InvalidFields)?;
        let employment_type = posting
            .employment_type
            .ok_or_else(|| AppError::Validation("Employment type is required".to_string()))?;

        let mut jobs = self.jobs.write().await;
        let id = jobs.iter().map(|j| j.id).max().unwrap_or(0) + 1;
        let job = Job {
            id,
            title: posting.title.trim().to_string(),
            company: posting.company.trim().to_string(),
            location: posting.location.trim().to_string(),
            description: posting.description,
            requirements: posting.requirements,
            salary: posting.salary,
            employment_type,
            experience_level: posting.experience_level,
            posted_by: Some(posted_by),
            created_at: Utc::now(),
        };
        jobs.push(job.clone());
        info!("Job {} posted by user {posted_by}", job.id);
        Ok(job)
    }

    pub async fn apply(
        &self,
        job_id: u32,
        req: ApplicationRequest,
    ) -> Result<ApplicationReceipt, AppError> {
        let job = self
            .get(job_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;
        req.validate().into_result().map_err(AppError::InvalidFields)?;

        let application = ApplicationRecord {
            id: Uuid::new_v4(),
            job_id,
            name: req.name.trim().to_string(),
            email: req.email,
            phone: req.phone,
            cover_letter: req.cover_letter,
            submitted_at: Utc::now(),
        };
        self.applications.write().await.push(application.clone());
        info!("Application {} received for job {job_id}", application.id);
        Ok(ApplicationReceipt {
            application,
            message: format!(
                "Application for {} at {} submitted successfully!",
                job.title, job.company
            ),
        })
    }

    #[cfg(test)]
    pub async fn applications_for(&self, job_id: u32) -> Vec<ApplicationRecord> {
        self.applications
            .read()
            .await
            .iter()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect()
    }
}

/// "Found 1 job matching your criteria" / "Found 3 jobs matching your criteria".
pub fn search_message(count: usize) -> String {
    let noun = if count == 1 { "job" } else { "jobs" };
    format!("Found {count} {noun} matching your criteria")
}
