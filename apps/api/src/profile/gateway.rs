//! Persistence Gateway: the boundary that durably stores profiles and accepts resumes.
//!
//! `AppState` holds an `Arc<dyn ProfileGateway>`, chosen at startup:
//! `PgProfileGateway` when `DATABASE_URL` is set, `InMemoryProfileGateway` otherwise.
//! Calls are at-most-once; nothing here retries.

use std::collections::HashMap;
use std::num::TryFromIntError;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::profile::{
    EducationEntry, ExperienceEntry, PersonalInfo, ProfileDocument, ResumeDescriptor, ResumeKind,
};
use crate::profile::resume::{describe_resume, ResumeFile};

pub const SAVE_FAILED: &str = "Failed to save profile";
pub const UPLOAD_FAILED: &str = "Failed to upload resume";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{0}")]
    SaveFailed(String),

    #[error("{0}")]
    UploadFailed(String),

    #[error("{0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ProfileGateway: Send + Sync {
    /// Stores the whole document. On success the returned copy has `completed = true`.
    async fn save_profile(
        &self,
        owner: Uuid,
        document: ProfileDocument,
    ) -> Result<ProfileDocument, GatewayError>;

    /// Accepts an already-validated resume and describes it. Backends that keep the
    /// descriptor alongside the profile only confirm they are reachable, so a resume is
    /// never accepted by a store that could not save it later.
    async fn upload_resume(
        &self,
        file: &ResumeFile,
        kind: ResumeKind,
    ) -> Result<ResumeDescriptor, GatewayError>;

    async fn fetch_profile(&self, owner: Uuid) -> Result<Option<ProfileDocument>, GatewayError>;

    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory backend
// ────────────────────────────────────────────────────────────────────────────

/// Keeps saved profiles in process memory. Every save and upload takes at least the
/// configured latency before resolving.
pub struct InMemoryProfileGateway {
    save_latency: Duration,
    upload_latency: Duration,
    profiles: RwLock<HashMap<Uuid, ProfileDocument>>,
}

impl InMemoryProfileGateway {
    pub fn new(save_latency: Duration, upload_latency: Duration) -> Self {
        Self {
            save_latency,
            upload_latency,
            profiles: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ProfileGateway for InMemoryProfileGateway {
    async fn save_profile(
        &self,
        owner: Uuid,
        mut document: ProfileDocument,
    ) -> Result<ProfileDocument, GatewayError> {
        tokio::time::sleep(self.save_latency).await;
        document.completed = true;
        self.profiles.write().await.insert(owner, document.clone());
        info!("Saved profile for user {owner} (in-memory)");
        Ok(document)
    }

    async fn upload_resume(
        &self,
        file: &ResumeFile,
        kind: ResumeKind,
    ) -> Result<ResumeDescriptor, GatewayError> {
        tokio::time::sleep(self.upload_latency).await;
        Ok(describe_resume(file, kind))
    }

    async fn fetch_profile(&self, owner: Uuid) -> Result<Option<ProfileDocument>, GatewayError> {
        Ok(self.profiles.read().await.get(&owner).cloned())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct ProfileRow {
    title: String,
    first_name: String,
    last_name: String,
    phone: String,
    location: String,
    bio: String,
    resume: Option<Json<ResumeDescriptor>>,
    completed: bool,
}

#[derive(Debug, FromRow)]
struct EducationRow {
    entry_id: i32,
    institution: String,
    degree: String,
    field_of_study: String,
    start_date: String,
    end_date: String,
    current: bool,
    description: String,
}

#[derive(Debug, FromRow)]
struct ExperienceRow {
    entry_id: i32,
    company: String,
    title: String,
    location: String,
    start_date: String,
    end_date: String,
    current: bool,
    description: String,
}

/// Writes the whole document in one transaction: either every table reflects the new
/// document or none does.
pub struct PgProfileGateway {
    pool: PgPool,
}

/// Entry ids and positions live in INTEGER columns; anything wider aborts the save.
fn int_column<T>(value: T) -> Result<i32, sqlx::Error>
where
    i32: TryFrom<T, Error = TryFromIntError>,
{
    i32::try_from(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

impl PgProfileGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write_document(
        &self,
        owner: Uuid,
        doc: &ProfileDocument,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let info = &doc.personal_info;

        sqlx::query(
            r#"
            INSERT INTO user_profiles
                (user_id, title, first_name, last_name, phone, location, bio, resume, completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            ON CONFLICT (user_id) DO UPDATE SET
                title = EXCLUDED.title,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                phone = EXCLUDED.phone,
                location = EXCLUDED.location,
                bio = EXCLUDED.bio,
                resume = EXCLUDED.resume,
                completed = TRUE,
                updated_at = NOW()
            "#,
        )
        .bind(owner)
        .bind(&info.title)
        .bind(&info.first_name)
        .bind(&info.last_name)
        .bind(&info.phone)
        .bind(&info.location)
        .bind(&info.bio)
        .bind(doc.resume.as_ref().map(Json))
        .execute(&mut *tx)
        .await?;

        for table in ["profile_education", "profile_experience", "profile_skills"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE user_id = $1"))
                .bind(owner)
                .execute(&mut *tx)
                .await?;
        }

        for (position, edu) in doc.education.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO profile_education
                    (user_id, entry_id, position, institution, degree, field_of_study,
                     start_date, end_date, current, description)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(owner)
            .bind(int_column(edu.id)?)
            .bind(int_column(position)?)
            .bind(&edu.institution)
            .bind(&edu.degree)
            .bind(&edu.field_of_study)
            .bind(&edu.start_date)
            .bind(&edu.end_date)
            .bind(edu.current)
            .bind(&edu.description)
            .execute(&mut *tx)
            .await?;
        }

        for (position, exp) in doc.experience.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO profile_experience
                    (user_id, entry_id, position, company, title, location,
                     start_date, end_date, current, description)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(owner)
            .bind(int_column(exp.id)?)
            .bind(int_column(position)?)
            .bind(&exp.company)
            .bind(&exp.title)
            .bind(&exp.location)
            .bind(&exp.start_date)
            .bind(&exp.end_date)
            .bind(exp.current)
            .bind(&exp.description)
            .execute(&mut *tx)
            .await?;
        }

        for (position, skill) in doc.skills.iter().enumerate() {
            sqlx::query(
                "INSERT INTO profile_skills (user_id, position, name) VALUES ($1, $2, $3)",
            )
            .bind(owner)
            .bind(int_column(position)?)
            .bind(skill)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    async fn read_document(&self, owner: Uuid) -> Result<Option<ProfileDocument>, sqlx::Error> {
        let Some(row) = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT title, first_name, last_name, phone, location, bio, resume, completed
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let education = sqlx::query_as::<_, EducationRow>(
            r#"
            SELECT entry_id, institution, degree, field_of_study, start_date, end_date,
                   current, description
            FROM profile_education
            WHERE user_id = $1
            ORDER BY position
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let experience = sqlx::query_as::<_, ExperienceRow>(
            r#"
            SELECT entry_id, company, title, location, start_date, end_date,
                   current, description
            FROM profile_experience
            WHERE user_id = $1
            ORDER BY position
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        let skills: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM profile_skills WHERE user_id = $1 ORDER BY position",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ProfileDocument {
            personal_info: PersonalInfo {
                title: row.title,
                first_name: row.first_name,
                last_name: row.last_name,
                phone: row.phone,
                location: row.location,
                bio: row.bio,
            },
            education: education
                .into_iter()
                .map(|r| EducationEntry {
                    id: u32::try_from(r.entry_id).unwrap_or_default(),
                    institution: r.institution,
                    degree: r.degree,
                    field_of_study: r.field_of_study,
                    start_date: r.start_date,
                    end_date: r.end_date,
                    current: r.current,
                    description: r.description,
                })
                .collect(),
            experience: experience
                .into_iter()
                .map(|r| ExperienceEntry {
                    id: u32::try_from(r.entry_id).unwrap_or_default(),
                    company: r.company,
                    title: r.title,
                    location: r.location,
                    start_date: r.start_date,
                    end_date: r.end_date,
                    current: r.current,
                    description: r.description,
                })
                .collect(),
            skills,
            resume: row.resume.map(|Json(descriptor)| descriptor),
            completed: row.completed,
        }))
    }
}

#[async_trait]
impl ProfileGateway for PgProfileGateway {
    async fn save_profile(
        &self,
        owner: Uuid,
        mut document: ProfileDocument,
    ) -> Result<ProfileDocument, GatewayError> {
        self.write_document(owner, &document).await.map_err(|e| {
            warn!("Profile save for user {owner} rolled back: {e}");
            GatewayError::SaveFailed(SAVE_FAILED.to_string())
        })?;
        info!("Saved profile for user {owner} (postgres)");
        document.completed = true;
        Ok(document)
    }

    async fn upload_resume(
        &self,
        file: &ResumeFile,
        kind: ResumeKind,
    ) -> Result<ResumeDescriptor, GatewayError> {
        // Reachability check; the descriptor is written with the profile row.
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!("Resume upload for '{}' failed: {e}", file.name);
                GatewayError::UploadFailed(UPLOAD_FAILED.to_string())
            })?;
        Ok(describe_resume(file, kind))
    }

    async fn fetch_profile(&self, owner: Uuid) -> Result<Option<ProfileDocument>, GatewayError> {
        self.read_document(owner).await.map_err(|e| {
            warn!("Profile read for user {owner} failed: {e}");
            GatewayError::Unavailable("Failed to load profile".to_string())
        })
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
