use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::session::JobSeekerSession;
use crate::errors::AppError;
use crate::models::profile::{ProfileDocument, ResumeKind};
use crate::profile::fields::{EducationField, ExperienceField, FieldValue};
use crate::profile::list_editor::{ListEditor, ListEntry};
use crate::profile::resume::{IntakeError, IntakeSource, ResumeFile};
use crate::profile::sessions::SharedWizard;
use crate::profile::wizard::{PersonalInfoPatch, StepOutcome, WizardView};
use crate::state::AppState;
use crate::validation::ValidationErrorMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Advanced,
    Blocked,
    Saved,
    Moved,
    Unchanged,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionResponse {
    pub outcome: Transition,
    /// True when the visible step changed.
    pub scroll_to_top: bool,
    pub view: WizardView,
}

impl TransitionResponse {
    fn new(outcome: Transition, view: WizardView) -> Self {
        let scroll_to_top = matches!(
            outcome,
            Transition::Advanced | Transition::Moved | Transition::Saved
        );
        Self {
            outcome,
            scroll_to_top,
            view,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EntryUpdate<F> {
    pub field: F,
    pub value: FieldValue,
}

#[derive(Debug, Deserialize)]
pub struct SkillRequest {
    pub skill: String,
}

async fn open_wizard(state: &AppState, owner: Uuid) -> Result<SharedWizard, AppError> {
    state
        .wizards
        .get(owner)
        .await
        .ok_or_else(|| AppError::NotFound("No profile wizard in progress".to_string()))
}

fn update_entry<E: ListEntry>(
    mut editor: ListEditor<'_, E>,
    id: u32,
    update: EntryUpdate<E::Field>,
) -> Result<(), AppError> {
    let found = editor
        .update(id, update.field, update.value)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if !found {
        return Err(AppError::NotFound(format!("{} entry {id} not found", E::SECTION)));
    }
    Ok(())
}

/// The wizard keeps at least one entry per list, so the last one cannot go.
fn remove_entry<E: ListEntry>(mut editor: ListEditor<'_, E>, id: u32) -> Result<(), AppError> {
    if !editor.contains(id) {
        return Err(AppError::NotFound(format!("{} entry {id} not found", E::SECTION)));
    }
    if editor.len() == 1 {
        return Err(AppError::Conflict(format!(
            "At least one {} entry is required",
            E::SECTION
        )));
    }
    editor.remove(id);
    Ok(())
}

/// POST /api/v1/profile/wizard
pub async fn handle_start(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
) -> (StatusCode, Json<WizardView>) {
    let wizard = state.wizards.start(session.user.id).await;
    let view = wizard.lock().await.view();
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/profile/wizard
pub async fn handle_get(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
) -> Result<Json<WizardView>, AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let view = wizard.lock().await.view();
    Ok(Json(view))
}

/// DELETE /api/v1/profile/wizard
pub async fn handle_discard(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
) -> StatusCode {
    state.wizards.discard(session.user.id).await;
    StatusCode::NO_CONTENT
}

/// PATCH /api/v1/profile/wizard/personal
pub async fn handle_update_personal(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
    Json(patch): Json<PersonalInfoPatch>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let mut wizard = wizard.lock().await;
    wizard.update_personal(patch);
    Ok(Json(wizard.view()))
}

/// POST /api/v1/profile/wizard/education
pub async fn handle_add_education(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
) -> Result<(StatusCode, Json<WizardView>), AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let mut wizard = wizard.lock().await;
    wizard.education().add();
    Ok((StatusCode::CREATED, Json(wizard.view())))
}

/// PATCH /api/v1/profile/wizard/education/:id
pub async fn handle_update_education(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
    Path(id): Path<u32>,
    Json(update): Json<EntryUpdate<EducationField>>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let mut wizard = wizard.lock().await;
    update_entry(wizard.education(), id, update)?;
    Ok(Json(wizard.view()))
}

/// DELETE /api/v1/profile/wizard/education/:id
pub async fn handle_remove_education(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
    Path(id): Path<u32>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let mut wizard = wizard.lock().await;
    remove_entry(wizard.education(), id)?;
    Ok(Json(wizard.view()))
}

/// POST /api/v1/profile/wizard/experience
pub async fn handle_add_experience(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
) -> Result<(StatusCode, Json<WizardView>), AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let mut wizard = wizard.lock().await;
    wizard.experience().add();
    Ok((StatusCode::CREATED, Json(wizard.view())))
}

/// PATCH /api/v1/profile/wizard/experience/:id
pub async fn handle_update_experience(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
    Path(id): Path<u32>,
    Json(update): Json<EntryUpdate<ExperienceField>>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let mut wizard = wizard.lock().await;
    update_entry(wizard.experience(), id, update)?;
    Ok(Json(wizard.view()))
}

/// DELETE /api/v1/profile/wizard/experience/:id
pub async fn handle_remove_experience(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
    Path(id): Path<u32>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let mut wizard = wizard.lock().await;
    remove_entry(wizard.experience(), id)?;
    Ok(Json(wizard.view()))
}

/// POST /api/v1/profile/wizard/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
    Json(req): Json<SkillRequest>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let mut wizard = wizard.lock().await;
    wizard.add_skill(&req.skill);
    Ok(Json(wizard.view()))
}

/// DELETE /api/v1/profile/wizard/skills/:skill
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
    Path(skill): Path<String>,
) -> Result<Json<WizardView>, AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let mut wizard = wizard.lock().await;
    wizard.remove_skill(&skill);
    Ok(Json(wizard.view()))
}

struct ResumeUpload {
    source: IntakeSource,
    file: ResumeFile,
}

async fn read_resume_upload(mut multipart: Multipart) -> Result<ResumeUpload, AppError> {
    let mut source = IntakeSource::default();
    let mut last_modified: Option<DateTime<Utc>> = None;
    let mut file: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "file" => {
                let name = field.file_name().unwrap_or("resume").to_string();
                // Browsers fall back to octet-stream for unknown types.
                let content_type = match field.content_type() {
                    Some(ct) if ct != "application/octet-stream" => ct.to_string(),
                    _ => ResumeKind::mime_for_file_name(&name)
                        .unwrap_or("application/octet-stream")
                        .to_string(),
                };
                let contents = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                file = Some((name, content_type, contents));
            }
            "source" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                source = match text.trim() {
                    "drop" => IntakeSource::Drop,
                    "picker" | "" => IntakeSource::Picker,
                    other => {
                        return Err(AppError::Validation(format!(
                            "Unknown upload source '{other}'"
                        )))
                    }
                };
            }
            "lastModified" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                let millis: i64 = text.trim().parse().map_err(|_| {
                    AppError::Validation("lastModified must be epoch milliseconds".to_string())
                })?;
                last_modified = DateTime::from_timestamp_millis(millis);
            }
            _ => {}
        }
    }

    let (name, content_type, contents) =
        file.ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    Ok(ResumeUpload {
        source,
        file: ResumeFile {
            name,
            content_type,
            contents,
            last_modified: last_modified.unwrap_or_else(Utc::now),
        },
    })
}

/// POST /api/v1/profile/wizard/resume
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
    multipart: Multipart,
) -> Result<Json<WizardView>, AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let upload = read_resume_upload(multipart).await?;

    let mut wizard = wizard.lock().await;
    match wizard
        .attach_resume(upload.source, &upload.file, state.gateway.as_ref())
        .await
    {
        Ok(_) => Ok(Json(wizard.view())),
        Err(IntakeError::Rejected(rejection)) => {
            let mut fields = ValidationErrorMap::new();
            fields.insert("resume", rejection.to_string());
            Err(AppError::InvalidFields(fields))
        }
        Err(IntakeError::Upload(e)) => Err(AppError::Persistence(e)),
    }
}

/// POST /api/v1/profile/wizard/next
pub async fn handle_next(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
) -> Result<Json<TransitionResponse>, AppError> {
    let owner = session.user.id;
    let shared = open_wizard(&state, owner).await?;
    let mut wizard = shared.lock().await;

    let outcome = match wizard.next(state.gateway.as_ref()).await {
        StepOutcome::Advanced(_) => Transition::Advanced,
        StepOutcome::Blocked => Transition::Blocked,
        StepOutcome::Saved => Transition::Saved,
        StepOutcome::SaveFailed(e) => return Err(AppError::Persistence(e)),
    };
    if outcome == Transition::Saved {
        state.wizards.discard_if_current(owner, &shared).await;
    }
    Ok(Json(TransitionResponse::new(outcome, wizard.view())))
}

/// POST /api/v1/profile/wizard/previous
pub async fn handle_previous(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
) -> Result<Json<TransitionResponse>, AppError> {
    let wizard = open_wizard(&state, session.user.id).await?;
    let mut wizard = wizard.lock().await;
    let outcome = if wizard.previous() {
        Transition::Moved
    } else {
        Transition::Unchanged
    };
    Ok(Json(TransitionResponse::new(outcome, wizard.view())))
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    JobSeekerSession(session): JobSeekerSession,
) -> Result<Json<ProfileDocument>, AppError> {
    state
        .gateway
        .fetch_profile(session.user.id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No saved profile".to_string()))
}
