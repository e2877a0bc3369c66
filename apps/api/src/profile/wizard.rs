//! Step Controller: five steps, forward movement gated on the current step's validator,
//! persistence attempted when leaving the last step.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::profile::{EducationEntry, ExperienceEntry, ProfileDocument, ResumeDescriptor};
use crate::profile::fields::PersonalField;
use crate::profile::gateway::{GatewayError, ProfileGateway};
use crate::profile::list_editor::ListEditor;
use crate::profile::resume::{intake_resume, IntakeError, IntakeSource, ResumeFile};
use crate::profile::validation::{personal_field_error, validate_step};
use crate::validation::ValidationErrorMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    Personal,
    Education,
    Experience,
    Skills,
    Resume,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Personal,
        WizardStep::Education,
        WizardStep::Experience,
        WizardStep::Skills,
        WizardStep::Resume,
    ];

    /// 1-based position.
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Personal => "Personal",
            WizardStep::Education => "Education",
            WizardStep::Experience => "Experience",
            WizardStep::Skills => "Skills",
            WizardStep::Resume => "Resume",
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self as usize + 1).copied()
    }

    pub fn previous(self) -> Option<Self> {
        (self as usize).checked_sub(1).map(|i| Self::ALL[i])
    }
}

/// Partial PersonalInfo update; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfoPatch {
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

/// Result of `next()`.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Advanced(WizardStep),
    /// Validation failed; the error map is published on the wizard.
    Blocked,
    /// The document was stored and is now `completed`.
    Saved,
    /// The gateway refused the document; the wizard stays on the last step.
    SaveFailed(GatewayError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub step: u8,
    pub step_label: &'static str,
    pub total_steps: usize,
    pub profile: ProfileDocument,
    pub errors: ValidationErrorMap,
    pub notice: Option<String>,
}

/// One editing session. Owns the document and the published error map.
#[derive(Debug, Clone)]
pub struct ProfileWizard {
    owner: Uuid,
    step: WizardStep,
    document: ProfileDocument,
    errors: ValidationErrorMap,
    notice: Option<String>,
}

impl ProfileWizard {
    pub fn new(owner: Uuid) -> Self {
        Self {
            owner,
            step: WizardStep::Personal,
            document: ProfileDocument::default(),
            errors: ValidationErrorMap::new(),
            notice: None,
        }
    }

    /// Merges the provided fields. A field's error is cleared once its new value passes.
    pub fn update_personal(&mut self, patch: PersonalInfoPatch) {
        let info = &mut self.document.personal_info;
        let updates = [
            (PersonalField::Title, patch.title, &mut info.title),
            (PersonalField::FirstName, patch.first_name, &mut info.first_name),
            (PersonalField::LastName, patch.last_name, &mut info.last_name),
            (PersonalField::Phone, patch.phone, &mut info.phone),
            (PersonalField::Location, patch.location, &mut info.location),
            (PersonalField::Bio, patch.bio, &mut info.bio),
        ];
        let mut touched = Vec::new();
        for (field, value, slot) in updates {
            if let Some(value) = value {
                *slot = value;
                touched.push(field);
            }
        }
        for field in touched {
            if personal_field_error(&self.document.personal_info, field).is_none() {
                self.errors.clear(field.key());
            }
        }
    }

    pub fn education(&mut self) -> ListEditor<'_, EducationEntry> {
        ListEditor::new(&mut self.document.education, &mut self.errors)
    }

    pub fn experience(&mut self) -> ListEditor<'_, ExperienceEntry> {
        ListEditor::new(&mut self.document.experience, &mut self.errors)
    }

    /// Adds a trimmed skill. Empty input and duplicates are ignored (returns false).
    pub fn add_skill(&mut self, raw: &str) -> bool {
        let skill = raw.trim();
        if skill.is_empty() || self.document.skills.iter().any(|s| s == skill) {
            return false;
        }
        self.document.skills.push(skill.to_string());
        self.errors.clear("skills");
        true
    }

    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.document.skills.len();
        self.document.skills.retain(|s| s != skill);
        self.document.skills.len() != before
    }

    /// Runs resume intake. The document changes only when intake succeeds.
    pub async fn attach_resume(
        &mut self,
        source: IntakeSource,
        file: &ResumeFile,
        gateway: &dyn ProfileGateway,
    ) -> Result<&ResumeDescriptor, IntakeError> {
        match intake_resume(source, file, gateway).await {
            Ok(descriptor) => {
                self.errors.clear("resume");
                self.notice = None;
                let attached: &ResumeDescriptor = self.document.resume.insert(descriptor);
                Ok(attached)
            }
            Err(e) => {
                self.notice = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Validates the current step and advances; on the last step, saves instead.
    /// Each call reaches the gateway at most once.
    pub async fn next(&mut self, gateway: &dyn ProfileGateway) -> StepOutcome {
        if self.document.completed {
            return StepOutcome::Saved;
        }

        self.errors = validate_step(self.step, &self.document);
        if !self.errors.is_empty() {
            info!(
                "Step {} blocked for user {} with {} error(s)",
                self.step.label(),
                self.owner,
                self.errors.len()
            );
            return StepOutcome::Blocked;
        }

        if let Some(next) = self.step.next() {
            self.step = next;
            info!("User {} advanced to step {}", self.owner, next.label());
            return StepOutcome::Advanced(next);
        }

        self.notice = None;
        match gateway
            .save_profile(self.owner, self.document.clone())
            .await
        {
            Ok(saved) => {
                self.document = saved;
                self.document.completed = true;
                info!("Profile wizard completed for user {}", self.owner);
                StepOutcome::Saved
            }
            Err(e) => {
                warn!("Profile save failed for user {}: {e}", self.owner);
                self.notice = Some(e.to_string());
                StepOutcome::SaveFailed(e)
            }
        }
    }

    /// Steps back without validating. Returns false on the first step.
    pub fn previous(&mut self) -> bool {
        match self.step.previous() {
            Some(prev) => {
                self.step = prev;
                true
            }
            None => false,
        }
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            step: self.step.number(),
            step_label: self.step.label(),
            total_steps: WizardStep::ALL.len(),
            profile: self.document.clone(),
            errors: self.errors.clone(),
            notice: self.notice.clone(),
        }
    }
}

#[cfg(test)]
impl ProfileWizard {
    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn document(&self) -> &ProfileDocument {
        &self.document
    }

    pub fn errors(&self) -> &ValidationErrorMap {
        &self.errors
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::ResumeKind;
    use crate::profile::fields::{EducationField, ExperienceField};
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls; saves fail while `fail_saves` is set, uploads while `fail_uploads` is.
    struct ScriptedGateway {
        saves: AtomicUsize,
        fail_saves: bool,
        fail_uploads: bool,
    }

    impl ScriptedGateway {
        fn new(fail_saves: bool) -> Self {
            Self {
                saves: AtomicUsize::new(0),
                fail_saves,
                fail_uploads: false,
            }
        }

        fn failing_uploads() -> Self {
            Self {
                fail_uploads: true,
                ..Self::new(false)
            }
        }
    }

    #[async_trait]
    impl ProfileGateway for ScriptedGateway {
        async fn save_profile(
            &self,
            _owner: Uuid,
            mut document: ProfileDocument,
        ) -> Result<ProfileDocument, GatewayError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail_saves {
                return Err(GatewayError::SaveFailed("backend unavailable".to_string()));
            }
            document.completed = true;
            Ok(document)
        }

        async fn upload_resume(
            &self,
            file: &ResumeFile,
            kind: ResumeKind,
        ) -> Result<ResumeDescriptor, GatewayError> {
            if self.fail_uploads {
                return Err(GatewayError::UploadFailed("storage offline".to_string()));
            }
            Ok(crate::profile::resume::describe_resume(file, kind))
        }

        async fn fetch_profile(
            &self,
            _owner: Uuid,
        ) -> Result<Option<ProfileDocument>, GatewayError> {
            Ok(None)
        }

        fn backend(&self) -> &'static str {
            "scripted"
        }
    }

    fn ann_lee_patch() -> PersonalInfoPatch {
        PersonalInfoPatch {
            first_name: Some("Ann".to_string()),
            last_name: Some("Lee".to_string()),
            phone: Some("+1 555-000-1111".to_string()),
            location: Some("Austin, TX".to_string()),
            ..Default::default()
        }
    }

    fn pdf() -> ResumeFile {
        ResumeFile {
            name: "ann-lee.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            contents: Bytes::from_static(b"%PDF-1.7"),
            last_modified: Utc::now(),
        }
    }

    /// Fills every step and walks to Resume.
    async fn wizard_on_last_step(gateway: &dyn ProfileGateway) -> ProfileWizard {
        let mut wizard = ProfileWizard::new(Uuid::new_v4());
        wizard.update_personal(ann_lee_patch());
        assert_eq!(
            wizard.next(gateway).await,
            StepOutcome::Advanced(WizardStep::Education)
        );

        let mut edu = wizard.education();
        edu.update(1, EducationField::Institution, "UT Austin".into())
            .unwrap();
        edu.update(1, EducationField::Degree, "BSc".into()).unwrap();
        edu.update(1, EducationField::StartDate, "2015-09".into())
            .unwrap();
        edu.update(1, EducationField::EndDate, "2019-06".into())
            .unwrap();
        assert_eq!(
            wizard.next(gateway).await,
            StepOutcome::Advanced(WizardStep::Experience)
        );

        let mut exp = wizard.experience();
        exp.update(1, ExperienceField::Company, "Acme".into()).unwrap();
        exp.update(1, ExperienceField::Title, "Engineer".into())
            .unwrap();
        exp.update(1, ExperienceField::StartDate, "2019-07".into())
            .unwrap();
        exp.update(1, ExperienceField::Current, true.into()).unwrap();
        assert_eq!(
            wizard.next(gateway).await,
            StepOutcome::Advanced(WizardStep::Skills)
        );

        assert!(wizard.add_skill("Rust"));
        assert_eq!(
            wizard.next(gateway).await,
            StepOutcome::Advanced(WizardStep::Resume)
        );

        wizard
            .attach_resume(IntakeSource::Picker, &pdf(), gateway)
            .await
            .unwrap();
        wizard
    }

    #[test]
    fn test_step_sequence() {
        assert_eq!(WizardStep::Personal.number(), 1);
        assert_eq!(WizardStep::Resume.number(), 5);
        assert_eq!(WizardStep::Personal.previous(), None);
        assert_eq!(WizardStep::Resume.next(), None);
        assert_eq!(WizardStep::Skills.next(), Some(WizardStep::Resume));
        assert_eq!(WizardStep::Education.previous(), Some(WizardStep::Personal));
    }

    #[tokio::test]
    async fn test_fresh_session_starts_on_personal() {
        let wizard = ProfileWizard::new(Uuid::new_v4());
        let view = wizard.view();
        assert_eq!(view.step, 1);
        assert_eq!(view.step_label, "Personal");
        assert_eq!(view.total_steps, 5);
        assert!(view.errors.is_empty());
        assert_eq!(view.profile, ProfileDocument::default());
    }

    #[tokio::test]
    async fn test_empty_education_blocks_on_step_two() {
        let gateway = ScriptedGateway::new(false);
        let mut wizard = ProfileWizard::new(Uuid::new_v4());
        wizard.update_personal(ann_lee_patch());
        assert_eq!(
            wizard.next(&gateway).await,
            StepOutcome::Advanced(WizardStep::Education)
        );

        assert_eq!(wizard.next(&gateway).await, StepOutcome::Blocked);
        assert_eq!(wizard.step(), WizardStep::Education);
        for key in [
            "education_0_institution",
            "education_0_degree",
            "education_0_startDate",
        ] {
            assert!(wizard.errors().contains_key(key), "missing {key}");
        }

        // Still blocked on repeat.
        assert_eq!(wizard.next(&gateway).await, StepOutcome::Blocked);
        assert_eq!(wizard.step(), WizardStep::Education);
    }

    #[tokio::test]
    async fn test_blocked_next_never_moves_from_any_step() {
        let gateway = ScriptedGateway::new(false);
        let mut wizard = wizard_on_last_step(&gateway).await;
        // Walk back and break each step in turn.
        wizard.document.resume = None;
        assert_eq!(wizard.next(&gateway).await, StepOutcome::Blocked);
        assert_eq!(wizard.step(), WizardStep::Resume);

        assert!(wizard.previous());
        assert!(wizard.remove_skill("Rust"));
        assert_eq!(wizard.next(&gateway).await, StepOutcome::Blocked);
        assert_eq!(wizard.step(), WizardStep::Skills);

        assert!(wizard.previous());
        wizard
            .experience()
            .update(1, ExperienceField::Company, " ".into())
            .unwrap();
        assert_eq!(wizard.next(&gateway).await, StepOutcome::Blocked);
        assert_eq!(wizard.step(), WizardStep::Experience);
        assert!(wizard.errors().contains_key("experience_0_company"));
        assert_eq!(gateway.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_personal_errors_clear_as_fields_become_valid() {
        let gateway = ScriptedGateway::new(false);
        let mut wizard = ProfileWizard::new(Uuid::new_v4());
        assert_eq!(wizard.next(&gateway).await, StepOutcome::Blocked);
        assert_eq!(wizard.errors().len(), 4);

        wizard.update_personal(PersonalInfoPatch {
            first_name: Some("Ann".to_string()),
            phone: Some("nope".to_string()),
            ..Default::default()
        });
        assert!(!wizard.errors().contains_key("firstName"));
        // Still invalid, so the message stays.
        assert!(wizard.errors().contains_key("phone"));
        assert!(wizard.errors().contains_key("lastName"));
    }

    #[tokio::test]
    async fn test_previous_floors_at_first_step_and_skips_validation() {
        let gateway = ScriptedGateway::new(false);
        let mut wizard = ProfileWizard::new(Uuid::new_v4());
        assert!(!wizard.previous());
        assert_eq!(wizard.step(), WizardStep::Personal);

        wizard.update_personal(ann_lee_patch());
        wizard.next(&gateway).await;
        // Education is still blank; going back is allowed anyway.
        assert!(wizard.previous());
        assert_eq!(wizard.step(), WizardStep::Personal);
    }

    #[tokio::test]
    async fn test_last_step_saves_exactly_once() {
        let gateway = ScriptedGateway::new(false);
        let mut wizard = wizard_on_last_step(&gateway).await;
        assert_eq!(wizard.next(&gateway).await, StepOutcome::Saved);
        assert_eq!(gateway.saves.load(Ordering::SeqCst), 1);
        assert!(wizard.document().completed);
        assert_eq!(wizard.step(), WizardStep::Resume);

        // A completed session does not save again.
        assert_eq!(wizard.next(&gateway).await, StepOutcome::Saved);
        assert_eq!(gateway.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_document_and_allows_retry() {
        let failing = ScriptedGateway::new(true);
        let mut wizard = wizard_on_last_step(&failing).await;
        let before = wizard.document().clone();

        let outcome = wizard.next(&failing).await;
        assert!(matches!(outcome, StepOutcome::SaveFailed(_)));
        assert_eq!(failing.saves.load(Ordering::SeqCst), 1);
        assert_eq!(wizard.step(), WizardStep::Resume);
        assert!(!wizard.document().completed);
        assert_eq!(wizard.document(), &before);
        assert_eq!(wizard.notice(), Some("backend unavailable"));

        // Second click is a second, independent attempt.
        wizard.next(&failing).await;
        assert_eq!(failing.saves.load(Ordering::SeqCst), 2);

        let working = ScriptedGateway::new(false);
        assert_eq!(wizard.next(&working).await, StepOutcome::Saved);
        assert!(wizard.notice().is_none());
        assert!(wizard.document().completed);
    }

    #[tokio::test]
    async fn test_rejected_resume_leaves_document_untouched() {
        let gateway = ScriptedGateway::new(false);
        let mut wizard = ProfileWizard::new(Uuid::new_v4());
        let png = ResumeFile {
            name: "me.png".to_string(),
            content_type: "image/png".to_string(),
            contents: Bytes::from_static(b"\x89PNG"),
            last_modified: Utc::now(),
        };
        assert!(wizard
            .attach_resume(IntakeSource::Drop, &png, &gateway)
            .await
            .is_err());
        assert!(wizard.document().resume.is_none());
        assert_eq!(
            wizard.notice(),
            Some("Please upload a PDF or Word document")
        );
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_attached_resume() {
        let gateway = ScriptedGateway::new(false);
        let mut wizard = wizard_on_last_step(&gateway).await;
        let attached = wizard.document().resume.clone();
        assert!(attached.is_some());

        let replacement = ResumeFile {
            name: "ann-lee-2024.docx".to_string(),
            content_type: ResumeKind::Docx.mime().to_string(),
            contents: Bytes::from_static(b"PK"),
            last_modified: Utc::now(),
        };
        let offline = ScriptedGateway::failing_uploads();
        let err = wizard
            .attach_resume(IntakeSource::Drop, &replacement, &offline)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IntakeError::Upload(GatewayError::UploadFailed(_))
        ));
        assert_eq!(wizard.document().resume, attached);
        assert_eq!(wizard.notice(), Some("storage offline"));

        // The earlier resume still satisfies the last step.
        assert_eq!(wizard.next(&gateway).await, StepOutcome::Saved);
    }

    #[tokio::test]
    async fn test_skills_are_trimmed_and_unique() {
        let mut wizard = ProfileWizard::new(Uuid::new_v4());
        wizard.errors.insert("skills", "Please add at least one skill");
        assert!(wizard.add_skill("  Rust "));
        assert!(!wizard.add_skill("Rust"));
        assert!(!wizard.add_skill("   "));
        assert!(wizard.add_skill("SQL"));
        assert_eq!(wizard.document().skills, vec!["Rust", "SQL"]);
        assert!(!wizard.errors().contains_key("skills"));
        assert!(wizard.remove_skill("Rust"));
        assert!(!wizard.remove_skill("Rust"));
    }
}
