use crate::models::profile::{
    EducationEntry, ExperienceEntry, PersonalInfo, ProfileDocument, ResumeDescriptor,
};
use crate::profile::fields::PersonalField;
use crate::profile::list_editor::ListEntry;
use crate::profile::wizard::WizardStep;
use crate::validation::{entry_key, is_valid_phone, ValidationErrorMap};

/// Message for a single personal-info field, or `None` when it is acceptable.
/// Title and bio are optional.
pub fn personal_field_error(info: &PersonalInfo, field: PersonalField) -> Option<&'static str> {
    match field {
        PersonalField::FirstName if info.first_name.trim().is_empty() => {
            Some("First name is required")
        }
        PersonalField::LastName if info.last_name.trim().is_empty() => {
            Some("Last name is required")
        }
        PersonalField::Phone if info.phone.trim().is_empty() => Some("Phone number is required"),
        PersonalField::Phone if !is_valid_phone(&info.phone) => {
            Some("Please enter a valid phone number")
        }
        PersonalField::Location if info.location.trim().is_empty() => {
            Some("Location is required")
        }
        _ => None,
    }
}

pub fn validate_personal_info(info: &PersonalInfo) -> ValidationErrorMap {
    let mut errors = ValidationErrorMap::new();
    for field in [
        PersonalField::FirstName,
        PersonalField::LastName,
        PersonalField::Phone,
        PersonalField::Location,
    ] {
        if let Some(message) = personal_field_error(info, field) {
            errors.insert(field.key(), message);
        }
    }
    errors
}

/// Start date is always required; end date only while `current` is false.
fn check_dates(
    section: &str,
    index: usize,
    start_date: &str,
    end_date: &str,
    current: bool,
    errors: &mut ValidationErrorMap,
) {
    if start_date.trim().is_empty() {
        errors.insert(entry_key(section, index, "startDate"), "Start date is required");
    }
    if !current && end_date.trim().is_empty() {
        errors.insert(
            entry_key(section, index, "endDate"),
            "End date is required when not current",
        );
    }
}

pub fn validate_education(entries: &[EducationEntry]) -> ValidationErrorMap {
    let section = EducationEntry::SECTION;
    let mut errors = ValidationErrorMap::new();
    for (index, edu) in entries.iter().enumerate() {
        if edu.institution.trim().is_empty() {
            errors.insert(
                entry_key(section, index, "institution"),
                "Institution is required",
            );
        }
        if edu.degree.trim().is_empty() {
            errors.insert(entry_key(section, index, "degree"), "Degree is required");
        }
        check_dates(
            section,
            index,
            &edu.start_date,
            &edu.end_date,
            edu.current,
            &mut errors,
        );
    }
    errors
}

pub fn validate_experience(entries: &[ExperienceEntry]) -> ValidationErrorMap {
    let section = ExperienceEntry::SECTION;
    let mut errors = ValidationErrorMap::new();
    for (index, exp) in entries.iter().enumerate() {
        if exp.company.trim().is_empty() {
            errors.insert(entry_key(section, index, "company"), "Company is required");
        }
        if exp.title.trim().is_empty() {
            errors.insert(entry_key(section, index, "title"), "Job title is required");
        }
        check_dates(
            section,
            index,
            &exp.start_date,
            &exp.end_date,
            exp.current,
            &mut errors,
        );
    }
    errors
}

pub fn validate_skills(skills: &[String]) -> ValidationErrorMap {
    let mut errors = ValidationErrorMap::new();
    if skills.is_empty() {
        errors.insert("skills", "Please add at least one skill");
    }
    errors
}

pub fn validate_resume(resume: Option<&ResumeDescriptor>) -> ValidationErrorMap {
    let mut errors = ValidationErrorMap::new();
    if resume.is_none() {
        errors.insert("resume", "Please upload your resume");
    }
    errors
}

/// Runs the validator that gates leaving `step`.
pub fn validate_step(step: WizardStep, doc: &ProfileDocument) -> ValidationErrorMap {
    match step {
        WizardStep::Personal => validate_personal_info(&doc.personal_info),
        WizardStep::Education => validate_education(&doc.education),
        WizardStep::Experience => validate_experience(&doc.experience),
        WizardStep::Skills => validate_skills(&doc.skills),
        WizardStep::Resume => validate_resume(doc.resume.as_ref()),
    }
}
