use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Editable PersonalInfo fields. `key()` is the error-map key and the wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonalField {
    Title,
    FirstName,
    LastName,
    Phone,
    Location,
    Bio,
}

impl PersonalField {
    pub fn key(self) -> &'static str {
        match self {
            PersonalField::Title => "title",
            PersonalField::FirstName => "firstName",
            PersonalField::LastName => "lastName",
            PersonalField::Phone => "phone",
            PersonalField::Location => "location",
            PersonalField::Bio => "bio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EducationField {
    Institution,
    Degree,
    FieldOfStudy,
    StartDate,
    EndDate,
    Current,
    Description,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExperienceField {
    Company,
    Title,
    Location,
    StartDate,
    EndDate,
    Current,
    Description,
}

/// A field of a list entry, addressable by its camelCase key.
pub trait EntryField: Copy {
    fn key(self) -> &'static str;
}

impl EntryField for EducationField {
    fn key(self) -> &'static str {
        match self {
            EducationField::Institution => "institution",
            EducationField::Degree => "degree",
            EducationField::FieldOfStudy => "fieldOfStudy",
            EducationField::StartDate => "startDate",
            EducationField::EndDate => "endDate",
            EducationField::Current => "current",
            EducationField::Description => "description",
        }
    }
}

impl EntryField for ExperienceField {
    fn key(self) -> &'static str {
        match self {
            ExperienceField::Company => "company",
            ExperienceField::Title => "title",
            ExperienceField::Location => "location",
            ExperienceField::StartDate => "startDate",
            ExperienceField::EndDate => "endDate",
            ExperienceField::Current => "current",
            ExperienceField::Description => "description",
        }
    }
}

/// New value for a single entry field: text for everything except `current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldValueError {
    #[error("Field '{0}' expects true or false")]
    ExpectedFlag(&'static str),

    #[error("Field '{0}' expects a text value")]
    ExpectedText(&'static str),
}

impl FieldValue {
    pub(crate) fn into_text(self, field: &'static str) -> Result<String, FieldValueError> {
        match self {
            FieldValue::Text(s) => Ok(s),
            FieldValue::Flag(_) => Err(FieldValueError::ExpectedText(field)),
        }
    }

    pub(crate) fn into_flag(self, field: &'static str) -> Result<bool, FieldValueError> {
        match self {
            FieldValue::Flag(b) => Ok(b),
            FieldValue::Text(_) => Err(FieldValueError::ExpectedFlag(field)),
        }
    }
}
