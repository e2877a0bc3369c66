use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field key → human-readable message.
///
/// Personal-info fields use the plain field name (`firstName`); list entries use
/// `<section>_<index>_<field>` (`education_0_startDate`), see [`entry_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrorMap(BTreeMap<String, String>);

/// Builds the key for a field of the entry at `index` in a list section.
pub fn entry_key(section: &str, index: usize, field: &str) -> String {
    format!("{section}_{index}_{field}")
}

impl ValidationErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    /// Removes a single key. Returns whether it was present.
    pub fn clear(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[cfg(test)]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when no field failed.
    pub fn into_result(self) -> Result<(), ValidationErrorMap> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Drops the keys of the entry removed at `index` and renumbers the keys of the
    /// entries that followed it, so every key keeps pointing at the same entry.
    pub fn forget_entry(&mut self, section: &str, index: usize) {
        let prefix = format!("{section}_");
        let mut kept = BTreeMap::new();
        for (key, message) in std::mem::take(&mut self.0) {
            let Some((entry_index, field)) = key
                .strip_prefix(&prefix)
                .and_then(|rest| rest.split_once('_'))
                .and_then(|(i, field)| i.parse::<usize>().ok().map(|i| (i, field)))
            else {
                kept.insert(key, message);
                continue;
            };
            if entry_index == index {
                continue;
            }
            let new_index = if entry_index > index {
                entry_index - 1
            } else {
                entry_index
            };
            kept.insert(entry_key(section, new_index, field), message);
        }
        self.0 = kept;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_key_format() {
        assert_eq!(entry_key("education", 0, "startDate"), "education_0_startDate");
    }

    #[test]
    fn test_clear_single_key() {
        let mut errors = ValidationErrorMap::new();
        errors.insert("firstName", "First name is required");
        errors.insert("lastName", "Last name is required");
        assert!(errors.clear("firstName"));
        assert!(!errors.clear("firstName"));
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("lastName"));
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrorMap::new().into_result().is_ok());
        let mut errors = ValidationErrorMap::new();
        errors.insert("skills", "Please add at least one skill");
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_forget_entry_renumbers_following_entries() {
        let mut errors = ValidationErrorMap::new();
        errors.insert("education_0_degree", "Degree is required");
        errors.insert("education_1_institution", "Institution is required");
        errors.insert("education_2_startDate", "Start date is required");
        errors.insert("experience_1_company", "Company is required");
        errors.insert("firstName", "First name is required");

        errors.forget_entry("education", 1);

        assert_eq!(errors.get("education_0_degree"), Some("Degree is required"));
        assert!(!errors.contains_key("education_1_institution"));
        assert_eq!(
            errors.get("education_1_startDate"),
            Some("Start date is required")
        );
        assert!(!errors.contains_key("education_2_startDate"));
        assert!(errors.contains_key("experience_1_company"));
        assert!(errors.contains_key("firstName"));
    }
}
