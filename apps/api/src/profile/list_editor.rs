//! Add / update / remove over the education and experience lists.
//!
//! Entry ids are synthetic: `max(existing ids) + 1`, or 1 for an empty list. Ids are
//! only unique within the current list. Removing the highest-id entry and then adding
//! hands the same id out again; nothing else in the profile refers to entry ids, so
//! reuse is harmless as long as the id is never present twice at once.

use crate::models::profile::{EducationEntry, ExperienceEntry};
use crate::profile::fields::{
    EducationField, EntryField, ExperienceField, FieldValue, FieldValueError,
};
use crate::validation::{entry_key, ValidationErrorMap};

pub trait ListEntry {
    type Field: EntryField;

    /// Prefix of this list's error keys.
    const SECTION: &'static str;

    /// A blank entry carrying `id`.
    fn blank(id: u32) -> Self;

    fn id(&self) -> u32;

    /// Replaces exactly one field.
    fn apply(&mut self, field: Self::Field, value: FieldValue) -> Result<(), FieldValueError>;
}

impl ListEntry for EducationEntry {
    type Field = EducationField;
    const SECTION: &'static str = "education";

    fn blank(id: u32) -> Self {
        EducationEntry {
            id,
            ..Default::default()
        }
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn apply(&mut self, field: EducationField, value: FieldValue) -> Result<(), FieldValueError> {
        let key = field.key();
        match field {
            EducationField::Institution => self.institution = value.into_text(key)?,
            EducationField::Degree => self.degree = value.into_text(key)?,
            EducationField::FieldOfStudy => self.field_of_study = value.into_text(key)?,
            EducationField::StartDate => self.start_date = value.into_text(key)?,
            EducationField::EndDate => self.end_date = value.into_text(key)?,
            EducationField::Current => self.current = value.into_flag(key)?,
            EducationField::Description => self.description = value.into_text(key)?,
        }
        Ok(())
    }
}

impl ListEntry for ExperienceEntry {
    type Field = ExperienceField;
    const SECTION: &'static str = "experience";

    fn blank(id: u32) -> Self {
        ExperienceEntry {
            id,
            ..Default::default()
        }
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn apply(&mut self, field: ExperienceField, value: FieldValue) -> Result<(), FieldValueError> {
        let key = field.key();
        match field {
            ExperienceField::Company => self.company = value.into_text(key)?,
            ExperienceField::Title => self.title = value.into_text(key)?,
            ExperienceField::Location => self.location = value.into_text(key)?,
            ExperienceField::StartDate => self.start_date = value.into_text(key)?,
            ExperienceField::EndDate => self.end_date = value.into_text(key)?,
            ExperienceField::Current => self.current = value.into_flag(key)?,
            ExperienceField::Description => self.description = value.into_text(key)?,
        }
        Ok(())
    }
}

/// Next synthetic id for `entries`.
pub fn next_id<E: ListEntry>(entries: &[E]) -> u32 {
    entries.iter().map(ListEntry::id).max().unwrap_or(0) + 1
}

/// Borrowed view over one list plus the wizard's error map.
///
/// The editor does not stop the last entry from being removed; callers that need at
/// least one entry to remain check [`ListEditor::len`] first.
pub struct ListEditor<'a, E: ListEntry> {
    entries: &'a mut Vec<E>,
    errors: &'a mut ValidationErrorMap,
}

impl<'a, E: ListEntry> ListEditor<'a, E> {
    pub fn new(entries: &'a mut Vec<E>, errors: &'a mut ValidationErrorMap) -> Self {
        Self { entries, errors }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.entries.iter().any(|e| e.id() == id)
    }

    /// Appends a blank entry and returns its id.
    pub fn add(&mut self) -> u32 {
        let id = next_id(self.entries.as_slice());
        self.entries.push(E::blank(id));
        id
    }

    /// Sets one field of the entry with `id` and clears that field's error.
    /// Returns `Ok(false)` when no entry has that id (nothing changes).
    pub fn update(
        &mut self,
        id: u32,
        field: E::Field,
        value: FieldValue,
    ) -> Result<bool, FieldValueError> {
        let Some(index) = self.entries.iter().position(|e| e.id() == id) else {
            return Ok(false);
        };
        self.entries[index].apply(field, value)?;
        self.errors.clear(&entry_key(E::SECTION, index, field.key()));
        Ok(true)
    }

    /// Removes the entry with `id`. Returns whether one was removed.
    pub fn remove(&mut self, id: u32) -> bool {
        let Some(index) = self.entries.iter().position(|e| e.id() == id) else {
            return false;
        };
        self.entries.remove(index);
        self.errors.forget_entry(E::SECTION, index);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Vec<EducationEntry> {
        vec![EducationEntry::blank(1)]
    }

    #[test]
    fn test_add_uses_max_plus_one() {
        let mut entries = seeded();
        let mut errors = ValidationErrorMap::new();
        let mut editor = ListEditor::new(&mut entries, &mut errors);
        assert_eq!(editor.add(), 2);
        assert_eq!(editor.add(), 3);
        assert_eq!(editor.len(), 3);
    }

    #[test]
    fn test_add_to_empty_list_starts_at_one() {
        let mut entries: Vec<ExperienceEntry> = Vec::new();
        let mut errors = ValidationErrorMap::new();
        let mut editor = ListEditor::new(&mut entries, &mut errors);
        assert_eq!(editor.add(), 1);
    }

    #[test]
    fn test_add_after_gap_follows_highest_id() {
        let mut entries = vec![EducationEntry::blank(1), EducationEntry::blank(7)];
        assert_eq!(next_id(&entries), 8);
        entries.retain(|e| e.id != 7);
        assert_eq!(next_id(&entries), 2);
    }

    #[test]
    fn test_add_remove_add_never_collides_with_live_ids() {
        // Highest id removed and re-issued: allowed, it is no longer in the list.
        let mut entries: Vec<EducationEntry> = Vec::new();
        let mut errors = ValidationErrorMap::new();
        let mut editor = ListEditor::new(&mut entries, &mut errors);
        let first = editor.add();
        let second = editor.add();
        assert!(editor.remove(second));
        let third = editor.add();
        assert_eq!(third, second);
        assert_ne!(third, first);

        // Removing a lower id never lets a new id collide with the survivors.
        assert!(editor.remove(first));
        let fourth = editor.add();
        assert_ne!(fourth, third);
        drop(editor);
        let mut ids: Vec<u32> = entries.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), entries.len());
    }

    #[test]
    fn test_update_replaces_only_named_field() {
        let mut entries = seeded();
        entries[0].degree = "BSc".to_string();
        let mut errors = ValidationErrorMap::new();
        let mut editor = ListEditor::new(&mut entries, &mut errors);
        assert_eq!(
            editor.update(1, EducationField::Institution, "MIT".into()),
            Ok(true)
        );
        assert_eq!(entries[0].institution, "MIT");
        assert_eq!(entries[0].degree, "BSc");
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut entries = seeded();
        let before = entries.clone();
        let mut errors = ValidationErrorMap::new();
        let mut editor = ListEditor::new(&mut entries, &mut errors);
        assert_eq!(
            editor.update(42, EducationField::Institution, "MIT".into()),
            Ok(false)
        );
        assert_eq!(entries, before);
    }

    #[test]
    fn test_update_clears_error_for_that_index_and_field_only() {
        let mut entries = vec![EducationEntry::blank(1), EducationEntry::blank(2)];
        let mut errors = ValidationErrorMap::new();
        errors.insert("education_1_institution", "Institution is required");
        errors.insert("education_1_degree", "Degree is required");
        errors.insert("education_0_institution", "Institution is required");

        let mut editor = ListEditor::new(&mut entries, &mut errors);
        editor
            .update(2, EducationField::Institution, "MIT".into())
            .unwrap();

        assert!(!errors.contains_key("education_1_institution"));
        assert!(errors.contains_key("education_1_degree"));
        assert!(errors.contains_key("education_0_institution"));
    }

    #[test]
    fn test_update_type_mismatch_changes_nothing() {
        let mut entries = vec![ExperienceEntry::blank(1)];
        let mut errors = ValidationErrorMap::new();
        errors.insert("experience_0_current", "stale");
        let mut editor = ListEditor::new(&mut entries, &mut errors);
        assert!(editor
            .update(1, ExperienceField::Current, "yes".into())
            .is_err());
        assert!(!entries[0].current);
        assert!(errors.contains_key("experience_0_current"));
    }

    #[test]
    fn test_current_flag_update() {
        let mut entries = vec![ExperienceEntry::blank(1)];
        let mut errors = ValidationErrorMap::new();
        let mut editor = ListEditor::new(&mut entries, &mut errors);
        editor.update(1, ExperienceField::Current, true.into()).unwrap();
        assert!(entries[0].current);
    }

    #[test]
    fn test_remove_does_not_guard_last_entry() {
        let mut entries = seeded();
        let mut errors = ValidationErrorMap::new();
        let mut editor = ListEditor::new(&mut entries, &mut errors);
        assert!(editor.remove(1));
        assert!(editor.is_empty());
        assert!(!editor.remove(1));
    }
}
