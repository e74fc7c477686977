use std::collections::BTreeMap;

use crate::models::{MentorId, MentorProfile, Role, StudentId, StudentProfile};
use crate::seed;

/// Typed lookup tables for everyone who can sign in. Fixed for the session.
#[derive(Debug, Clone)]
pub struct Directory {
    students: BTreeMap<StudentId, StudentProfile>,
    mentors: BTreeMap<MentorId, MentorProfile>,
    assignments: BTreeMap<StudentId, MentorId>,
}

impl Directory {
    pub fn new(
        students: Vec<StudentProfile>,
        mentors: Vec<MentorProfile>,
        assignments: Vec<(StudentId, MentorId)>,
    ) -> Self {
        Self {
            students: students.into_iter().map(|s| (s.id.clone(), s)).collect(),
            mentors: mentors.into_iter().map(|m| (m.id.clone(), m)).collect(),
            assignments: assignments.into_iter().collect(),
        }
    }

    pub fn seeded() -> Self {
        Self::new(seed::students(), seed::mentors(), seed::mentor_assignments())
    }

    pub fn student(&self, id: &StudentId) -> Option<&StudentProfile> {
        self.students.get(id)
    }

    pub fn mentor(&self, id: &MentorId) -> Option<&MentorProfile> {
        self.mentors.get(id)
    }

    #[cfg(test)]
    pub fn students(&self) -> impl Iterator<Item = &StudentProfile> {
        self.students.values()
    }

    pub fn mentor_of(&self, student: &StudentId) -> Option<&MentorProfile> {
        self.assignments
            .get(student)
            .and_then(|mentor| self.mentors.get(mentor))
    }

    pub fn mentees_of(&self, mentor: &MentorId) -> Vec<&StudentProfile> {
        self.assignments
            .iter()
            .filter(|(_, assigned)| *assigned == mentor)
            .filter_map(|(student, _)| self.students.get(student))
            .collect()
    }

    pub fn is_mentee(&self, mentor: &MentorId, student: &StudentId) -> bool {
        self.assignments.get(student) == Some(mentor)
    }

    /// Whether `id` names someone who may sign in under `role`.
    pub fn contains(&self, role: Role, id: &str) -> bool {
        match role {
            Role::Student => self.students.contains_key(&StudentId::new(id)),
            Role::Mentor => self.mentors.contains_key(&MentorId::new(id)),
        }
    }

    /// The first three ids and names, shown under the sign-in form.
    pub fn sign_in_hints(&self, role: Role) -> Vec<(String, String)> {
        match role {
            Role::Student => self
                .students
                .values()
                .take(3)
                .map(|s| (s.id.to_string(), s.name.clone()))
                .collect(),
            Role::Mentor => self
                .mentors
                .values()
                .take(3)
                .map(|m| (m.id.to_string(), m.name.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_explicit_about_missing_ids() {
        let directory = Directory::seeded();
        assert_eq!(
            directory.student(&StudentId::new("205631")).map(|s| s.name.as_str()),
            Some("Aisha Khan")
        );
        assert!(directory.student(&StudentId::new("999999")).is_none());
        assert!(directory.mentor(&MentorId::new("M009")).is_none());
    }

    #[test]
    fn mentees_follow_assignments() {
        let directory = Directory::seeded();
        let names: Vec<&str> = directory
            .mentees_of(&MentorId::new("M001"))
            .into_iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ahmed Hassan", "Aisha Khan"]);
        assert_eq!(
            directory.mentor_of(&StudentId::new("216037")).map(|m| m.name.as_str()),
            Some("Prof. Sarah Johnson")
        );
    }

    #[test]
    fn hints_list_three_entries() {
        let directory = Directory::seeded();
        assert_eq!(directory.sign_in_hints(Role::Mentor).len(), 3);
        assert_eq!(directory.sign_in_hints(Role::Student)[0].0, "201788");
    }
}
