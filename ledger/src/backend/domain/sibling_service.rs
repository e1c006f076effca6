//! Sibling detection.
//!
//! Students whose guardians share a normalized identity form a sibling set.
//! The join key is computed once per roster load and indexed in both
//! directions so that discount eligibility is a map lookup.

use log::debug;
use std::collections::{BTreeMap, HashMap};

use crate::backend::domain::errors::LedgerResult;
use crate::backend::domain::models::{GuardianKey, Student};
use crate::backend::storage::{Connection, RosterStorage, SiblingPolicy};

/// Group students by guardian. Only groups with two or more members are
/// returned; members keep their roster order and groups are ordered by key.
pub fn detect_siblings(students: &[Student]) -> BTreeMap<GuardianKey, Vec<Student>> {
    let mut groups: BTreeMap<GuardianKey, Vec<Student>> = BTreeMap::new();
    for student in students {
        if let Some(key) = student.guardian_key() {
            groups.entry(key).or_default().push(student.clone());
        }
    }
    groups.retain(|_, members| members.len() >= 2);
    groups
}

/// Sibling sets indexed by guardian key and by student id
#[derive(Debug, Clone, Default)]
pub struct SiblingIndex {
    groups: BTreeMap<GuardianKey, Vec<Student>>,
    by_student: HashMap<String, GuardianKey>,
}

impl SiblingIndex {
    pub fn build(students: &[Student]) -> Self {
        let groups = detect_siblings(students);
        let by_student = groups
            .iter()
            .flat_map(|(key, members)| members.iter().map(move |m| (m.id.clone(), key.clone())))
            .collect();
        Self { groups, by_student }
    }

    pub fn groups(&self) -> &BTreeMap<GuardianKey, Vec<Student>> {
        &self.groups
    }

    pub fn into_groups(self) -> BTreeMap<GuardianKey, Vec<Student>> {
        self.groups
    }

    pub fn key_for(&self, student_id: &str) -> Option<&GuardianKey> {
        self.by_student.get(student_id)
    }

    /// All members of the student's sibling set, the student included
    pub fn siblings_of(&self, student_id: &str) -> &[Student] {
        self.key_for(student_id)
            .and_then(|key| self.groups.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether the student receives sibling discounts under `policy`
    pub fn is_eligible(&self, student_id: &str, policy: SiblingPolicy) -> bool {
        let members = self.siblings_of(student_id);
        match policy {
            SiblingPolicy::AllMembers => !members.is_empty(),
            SiblingPolicy::ExceptFirst => members
                .first()
                .map(|first| first.id != student_id)
                .unwrap_or(false),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Clone)]
pub struct SiblingService<C: Connection> {
    roster_repository: C::RosterRepository,
}

impl<C: Connection> SiblingService<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            roster_repository: connection.create_roster_repository(),
        }
    }

    /// Index the active roster. Inactive students never join a set.
    pub fn build_index(&self) -> LedgerResult<SiblingIndex> {
        let students: Vec<Student> = self
            .roster_repository
            .list_students()?
            .into_iter()
            .filter(Student::is_active)
            .collect();
        let index = SiblingIndex::build(&students);
        debug!("Detected {} sibling sets among {} active students", index.len(), students.len());
        Ok(index)
    }

    pub fn detect(&self) -> LedgerResult<BTreeMap<GuardianKey, Vec<Student>>> {
        Ok(self.build_index()?.into_groups())
    }
}
