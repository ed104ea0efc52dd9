//! Deduplication of subjects.
//!
//! Two subjects describe the same artifact when their names are equal and
//! their digest sets agree on at least one `(algorithm, hex)` pair. Other
//! algorithms may differ; a match folds the newer digests into the entry
//! already collected.

use crate::model::Subject;

/// Whether `a` and `b` name the same artifact.
pub fn same_artifact(a: &Subject, b: &Subject) -> bool {
    a.name == b.name
        && a
            .digest
            .iter()
            .any(|(algorithm, hex)| b.digest.get(algorithm) == Some(hex))
}

/// What [`SubjectSet::upsert`] did with a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// Folded into the entry at this index
    Merged(usize),
    /// Appended at this index
    Appended(usize),
}

/// Ordered accumulator of distinct subjects.
///
/// Owns the digest sets it holds and mutates them in place when a duplicate
/// arrives. First-seen order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectSet {
    subjects: Vec<Subject>,
}

impl SubjectSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `subject`, merging it into the first matching entry if any.
    ///
    /// On a merge, digests from `subject` are added to the existing entry and
    /// overwrite algorithms it already had.
    pub fn upsert(&mut self, subject: Subject) -> Upsert {
        match self
            .subjects
            .iter()
            .position(|existing| same_artifact(existing, &subject))
        {
            Some(idx) => {
                self.subjects[idx].digest.extend(subject.digest);
                Upsert::Merged(idx)
            }
            None => {
                self.subjects.push(subject);
                Upsert::Appended(self.subjects.len() - 1)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn as_slice(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn into_subjects(self) -> Vec<Subject> {
        self.subjects
    }
}

impl Extend<Subject> for SubjectSet {
    fn extend<I: IntoIterator<Item = Subject>>(&mut self, iter: I) {
        for subject in iter {
            self.upsert(subject);
        }
    }
}

impl FromIterator<Subject> for SubjectSet {
    fn from_iter<I: IntoIterator<Item = Subject>>(iter: I) -> Self {
        let mut set = SubjectSet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for SubjectSet {
    type Item = Subject;
    type IntoIter = std::vec::IntoIter<Subject>;

    fn into_iter(self) -> Self::IntoIter {
        self.subjects.into_iter()
    }
}

/// Folds `item` into `collected` and returns the updated list.
pub fn merge_subject(collected: Vec<Subject>, item: Subject) -> Vec<Subject> {
    let mut set = SubjectSet { subjects: collected };
    set.upsert(item);
    set.into_subjects()
}
