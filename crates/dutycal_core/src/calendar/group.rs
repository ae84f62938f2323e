//! Per-cell grouping of duties by rubric.
//!
//! # Invariants
//! - Group key is the exact, case-sensitive rubric string.
//! - Groups appear in first-seen order of their rubric in the input.
//! - Duties keep their input order inside a group.
//! - Empty input yields no groups.

use crate::model::duty::{DutyId, DutyWithUser};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Duties of one rubric inside one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DutyGroup<'a> {
    pub rubric: &'a str,
    pub duties: Vec<&'a DutyWithUser>,
}

impl DutyGroup<'_> {
    pub fn len(&self) -> usize {
        self.duties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.duties.is_empty()
    }
}

/// Groups `duties` by rubric with stable first-seen ordering.
pub fn group_by_rubric<'a, I>(duties: I) -> Vec<DutyGroup<'a>>
where
    I: IntoIterator<Item = &'a DutyWithUser>,
{
    let mut groups: Vec<DutyGroup<'a>> = Vec::new();
    let mut slots: HashMap<&'a str, usize> = HashMap::new();

    for duty in duties {
        let rubric = duty.rubric();
        let slot = *slots.entry(rubric).or_insert_with(|| {
            groups.push(DutyGroup {
                rubric,
                duties: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].duties.push(duty);
    }

    groups
}

/// A duty names a rubric missing from the current rubric set.
///
/// Reported as a warning; the duty is still grouped under its literal name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownRubricError {
    pub duty_id: DutyId,
    pub rubric: String,
}

impl Display for UnknownRubricError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "duty {} references unknown rubric `{}`",
            self.duty_id, self.rubric
        )
    }
}

impl Error for UnknownRubricError {}

/// Collects one warning per duty whose rubric is absent from `known`.
pub fn find_unknown_rubrics<'a, I>(duties: I, known: &[String]) -> Vec<UnknownRubricError>
where
    I: IntoIterator<Item = &'a DutyWithUser>,
{
    let known: HashSet<&str> = known.iter().map(String::as_str).collect();
    duties
        .into_iter()
        .filter(|duty| !known.contains(duty.rubric()))
        .map(|duty| UnknownRubricError {
            duty_id: duty.id(),
            rubric: duty.rubric().to_string(),
        })
        .collect()
}
