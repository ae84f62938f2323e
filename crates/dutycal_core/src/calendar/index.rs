//! Date and month lookups over one duty snapshot.
//!
//! # Responsibility
//! - Map a calendar date to its duties.
//! - Map a (year, month) pair to all duties in that month.
//!
//! # Invariants
//! - Results keep snapshot insertion order; nothing is re-sorted.
//! - Each duty ID is indexed once; later records with an already seen ID are
//!   skipped.
//! - The index borrows the snapshot and never mutates it. A changed
//!   collection means building a new index.

use crate::model::date::CalendarDate;
use crate::model::duty::{DutyId, DutyWithUser};
use log::warn;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct DutyIndex<'a> {
    duties: &'a [DutyWithUser],
    by_date: HashMap<CalendarDate, Vec<usize>>,
    by_month: BTreeMap<(i32, u32), Vec<usize>>,
    indexed: usize,
}

impl<'a> DutyIndex<'a> {
    /// Builds the index in one pass over `duties`.
    pub fn build(duties: &'a [DutyWithUser]) -> Self {
        let mut by_date: HashMap<CalendarDate, Vec<usize>> = HashMap::new();
        let mut by_month: BTreeMap<(i32, u32), Vec<usize>> = BTreeMap::new();
        let mut seen: HashSet<DutyId> = HashSet::with_capacity(duties.len());
        let mut skipped = 0usize;

        for (position, duty) in duties.iter().enumerate() {
            if !seen.insert(duty.id()) {
                skipped += 1;
                continue;
            }
            let date = duty.date();
            by_date.entry(date).or_default().push(position);
            by_month
                .entry((date.year(), date.month()))
                .or_default()
                .push(position);
        }

        if skipped > 0 {
            warn!(
                "event=duty_index_build module=calendar status=degraded duplicate_ids={} total={}",
                skipped,
                duties.len()
            );
        }

        Self {
            duties,
            by_date,
            by_month,
            indexed: duties.len() - skipped,
        }
    }

    /// All duties on `date`, in snapshot order.
    pub fn duties_on(&self, date: &CalendarDate) -> Vec<&'a DutyWithUser> {
        self.resolve(self.by_date.get(date))
    }

    /// All duties in `year`/`month` (1-based), in snapshot order.
    pub fn duties_in_month(&self, year: i32, month: u32) -> Vec<&'a DutyWithUser> {
        self.resolve(self.by_month.get(&(year, month)))
    }

    /// Number of duties on `date`; the per-cell badge count.
    pub fn count_on(&self, date: &CalendarDate) -> usize {
        self.by_date.get(date).map_or(0, Vec::len)
    }

    /// Number of distinct duties indexed.
    pub fn len(&self) -> usize {
        self.indexed
    }

    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }

    fn resolve(&self, positions: Option<&Vec<usize>>) -> Vec<&'a DutyWithUser> {
        let duties = self.duties;
        positions
            .map(|positions| positions.iter().map(|&pos| &duties[pos]).collect())
            .unwrap_or_default()
    }
}
