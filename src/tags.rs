use std::collections::{BTreeMap, HashMap, HashSet};

use serde::ser::{Serialize, Serializer};

use crate::division::Division;

/// Verdict value marking an accepted submission.
pub const ACCEPTED_VERDICT: &str = "OK";

/// The category labels whose solve counts are aggregated. Labels outside
/// this list are dropped. Order is significant: it is the column order of
/// the tag-count store rows and the index order of [`TagVector`].
pub const TRACKED_TAGS: [&str; 10] = [
    "implementation",
    "math",
    "greedy",
    "dp",
    "data structures",
    "brute force",
    "constructive algorithms",
    "graphs",
    "sortings",
    "binary search",
];

/// Fixed-width vector of per-label solve counts, one slot per tracked
/// label. Labels with no solves stay at an explicit zero.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagVector {
    counts: [i32; TRACKED_TAGS.len()],
}

impl TagVector {
    pub fn new() -> TagVector {
        TagVector::default()
    }

    /// Rebuilds a vector from stored counts, in [`TRACKED_TAGS`] order.
    pub fn from_counts(counts: [i32; TRACKED_TAGS.len()]) -> TagVector {
        TagVector { counts }
    }

    pub fn tag_index(label: &str) -> Option<usize> {
        TRACKED_TAGS.iter().position(|tracked| *tracked == label)
    }

    /// Bumps the slot for `label`. Untracked labels are ignored; returns
    /// whether the label was tracked.
    pub fn increment(&mut self, label: &str) -> bool {
        match TagVector::tag_index(label) {
            Some(index) => {
                self.counts[index] += 1;
                true
            }
            None => false,
        }
    }

    /// Count for one label, zero when the label is untracked.
    pub fn count(&self, label: &str) -> i32 {
        TagVector::tag_index(label)
            .map(|index| self.counts[index])
            .unwrap_or(0)
    }

    pub fn counts(&self) -> &[i32; TRACKED_TAGS.len()] {
        &self.counts
    }

    /// Sum of the counts for the given labels. Labels the vector does not
    /// track contribute zero.
    pub fn sum_over<'a, I>(&self, labels: I) -> i64
    where
        I: IntoIterator<Item = &'a str>,
    {
        labels
            .into_iter()
            .map(|label| i64::from(self.count(label)))
            .sum()
    }

    /// Sum over every tracked label.
    pub fn total(&self) -> i64 {
        self.counts.iter().map(|count| i64::from(*count)).sum()
    }

    pub fn add(&mut self, other: &TagVector) {
        for (slot, count) in self.counts.iter_mut().zip(other.counts.iter()) {
            *slot += count;
        }
    }
}

impl Serialize for TagVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            TRACKED_TAGS
                .iter()
                .copied()
                .zip(self.counts.iter().copied()),
        )
    }
}

/// One submission as handed over by the ingestion collaborator. Every
/// field may be missing; missing data disqualifies the submission without
/// failing the batch.
#[derive(Debug, Clone, Default)]
pub struct SubmissionEntry {
    pub verdict: Option<String>,
    pub contest_id: Option<i32>,
    pub problem_index: Option<String>,
    pub tags: Vec<String>,
}

impl SubmissionEntry {
    /// Stable problem identifier: contest id concatenated with the problem
    /// index ("1922" + "A" -> "1922A"). `None` when either part is missing.
    pub fn problem_id(&self) -> Option<String> {
        match (self.contest_id, self.problem_index.as_ref()) {
            (Some(contest_id), Some(index)) => Some(format!("{}{}", contest_id, index)),
            _ => None,
        }
    }
}

/// A distinct accepted problem with its category tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvedProblem {
    pub problem_id: String,
    pub tags: Vec<String>,
}

/// Aggregates one user's submission history into per-division tag counts.
///
/// Non-accepted verdicts are skipped; a problem already counted for this
/// user is never counted twice; submissions whose contest is absent from
/// `divisions` are skipped. Only tracked labels are counted. The returned
/// vectors carry explicit zeros for tracked labels with no solves.
pub fn aggregate_tags(
    entries: &[SubmissionEntry],
    divisions: &HashMap<i32, Division>,
) -> BTreeMap<Division, TagVector> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut per_division: BTreeMap<Division, TagVector> = BTreeMap::new();

    for entry in entries {
        if entry.verdict.as_deref() != Some(ACCEPTED_VERDICT) {
            continue;
        }
        let problem_id = match entry.problem_id() {
            Some(problem_id) => problem_id,
            None => continue,
        };
        // First occurrence counts; later duplicates are no-ops.
        if !seen.insert(problem_id) {
            continue;
        }
        let division = match entry.contest_id.and_then(|id| divisions.get(&id)) {
            Some(division) => *division,
            None => continue,
        };
        let vector = per_division.entry(division).or_insert_with(TagVector::new);
        for tag in &entry.tags {
            vector.increment(tag);
        }
    }

    per_division
}

/// Distinct accepted problems in first-occurrence order, deduplicated by
/// problem identifier. Entries with a missing identifier are skipped.
pub fn distinct_accepted(entries: &[SubmissionEntry]) -> Vec<SolvedProblem> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut solved = Vec::new();

    for entry in entries {
        if entry.verdict.as_deref() != Some(ACCEPTED_VERDICT) {
            continue;
        }
        if let Some(problem_id) = entry.problem_id() {
            if seen.insert(problem_id.clone()) {
                solved.push(SolvedProblem {
                    problem_id,
                    tags: entry.tags.clone(),
                });
            }
        }
    }

    solved
}
