use crate::records::LocationRecord;
use std::collections::BTreeSet;

/// Keeps the records of the selected subjects. An empty selection keeps
/// every subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectFilter {
    selected: BTreeSet<String>,
}

impl SubjectFilter {
    pub fn new<I, S>(subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selected: subjects.into_iter().map(Into::into).collect(),
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn matches(&self, subject_id: &str) -> bool {
        self.selected.is_empty() || self.selected.contains(subject_id)
    }

    /// Matching records in their original order.
    pub fn apply(&self, records: &[LocationRecord]) -> Vec<LocationRecord> {
        records
            .iter()
            .filter(|record| self.matches(&record.subject_id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn records() -> Vec<LocationRecord> {
        [("a", 1), ("a", 2), ("b", 1), ("c", 1), ("c", 3)]
            .iter()
            .map(|(subject, day)| {
                LocationRecord::new(
                    *subject,
                    Utc.with_ymd_and_hms(2020, 1, *day, 0, 0, 0).unwrap(),
                    *day as f64,
                    0.0,
                )
            })
            .collect()
    }

    #[test]
    fn keeps_only_selected_subjects_in_order() {
        let filtered = SubjectFilter::new(["c", "a"]).apply(&records());
        let kept: Vec<(&str, f64)> = filtered
            .iter()
            .map(|r| (r.subject_id.as_str(), r.latitude))
            .collect();
        assert_eq!(kept, vec![("a", 1.0), ("a", 2.0), ("c", 1.0), ("c", 3.0)]);
    }

    #[test]
    fn full_or_empty_selection_returns_everything() {
        let all = records();
        assert_eq!(SubjectFilter::new(["a", "b", "c"]).apply(&all), all);
        assert_eq!(SubjectFilter::all().apply(&all), all);
    }

    #[test]
    fn unknown_subjects_yield_nothing() {
        assert!(SubjectFilter::new(["zebra"]).apply(&records()).is_empty());
    }
}
