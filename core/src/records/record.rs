use crate::math::GeoPoint;
use crate::prelude::RowError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One GPS fix of a tracked subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub subject_id: String,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Remaining non-empty columns of the source row, keyed by header.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl LocationRecord {
    pub fn new(
        subject_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            timestamp,
            latitude,
            longitude,
            attributes: BTreeMap::new(),
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// A row excluded at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: RowError,
}

/// Records of one load, sorted by subject and then time.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<LocationRecord>,
    skipped: Vec<SkippedRow>,
}

impl Dataset {
    /// Sorts `records` by (subject, timestamp). The sort is stable, so fixes
    /// sharing a timestamp keep their file order.
    pub fn new(mut records: Vec<LocationRecord>, skipped: Vec<SkippedRow>) -> Self {
        records.sort_by(|a, b| {
            a.subject_id
                .cmp(&b.subject_id)
                .then(a.timestamp.cmp(&b.timestamp))
        });
        Self { records, skipped }
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Unique subject ids in sorted order.
    pub fn subjects(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.subject_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }
}

/// Borrowed view of one subject's fixes.
#[derive(Debug, Clone, PartialEq)]
pub struct Track<'a> {
    pub subject_id: &'a str,
    pub points: Vec<&'a LocationRecord>,
}

impl<'a> Track<'a> {
    pub fn first(&self) -> Option<&'a LocationRecord> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<&'a LocationRecord> {
        self.points.last().copied()
    }

    pub fn positions(&self) -> Vec<GeoPoint> {
        self.points.iter().map(|record| record.position()).collect()
    }
}

/// Groups records by subject in order of first appearance, keeping each
/// subject's records in their input order.
pub fn group_tracks(records: &[LocationRecord]) -> Vec<Track<'_>> {
    let mut tracks: Vec<Track<'_>> = Vec::new();
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        let slot = *index.entry(record.subject_id.as_str()).or_insert_with(|| {
            tracks.push(Track {
                subject_id: record.subject_id.as_str(),
                points: Vec::new(),
            });
            tracks.len() - 1
        });
        tracks[slot].points.push(record);
    }
    tracks
}
