use crate::config::ColumnMapping;
use crate::prelude::{MigrationError, MigrationResult, RowError};
use crate::records::record::{Dataset, LocationRecord, SkippedRow};
use crate::records::timestamp::parse_timestamp;
use crate::telemetry::LogManager;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use std::io::Read;

/// Resolved header positions of the required columns.
struct ColumnIndex {
    subject: usize,
    timestamp: usize,
    latitude: usize,
    longitude: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &ColumnMapping) -> MigrationResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| MigrationError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            subject: find(&columns.subject)?,
            timestamp: find(&columns.timestamp)?,
            latitude: find(&columns.latitude)?,
            longitude: find(&columns.longitude)?,
        })
    }

    fn is_required(&self, position: usize) -> bool {
        [self.subject, self.timestamp, self.latitude, self.longitude].contains(&position)
    }
}

/// Turns CSV input into a [`Dataset`], skipping rows that fail validation.
pub struct RecordParser {
    columns: ColumnMapping,
    logger: LogManager,
}

impl RecordParser {
    pub fn new(columns: ColumnMapping) -> Self {
        Self {
            columns,
            logger: LogManager::new("parser"),
        }
    }

    pub fn parse_bytes(&self, bytes: &[u8]) -> MigrationResult<Dataset> {
        self.parse_reader(bytes)
    }

    pub fn parse_reader<R: Read>(&self, input: R) -> MigrationResult<Dataset> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let index = ColumnIndex::resolve(&headers, &self.columns)?;

        let mut records = Vec::new();
        let mut skipped = Vec::new();

        for (offset, row) in reader.records().enumerate() {
            let fallback_line = offset as u64 + 2;
            let outcome = match row {
                Ok(row) => {
                    let line = row.position().map_or(fallback_line, |pos| pos.line());
                    (line, self.parse_row(&row, &headers, &index))
                }
                Err(err) => {
                    let line = err.position().map_or(fallback_line, |pos| pos.line());
                    (line, Err(RowError::Malformed(err.to_string())))
                }
            };
            match outcome {
                (_, Ok(record)) => records.push(record),
                (line, Err(reason)) => {
                    self.logger
                        .trace_row(&format!("skipping line {}: {}", line, reason));
                    skipped.push(SkippedRow { line, reason });
                }
            }
        }

        if !skipped.is_empty() {
            self.logger
                .warn(&format!("{} unparseable rows skipped", skipped.len()));
        }
        self.logger.record(&format!("parsed {} records", records.len()));

        Ok(Dataset::new(records, skipped))
    }

    fn parse_row(
        &self,
        row: &StringRecord,
        headers: &StringRecord,
        index: &ColumnIndex,
    ) -> Result<LocationRecord, RowError> {
        let field = |position: usize, name: &str| {
            row.get(position)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| RowError::MissingField(name.to_string()))
        };

        let subject_id = field(index.subject, &self.columns.subject)?;
        let raw_timestamp = field(index.timestamp, &self.columns.timestamp)?;
        let raw_latitude = field(index.latitude, &self.columns.latitude)?;
        let raw_longitude = field(index.longitude, &self.columns.longitude)?;

        let latitude = parse_coordinate(raw_latitude, &self.columns.latitude, 90.0)?;
        let longitude = parse_coordinate(raw_longitude, &self.columns.longitude, 180.0)?;
        let timestamp = parse_timestamp(raw_timestamp)
            .ok_or_else(|| RowError::InvalidTimestamp(raw_timestamp.to_string()))?;

        let attributes: BTreeMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .enumerate()
            .filter(|(position, (_, value))| !index.is_required(*position) && !value.is_empty())
            .map(|(_, (header, value))| (header.to_string(), value.to_string()))
            .collect();

        Ok(LocationRecord {
            subject_id: subject_id.to_string(),
            timestamp,
            latitude,
            longitude,
            attributes,
        })
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(ColumnMapping::default())
    }
}

fn parse_coordinate(raw: &str, column: &str, limit: f64) -> Result<f64, RowError> {
    let value: f64 = raw
        .parse()
        .ok()
        .filter(|value: &f64| value.is_finite())
        .ok_or_else(|| RowError::InvalidCoordinate {
            column: column.to_string(),
            value: raw.to_string(),
        })?;
    if !(-limit..=limit).contains(&value) {
        return Err(RowError::CoordinateOutOfRange {
            column: column.to_string(),
            value,
            min: -limit,
            max: limit,
        });
    }
    Ok(value)
}
