use crate::prelude::{MapRenderer, MigrationError, MigrationResult};
use crate::records::{group_tracks, LocationRecord};
use crate::render::static_map::StaticRenderer;
use crate::render::view::{Camera, MapView, Marker, MarkerKind};
use crate::render::Palette;
use crate::telemetry::LogManager;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// Bucket size used to cut the selection into animation frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeWindow {
    seconds: i64,
}

impl TimeWindow {
    pub const DEFAULT: TimeWindow = TimeWindow {
        seconds: 7 * SECONDS_PER_DAY,
    };
    pub const MIN_DAYS: u32 = 1;
    pub const MAX_DAYS: u32 = 30;

    pub fn days(days: u32) -> MigrationResult<Self> {
        Self::from_seconds(i64::from(days) * SECONDS_PER_DAY, || format!("{days}d"))
    }

    pub fn hours(hours: u32) -> MigrationResult<Self> {
        Self::from_seconds(i64::from(hours) * SECONDS_PER_HOUR, || format!("{hours}h"))
    }

    fn from_seconds(seconds: i64, describe: impl FnOnce() -> String) -> MigrationResult<Self> {
        if seconds <= 0 {
            return Err(MigrationError::InvalidInterval(describe()));
        }
        Ok(Self { seconds })
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.seconds)
    }

    pub fn as_millis(&self) -> i64 {
        self.seconds * 1_000
    }

    pub fn whole_days(&self) -> Option<u32> {
        (self.seconds % SECONDS_PER_DAY == 0)
            .then(|| u32::try_from(self.seconds / SECONDS_PER_DAY).ok())
            .flatten()
    }

    fn label_format(&self) -> &'static str {
        if self.whole_days().is_some() {
            "%Y-%m-%d"
        } else {
            "%Y-%m-%d %H:%M"
        }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.whole_days() {
            Some(days) => write!(f, "{days}d"),
            None => write!(f, "{}h", self.seconds / SECONDS_PER_HOUR),
        }
    }
}

/// Accepts `12h`, `7d`, or a bare count of days.
impl FromStr for TimeWindow {
    type Err = MigrationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let text = raw.trim().to_ascii_lowercase();
        let invalid = || MigrationError::InvalidInterval(raw.to_string());
        let (digits, unit) = match text.char_indices().last() {
            Some((idx, 'h')) => (&text[..idx], 'h'),
            Some((idx, 'd')) => (&text[..idx], 'd'),
            Some(_) => (text.as_str(), 'd'),
            None => return Err(invalid()),
        };
        let count: u32 = digits.trim().parse().map_err(|_| invalid())?;
        match unit {
            'h' => Self::hours(count),
            _ => Self::days(count),
        }
        .map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = MigrationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(window: TimeWindow) -> Self {
        window.to_string()
    }
}

/// What each frame shows of the records before its end time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameMode {
    /// Everything up to the bucket end.
    #[default]
    Cumulative,
    /// Only the fixes inside the bucket.
    Windowed,
}

impl FromStr for FrameMode {
    type Err = MigrationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cumulative" => Ok(FrameMode::Cumulative),
            "windowed" | "window" => Ok(FrameMode::Windowed),
            _ => Err(MigrationError::UnknownFrameMode(raw.to_string())),
        }
    }
}

impl fmt::Display for FrameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameMode::Cumulative => "cumulative",
            FrameMode::Windowed => "windowed",
        })
    }
}

/// One animation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub index: usize,
    pub start: DateTime<Utc>,
    /// Exclusive bucket end, except for the last frame which closes on the
    /// latest fix.
    pub end: DateTime<Utc>,
    pub label: String,
    pub view: MapView,
    pub positions: Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub interval: TimeWindow,
    pub mode: FrameMode,
    pub camera: Camera,
    pub frames: Vec<Frame>,
}

impl Timeline {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.frames.iter().map(|frame| frame.label.as_str()).collect()
    }
}

/// Number of buckets of `interval` needed to cover `[first, last]`.
pub fn frame_count(first: DateTime<Utc>, last: DateTime<Utc>, interval: TimeWindow) -> usize {
    let span = (last - first).num_milliseconds().max(0);
    let step = interval.as_millis();
    let buckets = (span + step - 1) / step;
    usize::try_from(buckets).unwrap_or(usize::MAX).max(1)
}

/// Cuts the selection into interval buckets anchored at the earliest fix.
pub struct TimelineRenderer {
    interval: TimeWindow,
    mode: FrameMode,
    maps: StaticRenderer,
    logger: LogManager,
}

impl TimelineRenderer {
    pub fn new(interval: TimeWindow, mode: FrameMode) -> Self {
        Self {
            interval,
            mode,
            maps: StaticRenderer::new(),
            logger: LogManager::new("timeline"),
        }
    }

    fn bucket_of(&self, first: DateTime<Utc>, at: DateTime<Utc>, count: usize) -> usize {
        let offset = (at - first).num_milliseconds().max(0) / self.interval.as_millis();
        usize::try_from(offset).unwrap_or(usize::MAX).min(count - 1)
    }

    fn latest_positions(records: &[LocationRecord], palette: &Palette) -> Vec<Marker> {
        group_tracks(records)
            .into_iter()
            .filter_map(|track| {
                let last = track.last()?;
                Some(Marker {
                    subject_id: track.subject_id.to_string(),
                    kind: MarkerKind::Position,
                    position: last.position(),
                    timestamp: last.timestamp,
                    color: palette.color_of(track.subject_id),
                    tooltip: track.subject_id.to_string(),
                })
            })
            .collect()
    }
}

impl MapRenderer for TimelineRenderer {
    type Output = Timeline;

    fn render(&self, records: &[LocationRecord], palette: &Palette) -> Timeline {
        let camera = StaticRenderer::camera_for(records);
        let mut timeline = Timeline {
            interval: self.interval,
            mode: self.mode,
            camera,
            frames: Vec::new(),
        };

        let first = records.iter().map(|record| record.timestamp).min();
        let last = records.iter().map(|record| record.timestamp).max();
        let (Some(first), Some(last)) = (first, last) else {
            self.logger.record("no records selected, timeline is empty");
            return timeline;
        };

        let count = frame_count(first, last, self.interval);
        let buckets: Vec<usize> = records
            .iter()
            .map(|record| self.bucket_of(first, record.timestamp, count))
            .collect();
        let step = self.interval.duration();

        for index in 0..count {
            let start = first + Duration::milliseconds(self.interval.as_millis() * index as i64);
            let end = if index + 1 == count {
                last
            } else {
                start + step
            };
            let visible: Vec<LocationRecord> = records
                .iter()
                .zip(&buckets)
                .filter(|&(_, bucket)| match self.mode {
                    FrameMode::Cumulative => *bucket <= index,
                    FrameMode::Windowed => *bucket == index,
                })
                .map(|(record, _)| record.clone())
                .collect();

            timeline.frames.push(Frame {
                index,
                start,
                end,
                label: start.format(self.interval.label_format()).to_string(),
                view: self.maps.render_with_camera(&visible, palette, camera),
                positions: Self::latest_positions(&visible, palette),
            });
        }

        self.logger.record(&format!(
            "{} frames at {} ({})",
            timeline.len(),
            self.interval,
            self.mode
        ));
        timeline
    }
}
