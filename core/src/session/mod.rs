//! Event-driven state store for one user session.
//!
//! Every user interaction is an [`SessionEvent`]. Applying it recomputes the
//! affected pipeline stage and everything downstream of it, nothing more:
//! a load re-derives subjects, colors, the filter and the rendering; a
//! selection change re-filters and re-renders; view, interval and frame mode
//! changes only re-render.

use crate::config::SessionConfig;
use crate::prelude::{MapRenderer, MigrationError, MigrationResult};
use crate::records::{Dataset, LocationRecord, RecordParser};
use crate::render::{
    Frame, FrameMode, MapView, Palette, StaticRenderer, TimeWindow, Timeline, TimelinePlayer,
    TimelineRenderer,
};
use crate::sample::{sample_bytes, SAMPLE_NAME};
use crate::selection::SubjectFilter;
use crate::telemetry::{LogManager, PipelineCounters};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Static,
    Animated,
}

impl FromStr for ViewMode {
    type Err = MigrationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(ViewMode::Static),
            "animated" | "animation" => Ok(ViewMode::Animated),
            _ => Err(MigrationError::UnknownViewMode(raw.to_string())),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViewMode::Static => "static",
            ViewMode::Animated => "animated",
        })
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    LoadSample,
    LoadCsv { name: String, bytes: Vec<u8> },
    SetSelection(BTreeSet<String>),
    ToggleSubject(String),
    SelectAll,
    SetViewMode(ViewMode),
    SetInterval(TimeWindow),
    SetFrameMode(FrameMode),
}

/// First pipeline stage an event invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Load,
    Filter,
    Render,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Message shown to the user about the latest interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl From<&MigrationError> for Notice {
    fn from(err: &MigrationError) -> Self {
        match err {
            MigrationError::EmptySelection => Notice::info("No data to display."),
            MigrationError::NoValidRows(_) => Notice::warning(err.to_string()),
            other => Notice::error(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "artifact", rename_all = "lowercase")]
pub enum RenderedView {
    Static(MapView),
    Animated(Timeline),
}

pub struct Session {
    config: SessionConfig,
    parser: RecordParser,
    source_name: Option<String>,
    dataset: Option<Dataset>,
    subjects: Vec<String>,
    palette: Palette,
    selection: BTreeSet<String>,
    filtered: Vec<LocationRecord>,
    view_mode: ViewMode,
    interval: TimeWindow,
    frame_mode: FrameMode,
    rendered: Option<RenderedView>,
    player: TimelinePlayer,
    notice: Notice,
    last_stage: Option<Stage>,
    counters: PipelineCounters,
    logger: LogManager,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            parser: RecordParser::new(config.columns.clone()),
            view_mode: config.view_mode,
            interval: config.interval,
            frame_mode: config.frame_mode,
            config,
            source_name: None,
            dataset: None,
            subjects: Vec::new(),
            palette: Palette::default(),
            selection: BTreeSet::new(),
            filtered: Vec::new(),
            rendered: None,
            player: TimelinePlayer::new(0),
            notice: Notice::info("Awaiting CSV upload."),
            last_stage: None,
            counters: PipelineCounters::new(),
            logger: LogManager::new("session"),
        }
    }

    /// Handles one user event. Failures are also kept as the current notice.
    pub fn apply(&mut self, event: SessionEvent) -> MigrationResult<()> {
        let outcome = self.handle(event);
        if let Err(err) = &outcome {
            self.logger.warn(&err.to_string());
            self.notice = Notice::from(err);
        }
        outcome
    }

    fn handle(&mut self, event: SessionEvent) -> MigrationResult<()> {
        match event {
            SessionEvent::LoadSample => self.load(SAMPLE_NAME, sample_bytes()),
            SessionEvent::LoadCsv { name, bytes } => self.load(&name, &bytes),
            SessionEvent::SetSelection(selection) => {
                self.selection = selection;
                self.recompute(Stage::Filter)
            }
            SessionEvent::ToggleSubject(subject_id) => {
                if !self.selection.remove(&subject_id) {
                    self.selection.insert(subject_id);
                }
                self.recompute(Stage::Filter)
            }
            SessionEvent::SelectAll => {
                self.selection = self.subjects.iter().cloned().collect();
                self.recompute(Stage::Filter)
            }
            SessionEvent::SetViewMode(mode) => {
                self.view_mode = mode;
                self.recompute(Stage::Render)
            }
            SessionEvent::SetInterval(interval) => {
                self.interval = interval;
                self.recompute(Stage::Render)
            }
            SessionEvent::SetFrameMode(mode) => {
                self.frame_mode = mode;
                self.recompute(Stage::Render)
            }
        }
    }

    /// Replaces the dataset. A parse failure leaves the previous data in place.
    fn load(&mut self, name: &str, bytes: &[u8]) -> MigrationResult<()> {
        let dataset = self.parser.parse_bytes(bytes)?;
        self.counters
            .record_load(dataset.len(), dataset.skipped_count());
        self.subjects = dataset.subjects();
        self.palette = Palette::for_subjects(&self.subjects);
        self.selection = self.subjects.iter().cloned().collect();
        let skipped = dataset.skipped_count();
        self.dataset = Some(dataset);
        self.source_name = Some(name.to_string());
        self.logger.record(&format!(
            "loaded {} with {} animals",
            name,
            self.subjects.len()
        ));

        match self.recompute(Stage::Load) {
            Err(MigrationError::EmptySelection) if skipped > 0 => {
                Err(MigrationError::NoValidRows(skipped))
            }
            Err(err) => Err(err),
            Ok(()) => {
                if skipped > 0 {
                    self.notice = Notice::warning(format!(
                        "{} Skipped {} unparseable rows.",
                        self.notice.message, skipped
                    ));
                }
                Ok(())
            }
        }
    }

    fn recompute(&mut self, from: Stage) -> MigrationResult<()> {
        let Some(dataset) = &self.dataset else {
            return Ok(());
        };
        self.last_stage = Some(from);

        if from <= Stage::Filter {
            if self.selection.is_empty() {
                self.selection = self.subjects.iter().cloned().collect();
            }
            self.filtered = SubjectFilter::new(self.selection.iter().cloned())
                .apply(dataset.records());
        }

        let rendered = match self.view_mode {
            ViewMode::Static => {
                RenderedView::Static(StaticRenderer::new().render(&self.filtered, &self.palette))
            }
            ViewMode::Animated => {
                let timeline = TimelineRenderer::new(self.interval, self.frame_mode)
                    .render(&self.filtered, &self.palette);
                self.player.reset(timeline.len());
                RenderedView::Animated(timeline)
            }
        };
        self.rendered = Some(rendered);
        self.counters.record_render();

        if self.filtered.is_empty() {
            return Err(MigrationError::EmptySelection);
        }
        let shown = self
            .selection
            .iter()
            .filter(|subject| self.subjects.contains(subject))
            .count();
        self.notice = Notice::info(format!(
            "Showing {} records for {} of {} animals.",
            self.filtered.len(),
            shown,
            self.subjects.len()
        ));
        Ok(())
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// All subjects of the loaded data, sorted.
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    pub fn is_selected(&self, subject_id: &str) -> bool {
        self.selection.contains(subject_id)
    }

    pub fn filtered(&self) -> &[LocationRecord] {
        &self.filtered
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn interval(&self) -> TimeWindow {
        self.interval
    }

    pub fn frame_mode(&self) -> FrameMode {
        self.frame_mode
    }

    pub fn rendered(&self) -> Option<&RenderedView> {
        self.rendered.as_ref()
    }

    pub fn player(&self) -> &TimelinePlayer {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut TimelinePlayer {
        &mut self.player
    }

    /// Frame under the player cursor when the animated view is active.
    pub fn current_frame(&self) -> Option<&Frame> {
        match &self.rendered {
            Some(RenderedView::Animated(timeline)) => timeline.frame(self.player.current()?),
            _ => None,
        }
    }

    pub fn notice(&self) -> &Notice {
        &self.notice
    }

    pub fn last_stage(&self) -> Option<Stage> {
        self.last_stage
    }

    pub fn counters(&self) -> &PipelineCounters {
        &self.counters
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "individual-local-identifier,timestamp,location-lat,location-long\n\
        a,2020-01-01 00:00:00,70.0,-20.0\n\
        a,2020-01-05 00:00:00,70.5,-20.5\n\
        a,2020-01-11 00:00:00,71.0,-21.0\n\
        b,2020-01-02 00:00:00,60.0,-10.0\n\
        b,bad-time,60.0,-10.0\n";

    fn loaded() -> Session {
        let mut session = Session::default();
        session
            .apply(SessionEvent::LoadCsv {
                name: "upload.csv".into(),
                bytes: CSV.as_bytes().to_vec(),
            })
            .unwrap();
        session
    }

    #[test]
    fn awaits_data_before_first_load() {
        let mut session = Session::default();
        assert_eq!(session.notice().message, "Awaiting CSV upload.");
        session
            .apply(SessionEvent::SetViewMode(ViewMode::Animated))
            .unwrap();
        assert!(session.rendered().is_none());
    }

    #[test]
    fn load_selects_everyone_and_reports_skips() {
        let session = loaded();
        assert_eq!(session.subjects(), ["a".to_string(), "b".to_string()]);
        assert_eq!(session.selection().len(), 2);
        assert_eq!(session.filtered().len(), 4);
        assert_eq!(session.notice().level, NoticeLevel::Warning);
        assert!(session.notice().message.contains("Skipped 1"));
        assert_eq!(session.last_stage(), Some(Stage::Load));
        assert!(matches!(session.rendered(), Some(RenderedView::Static(_))));
        assert_eq!(session.counters().rows_skipped(), 1);
    }

    #[test]
    fn toggling_refilters() {
        let mut session = loaded();
        session
            .apply(SessionEvent::ToggleSubject("b".into()))
            .unwrap();
        assert_eq!(session.last_stage(), Some(Stage::Filter));
        assert!(session.filtered().iter().all(|r| r.subject_id == "a"));
        assert_eq!(session.notice().message, "Showing 3 records for 1 of 2 animals.");
    }

    #[test]
    fn clearing_the_selection_falls_back_to_everyone() {
        let mut session = loaded();
        session
            .apply(SessionEvent::SetSelection(BTreeSet::new()))
            .unwrap();
        assert_eq!(session.filtered().len(), 4);
        assert_eq!(session.selection().len(), 2);
    }

    #[test]
    fn unknown_selection_is_empty_and_noticed() {
        let mut session = loaded();
        let err = session
            .apply(SessionEvent::SetSelection(["zebra".to_string()].into()))
            .unwrap_err();
        assert!(matches!(err, MigrationError::EmptySelection));
        assert_eq!(session.notice().message, "No data to display.");
        match session.rendered() {
            Some(RenderedView::Static(view)) => assert!(view.is_empty()),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn view_changes_only_rerender() {
        let mut session = loaded();
        let renders = session.counters().renders();
        session
            .apply(SessionEvent::SetViewMode(ViewMode::Animated))
            .unwrap();
        session
            .apply(SessionEvent::SetInterval(TimeWindow::days(1).unwrap()))
            .unwrap();
        assert_eq!(session.last_stage(), Some(Stage::Render));
        assert_eq!(session.counters().renders(), renders + 2);
        assert_eq!(session.counters().loads(), 1);
        match session.rendered() {
            Some(RenderedView::Animated(timeline)) => assert_eq!(timeline.len(), 10),
            other => panic!("unexpected view {other:?}"),
        }
        assert_eq!(session.current_frame().map(|f| f.index), Some(0));
    }

    #[test]
    fn failed_load_keeps_previous_data() {
        let mut session = loaded();
        let err = session
            .apply(SessionEvent::LoadCsv {
                name: "broken.csv".into(),
                bytes: b"id,when\n1,2\n".to_vec(),
            })
            .unwrap_err();
        assert!(matches!(err, MigrationError::MissingColumn(_)));
        assert_eq!(session.notice().level, NoticeLevel::Error);
        assert_eq!(session.source_name(), Some("upload.csv"));
        assert_eq!(session.filtered().len(), 4);
    }

    #[test]
    fn sample_loads_without_upload() {
        let mut session = Session::default();
        session.apply(SessionEvent::LoadSample).unwrap();
        assert_eq!(session.source_name(), Some(SAMPLE_NAME));
        assert_eq!(session.subjects().len(), 3);
        assert_eq!(session.notice().level, NoticeLevel::Info);
    }

    #[test]
    fn upload_with_only_bad_rows_reports_the_skips() {
        let mut session = Session::default();
        let err = session
            .apply(SessionEvent::LoadCsv {
                name: "bad.csv".into(),
                bytes: b"individual-local-identifier,timestamp,location-lat,location-long\n\
                    a,not-a-time,70.0,-20.0\n\
                    b,2020-01-01 00:00:00,999,-20.0\n"
                    .to_vec(),
            })
            .unwrap_err();
        assert!(matches!(err, MigrationError::NoValidRows(2)));
        assert_eq!(session.notice().level, NoticeLevel::Warning);
        assert_eq!(
            session.notice().message,
            "No valid rows: 2 unparseable rows skipped."
        );
        assert_eq!(session.dataset().map(Dataset::skipped_count), Some(2));
        assert_eq!(session.counters().rows_skipped(), 2);
    }

    #[test]
    fn select_all_after_toggle_shows_everyone() {
        let mut session = loaded();
        session
            .apply(SessionEvent::ToggleSubject("a".into()))
            .unwrap();
        assert_eq!(session.filtered().len(), 1);
        session.apply(SessionEvent::SelectAll).unwrap();
        assert_eq!(session.last_stage(), Some(Stage::Filter));
        assert_eq!(session.selection().len(), 2);
        assert_eq!(session.filtered().len(), 4);
        assert_eq!(session.notice().message, "Showing 4 records for 2 of 2 animals.");
    }

    #[test]
    fn frame_mode_change_only_rerenders() {
        let mut session = loaded();
        session
            .apply(SessionEvent::SetViewMode(ViewMode::Animated))
            .unwrap();
        let renders = session.counters().renders();
        session
            .apply(SessionEvent::SetFrameMode(FrameMode::Windowed))
            .unwrap();
        assert_eq!(session.last_stage(), Some(Stage::Render));
        assert_eq!(session.frame_mode(), FrameMode::Windowed);
        assert_eq!(session.counters().renders(), renders + 1);
        assert_eq!(session.counters().loads(), 1);
        match session.rendered() {
            Some(RenderedView::Animated(timeline)) => {
                assert_eq!(timeline.mode, FrameMode::Windowed)
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn reload_resets_selection_to_every_subject() {
        let mut session = loaded();
        session
            .apply(SessionEvent::ToggleSubject("b".into()))
            .unwrap();
        assert_eq!(session.selection().len(), 1);
        session
            .apply(SessionEvent::LoadCsv {
                name: "second.csv".into(),
                bytes: CSV.as_bytes().to_vec(),
            })
            .unwrap();
        assert_eq!(session.last_stage(), Some(Stage::Load));
        assert_eq!(session.source_name(), Some("second.csv"));
        assert!(session.is_selected("a") && session.is_selected("b"));
        assert_eq!(session.filtered().len(), 4);
        assert_eq!(session.counters().loads(), 2);
    }

    #[test]
    fn non_utf8_header_is_a_csv_error() {
        let mut session = loaded();
        let mut bytes = b"individual-local-identifier,timestamp,location-lat,location-long,".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        bytes.extend_from_slice(b"a,2020-01-01 00:00:00,70.0,-20.0,x\n");
        let err = session
            .apply(SessionEvent::LoadCsv {
                name: "binary.csv".into(),
                bytes,
            })
            .unwrap_err();
        assert!(matches!(err, MigrationError::Csv(_)));
        assert_eq!(session.notice().level, NoticeLevel::Error);
        assert_eq!(session.source_name(), Some("upload.csv"));
    }

    #[test]
    fn view_mode_parsing() {
        assert_eq!("Animated".parse::<ViewMode>().unwrap(), ViewMode::Animated);
        assert!("3d".parse::<ViewMode>().is_err());
    }
}
