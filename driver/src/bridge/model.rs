use migrationcore::render::{Frame, FrameMode, TimeWindow};
use migrationcore::session::{Notice, RenderedView, Session, ViewMode};
use migrationcore::telemetry::PipelineCounters;
use serde::Serialize;

/// Headline facts about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub source: Option<String>,
    pub subjects: Vec<String>,
    pub selection: Vec<String>,
    pub records_loaded: usize,
    pub rows_skipped: usize,
    pub records_shown: usize,
    pub view_mode: ViewMode,
    pub interval: TimeWindow,
    pub frame_mode: FrameMode,
    pub notice: Notice,
    pub counters: PipelineCounters,
}

impl SessionSummary {
    pub fn from_session(session: &Session) -> Self {
        let dataset = session.dataset();
        Self {
            source: session.source_name().map(str::to_owned),
            subjects: session.subjects().to_vec(),
            selection: session.selection().iter().cloned().collect(),
            records_loaded: dataset.map_or(0, |d| d.len()),
            rows_skipped: dataset.map_or(0, |d| d.skipped_count()),
            records_shown: session.filtered().len(),
            view_mode: session.view_mode(),
            interval: session.interval(),
            frame_mode: session.frame_mode(),
            notice: session.notice().clone(),
            counters: *session.counters(),
        }
    }
}

/// Everything the bridge and the JSON output expose.
#[derive(Debug, Clone, Serialize)]
pub struct VisualizationModel {
    pub summary: SessionSummary,
    pub view: Option<RenderedView>,
}

impl VisualizationModel {
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        match &self.view {
            Some(RenderedView::Animated(timeline)) => timeline.frame(index),
            _ => None,
        }
    }

    /// One-line description of the rendered artifact.
    pub fn headline(&self) -> String {
        let summary = &self.summary;
        let source = summary.source.as_deref().unwrap_or("<none>");
        let artifact = match &self.view {
            Some(RenderedView::Static(view)) => format!(
                "static map: {} tracks, {} markers, center ({:.3}, {:.3}) zoom {}",
                view.layers.len(),
                view.markers.len(),
                view.camera.center.lat,
                view.camera.center.lon,
                view.camera.zoom
            ),
            Some(RenderedView::Animated(timeline)) => format!(
                "animated map: {} frames at {} ({})",
                timeline.len(),
                timeline.interval,
                timeline.mode
            ),
            None => "nothing rendered".to_string(),
        };
        format!(
            "{} -> {} records ({} skipped), {} of {} animals shown; {}",
            source,
            summary.records_loaded,
            summary.rows_skipped,
            summary.selection.len(),
            summary.subjects.len(),
            artifact
        )
    }
}
