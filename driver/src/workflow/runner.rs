use crate::bridge::{SessionSummary, VisualizationModel};
use crate::generator::build_track_csv;
use crate::workflow::config::{DataSource, WorkflowConfig};
use anyhow::Context;
use log::warn;
use migrationcore::session::{Session, SessionEvent};
use std::collections::BTreeSet;
use std::fs;

/// Runs load -> filter -> render once for a workflow.
#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    fn load_event(&self) -> anyhow::Result<SessionEvent> {
        let event = match &self.config.source {
            DataSource::Sample => SessionEvent::LoadSample,
            DataSource::Csv { path } => SessionEvent::LoadCsv {
                name: path.display().to_string(),
                bytes: fs::read(path)
                    .with_context(|| format!("reading tracks from {}", path.display()))?,
            },
            DataSource::Synthetic(generator) => SessionEvent::LoadCsv {
                name: format!("synthetic (seed {})", generator.seed),
                bytes: build_track_csv(generator).context("generating synthetic tracks")?,
            },
        };
        Ok(event)
    }

    /// Pipeline problems (missing columns, empty selections) end up in the
    /// model's notice; only I/O and generator failures are errors here.
    pub fn execute(&self) -> anyhow::Result<VisualizationModel> {
        let mut session = Session::new(self.config.session_config());

        let mut events = vec![self.load_event()?];
        if !self.config.subjects.is_empty() {
            let selection: BTreeSet<String> = self.config.subjects.iter().cloned().collect();
            events.push(SessionEvent::SetSelection(selection));
        }

        for event in events {
            if let Err(err) = session.apply(event) {
                warn!("pipeline: {}", err);
            }
        }

        Ok(VisualizationModel {
            summary: SessionSummary::from_session(&session),
            view: session.rendered().cloned(),
        })
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(WorkflowConfig::from_source(DataSource::Sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorConfig;
    use migrationcore::render::TimeWindow;
    use migrationcore::session::{NoticeLevel, RenderedView, ViewMode};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn runner_executes_sample_workflow() {
        let model = Runner::default().execute().unwrap();
        assert_eq!(model.summary.source.as_deref(), Some("sample.csv"));
        assert_eq!(model.summary.subjects.len(), 3);
        assert_eq!(model.summary.records_shown, 72);
        match model.view {
            Some(RenderedView::Static(view)) => assert_eq!(view.layers.len(), 3),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn runner_animates_synthetic_tracks() {
        let mut config = WorkflowConfig::from_source(DataSource::Synthetic(GeneratorConfig {
            subjects: 2,
            fixes_per_subject: 11,
            step_hours: 24,
            ..Default::default()
        }));
        config.session.view_mode = ViewMode::Animated;
        config.session.interval = TimeWindow::days(30).unwrap();
        let model = Runner::new(config).execute().unwrap();
        match model.view {
            Some(RenderedView::Animated(timeline)) => assert_eq!(timeline.len(), 1),
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn runner_applies_subject_selection() {
        let mut config = WorkflowConfig::default();
        config.subjects = vec!["FOX-KAR-02".into()];
        let model = Runner::new(config).execute().unwrap();
        assert_eq!(model.summary.selection, vec!["FOX-KAR-02"]);
        assert_eq!(model.summary.records_shown, 24);
    }

    #[test]
    fn missing_column_becomes_a_notice() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"id,when,lat,lon\n1,2020-01-01,1,2\n").unwrap();
        let path = temp.into_temp_path();
        let config = WorkflowConfig::from_source(DataSource::Csv {
            path: path.to_path_buf(),
        });
        let model = Runner::new(config).execute().unwrap();
        assert_eq!(model.summary.notice.level, NoticeLevel::Error);
        assert!(model.summary.notice.message.contains("individual-local-identifier"));
        assert!(model.view.is_none());
    }

    #[test]
    fn unreadable_path_is_an_error() {
        let config = WorkflowConfig::from_source(DataSource::Csv {
            path: "does/not/exist.csv".into(),
        });
        assert!(Runner::new(config).execute().is_err());
    }
}
