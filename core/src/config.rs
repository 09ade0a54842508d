use crate::render::{FrameMode, TimeWindow};
use crate::session::ViewMode;
use serde::{Deserialize, Serialize};

/// Header names of the required columns, defaulting to the Movebank export schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub subject: String,
    pub timestamp: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            subject: "individual-local-identifier".into(),
            timestamp: "timestamp".into(),
            latitude: "location-lat".into(),
            longitude: "location-long".into(),
        }
    }
}

impl ColumnMapping {
    pub fn required(&self) -> [&str; 4] {
        [
            self.subject.as_str(),
            self.timestamp.as_str(),
            self.latitude.as_str(),
            self.longitude.as_str(),
        ]
    }
}

/// Initial choices for a session before the user touches any control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub columns: ColumnMapping,
    pub view_mode: ViewMode,
    pub interval: TimeWindow,
    pub frame_mode: FrameMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            view_mode: ViewMode::Static,
            interval: TimeWindow::DEFAULT,
            frame_mode: FrameMode::Cumulative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_columns_follow_movebank_headers() {
        let columns = ColumnMapping::default();
        assert_eq!(
            columns.required(),
            [
                "individual-local-identifier",
                "timestamp",
                "location-lat",
                "location-long"
            ]
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SessionConfig =
            serde_json::from_str(r#"{"interval": "12h", "columns": {"subject": "tag"}}"#).unwrap();
        assert_eq!(cfg.interval, TimeWindow::hours(12).unwrap());
        assert_eq!(cfg.columns.subject, "tag");
        assert_eq!(cfg.columns.latitude, "location-lat");
        assert_eq!(cfg.view_mode, ViewMode::Static);
    }
}
