use crate::math::{GeoPoint, StatsHelper};
use crate::prelude::MapRenderer;
use crate::records::{group_tracks, LocationRecord};
use crate::render::view::{Camera, MapView, Marker, MarkerKind, TrackLayer};
use crate::render::Palette;
use crate::telemetry::LogManager;

const TOOLTIP_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders every subject's full path with start and end markers.
pub struct StaticRenderer {
    logger: LogManager,
}

impl StaticRenderer {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("static"),
        }
    }

    /// Mean position of all fixes; zoomed out when there is more than one.
    pub fn camera_for(records: &[LocationRecord]) -> Camera {
        let points: Vec<GeoPoint> = records.iter().map(LocationRecord::position).collect();
        match (
            StatsHelper::centroid(&points),
            StatsHelper::bounds(&points),
        ) {
            (Some(center), Some(bounds)) => Camera {
                center,
                zoom: if records.len() > 1 { 6 } else { 10 },
                bounds: bounds.padded(0.08, 0.05),
            },
            _ => Camera::world(),
        }
    }

    pub fn render_with_camera(
        &self,
        records: &[LocationRecord],
        palette: &Palette,
        camera: Camera,
    ) -> MapView {
        let mut view = MapView::with_camera(camera);

        for track in group_tracks(records) {
            let (Some(first), Some(last)) = (track.first(), track.last()) else {
                continue;
            };
            let color = palette.color_of(track.subject_id);

            view.layers.push(TrackLayer {
                subject_id: track.subject_id.to_string(),
                color,
                weight: 3.0,
                opacity: 0.8,
                tooltip: format!("Animal {}", track.subject_id),
                path: track.positions(),
            });
            view.markers.push(Marker {
                subject_id: track.subject_id.to_string(),
                kind: MarkerKind::Start,
                position: first.position(),
                timestamp: first.timestamp,
                color,
                tooltip: format!(
                    "Start - Animal {}\n{}",
                    track.subject_id,
                    first.timestamp.format(TOOLTIP_TIME_FORMAT)
                ),
            });
            view.markers.push(Marker {
                subject_id: track.subject_id.to_string(),
                kind: MarkerKind::End,
                position: last.position(),
                timestamp: last.timestamp,
                color,
                tooltip: format!(
                    "End - Animal {}\n{}",
                    track.subject_id,
                    last.timestamp.format(TOOLTIP_TIME_FORMAT)
                ),
            });
        }

        view
    }
}

impl Default for StaticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MapRenderer for StaticRenderer {
    type Output = MapView;

    fn render(&self, records: &[LocationRecord], palette: &Palette) -> MapView {
        if records.is_empty() {
            self.logger.record("no records selected, rendering placeholder");
            return MapView::placeholder();
        }
        let view = self.render_with_camera(records, palette, Self::camera_for(records));
        self.logger.record(&format!(
            "{} tracks / {} points",
            view.layers.len(),
            view.point_count()
        ));
        view
    }
}
