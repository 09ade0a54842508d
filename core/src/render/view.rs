use crate::math::{GeoBounds, GeoPoint};
use crate::render::Rgb;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const BASE_LAYER: &str = "Esri WorldImagery";

/// Where the map is looking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center: GeoPoint,
    pub zoom: u8,
    pub bounds: GeoBounds,
}

impl Camera {
    pub fn world() -> Self {
        Self {
            center: GeoPoint::new(0.0, 0.0),
            zoom: 2,
            bounds: GeoBounds::WORLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Start,
    End,
    /// Latest known fix of a subject within an animation frame.
    Position,
}

impl MarkerKind {
    pub fn icon_color(&self) -> &'static str {
        match self {
            MarkerKind::Start => "green",
            MarkerKind::End => "red",
            MarkerKind::Position => "subject",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub subject_id: String,
    pub kind: MarkerKind,
    pub position: GeoPoint,
    pub timestamp: DateTime<Utc>,
    pub color: Rgb,
    pub tooltip: String,
}

/// One subject's path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackLayer {
    pub subject_id: String,
    pub color: Rgb,
    pub weight: f32,
    pub opacity: f32,
    pub tooltip: String,
    pub path: Vec<GeoPoint>,
}

/// A renderable map: camera, one polyline per subject and its markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub base_layer: String,
    pub camera: Camera,
    pub layers: Vec<TrackLayer>,
    pub markers: Vec<Marker>,
}

impl MapView {
    /// Stand-in shown when nothing is selected.
    pub fn placeholder() -> Self {
        Self::with_camera(Camera::world())
    }

    pub fn with_camera(camera: Camera) -> Self {
        Self {
            base_layer: BASE_LAYER.to_string(),
            camera,
            layers: Vec::new(),
            markers: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.path.len()).sum()
    }
}
