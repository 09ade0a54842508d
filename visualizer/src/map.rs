use crate::Message;
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Size, Theme,
};
use migrationcore::math::{GeoBounds, GeoPoint};
use migrationcore::render::{MapView, Marker, MarkerKind, Rgb};

const GRATICULE_STEPS: [f64; 10] = [0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 15.0, 30.0];
const MARGIN: f32 = 14.0;

/// Equirectangular fit of geographic bounds into a canvas, with longitude
/// scaled by the cosine of the middle latitude.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    bounds: GeoBounds,
    lon_factor: f64,
    scale: f64,
    origin: Point,
}

impl Projection {
    pub fn fit(bounds: GeoBounds, size: Size) -> Self {
        let mid_lat = (bounds.min_lat + bounds.max_lat) / 2.0;
        let lon_factor = mid_lat.to_radians().cos().max(0.05);
        let geo_width = (bounds.lon_span() * lon_factor).max(1e-6);
        let geo_height = bounds.lat_span().max(1e-6);
        let avail_w = f64::from((size.width - 2.0 * MARGIN).max(1.0));
        let avail_h = f64::from((size.height - 2.0 * MARGIN).max(1.0));
        let scale = (avail_w / geo_width).min(avail_h / geo_height);
        let used_w = geo_width * scale;
        let used_h = geo_height * scale;
        let origin = Point::new(
            (f64::from(size.width) - used_w) as f32 / 2.0,
            (f64::from(size.height) - used_h) as f32 / 2.0,
        );
        Self {
            bounds,
            lon_factor,
            scale,
            origin,
        }
    }

    pub fn project(&self, point: GeoPoint) -> Point {
        let x = (point.lon - self.bounds.min_lon) * self.lon_factor * self.scale;
        let y = (self.bounds.max_lat - point.lat) * self.scale;
        Point::new(self.origin.x + x as f32, self.origin.y + y as f32)
    }
}

fn graticule_step(span: f64) -> f64 {
    GRATICULE_STEPS
        .iter()
        .copied()
        .find(|step| span / step <= 8.0)
        .unwrap_or(45.0)
}

fn to_color(rgb: Rgb, alpha: f32) -> Color {
    Color {
        a: alpha,
        ..Color::from_rgb8(rgb.r, rgb.g, rgb.b)
    }
}

/// Canvas program drawing one map view plus optional live positions.
#[derive(Clone)]
pub struct MapCanvas {
    view: MapView,
    positions: Vec<Marker>,
}

impl MapCanvas {
    pub fn new(view: &MapView, positions: &[Marker]) -> Self {
        Self {
            view: view.clone(),
            positions: positions.to_vec(),
        }
    }

    fn draw_graticule(&self, frame: &mut Frame, projection: &Projection) {
        let bounds = self.view.camera.bounds;
        let step = graticule_step(bounds.lat_span().max(bounds.lon_span()));
        let grid = Path::new(|builder| {
            let mut lat = (bounds.min_lat / step).ceil() * step;
            while lat <= bounds.max_lat {
                builder.move_to(projection.project(GeoPoint::new(lat, bounds.min_lon)));
                builder.line_to(projection.project(GeoPoint::new(lat, bounds.max_lon)));
                lat += step;
            }
            let mut lon = (bounds.min_lon / step).ceil() * step;
            while lon <= bounds.max_lon {
                builder.move_to(projection.project(GeoPoint::new(bounds.min_lat, lon)));
                builder.line_to(projection.project(GeoPoint::new(bounds.max_lat, lon)));
                lon += step;
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_width(1.0)
                .with_color(Color::from_rgb(0.16, 0.2, 0.26)),
        );
    }

    fn draw_marker(frame: &mut Frame, center: Point, radius: f32, fill: Color) {
        let outline = Path::new(|builder| builder.circle(center, radius + 1.5));
        frame.fill(&outline, Color::from_rgb(0.95, 0.95, 0.95));
        let dot = Path::new(|builder| builder.circle(center, radius));
        frame.fill(&dot, fill);
    }
}

impl canvas::Program<Message> for MapCanvas {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.04, 0.07, 0.11),
        );

        let projection = Projection::fit(self.view.camera.bounds, bounds.size());
        self.draw_graticule(&mut frame, &projection);

        for layer in &self.view.layers {
            if layer.path.len() > 1 {
                let path = Path::new(|builder| {
                    for (i, point) in layer.path.iter().enumerate() {
                        let projected = projection.project(*point);
                        if i == 0 {
                            builder.move_to(projected);
                        } else {
                            builder.line_to(projected);
                        }
                    }
                });
                frame.stroke(
                    &path,
                    Stroke::default()
                        .with_width(layer.weight)
                        .with_color(to_color(layer.color, layer.opacity)),
                );
            }
        }

        for marker in &self.view.markers {
            let fill = match marker.kind {
                MarkerKind::Start => Color::from_rgb(0.2, 0.75, 0.3),
                MarkerKind::End => Color::from_rgb(0.85, 0.2, 0.2),
                MarkerKind::Position => to_color(marker.color, 1.0),
            };
            Self::draw_marker(&mut frame, projection.project(marker.position), 4.0, fill);
        }

        for marker in &self.positions {
            Self::draw_marker(
                &mut frame,
                projection.project(marker.position),
                6.5,
                to_color(marker.color, 1.0),
            );
        }

        vec![frame.into_geometry()]
    }
}
