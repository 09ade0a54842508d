pub mod palette;
pub mod player;
pub mod static_map;
pub mod timeline;
pub mod view;

pub use palette::{Palette, Rgb};
pub use player::TimelinePlayer;
pub use static_map::StaticRenderer;
pub use timeline::{Frame, FrameMode, TimeWindow, Timeline, TimelineRenderer};
pub use view::{Camera, MapView, Marker, MarkerKind, TrackLayer};
