pub mod controller;
pub mod geometry;

pub use controller::{DockConfig, DockEdge, DockLayout, DockState, DockingController};
pub use geometry::{FixedScreen, Point, Rect, ScreenGeometry};
