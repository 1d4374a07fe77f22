use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Screen-space position in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn with_x(self, x: i32) -> Self {
        Self { x, y: self.y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn mid_x(&self) -> i32 {
        self.x + self.width / 2
    }
}

/// Supplies the primary display's working area. `None` when no display is known.
pub trait ScreenGeometry: Send + Sync {
    fn primary_work_area(&self) -> Option<Rect>;
}

/// A screen whose working area never changes.
#[derive(Debug, Clone, Copy)]
pub struct FixedScreen(pub Option<Rect>);

impl ScreenGeometry for FixedScreen {
    fn primary_work_area(&self) -> Option<Rect> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let delta = Point::new(130, 40) - Point::new(100, 50);
        assert_eq!(delta, Point::new(30, -10));
        assert_eq!(Point::new(5, 5) + delta, Point::new(35, -5));
    }

    #[test]
    fn rect_edges() {
        let area = Rect::new(100, 0, 1920, 1040);
        assert_eq!(area.right(), 2020);
        assert_eq!(area.mid_x(), 1060);
    }
}
