use serde::Serialize;

use super::geometry::{Point, Rect, ScreenGeometry};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DockEdge {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DockConfig {
    /// Distance from a working-area edge within which a released bar snaps.
    pub snap_threshold: i32,
    pub expanded_width: i32,
    /// Visible width when collapsed and the time text has not been measured.
    pub collapsed_fallback_width: i32,
    /// Horizontal padding added around the measured time text when collapsed.
    pub content_padding: i32,
    pub expanded_opacity: f64,
    pub collapsed_opacity: f64,
    /// Initial offset from the working area's top-right corner.
    pub initial_inset: Point,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            snap_threshold: 20,
            expanded_width: 300,
            collapsed_fallback_width: 45,
            content_padding: 32,
            expanded_opacity: 0.95,
            collapsed_opacity: 0.7,
            initial_inset: Point::new(20, 50),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DockState {
    pub position: Point,
    pub is_dragging: bool,
    pub is_snapped: bool,
    pub is_pointer_over: bool,
    pub width: i32,
    pub opacity: f64,
    pub edge: Option<DockEdge>,
    last_pointer: Option<Point>,
    content_width: Option<i32>,
}

/// What the host window should look like after a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DockLayout {
    pub position: Point,
    pub width: i32,
    pub opacity: f64,
    pub collapsed: bool,
    pub edge: Option<DockEdge>,
}

/// Position, drag and edge-snap state of the floating bar.
///
/// ```text
/// Unsnapped-Expanded --release near edge--> Snapped-Expanded <--pointer--> Snapped-Collapsed
///        ^                                         |                            |
///        +------------------- begin_drag ----------+----------------------------+
/// ```
///
/// Snapping is decided once per drag release. Collapse shrinks the bar to the
/// time text and keeps it against the edge it snapped to.
pub struct DockingController<S: ScreenGeometry> {
    config: DockConfig,
    screen: S,
    state: DockState,
}

impl<S: ScreenGeometry> DockingController<S> {
    /// Creates the controller and places the bar near the working area's top-right corner.
    pub fn new(config: DockConfig, screen: S) -> Self {
        let state = DockState {
            position: Point::default(),
            is_dragging: false,
            is_snapped: false,
            is_pointer_over: false,
            width: config.expanded_width,
            opacity: config.expanded_opacity,
            edge: None,
            last_pointer: None,
            content_width: None,
        };
        let mut controller = Self {
            config,
            screen,
            state,
        };
        controller.place_initial();
        controller
    }

    pub fn state(&self) -> &DockState {
        &self.state
    }

    pub fn config(&self) -> &DockConfig {
        &self.config
    }

    pub fn is_collapsed(&self) -> bool {
        self.state.is_snapped && !self.state.is_pointer_over
    }

    pub fn layout(&self) -> DockLayout {
        DockLayout {
            position: self.state.position,
            width: self.state.width,
            opacity: self.state.opacity,
            collapsed: self.is_collapsed(),
            edge: self.state.edge,
        }
    }

    pub fn place_initial(&mut self) -> DockLayout {
        if let Some(area) = self.work_area() {
            self.state.position = Point::new(
                area.right() - self.config.expanded_width - self.config.initial_inset.x,
                area.y + self.config.initial_inset.y,
            );
        }
        self.layout()
    }

    /// Moves the bar to an explicit position, e.g. one restored by the host.
    pub fn move_to(&mut self, position: Point) -> DockLayout {
        self.state.position = position;
        self.layout()
    }

    pub fn begin_drag(&mut self, pointer: Point) -> DockLayout {
        if self.state.is_snapped {
            self.state.is_snapped = false;
            self.state.edge = None;
            self.update_visual_state();
        }
        self.state.is_dragging = true;
        self.state.last_pointer = Some(pointer);
        self.layout()
    }

    pub fn drag_move(&mut self, pointer: Point) -> DockLayout {
        if !self.state.is_dragging {
            return self.layout();
        }
        if let Some(last) = self.state.last_pointer {
            let delta = pointer - last;
            self.state.position = self.state.position + delta;
        }
        self.state.last_pointer = Some(pointer);
        self.layout()
    }

    pub fn end_drag(&mut self) -> DockLayout {
        if !self.state.is_dragging {
            return self.layout();
        }
        self.state.is_dragging = false;
        self.state.last_pointer = None;
        self.snap_to_edge();
        self.update_visual_state();
        self.layout()
    }

    pub fn pointer_enter(&mut self) -> DockLayout {
        self.state.is_pointer_over = true;
        self.update_visual_state();
        self.layout()
    }

    pub fn pointer_exit(&mut self) -> DockLayout {
        self.state.is_pointer_over = false;
        self.update_visual_state();
        self.layout()
    }

    /// Records the rendered width of the time text; `None` falls back to a fixed width.
    pub fn set_content_width(&mut self, width: Option<i32>) -> DockLayout {
        self.state.content_width = width.filter(|w| *w > 0);
        self.update_visual_state();
        self.layout()
    }

    fn collapsed_width(&self) -> i32 {
        self.state
            .content_width
            .map(|text| text + self.config.content_padding)
            .unwrap_or(self.config.collapsed_fallback_width)
            .min(self.config.expanded_width)
    }

    fn snap_to_edge(&mut self) {
        let Some(area) = self.work_area() else {
            self.state.is_snapped = false;
            self.state.edge = None;
            return;
        };

        let x = self.state.position.x;
        let threshold = self.config.snap_threshold;
        let near_left = x < area.x + threshold;
        let near_right = x + self.config.expanded_width > area.right() - threshold;

        if near_left || near_right {
            let edge = if x < area.mid_x() {
                DockEdge::Left
            } else {
                DockEdge::Right
            };
            self.state.is_snapped = true;
            self.state.edge = Some(edge);
            log_info!("floating bar snapped to {:?} edge at x={}", edge, x);
        } else {
            self.state.is_snapped = false;
            self.state.edge = None;
            log_debug!("floating bar released at x={x}, no snap");
        }
    }

    fn update_visual_state(&mut self) {
        if self.is_collapsed() {
            self.state.width = self.collapsed_width();
            self.state.opacity = self.config.collapsed_opacity;
        } else {
            self.state.width = self.config.expanded_width;
            self.state.opacity = self.config.expanded_opacity;
        }

        let Some(edge) = self.state.edge.filter(|_| self.state.is_snapped) else {
            return;
        };
        let Some(area) = self.work_area() else {
            return;
        };
        let x = match edge {
            DockEdge::Left => area.x,
            DockEdge::Right => area.right() - self.state.width,
        };
        self.state.position = self.state.position.with_x(x);
    }

    fn work_area(&self) -> Option<Rect> {
        let area = self.screen.primary_work_area();
        if area.is_none() {
            log_debug!("no primary display; keeping floating bar at its last position");
        }
        area
    }
}
