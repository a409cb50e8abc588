//! Annotation geometry: points, rectangles and resize-handle math.
//!
//! Document space has its origin at the bottom-left of the page with Y
//! increasing upward; view space has its origin at the top-left of the
//! rendered surface with Y increasing downward. The two point types are
//! distinct so the spaces cannot be mixed by accident.

use serde::{Deserialize, Serialize};

/// A point in document space (origin bottom-left, Y up, zoom-independent units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocPoint {
    pub x: f32,
    pub y: f32,
}

impl DocPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A point in view space (origin top-left, Y down, pixels at the current zoom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewPoint {
    pub x: f32,
    pub y: f32,
}

impl ViewPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another view point.
    pub fn distance_to(&self, other: &ViewPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An axis-aligned document-space rectangle `[x1, y1, x2, y2]`.
///
/// Normalized by construction: `x1 <= x2` and `y1 <= y2`. All persisted
/// geometry uses this type; view-space rectangles never leave the
/// interaction layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    /// Create a rect from four scalars, swapping coordinates as needed.
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Create a normalized rect from two corner points (in any order).
    pub fn from_points(p1: DocPoint, p2: DocPoint) -> Self {
        Self::new(p1.x, p1.y, p2.x, p2.y)
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Check if a document point is inside the rect (edges inclusive).
    pub fn contains(&self, point: DocPoint) -> bool {
        point.x >= self.x1 && point.x <= self.x2 && point.y >= self.y1 && point.y <= self.y2
    }

    /// Shift the rect by a document-space delta.
    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }

    /// Clamp the rect into `[0, page_width] x [0, page_height]`.
    ///
    /// The rect is shifted back onto the page where possible; a rect larger
    /// than the page is pinned to the page bounds.
    pub fn clamped_to_page(&self, page_width: f32, page_height: f32) -> Rect {
        let mut dx = 0.0;
        if self.x2 > page_width {
            dx = page_width - self.x2;
        }
        if self.x1 + dx < 0.0 {
            dx = -self.x1;
        }

        let mut dy = 0.0;
        if self.y2 > page_height {
            dy = page_height - self.y2;
        }
        if self.y1 + dy < 0.0 {
            dy = -self.y1;
        }

        let shifted = self.translated(dx, dy);
        Rect {
            x1: shifted.x1.clamp(0.0, page_width),
            y1: shifted.y1.clamp(0.0, page_height),
            x2: shifted.x2.clamp(0.0, page_width),
            y2: shifted.y2.clamp(0.0, page_height),
        }
    }
}

/// A view-space rectangle used for hit testing and live resize.
///
/// Normalized by construction: `left <= right` and `top <= bottom`
/// (view Y grows downward). Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ViewRect {
    /// Create a view rect from four scalars, swapping coordinates as needed.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left: left.min(right),
            top: top.min(bottom),
            right: left.max(right),
            bottom: top.max(bottom),
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Check if a view point is inside the rect (edges inclusive).
    pub fn contains(&self, point: ViewPoint) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

/// A resize handle on an annotation rectangle, named by its visual position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    Top,
    Right,
    Bottom,
    Left,
}

impl Handle {
    /// All handles in hit-test priority order: corners before edge
    /// midpoints, clockwise from top-left.
    pub fn in_priority_order() -> &'static [Handle] {
        &[
            Handle::TopLeft,
            Handle::TopRight,
            Handle::BottomRight,
            Handle::BottomLeft,
            Handle::Top,
            Handle::Right,
            Handle::Bottom,
            Handle::Left,
        ]
    }

    /// Center of this handle on the given view rect.
    pub fn center(&self, rect: &ViewRect) -> ViewPoint {
        let mid_x = (rect.left + rect.right) / 2.0;
        let mid_y = (rect.top + rect.bottom) / 2.0;
        match self {
            Handle::TopLeft => ViewPoint::new(rect.left, rect.top),
            Handle::TopRight => ViewPoint::new(rect.right, rect.top),
            Handle::BottomRight => ViewPoint::new(rect.right, rect.bottom),
            Handle::BottomLeft => ViewPoint::new(rect.left, rect.bottom),
            Handle::Top => ViewPoint::new(mid_x, rect.top),
            Handle::Right => ViewPoint::new(rect.right, mid_y),
            Handle::Bottom => ViewPoint::new(mid_x, rect.bottom),
            Handle::Left => ViewPoint::new(rect.left, mid_y),
        }
    }
}

/// Find the resize handle under `point`, if any.
///
/// Each handle claims a square region of `handle_radius_px` around its
/// center; corners win over edge midpoints when regions overlap.
pub fn hit_test_handles(rect: &ViewRect, point: ViewPoint, handle_radius_px: f32) -> Option<Handle> {
    for handle in Handle::in_priority_order() {
        let center = handle.center(rect);
        if (point.x - center.x).abs() <= handle_radius_px
            && (point.y - center.y).abs() <= handle_radius_px
        {
            return Some(*handle);
        }
    }
    None
}

/// Move the edge(s) controlled by `handle` to `point` and re-normalize.
///
/// Dragging a handle across the opposite edge flips the rect instead of
/// producing an inverted one.
pub fn resize_view_rect(rect: &ViewRect, handle: Handle, point: ViewPoint) -> ViewRect {
    let (mut left, mut top, mut right, mut bottom) =
        (rect.left, rect.top, rect.right, rect.bottom);
    match handle {
        Handle::TopLeft => {
            left = point.x;
            top = point.y;
        }
        Handle::TopRight => {
            right = point.x;
            top = point.y;
        }
        Handle::BottomRight => {
            right = point.x;
            bottom = point.y;
        }
        Handle::BottomLeft => {
            left = point.x;
            bottom = point.y;
        }
        Handle::Top => top = point.y,
        Handle::Right => right = point.x,
        Handle::Bottom => bottom = point.y,
        Handle::Left => left = point.x,
    }
    ViewRect::new(left, top, right, bottom)
}
