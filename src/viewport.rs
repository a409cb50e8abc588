//! Page viewport description and document/view coordinate mapping.
//!
//! A [`CoordinateMapper`] is an immutable value object built from one
//! viewport. When the scale or rotation changes the caller rebuilds the
//! mapper and discards the previous one rather than patching it, so a
//! stale transform cannot survive a zoom change.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{DocPoint, Rect, ViewPoint, ViewRect};

/// Page rotation in quarter turns, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    /// Parse a rotation from degrees (multiples of 90, modulo 360).
    pub fn from_degrees(degrees: i32) -> Option<Rotation> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::Rotate0),
            90 => Some(Rotation::Rotate90),
            180 => Some(Rotation::Rotate180),
            270 => Some(Rotation::Rotate270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Rotate0 => 0,
            Rotation::Rotate90 => 90,
            Rotation::Rotate180 => 180,
            Rotation::Rotate270 => 270,
        }
    }

    /// Whether this rotation swaps the page's width and height on screen.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Rotation::Rotate90 | Rotation::Rotate270)
    }
}

/// Per-page, per-scale rendering descriptor supplied by the page renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageViewport {
    /// Page width in document units.
    pub page_width: f32,
    /// Page height in document units.
    pub page_height: f32,
    /// Current zoom factor.
    pub scale: f32,
    /// Rotation applied by the renderer.
    pub rotation: Rotation,
    /// Rendered surface width in pixels.
    pub pixel_width: f32,
    /// Rendered surface height in pixels.
    pub pixel_height: f32,
}

impl PageViewport {
    /// Create a viewport, deriving the pixel dimensions from the page
    /// size, scale and rotation.
    pub fn new(page_width: f32, page_height: f32, scale: f32, rotation: Rotation) -> Self {
        let (pixel_width, pixel_height) = if rotation.swaps_axes() {
            (page_height * scale, page_width * scale)
        } else {
            (page_width * scale, page_height * scale)
        };
        Self {
            page_width,
            page_height,
            scale,
            rotation,
            pixel_width,
            pixel_height,
        }
    }

    fn is_degenerate(&self) -> bool {
        !(self.page_width > 0.0
            && self.page_height > 0.0
            && self.scale > 0.0
            && self.pixel_width > 0.0
            && self.pixel_height > 0.0)
    }
}

/// Errors from viewport validation.
#[derive(Debug, Error)]
pub enum ViewportError {
    /// The viewport has a non-positive dimension or scale. Never silently
    /// clamped; callers must not build a mapper in this state.
    #[error("invalid viewport: {page_width}x{page_height} at scale {scale}")]
    InvalidViewport {
        page_width: f32,
        page_height: f32,
        scale: f32,
    },
}

/// Bidirectional transform between document space and view space for one
/// page at one scale and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    viewport: PageViewport,
}

impl CoordinateMapper {
    /// Validate the viewport and build a mapper for it.
    pub fn new(viewport: PageViewport) -> Result<Self, ViewportError> {
        if viewport.is_degenerate() {
            return Err(ViewportError::InvalidViewport {
                page_width: viewport.page_width,
                page_height: viewport.page_height,
                scale: viewport.scale,
            });
        }
        Ok(Self { viewport })
    }

    pub fn viewport(&self) -> &PageViewport {
        &self.viewport
    }

    /// Map a view-space point to document space.
    pub fn to_doc(&self, point: ViewPoint) -> DocPoint {
        let s = self.viewport.scale;
        let w = self.viewport.page_width;
        let h = self.viewport.page_height;
        match self.viewport.rotation {
            Rotation::Rotate0 => DocPoint::new(point.x / s, h - point.y / s),
            Rotation::Rotate90 => DocPoint::new(point.y / s, point.x / s),
            Rotation::Rotate180 => DocPoint::new(w - point.x / s, point.y / s),
            Rotation::Rotate270 => DocPoint::new(w - point.y / s, h - point.x / s),
        }
    }

    /// Map a document-space point to view space.
    pub fn to_view(&self, point: DocPoint) -> ViewPoint {
        let s = self.viewport.scale;
        let w = self.viewport.page_width;
        let h = self.viewport.page_height;
        match self.viewport.rotation {
            Rotation::Rotate0 => ViewPoint::new(point.x * s, (h - point.y) * s),
            Rotation::Rotate90 => ViewPoint::new(point.y * s, point.x * s),
            Rotation::Rotate180 => ViewPoint::new((w - point.x) * s, point.y * s),
            Rotation::Rotate270 => ViewPoint::new((h - point.y) * s, (w - point.x) * s),
        }
    }

    /// Map a document rect to a normalized view rect.
    pub fn rect_to_view(&self, rect: &Rect) -> ViewRect {
        let a = self.to_view(DocPoint::new(rect.x1, rect.y1));
        let b = self.to_view(DocPoint::new(rect.x2, rect.y2));
        ViewRect::new(a.x, a.y, b.x, b.y)
    }

    /// Map a view rect to a normalized document rect.
    pub fn rect_to_doc(&self, rect: &ViewRect) -> Rect {
        let a = self.to_doc(ViewPoint::new(rect.left, rect.top));
        let b = self.to_doc(ViewPoint::new(rect.right, rect.bottom));
        Rect::from_points(a, b)
    }

    /// Check whether a document rect spans less than `min_px` view pixels
    /// on its larger axis. Used to reject draw gestures that are really
    /// clicks.
    pub fn rect_below_min_view_size(&self, rect: &Rect, min_px: f32) -> bool {
        let view = self.rect_to_view(rect);
        view.width().max(view.height()) < min_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COORD_EPSILON;

    const ROTATIONS: [Rotation; 4] = [
        Rotation::Rotate0,
        Rotation::Rotate90,
        Rotation::Rotate180,
        Rotation::Rotate270,
    ];

    fn letter(scale: f32, rotation: Rotation) -> CoordinateMapper {
        CoordinateMapper::new(PageViewport::new(612.0, 792.0, scale, rotation)).unwrap()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < COORD_EPSILON
    }

    #[test]
    fn test_degenerate_viewports_rejected() {
        assert!(CoordinateMapper::new(PageViewport::new(0.0, 792.0, 1.0, Rotation::Rotate0)).is_err());
        assert!(CoordinateMapper::new(PageViewport::new(612.0, 0.0, 1.0, Rotation::Rotate0)).is_err());
        assert!(CoordinateMapper::new(PageViewport::new(612.0, 792.0, 0.0, Rotation::Rotate0)).is_err());
        assert!(
            CoordinateMapper::new(PageViewport::new(612.0, 792.0, -2.0, Rotation::Rotate0)).is_err()
        );
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0), Some(Rotation::Rotate0));
        assert_eq!(Rotation::from_degrees(90), Some(Rotation::Rotate90));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Rotate90));
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Rotate270));
        assert_eq!(Rotation::from_degrees(45), None);
    }

    #[test]
    fn test_pixel_dimensions_follow_rotation() {
        let upright = PageViewport::new(612.0, 792.0, 2.0, Rotation::Rotate0);
        assert_eq!(upright.pixel_width, 1224.0);
        assert_eq!(upright.pixel_height, 1584.0);

        let sideways = PageViewport::new(612.0, 792.0, 2.0, Rotation::Rotate90);
        assert_eq!(sideways.pixel_width, 1584.0);
        assert_eq!(sideways.pixel_height, 1224.0);
    }

    #[test]
    fn test_y_flip_at_identity_scale() {
        let mapper = letter(1.0, Rotation::Rotate0);
        // View top-left is the page's top-left, which in document space
        // sits at (0, page_height).
        let doc = mapper.to_doc(ViewPoint::new(0.0, 0.0));
        assert!(approx(doc.x, 0.0));
        assert!(approx(doc.y, 792.0));

        let doc = mapper.to_doc(ViewPoint::new(0.0, 100.0));
        assert!(approx(doc.y, 692.0));
    }

    #[test]
    fn test_corner_mapping_rotate90() {
        let mapper = letter(1.0, Rotation::Rotate90);
        // Rotated a quarter turn clockwise, the page's bottom-left corner
        // lands at the view's top-left.
        let view = mapper.to_view(DocPoint::new(0.0, 0.0));
        assert!(approx(view.x, 0.0));
        assert!(approx(view.y, 0.0));

        let view = mapper.to_view(DocPoint::new(0.0, 792.0));
        assert!(approx(view.x, 792.0));
        assert!(approx(view.y, 0.0));

        let view = mapper.to_view(DocPoint::new(612.0, 0.0));
        assert!(approx(view.x, 0.0));
        assert!(approx(view.y, 612.0));
    }

    #[test]
    fn test_corner_mapping_rotate180() {
        let mapper = letter(1.0, Rotation::Rotate180);
        let view = mapper.to_view(DocPoint::new(0.0, 0.0));
        assert!(approx(view.x, 612.0));
        assert!(approx(view.y, 0.0));

        let view = mapper.to_view(DocPoint::new(612.0, 792.0));
        assert!(approx(view.x, 0.0));
        assert!(approx(view.y, 792.0));
    }

    #[test]
    fn test_corner_mapping_rotate270() {
        let mapper = letter(1.0, Rotation::Rotate270);
        let view = mapper.to_view(DocPoint::new(0.0, 0.0));
        assert!(approx(view.x, 792.0));
        assert!(approx(view.y, 612.0));

        let view = mapper.to_view(DocPoint::new(612.0, 792.0));
        assert!(approx(view.x, 0.0));
        assert!(approx(view.y, 0.0));
    }

    #[test]
    fn test_round_trip_across_rotations_and_scales() {
        let scales = [0.1, 0.5, 1.0, 2.5, 10.0];
        let points = [
            DocPoint::new(0.0, 0.0),
            DocPoint::new(612.0, 792.0),
            DocPoint::new(100.0, 200.0),
            DocPoint::new(306.0, 396.0),
            DocPoint::new(12.5, 780.25),
        ];

        for rotation in ROTATIONS {
            for scale in scales {
                let mapper = letter(scale, rotation);
                for p in points {
                    let back = mapper.to_doc(mapper.to_view(p));
                    assert!(
                        approx(back.x, p.x) && approx(back.y, p.y),
                        "doc round trip failed: {:?} scale {} rot {:?} -> {:?}",
                        p,
                        scale,
                        rotation,
                        back
                    );
                }
            }
        }
    }

    #[test]
    fn test_view_round_trip() {
        for rotation in ROTATIONS {
            let mapper = letter(1.5, rotation);
            let q = ViewPoint::new(150.0, 240.0);
            let back = mapper.to_view(mapper.to_doc(q));
            assert!(approx(back.x, q.x));
            assert!(approx(back.y, q.y));
        }
    }

    #[test]
    fn test_drawn_region_maps_with_y_flip() {
        // Drawing from view (100, 100) to (300, 150) on an upright letter
        // page at scale 1.0 covers document Y 642..692.
        let mapper = letter(1.0, Rotation::Rotate0);
        let rect = Rect::from_points(
            mapper.to_doc(ViewPoint::new(100.0, 100.0)),
            mapper.to_doc(ViewPoint::new(300.0, 150.0)),
        );
        assert!(approx(rect.x1, 100.0));
        assert!(approx(rect.y1, 642.0));
        assert!(approx(rect.x2, 300.0));
        assert!(approx(rect.y2, 692.0));
    }

    #[test]
    fn test_rect_below_min_view_size_scales_with_zoom() {
        let rect = Rect::new(100.0, 100.0, 104.0, 104.0);
        let upright = letter(1.0, Rotation::Rotate0);
        assert!(upright.rect_below_min_view_size(&rect, 6.0));

        // At 2x zoom the same rect spans 8 px and passes.
        let zoomed = letter(2.0, Rotation::Rotate0);
        assert!(!zoomed.rect_below_min_view_size(&rect, 6.0));
    }

    #[test]
    fn test_rect_round_trip() {
        for rotation in ROTATIONS {
            let mapper = letter(2.0, rotation);
            let rect = Rect::new(50.0, 700.0, 300.0, 750.0);
            let back = mapper.rect_to_doc(&mapper.rect_to_view(&rect));
            assert!(approx(back.x1, rect.x1));
            assert!(approx(back.y1, rect.y1));
            assert!(approx(back.x2, rect.x2));
            assert!(approx(back.y2, rect.y2));
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::constants::COORD_EPSILON;
    use proptest::prelude::*;

    fn page_dimension() -> impl Strategy<Value = f32> {
        72.0f32..2000.0
    }

    fn zoom() -> impl Strategy<Value = f32> {
        0.1f32..10.0
    }

    fn rotation() -> impl Strategy<Value = Rotation> {
        prop_oneof![
            Just(Rotation::Rotate0),
            Just(Rotation::Rotate90),
            Just(Rotation::Rotate180),
            Just(Rotation::Rotate270),
        ]
    }

    proptest! {
        /// Document -> view -> document returns the original point within tolerance.
        #[test]
        fn roundtrip_doc_view_doc(
            page_w in page_dimension(),
            page_h in page_dimension(),
            scale in zoom(),
            rotation in rotation(),
            fx in 0.0f32..=1.0,
            fy in 0.0f32..=1.0,
        ) {
            let mapper =
                CoordinateMapper::new(PageViewport::new(page_w, page_h, scale, rotation)).unwrap();
            let p = DocPoint::new(fx * page_w, fy * page_h);

            let back = mapper.to_doc(mapper.to_view(p));

            prop_assert!((back.x - p.x).abs() < COORD_EPSILON, "X: {} vs {}", back.x, p.x);
            prop_assert!((back.y - p.y).abs() < COORD_EPSILON, "Y: {} vs {}", back.y, p.y);
        }

        /// View -> document -> view returns the original point within tolerance.
        #[test]
        fn roundtrip_view_doc_view(
            page_w in page_dimension(),
            page_h in page_dimension(),
            scale in zoom(),
            rotation in rotation(),
            fx in 0.0f32..=1.0,
            fy in 0.0f32..=1.0,
        ) {
            let viewport = PageViewport::new(page_w, page_h, scale, rotation);
            let mapper = CoordinateMapper::new(viewport).unwrap();
            let q = ViewPoint::new(fx * viewport.pixel_width, fy * viewport.pixel_height);

            let back = mapper.to_view(mapper.to_doc(q));

            // View pixels scale with zoom, so the tolerance does too.
            let tolerance = COORD_EPSILON * scale.max(1.0);
            prop_assert!((back.x - q.x).abs() < tolerance, "X: {} vs {}", back.x, q.x);
            prop_assert!((back.y - q.y).abs() < tolerance, "Y: {} vs {}", back.y, q.y);
        }

        /// Rect mapping preserves normalization in both spaces.
        #[test]
        fn rect_mapping_stays_normalized(
            page_w in page_dimension(),
            page_h in page_dimension(),
            scale in zoom(),
            rotation in rotation(),
            fx1 in 0.0f32..=1.0,
            fy1 in 0.0f32..=1.0,
            fx2 in 0.0f32..=1.0,
            fy2 in 0.0f32..=1.0,
        ) {
            let mapper =
                CoordinateMapper::new(PageViewport::new(page_w, page_h, scale, rotation)).unwrap();
            let rect = Rect::new(fx1 * page_w, fy1 * page_h, fx2 * page_w, fy2 * page_h);

            let view = mapper.rect_to_view(&rect);
            prop_assert!(view.left <= view.right);
            prop_assert!(view.top <= view.bottom);

            let back = mapper.rect_to_doc(&view);
            prop_assert!(back.x1 <= back.x2);
            prop_assert!(back.y1 <= back.y2);
        }
    }
}
