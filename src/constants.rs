//! Global default constants for the annotation engine.

/// Minimum draw extent (view pixels) for a gesture to produce an annotation.
pub const DEFAULT_MIN_DRAG_PX: f32 = 6.0;

/// Hit radius around a resize handle (view pixels).
pub const DEFAULT_HANDLE_HIT_RADIUS_PX: f32 = 6.0;

/// Maximum pointer travel (view pixels) for a press to count as a click.
pub const DEFAULT_CLICK_EPSILON_PX: f32 = 3.0;

/// Tolerance for coordinate round-trip comparisons (document units).
pub const COORD_EPSILON: f32 = 0.01;

/// Default highlight border color (RGB).
pub const DEFAULT_HIGHLIGHT_BORDER: [u8; 3] = [255, 200, 0];

/// Default highlight fill color (RGB).
pub const DEFAULT_HIGHLIGHT_FILL: [u8; 3] = [255, 235, 130];

/// Default highlight fill opacity.
pub const DEFAULT_HIGHLIGHT_OPACITY: f32 = 0.35;

/// Default highlight border width (document units).
pub const DEFAULT_HIGHLIGHT_BORDER_WIDTH: f32 = 1.0;
