//! pagemark - PDF page annotation engine.
//!
//! Maps between a page's intrinsic document space and the zoomed,
//! rotated view space of its rendered surface, runs the pointer gesture
//! state machine for drawing, moving and resizing annotations, exposes a
//! programmatic highlight API for host code, and serializes annotations
//! to XFDF for interchange with other PDF tools.
//!
//! The page rasterizer and the surrounding application shell are external
//! collaborators: the renderer supplies a [`viewport::PageViewport`] per
//! page, the host feeds pointer events to an [`overlay::AnnotationOverlay`]
//! and reacts to the returned [`overlay::OverlayEvent`]s.

pub mod config;
pub mod constants;
pub mod format;
pub mod geometry;
pub mod highlight;
pub mod model;
pub mod overlay;
pub mod suffix;
pub mod viewport;

pub use config::{ConfigError, EngineConfig};
pub use format::{FormatError, ImportReport};
pub use geometry::{DocPoint, Handle, Rect, ViewPoint};
pub use highlight::{HighlightRegistry, HighlightStyle, HighlightStyleOverride};
pub use model::{
    Annotation, AnnotationId, AnnotationKind, AnnotationOrigin, AnnotationStore, Bookmark, Color,
};
pub use overlay::{AnnotationOverlay, OverlayConfig, OverlayError, OverlayEvent, Tool};
pub use suffix::{BracketPair, SuffixConfig, SuffixPlacement};
pub use viewport::{CoordinateMapper, PageViewport, Rotation, ViewportError};
