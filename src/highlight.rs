//! Programmatic highlight regions.
//!
//! Host code can mark page regions directly (e.g. fields located by an
//! extraction service) without going through the pointer state machine.
//! Coordinates are always document space; the view layer is never involved
//! in creating or persisting these regions. Highlights created here are
//! tagged so bulk removal leaves user-drawn annotations untouched.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::geometry::Rect;
use crate::model::{
    Annotation, AnnotationId, AnnotationKind, AnnotationOrigin, AnnotationStore, Color,
};

/// Visual style of a highlight region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightStyle {
    pub border_color: Color,
    pub fill_color: Color,
    /// Fill opacity, 0.0-1.0.
    pub fill_opacity: f32,
    /// Border width in document units.
    pub border_width: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        let [br, bg, bb] = constants::DEFAULT_HIGHLIGHT_BORDER;
        let [fr, fg, fb] = constants::DEFAULT_HIGHLIGHT_FILL;
        Self {
            border_color: Color::new(br, bg, bb),
            fill_color: Color::new(fr, fg, fb),
            fill_opacity: constants::DEFAULT_HIGHLIGHT_OPACITY,
            border_width: constants::DEFAULT_HIGHLIGHT_BORDER_WIDTH,
        }
    }
}

/// Per-call style override; unset fields fall back to the registry defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighlightStyleOverride {
    #[serde(default)]
    pub border_color: Option<Color>,
    #[serde(default)]
    pub fill_color: Option<Color>,
    #[serde(default)]
    pub fill_opacity: Option<f32>,
    #[serde(default)]
    pub border_width: Option<f32>,
}

/// Imperative highlight API, independent of pointer gestures.
pub struct HighlightRegistry {
    defaults: HighlightStyle,
    author: String,
}

impl HighlightRegistry {
    pub fn new(defaults: HighlightStyle) -> Self {
        Self {
            defaults,
            author: String::new(),
        }
    }

    /// Author stamped on highlights created through this registry.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Create a highlight from caller-supplied document coordinates and
    /// insert it into the store. Returns the new annotation id.
    pub fn create(
        &self,
        store: &mut AnnotationStore,
        page_index: u32,
        rect: Rect,
        style: Option<HighlightStyleOverride>,
    ) -> AnnotationId {
        let style = self.resolve(style);
        let id = store.allocate_id();
        let mut annotation = Annotation::new(
            id,
            AnnotationKind::Highlight,
            page_index,
            rect,
            self.author.clone(),
            Utc::now(),
        );
        annotation.origin = AnnotationOrigin::Api;
        annotation.color = Some(style.border_color);
        annotation.interior_color = Some(style.fill_color);
        annotation.opacity = Some(style.fill_opacity);
        annotation.border_width = Some(style.border_width);
        store.insert(annotation);

        log::debug!("Created highlight {} on page {}", id, page_index);
        id
    }

    /// Remove a highlight previously created through this registry.
    ///
    /// Returns false when the id is unknown or refers to an annotation the
    /// registry does not own, so callers can probe optimistically.
    pub fn remove(&self, store: &mut AnnotationStore, id: AnnotationId) -> bool {
        match store.get(id) {
            Some(annotation) if annotation.origin == AnnotationOrigin::Api => {
                store.remove(id);
                log::debug!("Removed highlight {}", id);
                true
            }
            Some(_) => {
                log::debug!("Annotation {} is not registry-owned, leaving it", id);
                false
            }
            None => false,
        }
    }

    /// Remove every registry-owned highlight, leaving user-drawn
    /// annotations in place. Returns how many were removed.
    pub fn clear_all(&self, store: &mut AnnotationStore) -> usize {
        let removed = store.remove_where(|a| a.origin == AnnotationOrigin::Api);
        log::info!("Cleared {} highlights", removed);
        removed
    }

    fn resolve(&self, style: Option<HighlightStyleOverride>) -> HighlightStyle {
        let style = style.unwrap_or_default();
        HighlightStyle {
            border_color: style.border_color.unwrap_or(self.defaults.border_color),
            fill_color: style.fill_color.unwrap_or(self.defaults.fill_color),
            fill_opacity: style.fill_opacity.unwrap_or(self.defaults.fill_opacity),
            border_width: style.border_width.unwrap_or(self.defaults.border_width),
        }
    }
}
