//! Pointer-driven annotation interaction for a single page overlay.
//!
//! The overlay consumes view-space pointer events, maps them through the
//! page's coordinate mapper, and turns gestures into annotation store
//! mutations. Exactly one gesture is in flight at a time; pointer events
//! arriving in a state that cannot accept them are logged and ignored,
//! which is expected under fast double-clicks.

use chrono::Utc;
use thiserror::Error;

use crate::geometry::{self, Handle, Rect, ViewPoint};
use crate::model::{Annotation, AnnotationId, AnnotationKind, AnnotationStore};
use crate::suffix::{self, SuffixConfig};
use crate::viewport::{CoordinateMapper, PageViewport, ViewportError};
use crate::constants;

/// The active annotation tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// No tool: pointer input drags and resizes existing annotations.
    #[default]
    None,
    Square,
    Highlight,
    FreeText,
    /// Draws a FreeText annotation pre-filled with the configured stamp text.
    Stamp,
}

impl Tool {
    /// Annotation kind produced when a draw gesture with this tool finalizes.
    fn kind(&self) -> Option<AnnotationKind> {
        match self {
            Tool::None => None,
            Tool::Square => Some(AnnotationKind::Square),
            Tool::Highlight => Some(AnnotationKind::Highlight),
            Tool::FreeText | Tool::Stamp => Some(AnnotationKind::FreeText),
        }
    }
}

/// The gesture currently in flight.
///
/// Drag and resize keep the pre-gesture rect so cancellation can roll the
/// annotation back without touching the rest of the collection.
#[derive(Debug, Clone, PartialEq)]
enum GestureMode {
    Idle,
    Drawing {
        anchor: ViewPoint,
        current: ViewPoint,
    },
    Dragging {
        target: AnnotationId,
        anchor: ViewPoint,
        original: Rect,
    },
    Resizing {
        target: AnnotationId,
        handle: Handle,
        original: Rect,
    },
}

/// Host-visible result of an interaction, delivered synchronously from the
/// call that caused it.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    AnnotationCreated(Annotation),
    AnnotationUpdated(Annotation),
    AnnotationDeleted(AnnotationId),
    AnnotationClicked(AnnotationId),
}

/// Errors from overlay operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// A pointer event or query arrived before the renderer supplied a viewport.
    #[error("viewport not ready for page {page_index}")]
    ViewportNotReady { page_index: u32 },
    /// The referenced annotation does not exist.
    #[error("annotation {0} not found")]
    AnnotationNotFound(AnnotationId),
}

/// Interaction configuration supplied by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    /// Author stamped on new annotations.
    pub author: String,
    /// Minimum draw extent in view pixels; smaller gestures are discarded.
    pub min_drag_px: f32,
    /// Hit radius around a resize handle, in view pixels.
    pub handle_hit_radius_px: f32,
    /// Maximum pointer travel for a press to count as a click.
    pub click_epsilon_px: f32,
    /// Keep dragged annotations within the page bounds.
    pub clamp_drag_to_page: bool,
    /// Default contents for new FreeText annotations.
    pub free_text_default: Option<String>,
    /// Contents of stamp annotations.
    pub stamp_text: String,
    /// Suffix policy applied when contents are finalized.
    pub suffix: SuffixConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            author: String::new(),
            min_drag_px: constants::DEFAULT_MIN_DRAG_PX,
            handle_hit_radius_px: constants::DEFAULT_HANDLE_HIT_RADIUS_PX,
            click_epsilon_px: constants::DEFAULT_CLICK_EPSILON_PX,
            clamp_drag_to_page: true,
            free_text_default: None,
            stamp_text: "APPROVED".to_string(),
            suffix: SuffixConfig::default(),
        }
    }
}

/// Pointer interaction state machine for one page overlay.
pub struct AnnotationOverlay {
    page_index: u32,
    config: OverlayConfig,
    mapper: Option<CoordinateMapper>,
    tool: Tool,
    gesture: GestureMode,
}

impl AnnotationOverlay {
    pub fn new(page_index: u32, config: OverlayConfig) -> Self {
        Self {
            page_index,
            config,
            mapper: None,
            tool: Tool::None,
            gesture: GestureMode::Idle,
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Install or replace the page viewport. The previous mapper is
    /// discarded wholesale; transforms are never patched in place.
    pub fn set_viewport(&mut self, viewport: PageViewport) -> Result<(), ViewportError> {
        self.mapper = Some(CoordinateMapper::new(viewport)?);
        Ok(())
    }

    /// The current viewport, once the renderer has supplied one.
    pub fn viewport(&self) -> Result<&PageViewport, OverlayError> {
        self.mapper().map(CoordinateMapper::viewport)
    }

    /// Select the active tool, discarding any in-flight gesture.
    pub fn set_tool(&mut self, store: &mut AnnotationStore, tool: Tool) {
        if self.gesture != GestureMode::Idle {
            log::debug!("Tool change cancels in-flight gesture");
            self.cancel_gesture(store);
        }
        self.tool = tool;
    }

    /// Document-space rect of the in-flight draw gesture, for preview rendering.
    pub fn preview_rect(&self) -> Option<Rect> {
        match &self.gesture {
            GestureMode::Drawing { anchor, current } => {
                let mapper = self.mapper.as_ref()?;
                Some(Rect::from_points(
                    mapper.to_doc(*anchor),
                    mapper.to_doc(*current),
                ))
            }
            _ => None,
        }
    }

    /// Handle a pointer press on the page surface.
    pub fn pointer_down(
        &mut self,
        store: &mut AnnotationStore,
        point: ViewPoint,
    ) -> Result<Vec<OverlayEvent>, OverlayError> {
        let mapper = *self.mapper()?;

        if self.gesture != GestureMode::Idle {
            log::debug!("Pointer down ignored: gesture already in flight");
            return Ok(Vec::new());
        }

        if self.tool != Tool::None {
            self.gesture = GestureMode::Drawing {
                anchor: point,
                current: point,
            };
            log::debug!(
                "Draw started at ({:.1}, {:.1}) with {:?}",
                point.x,
                point.y,
                self.tool
            );
            return Ok(Vec::new());
        }

        // Handles take priority over body hits, topmost annotation first.
        if let Some((target, handle, original)) = self.hit_handle(store, &mapper, point) {
            self.gesture = GestureMode::Resizing {
                target,
                handle,
                original,
            };
            log::debug!("Resize started on annotation {} via {:?}", target, handle);
        } else if let Some((target, original)) = store
            .hit_test_body(self.page_index, mapper.to_doc(point))
            .and_then(|id| store.get(id).map(|a| (id, a.rect)))
        {
            self.gesture = GestureMode::Dragging {
                target,
                anchor: point,
                original,
            };
            log::debug!("Drag started on annotation {}", target);
        } else {
            log::trace!("Pointer down on empty page space");
        }
        Ok(Vec::new())
    }

    /// Handle pointer movement while a gesture may be in flight.
    pub fn pointer_move(
        &mut self,
        store: &mut AnnotationStore,
        point: ViewPoint,
    ) -> Result<Vec<OverlayEvent>, OverlayError> {
        let mapper = *self.mapper()?;
        match &mut self.gesture {
            GestureMode::Idle => {}
            GestureMode::Drawing { current, .. } => *current = point,
            GestureMode::Dragging {
                target,
                anchor,
                original,
            } => {
                let from = mapper.to_doc(*anchor);
                let to = mapper.to_doc(point);
                let mut rect = original.translated(to.x - from.x, to.y - from.y);
                if self.config.clamp_drag_to_page {
                    let viewport = mapper.viewport();
                    rect = rect.clamped_to_page(viewport.page_width, viewport.page_height);
                }
                if let Some(annotation) = store.get_mut(*target) {
                    annotation.rect = rect;
                }
            }
            GestureMode::Resizing {
                target,
                handle,
                original,
            } => {
                let view = mapper.rect_to_view(original);
                let resized = geometry::resize_view_rect(&view, *handle, point);
                if let Some(annotation) = store.get_mut(*target) {
                    annotation.rect = mapper.rect_to_doc(&resized);
                }
            }
        }
        Ok(Vec::new())
    }

    /// Handle pointer release: finalize or discard the in-flight gesture.
    pub fn pointer_up(
        &mut self,
        store: &mut AnnotationStore,
        point: ViewPoint,
    ) -> Result<Vec<OverlayEvent>, OverlayError> {
        let mapper = *self.mapper()?;
        let gesture = std::mem::replace(&mut self.gesture, GestureMode::Idle);
        let mut events = Vec::new();

        match gesture {
            GestureMode::Idle => {
                log::debug!("Pointer up ignored: no gesture in flight");
            }
            GestureMode::Drawing { anchor, .. } => {
                let rect = Rect::from_points(mapper.to_doc(anchor), mapper.to_doc(point));
                if mapper.rect_below_min_view_size(&rect, self.config.min_drag_px) {
                    log::debug!("Draw discarded: below minimum size");
                } else if let Some(kind) = self.tool.kind() {
                    let annotation = self.finalize_drawing(store, kind, rect);
                    log::info!("Created {} annotation {}", kind.name(), annotation.id);
                    events.push(OverlayEvent::AnnotationCreated(annotation));
                }
            }
            GestureMode::Dragging {
                target,
                anchor,
                original,
            } => {
                if anchor.distance_to(&point) < self.config.click_epsilon_px {
                    // A press without meaningful travel is a click, not a move.
                    if let Some(annotation) = store.get_mut(target) {
                        annotation.rect = original;
                        if matches!(
                            annotation.kind,
                            AnnotationKind::Square | AnnotationKind::FreeText
                        ) {
                            log::debug!("Annotation {} clicked", target);
                            events.push(OverlayEvent::AnnotationClicked(target));
                        }
                    }
                } else if let Some(annotation) = store.get(target) {
                    log::info!("Annotation {} moved", target);
                    events.push(OverlayEvent::AnnotationUpdated(annotation.clone()));
                }
            }
            GestureMode::Resizing { target, original, .. } => {
                if let Some(annotation) = store.get(target) {
                    if annotation.rect != original {
                        log::info!("Annotation {} resized", target);
                        events.push(OverlayEvent::AnnotationUpdated(annotation.clone()));
                    }
                }
            }
        }
        Ok(events)
    }

    /// Discard the in-flight gesture without mutating the collection.
    ///
    /// Live drag/resize mutations are rolled back to the pre-gesture rect.
    /// Cancellation is synchronous; there is no timeout semantics.
    pub fn pointer_cancel(&mut self, store: &mut AnnotationStore) {
        self.cancel_gesture(store);
    }

    /// Delete an annotation by id.
    pub fn delete_annotation(
        &mut self,
        store: &mut AnnotationStore,
        id: AnnotationId,
    ) -> Result<Vec<OverlayEvent>, OverlayError> {
        store
            .remove(id)
            .ok_or(OverlayError::AnnotationNotFound(id))?;
        log::info!("Deleted annotation {}", id);
        Ok(vec![OverlayEvent::AnnotationDeleted(id)])
    }

    /// Replace an annotation's contents with `base_text` plus the
    /// configured suffixes.
    ///
    /// Callers re-editing existing contents should first recover the base
    /// text with [`suffix::strip`] so suffixes do not accumulate across
    /// saves.
    pub fn set_contents(
        &mut self,
        store: &mut AnnotationStore,
        id: AnnotationId,
        base_text: &str,
    ) -> Result<Vec<OverlayEvent>, OverlayError> {
        let annotation = store
            .get_mut(id)
            .ok_or(OverlayError::AnnotationNotFound(id))?;
        annotation.contents = suffix::compose(base_text, &self.config.suffix, Utc::now());
        Ok(vec![OverlayEvent::AnnotationUpdated(annotation.clone())])
    }

    fn mapper(&self) -> Result<&CoordinateMapper, OverlayError> {
        self.mapper.as_ref().ok_or(OverlayError::ViewportNotReady {
            page_index: self.page_index,
        })
    }

    /// Topmost handle hit on this page's annotations.
    fn hit_handle(
        &self,
        store: &AnnotationStore,
        mapper: &CoordinateMapper,
        point: ViewPoint,
    ) -> Option<(AnnotationId, Handle, Rect)> {
        let annotations: Vec<&Annotation> = store.for_page(self.page_index).collect();
        for annotation in annotations.iter().rev() {
            let view = mapper.rect_to_view(&annotation.rect);
            if let Some(handle) =
                geometry::hit_test_handles(&view, point, self.config.handle_hit_radius_px)
            {
                return Some((annotation.id, handle, annotation.rect));
            }
        }
        None
    }

    fn finalize_drawing(
        &self,
        store: &mut AnnotationStore,
        kind: AnnotationKind,
        rect: Rect,
    ) -> Annotation {
        let now = Utc::now();
        let contents = match self.tool {
            Tool::Stamp => suffix::compose(&self.config.stamp_text, &self.config.suffix, now),
            Tool::FreeText => match &self.config.free_text_default {
                Some(base) => suffix::compose(base, &self.config.suffix, now),
                None => String::new(),
            },
            _ => String::new(),
        };

        let id = store.allocate_id();
        let mut annotation = Annotation::new(
            id,
            kind,
            self.page_index,
            rect,
            self.config.author.clone(),
            now,
        );
        annotation.contents = contents;
        store.insert(annotation.clone());
        annotation
    }

    fn cancel_gesture(&mut self, store: &mut AnnotationStore) {
        match std::mem::replace(&mut self.gesture, GestureMode::Idle) {
            GestureMode::Idle => {}
            GestureMode::Drawing { .. } => log::debug!("Draw cancelled"),
            GestureMode::Dragging { target, original, .. }
            | GestureMode::Resizing { target, original, .. } => {
                if let Some(annotation) = store.get_mut(target) {
                    annotation.rect = original;
                }
                log::debug!("Gesture on annotation {} cancelled", target);
            }
        }
    }
}
