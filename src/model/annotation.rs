//! Annotation records and the per-document annotation store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{DocPoint, Rect};

/// Unique identifier for an annotation, stable for its lifetime.
pub type AnnotationId = u64;

/// The closed set of annotation types.
///
/// Type-specific behavior is a lookup on this tag; adding a type is a new
/// variant plus handlers, not a new inheritance branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationKind {
    /// Rectangle outline.
    Square,
    /// Translucent region marker.
    Highlight,
    /// Text placed directly on the page.
    FreeText,
    /// User-placed bookmark marker on a page.
    CustomBookmark,
}

impl AnnotationKind {
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationKind::Square => "square",
            AnnotationKind::Highlight => "highlight",
            AnnotationKind::FreeText => "freetext",
            AnnotationKind::CustomBookmark => "custom bookmark",
        }
    }
}

/// How an annotation entered the store.
///
/// API-created highlights are tagged so bulk removal of programmatic
/// highlights leaves user-drawn work untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnnotationOrigin {
    /// Created through a pointer gesture.
    #[default]
    UserDrawn,
    /// Created through the programmatic highlight API.
    Api,
}

/// An RGB color, written as `#RRGGBB` in the interchange document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Parse a `#RRGGBB` string.
    pub fn from_hex(hex: &str) -> Option<Color> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Color { r, g, b })
    }
}

/// A single annotation anchored to a page.
///
/// Created by the interaction layer or the highlight registry, mutated
/// only through explicit update operations, removed by explicit delete or
/// bulk clear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
    /// 0-based page index.
    pub page_index: u32,
    /// Geometry in document space.
    pub rect: Rect,
    pub author: String,
    pub date: DateTime<Utc>,
    /// Text contents, possibly empty.
    #[serde(default)]
    pub contents: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Border color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Fill color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interior_color: Option<Color>,
    /// Fill opacity, 0.0-1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Border width in document units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f32>,
    /// Annotation flags (e.g. "print").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
    #[serde(default)]
    pub origin: AnnotationOrigin,
}

impl Annotation {
    /// Create an annotation with the required fields; optional fields start unset.
    pub fn new(
        id: AnnotationId,
        kind: AnnotationKind,
        page_index: u32,
        rect: Rect,
        author: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            page_index,
            rect,
            author: author.into(),
            date,
            contents: String::new(),
            subject: None,
            color: None,
            interior_color: None,
            opacity: None,
            border_width: None,
            flags: None,
            origin: AnnotationOrigin::UserDrawn,
        }
    }

    pub fn with_contents(mut self, contents: impl Into<String>) -> Self {
        self.contents = contents.into();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Insertion-ordered annotation collection for one document.
///
/// Insertion order is display order within a page. The store is the single
/// source of truth: the interaction layer and the highlight registry both
/// write here and the rendering layer reacts to its contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    next_id: AnnotationId,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            annotations: Vec::new(),
            next_id: 1,
        }
    }

    /// Reserve the next annotation id.
    pub fn allocate_id(&mut self) -> AnnotationId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert an annotation. Ids should come from [`Self::allocate_id`];
    /// imported annotations with larger ids advance the counter so later
    /// allocations stay unique.
    pub fn insert(&mut self, annotation: Annotation) {
        if annotation.id >= self.next_id {
            self.next_id = annotation.id + 1;
        }
        self.annotations.push(annotation);
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.id == id)
    }

    /// Remove an annotation by id.
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.annotations.iter().position(|a| a.id == id)?;
        Some(self.annotations.remove(index))
    }

    /// Remove every annotation matching the predicate; returns how many
    /// were removed.
    pub fn remove_where(&mut self, predicate: impl Fn(&Annotation) -> bool) -> usize {
        let before = self.annotations.len();
        self.annotations.retain(|a| !predicate(a));
        before - self.annotations.len()
    }

    /// All annotations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    /// Annotations on a page in display (insertion) order.
    pub fn for_page(&self, page_index: u32) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(move |a| a.page_index == page_index)
    }

    /// Topmost annotation on the page whose body contains `point`.
    pub fn hit_test_body(&self, page_index: u32, point: DocPoint) -> Option<AnnotationId> {
        self.for_page(page_index)
            .filter(|a| a.rect.contains(point))
            .last()
            .map(|a| a.id)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Remove all annotations.
    pub fn clear(&mut self) {
        self.annotations.clear();
    }
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap()
    }

    fn square(id: AnnotationId, page: u32, rect: Rect) -> Annotation {
        Annotation::new(id, AnnotationKind::Square, page, rect, "tester", date())
    }

    #[test]
    fn test_color_hex_round_trip() {
        let color = Color::new(255, 200, 0);
        assert_eq!(color.to_hex(), "#FFC800");
        assert_eq!(Color::from_hex("#FFC800"), Some(color));
        assert_eq!(Color::from_hex("FFC800"), None);
        assert_eq!(Color::from_hex("#FFC8"), None);
        assert_eq!(Color::from_hex("#GGC800"), None);
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut store = AnnotationStore::new();
        for _ in 0..3 {
            let id = store.allocate_id();
            store.insert(square(id, 0, Rect::new(0.0, 0.0, 10.0, 10.0)));
        }
        let ids: Vec<_> = store.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_imported_ids_advance_counter() {
        let mut store = AnnotationStore::new();
        store.insert(square(40, 0, Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(store.allocate_id(), 41);
    }

    #[test]
    fn test_remove() {
        let mut store = AnnotationStore::new();
        let id = store.allocate_id();
        store.insert(square(id, 0, Rect::new(0.0, 0.0, 10.0, 10.0)));

        assert!(store.remove(id).is_some());
        assert!(store.remove(id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_for_page_filters() {
        let mut store = AnnotationStore::new();
        let a = store.allocate_id();
        store.insert(square(a, 0, Rect::new(0.0, 0.0, 10.0, 10.0)));
        let b = store.allocate_id();
        store.insert(square(b, 2, Rect::new(0.0, 0.0, 10.0, 10.0)));

        assert_eq!(store.for_page(0).count(), 1);
        assert_eq!(store.for_page(2).count(), 1);
        assert_eq!(store.for_page(1).count(), 0);
    }

    #[test]
    fn test_hit_test_returns_topmost() {
        let mut store = AnnotationStore::new();
        let below = store.allocate_id();
        store.insert(square(below, 0, Rect::new(0.0, 0.0, 100.0, 100.0)));
        let above = store.allocate_id();
        store.insert(square(above, 0, Rect::new(50.0, 50.0, 150.0, 150.0)));

        // The overlap region resolves to the later (topmost) annotation.
        assert_eq!(store.hit_test_body(0, DocPoint::new(75.0, 75.0)), Some(above));
        assert_eq!(store.hit_test_body(0, DocPoint::new(10.0, 10.0)), Some(below));
        assert_eq!(store.hit_test_body(0, DocPoint::new(500.0, 500.0)), None);
        // Wrong page misses entirely.
        assert_eq!(store.hit_test_body(1, DocPoint::new(75.0, 75.0)), None);
    }

    #[test]
    fn test_remove_where() {
        let mut store = AnnotationStore::new();
        for page in 0..4 {
            let id = store.allocate_id();
            store.insert(square(id, page, Rect::new(0.0, 0.0, 10.0, 10.0)));
        }

        let removed = store.remove_where(|a| a.page_index >= 2);
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_json_round_trip() {
        let mut store = AnnotationStore::new();
        let id = store.allocate_id();
        store.insert(
            square(id, 1, Rect::new(10.0, 20.0, 30.0, 40.0))
                .with_contents("note")
                .with_color(Color::new(255, 0, 0)),
        );

        let json = serde_json::to_string(&store).expect("Failed to serialize");
        let loaded: AnnotationStore = serde_json::from_str(&json).expect("Failed to deserialize");

        assert_eq!(loaded.len(), 1);
        let ann = loaded.get(id).unwrap();
        assert_eq!(ann.contents, "note");
        assert_eq!(ann.color, Some(Color::new(255, 0, 0)));
        assert_eq!(ann.date, date());
    }
}
