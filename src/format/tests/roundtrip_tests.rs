//! Round-trip tests: export to XFDF and import back without losing data.

use chrono::TimeZone;
use chrono::Utc;

use crate::constants::COORD_EPSILON;
use crate::format::xfdf::{from_document, to_document};
use crate::geometry::{DocPoint, Rect};
use crate::model::{Annotation, AnnotationKind, AnnotationStore, Bookmark, Color};

/// Create a store exercising every annotation kind and optional field.
fn comprehensive_store() -> AnnotationStore {
    let mut store = AnnotationStore::new();
    let date = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();

    let id = store.allocate_id();
    let mut square = Annotation::new(
        id,
        AnnotationKind::Square,
        0,
        Rect::new(100.0, 642.5, 300.25, 692.0),
        "JD",
        date,
    );
    square.contents = "Check this".to_string();
    square.subject = Some("Review".to_string());
    square.color = Some(Color::new(255, 0, 0));
    square.border_width = Some(2.0);
    square.flags = Some("print".to_string());
    store.insert(square);

    let id = store.allocate_id();
    let mut highlight = Annotation::new(
        id,
        AnnotationKind::Highlight,
        1,
        Rect::new(50.0, 700.0, 300.0, 750.0),
        "extractor",
        date,
    );
    highlight.interior_color = Some(Color::new(255, 235, 130));
    highlight.opacity = Some(0.35);
    store.insert(highlight);

    let id = store.allocate_id();
    let mut freetext = Annotation::new(
        id,
        AnnotationKind::FreeText,
        2,
        Rect::new(10.0, 10.0, 200.0, 40.0),
        "JD",
        date,
    );
    freetext.contents = "Approved [JD] [2025-01-15T10:00:00Z]".to_string();
    store.insert(freetext);

    let id = store.allocate_id();
    let mut marker = Annotation::new(
        id,
        AnnotationKind::CustomBookmark,
        3,
        Rect::new(72.0, 720.0, 90.0, 740.0),
        "JD",
        date,
    );
    marker.contents = "Continue reading here".to_string();
    store.insert(marker);

    store
}

fn assert_rect_close(a: &Rect, b: &Rect) {
    assert!((a.x1 - b.x1).abs() < COORD_EPSILON, "x1: {} vs {}", a.x1, b.x1);
    assert!((a.y1 - b.y1).abs() < COORD_EPSILON, "y1: {} vs {}", a.y1, b.y1);
    assert!((a.x2 - b.x2).abs() < COORD_EPSILON, "x2: {} vs {}", a.x2, b.x2);
    assert!((a.y2 - b.y2).abs() < COORD_EPSILON, "y2: {} vs {}", a.y2, b.y2);
}

#[test]
fn test_full_round_trip() {
    let store = comprehensive_store();
    let doc = to_document(&store, &[], "report.pdf").unwrap();
    let report = from_document(&doc).unwrap();

    assert!(!report.has_warnings(), "warnings: {:?}", report.warnings);
    assert_eq!(report.source.as_deref(), Some("report.pdf"));
    assert_eq!(report.annotations.len(), store.len());

    for (original, loaded) in store.iter().zip(report.annotations.iter()) {
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.kind, original.kind);
        assert_eq!(loaded.page_index, original.page_index);
        assert_rect_close(&loaded.rect, &original.rect);
        assert_eq!(loaded.author, original.author);
        assert_eq!(loaded.date, original.date);
        assert_eq!(loaded.contents, original.contents);
        assert_eq!(loaded.subject, original.subject);
        assert_eq!(loaded.color, original.color);
        assert_eq!(loaded.interior_color, original.interior_color);
        assert_eq!(loaded.flags, original.flags);
    }
}

#[test]
fn test_bookmark_round_trip() {
    let store = AnnotationStore::new();
    let bookmarks = vec![
        Bookmark::new("Introduction", 0),
        Bookmark::new("Results", 4).with_destination(DocPoint::new(72.0, 700.5)),
    ];

    let doc = to_document(&store, &bookmarks, "paper.pdf").unwrap();
    let report = from_document(&doc).unwrap();

    assert_eq!(report.bookmarks, bookmarks);
}

#[test]
fn test_empty_store_round_trip() {
    let store = AnnotationStore::new();
    let doc = to_document(&store, &[], "empty.pdf").unwrap();
    let report = from_document(&doc).unwrap();

    assert!(report.annotations.is_empty());
    assert!(report.bookmarks.is_empty());
    assert!(!report.has_warnings());
}

#[test]
fn test_unicode_contents_round_trip() {
    let mut store = AnnotationStore::new();
    let id = store.allocate_id();
    let mut annotation = Annotation::new(
        id,
        AnnotationKind::FreeText,
        0,
        Rect::new(0.0, 0.0, 100.0, 20.0),
        "校對者",
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap(),
    );
    annotation.contents = "確認済み — приём • ¶".to_string();
    store.insert(annotation);

    let doc = to_document(&store, &[], "intl.pdf").unwrap();
    let report = from_document(&doc).unwrap();

    assert_eq!(report.annotations[0].contents, "確認済み — приём • ¶");
    assert_eq!(report.annotations[0].author, "校對者");
}

#[test]
fn test_multiline_contents_round_trip() {
    let mut store = AnnotationStore::new();
    let id = store.allocate_id();
    let mut annotation = Annotation::new(
        id,
        AnnotationKind::FreeText,
        0,
        Rect::new(0.0, 0.0, 100.0, 60.0),
        "JD",
        Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap(),
    );
    annotation.contents = "Line one\nLine two\n[JD]".to_string();
    store.insert(annotation);

    let doc = to_document(&store, &[], "notes.pdf").unwrap();
    let report = from_document(&doc).unwrap();
    assert_eq!(report.annotations[0].contents, "Line one\nLine two\n[JD]");
}

#[test]
fn test_imported_annotations_reinsert_cleanly() {
    // Importing into a fresh store keeps ids stable and display order intact.
    let store = comprehensive_store();
    let doc = to_document(&store, &[], "report.pdf").unwrap();
    let report = from_document(&doc).unwrap();

    let mut restored = AnnotationStore::new();
    for annotation in report.annotations {
        restored.insert(annotation);
    }
    assert_eq!(restored.len(), store.len());
    // The id counter advanced past the imported ids.
    let next = restored.allocate_id();
    assert!(store.iter().all(|a| a.id < next));

    let doc_again = to_document(&restored, &[], "report.pdf").unwrap();
    assert_eq!(doc, doc_again);
}
