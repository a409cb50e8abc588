//! XFDF document writer and parser.
//!
//! XFDF rect values are PDF page coordinates with a bottom-left origin,
//! the same convention as this engine's document space, so geometry is
//! written verbatim. Dates use the PDF `D:` form on the wire; ISO-8601 is
//! accepted on import for tolerance.

use std::io::Write;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::format::error::FormatError;
use crate::format::{FormatWarning, WarningSeverity};
use crate::geometry::{DocPoint, Rect};
use crate::model::{
    Annotation, AnnotationId, AnnotationKind, AnnotationStore, Bookmark, Color,
};

/// XFDF namespace identifier. Fixed once published; doubles as the format
/// version marker.
pub const XFDF_NAMESPACE: &str = "http://ns.adobe.com/xfdf/";

/// Result of importing an interchange document: the parsed annotations and
/// bookmarks plus warnings for anything skipped or degraded.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Source document reference from the `<f>` element, when present.
    pub source: Option<String>,
    pub annotations: Vec<Annotation>,
    pub bookmarks: Vec<Bookmark>,
    pub warnings: Vec<FormatWarning>,
}

impl ImportReport {
    /// Check if any skipped element was recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the import stopped early.
    pub fn has_errors(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w.severity, WarningSeverity::Error))
    }
}

fn element_name(kind: AnnotationKind) -> &'static str {
    match kind {
        AnnotationKind::Square => "square",
        AnnotationKind::Highlight => "highlight",
        AnnotationKind::FreeText => "freetext",
        // Bookmark markers travel as text notes so other viewers render them.
        AnnotationKind::CustomBookmark => "text",
    }
}

fn kind_for_element(name: &str) -> Option<AnnotationKind> {
    match name {
        "square" => Some(AnnotationKind::Square),
        "highlight" => Some(AnnotationKind::Highlight),
        "freetext" => Some(AnnotationKind::FreeText),
        "text" => Some(AnnotationKind::CustomBookmark),
        _ => None,
    }
}

/// Serialize the annotation collection and bookmarks into an XFDF document.
pub fn to_document(
    store: &AnnotationStore,
    bookmarks: &[Bookmark],
    source_filename: &str,
) -> Result<String, FormatError> {
    log::info!(
        "Exporting {} annotations and {} bookmarks for '{}'",
        store.len(),
        bookmarks.len(),
        source_filename
    );

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| FormatError::Xml(e.into()))?;

    let mut root = BytesStart::new("xfdf");
    root.push_attribute(("xmlns", XFDF_NAMESPACE));
    root.push_attribute(("xml:space", "preserve"));
    writer
        .write_event(Event::Start(root))
        .map_err(|e| FormatError::Xml(e.into()))?;

    let mut f = BytesStart::new("f");
    f.push_attribute(("href", source_filename));
    writer
        .write_event(Event::Empty(f))
        .map_err(|e| FormatError::Xml(e.into()))?;

    writer
        .write_event(Event::Start(BytesStart::new("annots")))
        .map_err(|e| FormatError::Xml(e.into()))?;
    for annotation in store.iter() {
        write_annotation(&mut writer, annotation)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("annots")))
        .map_err(|e| FormatError::Xml(e.into()))?;

    if !bookmarks.is_empty() {
        writer
            .write_event(Event::Start(BytesStart::new("bookmarks")))
            .map_err(|e| FormatError::Xml(e.into()))?;
        for bookmark in bookmarks {
            write_bookmark(&mut writer, bookmark)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new("bookmarks")))
            .map_err(|e| FormatError::Xml(e.into()))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("xfdf")))
        .map_err(|e| FormatError::Xml(e.into()))?;

    let result = writer.into_inner();
    String::from_utf8(result).map_err(|_| FormatError::invalid_document("Invalid UTF-8 in XML"))
}

fn write_annotation<W: Write>(
    writer: &mut Writer<W>,
    annotation: &Annotation,
) -> Result<(), FormatError> {
    let name = element_name(annotation.kind);
    let mut el = BytesStart::new(name);
    el.push_attribute(("page", annotation.page_index.to_string().as_str()));
    el.push_attribute(("rect", format_rect(&annotation.rect).as_str()));
    el.push_attribute(("name", annotation.id.to_string().as_str()));
    el.push_attribute(("title", annotation.author.as_str()));
    el.push_attribute(("date", format_pdf_date(&annotation.date).as_str()));
    if let Some(subject) = &annotation.subject {
        el.push_attribute(("subject", subject.as_str()));
    }
    if let Some(color) = &annotation.color {
        el.push_attribute(("color", color.to_hex().as_str()));
    }
    if let Some(interior) = &annotation.interior_color {
        el.push_attribute(("interior-color", interior.to_hex().as_str()));
    }
    if let Some(opacity) = annotation.opacity {
        el.push_attribute(("opacity", format_coord(opacity).as_str()));
    }
    if let Some(width) = annotation.border_width {
        el.push_attribute(("width", format_coord(width).as_str()));
    }
    if let Some(flags) = &annotation.flags {
        el.push_attribute(("flags", flags.as_str()));
    }

    if annotation.contents.is_empty() {
        writer
            .write_event(Event::Empty(el))
            .map_err(|e| FormatError::Xml(e.into()))?;
    } else {
        writer
            .write_event(Event::Start(el))
            .map_err(|e| FormatError::Xml(e.into()))?;
        write_text_element(writer, "contents", &annotation.contents)?;
        writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(|e| FormatError::Xml(e.into()))?;
    }
    Ok(())
}

fn write_bookmark<W: Write>(writer: &mut Writer<W>, bookmark: &Bookmark) -> Result<(), FormatError> {
    let mut el = BytesStart::new("bookmark");
    el.push_attribute(("title", bookmark.title.as_str()));
    el.push_attribute(("page", bookmark.page_index.to_string().as_str()));
    if let Some(destination) = &bookmark.destination {
        el.push_attribute(("x", format_coord(destination.x).as_str()));
        el.push_attribute(("y", format_coord(destination.y).as_str()));
    }
    writer
        .write_event(Event::Empty(el))
        .map_err(|e| FormatError::Xml(e.into()))?;
    Ok(())
}

/// Write a simple text element.
fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), FormatError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(|e| FormatError::Xml(e.into()))?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(|e| FormatError::Xml(e.into()))?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| FormatError::Xml(e.into()))?;
    Ok(())
}

/// Attribute values collected for an annotation element before its
/// contents arrive.
struct PendingAnnotation {
    kind: AnnotationKind,
    page_index: Option<u32>,
    rect: Option<Rect>,
    id: Option<AnnotationId>,
    author: String,
    date: Option<DateTime<Utc>>,
    subject: Option<String>,
    color: Option<Color>,
    interior_color: Option<Color>,
    opacity: Option<f32>,
    border_width: Option<f32>,
    flags: Option<String>,
}

impl PendingAnnotation {
    fn new(kind: AnnotationKind) -> Self {
        Self {
            kind,
            page_index: None,
            rect: None,
            id: None,
            author: String::new(),
            date: None,
            subject: None,
            color: None,
            interior_color: None,
            opacity: None,
            border_width: None,
            flags: None,
        }
    }
}

/// Parse an XFDF document into annotations and bookmarks.
///
/// Unknown annotation elements and elements with unusable geometry are
/// skipped with a warning; a malformed XML stream stops the import and
/// reports what was parsed so far. Only a document without an `<xfdf>`
/// root fails outright.
pub fn from_document(text: &str) -> Result<ImportReport, FormatError> {
    let mut reader = Reader::from_str(text);
    reader.trim_text(true);

    let mut report = ImportReport::default();
    let mut saw_root = false;
    let mut in_annots = false;
    let mut in_bookmarks = false;
    let mut pending: Option<PendingAnnotation> = None;
    let mut in_contents = false;
    let mut contents = String::new();
    let mut fallback_id: AnnotationId = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "xfdf" => saw_root = true,
                    "annots" => in_annots = true,
                    "bookmarks" => in_bookmarks = true,
                    "contents" if pending.is_some() => {
                        in_contents = true;
                        contents.clear();
                    }
                    _ if in_annots && pending.is_none() => match kind_for_element(&name) {
                        Some(kind) => {
                            pending = Some(parse_annotation_attrs(e, kind, &mut report.warnings));
                        }
                        None => {
                            log::warn!("Skipping unsupported annotation element '{}'", name);
                            report.warnings.push(
                                FormatWarning::warning(format!(
                                    "Skipped unsupported annotation element '{}'",
                                    name
                                ))
                                .with_element(name.as_str()),
                            );
                            let end = e.to_end().into_owned();
                            if let Err(err) = reader.read_to_end(end.name()) {
                                report.warnings.push(FormatWarning::error(format!(
                                    "Malformed XML, import stopped: {}",
                                    err
                                )));
                                break;
                            }
                        }
                    },
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "f" {
                    report.source = attribute_value(e, b"href");
                } else if in_bookmarks && name == "bookmark" {
                    if let Some(bookmark) = parse_bookmark_attrs(e, &mut report.warnings) {
                        report.bookmarks.push(bookmark);
                    }
                } else if in_annots && pending.is_none() {
                    match kind_for_element(&name) {
                        Some(kind) => {
                            let parsed = parse_annotation_attrs(e, kind, &mut report.warnings);
                            finish_annotation(parsed, String::new(), &mut report, &mut fallback_id);
                        }
                        None => {
                            log::warn!("Skipping unsupported annotation element '{}'", name);
                            report.warnings.push(
                                FormatWarning::warning(format!(
                                    "Skipped unsupported annotation element '{}'",
                                    name
                                ))
                                .with_element(name.as_str()),
                            );
                        }
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "annots" => in_annots = false,
                    "bookmarks" => in_bookmarks = false,
                    "contents" => in_contents = false,
                    _ => {
                        if let Some(parsed) = pending.take() {
                            if element_name(parsed.kind) == name {
                                finish_annotation(
                                    parsed,
                                    std::mem::take(&mut contents),
                                    &mut report,
                                    &mut fallback_id,
                                );
                            } else {
                                // End of an untracked child element.
                                pending = Some(parsed);
                            }
                        }
                    }
                }
            }
            Ok(Event::Text(ref e)) if in_contents => {
                contents.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::CData(ref e)) if in_contents => {
                contents.push_str(&String::from_utf8_lossy(e));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                log::warn!("Stopping import on XML error: {}", e);
                report
                    .warnings
                    .push(FormatWarning::error(format!("Malformed XML, import stopped: {}", e)));
                break;
            }
        }
    }

    if !saw_root {
        return Err(FormatError::invalid_document("missing <xfdf> root element"));
    }

    log::info!(
        "Imported {} annotations and {} bookmarks ({} warnings)",
        report.annotations.len(),
        report.bookmarks.len(),
        report.warnings.len()
    );
    Ok(report)
}

fn parse_annotation_attrs(
    e: &BytesStart<'_>,
    kind: AnnotationKind,
    warnings: &mut Vec<FormatWarning>,
) -> PendingAnnotation {
    let mut parsed = PendingAnnotation::new(kind);
    for attr in e.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(err) => {
                warnings.push(
                    FormatWarning::warning(format!("Bad attribute: {}", err))
                        .with_element(element_name(kind)),
                );
                continue;
            }
        };
        let value = attr.unescape_value().unwrap_or_default();
        match attr.key.as_ref() {
            b"page" => parsed.page_index = value.parse().ok(),
            b"rect" => parsed.rect = parse_rect(&value),
            b"name" => parsed.id = value.parse().ok(),
            b"title" => parsed.author = value.into_owned(),
            b"date" => parsed.date = parse_pdf_date(&value),
            b"subject" => parsed.subject = Some(value.into_owned()),
            b"color" => parsed.color = Color::from_hex(&value),
            b"interior-color" => parsed.interior_color = Color::from_hex(&value),
            b"opacity" => parsed.opacity = value.parse().ok(),
            b"width" => parsed.border_width = value.parse().ok(),
            b"flags" => parsed.flags = Some(value.into_owned()),
            _ => {}
        }
    }
    parsed
}

fn finish_annotation(
    parsed: PendingAnnotation,
    contents: String,
    report: &mut ImportReport,
    fallback_id: &mut AnnotationId,
) {
    let element = element_name(parsed.kind);
    let (Some(page_index), Some(rect)) = (parsed.page_index, parsed.rect) else {
        log::warn!("Skipped <{}> without usable page and rect", element);
        report.warnings.push(
            FormatWarning::warning(format!("Skipped <{}> without usable page and rect", element))
                .with_element(element),
        );
        return;
    };

    let id = match parsed.id {
        Some(id) => id,
        None => {
            *fallback_id += 1;
            report.warnings.push(
                FormatWarning::info(format!(
                    "<{}> without a numeric name attribute, assigned id {}",
                    element, fallback_id
                ))
                .with_element(element),
            );
            *fallback_id
        }
    };
    let date = parsed.date.unwrap_or(DateTime::UNIX_EPOCH);

    let mut annotation = Annotation::new(id, parsed.kind, page_index, rect, parsed.author, date);
    annotation.contents = contents;
    annotation.subject = parsed.subject;
    annotation.color = parsed.color;
    annotation.interior_color = parsed.interior_color;
    annotation.opacity = parsed.opacity;
    annotation.border_width = parsed.border_width;
    annotation.flags = parsed.flags;
    report.annotations.push(annotation);
}

fn parse_bookmark_attrs(
    e: &BytesStart<'_>,
    warnings: &mut Vec<FormatWarning>,
) -> Option<Bookmark> {
    let mut title = None;
    let mut page_index = None;
    let mut x = None;
    let mut y = None;
    for attr in e.attributes().filter_map(Result::ok) {
        let value = attr.unescape_value().unwrap_or_default();
        match attr.key.as_ref() {
            b"title" => title = Some(value.into_owned()),
            b"page" => page_index = value.parse().ok(),
            b"x" => x = value.parse().ok(),
            b"y" => y = value.parse().ok(),
            _ => {}
        }
    }

    let (Some(title), Some(page_index)) = (title, page_index) else {
        log::warn!("Skipped <bookmark> without title and page");
        warnings.push(
            FormatWarning::warning("Skipped <bookmark> without title and page")
                .with_element("bookmark"),
        );
        return None;
    };

    let mut bookmark = Bookmark::new(title, page_index);
    if let (Some(x), Some(y)) = (x, y) {
        bookmark = bookmark.with_destination(DocPoint::new(x, y));
    }
    Some(bookmark)
}

fn attribute_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(Result::ok)
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| attr.unescape_value().unwrap_or_default().into_owned())
}

/// Format a rect as `x1,y1,x2,y2` in document coordinates.
fn format_rect(rect: &Rect) -> String {
    format!(
        "{},{},{},{}",
        format_coord(rect.x1),
        format_coord(rect.y1),
        format_coord(rect.x2),
        format_coord(rect.y2)
    )
}

fn parse_rect(value: &str) -> Option<Rect> {
    let mut parts = value.split(',').map(|part| part.trim().parse::<f32>());
    let x1 = parts.next()?.ok()?;
    let y1 = parts.next()?.ok()?;
    let x2 = parts.next()?.ok()?;
    let y2 = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Rect::new(x1, y1, x2, y2))
}

/// Format a coordinate with two decimals, trimming trailing zeros.
fn format_coord(value: f32) -> String {
    let mut s = format!("{:.2}", value);
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// Format a date in the PDF `D:YYYYMMDDHHMMSSZ` form.
fn format_pdf_date(date: &DateTime<Utc>) -> String {
    format!("D:{}", date.format("%Y%m%d%H%M%SZ"))
}

/// Parse a PDF `D:` date; ISO-8601 is accepted for tolerance.
fn parse_pdf_date(value: &str) -> Option<DateTime<Utc>> {
    if let Some(rest) = value.strip_prefix("D:") {
        let digits: String = rest.chars().take(14).collect();
        if digits.len() == 14 && digits.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(naive) = NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M%S") {
                return Some(Utc.from_utc_datetime(&naive));
            }
        }
        return None;
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
