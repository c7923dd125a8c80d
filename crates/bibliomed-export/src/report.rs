//! PDF report rendering.
//!
//! Layout (US Letter, points, origin bottom-left):
//!   - report title, bold 16, centred on x=300 at y=750
//!   - publication-year histogram in the box x=130, y=590, 350x100
//!   - per record, lines at x=50 spaced 15 apart, starting at y=570:
//!     `Title:`, `Date: … | Source:`, `Link:`, `Summary:`, then an extra 15
//!   - before each record, if y < 100 a new page starts at y=750
//!
//! Layout is computed first (`layout_records`) and rendered with lopdf second,
//! so pagination is testable without parsing PDF content streams.

use bibliomed_common::Result;
use bibliomed_ingestion::models::Record;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

use crate::histogram::{YearHistogram, DEFAULT_BINS};

pub const PAGE_WIDTH: i64 = 612;
pub const PAGE_HEIGHT: i64 = 792;

const TITLE_CENTER_X: i64 = 300;
const TITLE_Y: i64 = 750;
const TITLE_SIZE: i64 = 16;

const CHART_X: i64 = 130;
const CHART_Y: i64 = 590;
const CHART_WIDTH: i64 = 350;
const CHART_HEIGHT: i64 = 100;
const CHART_TITLE: &str = "Publications by Year";

const BODY_X: i64 = 50;
const BODY_START_Y: i64 = 570;
const PAGE_TOP_Y: i64 = 750;
const BOTTOM_MARGIN: i64 = 100;
const LINE_STEP: i64 = 15;
const BODY_SIZE: i64 = 10;

/// Longest line drawn; the page is 612pt wide and Helvetica 10 averages ~5pt per glyph.
const MAX_LINE_CHARS: usize = 105;

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    /// Draw the `Summary:` line for each record.
    pub include_summary: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Bibliographic References Report".to_string(),
            include_summary: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub x: i64,
    pub y: i64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLayout {
    pub lines: Vec<TextLine>,
}

/// The lines printed for one record.
pub fn record_lines(record: &Record, include_summary: bool) -> Vec<String> {
    let mut lines = vec![
        format!("Title: {}", record.title),
        format!("Date: {} | Source: {}", record.publication_date, record.source.label()),
        format!("Link: {}", record.url),
    ];
    if include_summary {
        lines.push(format!("Summary: {}", record.summary));
    }
    lines
}

/// Place every record's lines on pages. Always returns at least one page.
pub fn layout_records(records: &[Record], include_summary: bool) -> Vec<PageLayout> {
    let mut pages = vec![PageLayout::default()];
    let mut y = BODY_START_Y;

    for record in records {
        if y < BOTTOM_MARGIN {
            pages.push(PageLayout::default());
            y = PAGE_TOP_Y;
        }

        let lines = record_lines(record, include_summary);
        let last = lines.len() - 1;
        for (i, text) in lines.into_iter().enumerate() {
            if let Some(page) = pages.last_mut() {
                page.lines.push(TextLine { x: BODY_X, y, text });
            }
            y -= if i == last { 2 * LINE_STEP } else { LINE_STEP };
        }
    }

    pages
}

/// Render the full report to PDF bytes.
pub fn render_pdf(records: &[Record], options: &ReportOptions) -> Result<Vec<u8>> {
    let pages = layout_records(records, options.include_summary);
    let histogram = YearHistogram::from_records(records, DEFAULT_BINS);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for (index, page) in pages.iter().enumerate() {
        let mut ops = Vec::new();
        if index == 0 {
            title_ops(&mut ops, &options.title);
            chart_ops(&mut ops, histogram.as_ref());
        }
        for line in &page.lines {
            text_ops(&mut ops, "F1", BODY_SIZE, line.x, line.y, &line.text);
        }

        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_text(&options.title, usize::MAX)),
        "Producer" => Object::string_literal("bibliomed"),
    });
    doc.trailer.set("Info", info_id);

    doc.compress();
    let mut buf = Vec::new();
    doc.save_to(&mut buf)?;

    debug!(records = records.len(), pages = page_count, bytes = buf.len(), "Rendered PDF report");
    Ok(buf)
}

// ── Drawing helpers ───────────────────────────────────────────────────────────

fn text_ops(ops: &mut Vec<Operation>, font: &str, size: i64, x: i64, y: i64, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)]));
    ops.push(Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(encode_text(text, MAX_LINE_CHARS))]));
    ops.push(Operation::new("ET", vec![]));
}

fn rect_ops(ops: &mut Vec<Operation>, x: i64, y: i64, width: i64, height: i64) {
    ops.push(Operation::new(
        "re",
        vec![Object::Integer(x), Object::Integer(y), Object::Integer(width), Object::Integer(height)],
    ));
    ops.push(Operation::new("f", vec![]));
}

fn title_ops(ops: &mut Vec<Operation>, title: &str) {
    // Approximate Helvetica-Bold advance of 0.55 em.
    let width = title.chars().count() as i64 * TITLE_SIZE * 55 / 100;
    let x = (TITLE_CENTER_X - width / 2).max(BODY_X);
    text_ops(ops, "F2", TITLE_SIZE, x, TITLE_Y, title);
}

fn chart_ops(ops: &mut Vec<Operation>, histogram: Option<&YearHistogram>) {
    text_ops(ops, "F2", BODY_SIZE, CHART_X, CHART_Y + CHART_HEIGHT - 10, CHART_TITLE);

    let Some(hist) = histogram else {
        text_ops(ops, "F1", BODY_SIZE, CHART_X, CHART_Y + CHART_HEIGHT / 2, "No publication years available");
        return;
    };

    let baseline = CHART_Y + 12;
    let max_bar = CHART_HEIGHT - 30;
    let bins = hist.counts.len() as i64;
    let slot = CHART_WIDTH / bins;
    let peak = hist.max_count().max(1) as i64;

    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("g", vec![Object::Integer(0)]));
    // Axis
    rect_ops(ops, CHART_X, baseline - 1, CHART_WIDTH, 1);
    for (i, &count) in hist.counts.iter().enumerate() {
        let height = count as i64 * max_bar / peak;
        if height > 0 {
            rect_ops(ops, CHART_X + i as i64 * slot + 2, baseline, slot - 4, height);
        }
    }
    ops.push(Operation::new("Q", vec![]));

    let lower = hist.lower.ceil() as i64;
    let upper = hist.upper.floor() as i64;
    text_ops(ops, "F1", 8, CHART_X, CHART_Y, &lower.to_string());
    text_ops(ops, "F1", 8, CHART_X + CHART_WIDTH - 20, CHART_Y, &upper.to_string());
    text_ops(ops, "F1", 8, CHART_X + CHART_WIDTH + 6, baseline + max_bar - 4, &format!("max {}", peak));
    text_ops(ops, "F1", 8, CHART_X + CHART_WIDTH / 2 - 20, CHART_Y, &format!("{} dated", hist.total()));
}

/// Encode for a WinAnsi Type1 font: Latin-1 passes through, other characters
/// become `?`, control characters become spaces. Lines longer than `max_chars`
/// are cut with `...`.
fn encode_text(text: &str, max_chars: usize) -> Vec<u8> {
    let mut out: Vec<u8> = text
        .chars()
        .take(max_chars)
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            0x00..=0x1F | 0x7F => b' ',
            _ => b'?',
        })
        .collect();

    if text.chars().nth(max_chars).is_some() {
        out.truncate(out.len().saturating_sub(3));
        out.extend_from_slice(b"...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibliomed_ingestion::models::Record;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                Record::indexed(format!("Paper {}", i), format!("{} Jan", 2000 + i), format!("u{}", i))
                    .with_summary()
            })
            .collect()
    }

    #[test]
    fn test_four_lines_per_record() {
        let pages = layout_records(&records(1), true);
        assert_eq!(pages.len(), 1);
        let ys: Vec<i64> = pages[0].lines.iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![570, 555, 540, 525]);
        assert_eq!(pages[0].lines[0].text, "Title: Paper 0");
        assert_eq!(pages[0].lines[1].text, "Date: 2000 Jan | Source: PubMed");
        assert_eq!(pages[0].lines[2].text, "Link: u0");
        assert!(pages[0].lines[3].text.starts_with("Summary: "));
    }

    #[test]
    fn test_pagination_seven_then_nine() {
        let pages = layout_records(&records(7), true);
        assert_eq!(pages.len(), 1);

        let pages = layout_records(&records(8), true);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines.len(), 7 * 4);
        assert_eq!(pages[1].lines[0].y, 750);

        let pages = layout_records(&records(7 + 9 + 1), true);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].lines.len(), 9 * 4);
        assert_eq!(pages[2].lines.len(), 4);
    }

    #[test]
    fn test_without_summary_three_lines() {
        let pages = layout_records(&records(2), false);
        let ys: Vec<i64> = pages[0].lines.iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![570, 555, 540, 510, 495, 480]);
    }

    #[test]
    fn test_empty_collection_still_one_page() {
        let pages = layout_records(&[], true);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.is_empty());
    }

    #[test]
    fn test_encode_text_latin1_and_truncation() {
        assert_eq!(encode_text("Título\tα", 50), b"T\xEDtulo ?".to_vec());
        let long = "x".repeat(20);
        let encoded = encode_text(&long, 10);
        assert_eq!(encoded.len(), 10);
        assert!(encoded.ends_with(b"..."));
        assert_eq!(encode_text("exactly10!", 10), b"exactly10!".to_vec());
    }

    fn drawn_text(ops: &[Operation]) -> Vec<String> {
        ops.iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| op.operands.first())
            .filter_map(|operand| operand.as_str().ok())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    #[test]
    fn test_chart_labels_range_and_dated_count() {
        let mut dated = records(6);
        dated.push(Record::scraped("undated".into(), "".into(), "http://x".into(), "".into()));
        let hist = YearHistogram::from_records(&dated, DEFAULT_BINS).unwrap();

        let mut ops = Vec::new();
        chart_ops(&mut ops, Some(&hist));
        let labels = drawn_text(&ops);
        assert!(labels.contains(&"2000".to_string()));
        assert!(labels.contains(&"2005".to_string()));
        assert!(labels.contains(&"6 dated".to_string()));

        let mut ops = Vec::new();
        chart_ops(&mut ops, None);
        assert!(drawn_text(&ops).contains(&"No publication years available".to_string()));
    }

    #[test]
    fn test_rendered_pdf_has_expected_pages() {
        let bytes = render_pdf(&records(10), &ReportOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_render_without_dated_records() {
        let undated = vec![Record::scraped("t".into(), "".into(), "http://x".into(), "".into())];
        let bytes = render_pdf(&undated, &ReportOptions { include_summary: false, ..Default::default() }).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
