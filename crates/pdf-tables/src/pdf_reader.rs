//! Page text recovery.
//!
//! Each page's text is obtained several ways (the `pdf-extract` document text
//! split at form feeds, a walk over the page's content stream, and lopdf's own
//! extractor) and the candidate that looks most like tabular text wins.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};

use encoding_rs::{BIG5, EUC_KR, Encoding, GBK, SHIFT_JIS, UTF_16BE};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use crate::error::ExtractError;
use crate::model::PageText;
use crate::options::PageSelector;
use crate::table_parse::{soft_split_line_into_cells, split_line_into_cells};

const FORM_FEED: char = '\u{000C}';
const UNSCORABLE: i64 = i64::MIN / 4;
/// Below this score the first page may borrow the whole-document text.
const WEAK_PAGE_SCORE: i64 = 80;
/// Kerning adjustments wider than this (in thousandths of an em) read as a space.
const TJ_SPACE_THRESHOLD: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextSource {
    FormFeedSplit,
    ContentStream,
    Lopdf,
    WholeDocument,
}

struct Candidate {
    source: TextSource,
    text: String,
}

impl Candidate {
    fn new(source: TextSource, text: String) -> Option<Self> {
        (!text.trim().is_empty()).then_some(Self { source, text })
    }
}

/// Text of the selected pages plus the whole-document text, when available.
pub(crate) struct DocumentText {
    pub pages: Vec<PageText>,
    pub full_text: Option<String>,
}

fn split_at_form_feeds(raw_text: &str) -> Vec<&str> {
    let mut pages = raw_text.split(FORM_FEED).collect::<Vec<_>>();
    if pages.last().is_some_and(|page| page.is_empty()) {
        pages.pop();
    }
    pages
}

fn looks_garbled(text: &str) -> bool {
    if text.contains("?Identity-H Unimplemented?") {
        return true;
    }

    let (mut total, mut replacement, mut control) = (0_usize, 0_usize, 0_usize);
    for ch in text.chars() {
        total += 1;
        if ch == '\u{FFFD}' {
            replacement += 1;
        } else if ch.is_control() && !matches!(ch, '\n' | '\r' | '\t') {
            control += 1;
        }
    }

    total > 0 && (replacement * 8 > total || control * 5 > total)
}

/// Charsets worth retrying for a font encoding name like `ETen-B5-H`.
fn hinted_charsets(encoding_name: &str) -> impl Iterator<Item = &'static Encoding> {
    let name = encoding_name.to_ascii_lowercase();
    let hints: [(&[&str], &'static Encoding); 5] = [
        (&["utf16", "ucs2", "identity-h", "unicode"], UTF_16BE),
        (&["big5", "b5", "eten", "cns"], BIG5),
        (&["gbk", "gb2312", "gb-euc", "gbpc"], GBK),
        (&["sjis", "shift_jis", "90ms", "rksj"], SHIFT_JIS),
        (&["euc-kr", "ksc", "uhc"], EUC_KR),
    ];
    hints
        .into_iter()
        .filter(move |(fragments, _)| fragments.iter().any(|fragment| name.contains(*fragment)))
        .map(|(_, charset)| charset)
}

fn decode_as(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    (!had_errors && !text.is_empty()).then(|| text.into_owned())
}

/// Decodes a PDF string operand, retrying with a charset guessed from the
/// font encoding name when lopdf's result looks garbled.
fn decode_pdf_string(encoding: Option<&str>, bytes: &[u8]) -> String {
    let decoded = Document::decode_text(encoding, bytes);
    if !looks_garbled(&decoded) {
        return decoded;
    }

    if let Some(without_bom) = bytes.strip_prefix(&[0xFE, 0xFF])
        && let Some(text) = decode_as(UTF_16BE, without_bom)
    {
        return text;
    }

    let hinted = encoding
        .and_then(|name| hinted_charsets(name).find_map(|charset| decode_as(charset, bytes)));

    hinted.unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned())
}

/// Higher for text with more multi-cell and numeric lines.
fn layout_score(text: &str) -> i64 {
    if text.trim().is_empty() {
        return UNSCORABLE;
    }

    let mut score = 0_i64;
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        score += 1;
        let cells = split_line_into_cells(line);
        if cells.len() >= 2 || soft_split_line_into_cells(line).len() >= 3 {
            score += 50;
        }
        if cells.iter().any(|cell| cell.parse::<f64>().is_ok()) {
            score += 15;
        }
    }

    if looks_garbled(text) {
        score -= 800;
    }
    score
}

#[derive(Default)]
struct LineCollector {
    lines: Vec<String>,
    current: String,
}

impl LineCollector {
    fn show(&mut self, encoding: Option<&str>, operands: &[Object]) {
        for operand in operands {
            match operand {
                Object::String(bytes, _) => self.current.push_str(&decode_pdf_string(encoding, bytes)),
                Object::Array(items) => self.show(encoding, items),
                Object::Integer(_) | Object::Real(_) => {
                    if operand
                        .as_float()
                        .is_ok_and(|offset| offset < -TJ_SPACE_THRESHOLD)
                    {
                        self.current.push(' ');
                    }
                }
                _ => {}
            }
        }
    }

    fn break_line(&mut self) {
        if self.current.trim().is_empty() {
            self.current.clear();
        } else {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn finish(mut self) -> Option<String> {
        self.break_line();
        (!self.lines.is_empty()).then(|| self.lines.join("\n"))
    }
}

fn content_stream_text(document: &Document, page_id: ObjectId) -> Option<String> {
    let content = Content::decode(&document.get_page_content(page_id).ok()?).ok()?;
    let font_encodings = document
        .get_page_fonts(page_id)
        .into_iter()
        .map(|(name, font)| (name, font.get_font_encoding()))
        .collect::<BTreeMap<Vec<u8>, &str>>();

    let mut collector = LineCollector::default();
    let mut encoding = None;
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|operand| operand.as_name().ok())
                    .and_then(|name| font_encodings.get(name).copied());
            }
            "Tj" | "TJ" => collector.show(encoding, &operation.operands),
            // Both move to the next line before showing their string.
            "'" | "\"" => {
                collector.break_line();
                if let Some(text) = operation.operands.last() {
                    collector.show(encoding, std::slice::from_ref(text));
                }
            }
            "T*" | "Td" | "TD" | "Tm" | "ET" => collector.break_line(),
            _ => {}
        }
    }

    collector.finish()
}

fn page_candidates(
    document: &Document,
    page_number: u32,
    page_id: ObjectId,
    form_feed_text: Option<&str>,
) -> Vec<Candidate> {
    [
        form_feed_text.and_then(|text| Candidate::new(TextSource::FormFeedSplit, text.to_string())),
        content_stream_text(document, page_id)
            .and_then(|text| Candidate::new(TextSource::ContentStream, text)),
        document
            .extract_text(&[page_number])
            .ok()
            .and_then(|text| Candidate::new(TextSource::Lopdf, text)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn best_candidate(page_number: u32, candidates: Vec<Candidate>) -> String {
    let Some(best) = candidates
        .into_iter()
        .max_by_key(|candidate| layout_score(&candidate.text))
    else {
        return String::new();
    };

    tracing::trace!(page = page_number, source = ?best.source, "picked page text");
    best.text
}

/// Whole-document text from `pdf-extract`, which panics on some malformed
/// fonts. A panic only costs this candidate; the others still run.
fn document_text(document: &[u8]) -> Option<String> {
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(document))) {
        Ok(Ok(text)) => Some(text),
        Ok(Err(error)) => {
            tracing::debug!(%error, "document text extraction failed");
            None
        }
        Err(_) => {
            tracing::warn!("document text extraction panicked; using per-page text only");
            None
        }
    }
}

/// Loads `document` and returns the text of every page `selector` keeps.
pub(crate) fn read_pdf_pages(
    document: &[u8],
    selector: &PageSelector,
) -> Result<DocumentText, ExtractError> {
    let pdf = Document::load_mem(document)?;
    if pdf.is_encrypted() {
        return Err(ExtractError::Encrypted);
    }
    let page_ids = pdf.get_pages();

    let full_text = document_text(document);
    let form_feed_pages = full_text
        .as_deref()
        .map(split_at_form_feeds)
        .filter(|pages| pages.len() == page_ids.len());

    let mut pages = Vec::new();
    for (index, (&page_number, &page_id)) in page_ids.iter().enumerate() {
        if !selector.contains(page_number) {
            continue;
        }

        let form_feed_text = form_feed_pages.as_ref().and_then(|pages| pages.get(index).copied());
        let mut candidates = page_candidates(&pdf, page_number, page_id, form_feed_text);

        let best_score = candidates
            .iter()
            .map(|candidate| layout_score(&candidate.text))
            .max()
            .unwrap_or(UNSCORABLE);
        // Whole-document text only helps when it could not be split per page.
        if index == 0
            && best_score < WEAK_PAGE_SCORE
            && form_feed_pages.is_none()
            && let Some(candidate) = full_text
                .clone()
                .and_then(|text| Candidate::new(TextSource::WholeDocument, text))
        {
            candidates.push(candidate);
        }

        pages.push(PageText {
            page_number,
            text: best_candidate(page_number, candidates),
        });
    }

    if pages.is_empty() {
        return Err(ExtractError::NoPagesSelected);
    }

    tracing::debug!(pages = pages.len(), "read PDF page text");
    Ok(DocumentText { pages, full_text })
}
