use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

const LEADING: i64 = 16;
const TOP_MARGIN: i64 = 780;
const LEFT_MARGIN: i64 = 50;

/// Draws each line with a Courier text operator, one line below the other.
fn page_content(lines: &[&str]) -> Content {
    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("TL", vec![LEADING.into()]),
        Operation::new("Td", vec![LEFT_MARGIN.into(), TOP_MARGIN.into()]),
    ];
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            operations.push(Operation::new("T*", vec![]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    operations.push(Operation::new("ET", vec![]));
    Content { operations }
}

fn add_page(
    doc: &mut Document,
    parent: ObjectId,
    broken_title: Option<&str>,
    lines: &[&str],
) -> FixtureResult<ObjectId> {
    let mut content = page_content(lines);
    if let Some(title) = broken_title {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F2".into(), 12.into()]),
            Operation::new("Td", vec![LEFT_MARGIN.into(), (TOP_MARGIN + 2 * LEADING).into()]),
            Operation::new("Tj", vec![Object::string_literal(title)]),
            Operation::new("ET", vec![]),
        ];
        operations.append(&mut content.operations);
        content.operations = operations;
    }
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
    }))
}

/// Builds a text PDF with one page per entry of `pages`.
pub fn build_test_pdf(pages: &[Vec<&str>]) -> FixtureResult<Document> {
    build_pdf(pages, None)
}

/// Like [`build_test_pdf`], but every page opens with `title` drawn in a
/// Type0 font that lacks its descendant fonts.
pub fn build_broken_font_pdf(title: &str, pages: &[Vec<&str>]) -> FixtureResult<Document> {
    build_pdf(pages, Some(title))
}

fn build_pdf(pages: &[Vec<&str>], broken_title: Option<&str>) -> FixtureResult<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let mut fonts = dictionary! { "F1" => font_id };
    if broken_title.is_some() {
        let broken_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "Missing-Identity",
            "Encoding" => "Identity-H",
        });
        fonts.set("F2", broken_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let kids = pages
        .iter()
        .map(|lines| add_page(&mut doc, pages_id, broken_title, lines).map(Object::from))
        .collect::<FixtureResult<Vec<_>>>()?;
    let count = i64::try_from(kids.len())?;

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    Ok(doc)
}

pub fn create_test_pdf(path: &Path, pages: &[Vec<&str>]) -> FixtureResult<()> {
    build_test_pdf(pages)?.save(path)?;
    Ok(())
}

pub fn test_pdf_bytes(pages: &[Vec<&str>]) -> FixtureResult<Vec<u8>> {
    let mut bytes = Vec::new();
    build_test_pdf(pages)?.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Bytes of a PDF whose trailer names an `/Encrypt` dictionary.
pub fn encrypted_pdf_bytes(pages: &[Vec<&str>]) -> FixtureResult<Vec<u8>> {
    let mut doc = build_test_pdf(pages)?;
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1_i64,
        "R" => 2_i64,
        "P" => -44_i64,
    });
    doc.trailer.set("Encrypt", encrypt_id);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

pub fn broken_font_pdf_bytes(title: &str, pages: &[Vec<&str>]) -> FixtureResult<Vec<u8>> {
    let mut bytes = Vec::new();
    build_broken_font_pdf(title, pages)?.save_to(&mut bytes)?;
    Ok(bytes)
}
