mod common;

use std::process::Command;

use pdf_tables::{
    Cell, ConvertOptions, ExtractError, PageSelector, TableExtractor, TextLayoutExtractor,
    convert_pdf_to_csv,
};
use tempfile::tempdir;

#[test]
fn extracts_single_table_to_csv() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("single.pdf");
    let output = dir.path().join("single.csv");

    common::create_test_pdf(
        &input,
        &[vec!["Name  Age  Score", "Alice  30  98", "Bob  22  87"]],
    )
    .expect("PDF fixture should be created");

    let report = convert_pdf_to_csv(
        &input,
        &output,
        &TextLayoutExtractor::default(),
        &ConvertOptions::default(),
    )
    .expect("conversion should succeed");

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    assert!(
        csv.starts_with("Name,Age,Score\n"),
        "unexpected CSV output: {csv:?}, report: {report:?}"
    );
    assert!(
        csv.contains("Alice,30,98"),
        "unexpected CSV output: {csv:?}, report: {report:?}"
    );
    assert_eq!(report.table_count, 1);
    assert_eq!(report.row_count, 2);
}

#[test]
fn combines_tables_from_multiple_pages_in_order() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("multi.pdf");
    let output = dir.path().join("multi.csv");

    common::create_test_pdf(
        &input,
        &[
            vec!["City  Pop  Rank", "A  10  1", "B  20  2", "C  30  3"],
            vec!["Product  Qty  Price", "Pen  3  1.5", "Book  1  9.9"],
        ],
    )
    .expect("PDF fixture should be created");

    let report = convert_pdf_to_csv(
        &input,
        &output,
        &TextLayoutExtractor::default(),
        &ConvertOptions::default(),
    )
    .expect("conversion should succeed");

    let csv = std::fs::read_to_string(&output).expect("CSV should be readable");
    let lines = csv.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 6, "unexpected CSV output: {csv:?}");
    assert_eq!(lines[0], "City,Pop,Rank");
    assert!(
        lines[1].starts_with('A') && lines[5].starts_with("Book"),
        "unexpected CSV output: {csv:?}"
    );
    assert_eq!(report.table_count, 2);
    assert_eq!(report.row_count, 5);
}

#[test]
fn extractor_reads_bytes_and_honours_page_selection() {
    let bytes = common::test_pdf_bytes(&[
        vec!["City  Pop", "A  10", "B  20"],
        vec!["Product  Qty", "Pen  3", "Book  1"],
    ])
    .expect("PDF fixture should be created");

    let extraction = TextLayoutExtractor::default()
        .extract(&bytes, &"2".parse::<PageSelector>().expect("selector"))
        .expect("extraction should succeed");

    assert_eq!(extraction.tables.len(), 1);
    assert_eq!(extraction.tables[0].page, 2);
    assert_eq!(
        extraction.tables[0].rows[0],
        vec![Cell::text("Pen"), Cell::Number(3.0)]
    );
}

#[test]
fn warns_on_ambiguous_table_structure() {
    let bytes = common::test_pdf_bytes(&[vec!["A  B  C", "1  2", "3  4  5  6", "7  8"]])
        .expect("PDF fixture should be created");

    let extraction = TextLayoutExtractor::default()
        .extract(&bytes, &PageSelector::All)
        .expect("extraction should succeed");

    assert!(!extraction.warnings.is_empty());
}

#[test]
fn non_table_pdf_reports_no_tables() {
    let bytes = common::test_pdf_bytes(&[vec!["This is plain narrative text without columns."]])
        .expect("PDF fixture should be created");

    let err = TextLayoutExtractor::default()
        .extract(&bytes, &PageSelector::All)
        .expect_err("no tables should be found");
    assert!(matches!(err, ExtractError::NoTablesFound), "error: {err:?}");
}

#[test]
fn garbage_input_is_an_extraction_error() {
    let err = TextLayoutExtractor::default()
        .extract(b"definitely not a pdf", &PageSelector::All)
        .expect_err("garbage should fail");
    assert!(matches!(err, ExtractError::PdfLoad(_)), "error: {err:?}");
}

#[test]
fn cli_exits_with_code_2_when_no_tables() {
    let dir = tempdir().expect("tempdir should be created");
    let input = dir.path().join("cli-empty.pdf");
    let output = dir.path().join("cli-empty.csv");

    common::create_test_pdf(&input, &[vec!["No table here"]])
        .expect("PDF fixture should be created");

    let status = Command::new(env!("CARGO_BIN_EXE_pdf2csv"))
        .args([
            "extract",
            "-i",
            &input.to_string_lossy(),
            "-o",
            &output.to_string_lossy(),
        ])
        .status()
        .expect("CLI should run");

    assert_eq!(status.code(), Some(2));
}

#[test]
fn encrypted_pdf_is_rejected() {
    let bytes = common::encrypted_pdf_bytes(&[vec!["City  Pop", "A  10", "B  20"]])
        .expect("PDF fixture should be created");

    let err = TextLayoutExtractor::default()
        .extract(&bytes, &PageSelector::All)
        .expect_err("encrypted PDF should fail");
    assert!(matches!(err, ExtractError::Encrypted), "error: {err:?}");
}

#[test]
fn malformed_font_falls_back_to_page_text() {
    let bytes = common::broken_font_pdf_bytes(
        "Report",
        &[vec!["Name  Age  Score", "Alice  30  98", "Bob  22  87"]],
    )
    .expect("PDF fixture should be created");

    let extraction = TextLayoutExtractor::default()
        .extract(&bytes, &PageSelector::All)
        .expect("page text should still yield the table");

    assert_eq!(extraction.tables.len(), 1);
    assert_eq!(extraction.tables[0].header, vec!["Name", "Age", "Score"]);
    assert_eq!(
        extraction.tables[0].rows[0],
        vec![Cell::text("Alice"), Cell::Number(30.0), Cell::Number(98.0)]
    );
}
