//! Integration tests for qrcards.
//!
//! Everything runs locally: product lists are written to temporary
//! directories and documents are generated in memory or into those
//! directories.
//!
//! Run with:
//!   cargo test --test pipeline

use pretty_assertions::assert_eq;
use qrcards::pipeline::dedup::deduplicate;
use qrcards::pipeline::layout::{cards_per_page, rows_per_page, total_pages};
use qrcards::{
    eligible_rows, generate, generate_to_file, import_file, import_str, toggle_exclusion,
    CardsError, GenerationConfig, GenerationProgressCallback, LayoutPolicy, OutputFormat,
    RowError, RowSummary,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// A plyty-shaped TSV line: id, raw name, two filler columns, colour, URL.
fn plyty_line(id: usize, code: &str, color: &str, url: &str) -> String {
    format!("{id}\t{code}_SM_2800x2070_18\tx\tx\t{color}\t{url}")
}

fn plyty_list(n: usize) -> String {
    (1..=n)
        .map(|i| {
            plyty_line(
                i,
                &format!("{i:04}"),
                "BIAŁY KORPUSOWY",
                &format!("https://sklep.example.com/p/{i}"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_list(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[derive(Default)]
struct PageLog {
    completed: Mutex<Vec<(usize, usize)>>,
}

impl GenerationProgressCallback for PageLog {
    fn on_page_complete(&self, page_num: usize, total_pages: usize, _cards: usize) {
        self.completed.lock().unwrap().push((page_num, total_pages));
    }
}

// ── Import ───────────────────────────────────────────────────────────────────

#[test]
fn plyty_row_is_formatted_and_valid() {
    let out = import_str(
        "007\t0110_SM_2800x2070_18\t\t\tBIAŁY KORPUSOWY\thttp://x/y",
        "plyty",
    )
    .unwrap();
    let row = &out.rows[0];
    assert_eq!(row.id, "007");
    assert_eq!(row.product_name, "Biały Korpusowy 0110 SM");
    assert_eq!(row.url, "http://x/y");
    assert!(row.is_valid);
    assert!(row.errors.is_empty());
    assert_eq!(row.product_type, "plyty");
}

#[test]
fn url_validation_messages() {
    let text = "\
1\t0110_SM\t\t\tBIAŁY\t
2\t0111_SM\t\t\tBIAŁY\tftp://x
3\t0112_SM\t\t\tBIAŁY\thttp://x";
    let out = import_str(text, "plyty").unwrap();
    assert_eq!(out.rows[0].error_messages(), vec!["URL is empty"]);
    assert_eq!(
        out.rows[1].error_messages(),
        vec!["URL must start with http:// or https://"]
    );
    assert!(out.rows[2].is_valid);
}

#[test]
fn row_can_carry_both_validation_errors() {
    let out = import_str("1\t\t\t\t\t", "plyty").unwrap();
    assert_eq!(
        out.rows[0].errors,
        vec![RowError::EmptyProductName, RowError::EmptyUrl]
    );
    assert!(!out.rows[0].is_valid);
}

#[test]
fn missing_id_gets_placeholder() {
    let out = import_str("1\t0110_SM\t\t\tA\thttp://a\n\t0111_SM\t\t\tB\thttp://b", "plyty").unwrap();
    assert_eq!(out.rows[1].id, "row-1");
}

#[test]
fn comma_separated_blaty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_list(
        &dir,
        "blaty.csv",
        "10,K190_RS_4100,a,b,c,DĄB ARTISAN,https://x/10\n11,K001_PE_4100,a,b,c,CZARNY,https://x/11\n",
    );
    let out = import_file(&path, "blaty").unwrap();
    assert_eq!(out.rows.len(), 2);
    assert_eq!(out.rows[0].product_name, "Dąb Artisan K190 RS");
    assert_eq!(out.rows[1].product_name, "Czarny K001 PE");
    assert!(out.rows.iter().all(|r| r.is_valid));
}

#[test]
fn non_utf8_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin2.tsv");
    std::fs::write(&path, b"1\t0110_SM\t\t\tBIA\xa3Y\thttp://x\n").unwrap();
    let err = import_file(&path, "plyty").unwrap_err();
    assert!(matches!(err, CardsError::DecodeFailed { .. }));
}

#[test]
fn unknown_product_type_is_fatal() {
    let err = import_str("1\tA_B\t\t\tC\thttp://x", "drzwi").unwrap_err();
    assert!(matches!(err, CardsError::UnknownProductType { .. }));
}

// ── Deduplication ────────────────────────────────────────────────────────────

#[test]
fn duplicate_url_excludes_second_row_only() {
    let text = [
        plyty_line(1, "0110", "BIAŁY", "https://x/same"),
        plyty_line(2, "0111", "BIAŁY", "https://x/same"),
    ]
    .join("\n");
    let out = import_str(&text, "plyty").unwrap();

    assert!(out.rows[0].errors.is_empty());
    assert!(!out.rows[0].is_excluded);

    assert_eq!(
        out.rows[1].error_messages(),
        vec!["duplicate URL (occurrence 2)"]
    );
    assert!(out.rows[1].is_excluded);
    assert!(out.rows[1].is_valid);
}

#[test]
fn invalid_row_does_not_claim_a_key() {
    let text = [
        plyty_line(1, "0110", "", "https://x/same").replace("0110_SM_2800x2070_18", ""),
        plyty_line(2, "0111", "BIAŁY", "https://x/same"),
    ]
    .join("\n");
    let out = import_str(&text, "plyty").unwrap();
    assert!(!out.rows[0].is_valid);
    assert!(!out.rows[1].is_excluded);
    assert!(out.rows[1].errors.is_empty());
}

#[test]
fn second_dedup_pass_changes_nothing() {
    let text = [
        plyty_line(1, "0110", "BIAŁY", "https://x/a"),
        plyty_line(2, "0110", "BIAŁY", "https://x/a"),
        plyty_line(3, "0110", "BIAŁY", "https://x/b"),
    ]
    .join("\n");
    let out = import_str(&text, "plyty").unwrap();
    let again = deduplicate(out.rows.clone());
    assert_eq!(again, out.rows);
}

#[test]
fn validity_survives_dedup_and_toggles() {
    let text = [
        plyty_line(1, "0110", "BIAŁY", "https://x/a"),
        plyty_line(2, "0110", "BIAŁY", "ftp://x/a"),
        plyty_line(3, "0110", "BIAŁY", "https://x/a"),
    ]
    .join("\n");
    let mut out = import_str(&text, "plyty").unwrap();
    let validity: Vec<bool> = out.rows.iter().map(|r| r.is_valid).collect();

    for i in 0..out.rows.len() {
        toggle_exclusion(&mut out.rows, i).unwrap();
    }
    let rows = deduplicate(out.rows);
    assert_eq!(rows.iter().map(|r| r.is_valid).collect::<Vec<_>>(), validity);
}

#[test]
fn manual_reinclusion_makes_row_eligible() {
    let text = [
        plyty_line(1, "0110", "BIAŁY", "https://x/a"),
        plyty_line(2, "0111", "BIAŁY", "https://x/a"),
    ]
    .join("\n");
    let mut out = import_str(&text, "plyty").unwrap();
    assert_eq!(eligible_rows(&out.rows).len(), 1);

    assert!(!toggle_exclusion(&mut out.rows, 1).unwrap());
    assert_eq!(eligible_rows(&out.rows).len(), 2);
    assert_eq!(
        RowSummary::of(&out.rows),
        RowSummary {
            total: 2,
            valid: 2,
            invalid: 0,
            excluded: 0
        }
    );
}

// ── Layout ───────────────────────────────────────────────────────────────────

#[test]
fn layout_for_36mm_cards() {
    let rows = rows_per_page(297.0, 12.0, 3.0, 36.0);
    assert_eq!(rows, 7);
    let per_page = cards_per_page(rows, 3);
    assert_eq!(per_page, 21);
    assert_eq!(total_pages(50, per_page), 3);
}

#[test]
fn total_pages_matches_ceiling_for_slider_range() {
    for height in 40..=80 {
        let per_page = cards_per_page(rows_per_page(297.0, 12.0, 3.0, height as f64), 3);
        assert!(per_page > 0, "height {height}");
        for n in 1..=60 {
            assert_eq!(total_pages(n, per_page), n.div_ceil(per_page));
        }
    }
}

// ── Generation ───────────────────────────────────────────────────────────────

#[test]
fn generation_rejects_zero_eligible_rows() {
    let text = plyty_line(1, "0110", "BIAŁY", "ftp://nope");
    let out = import_str(&text, "plyty").unwrap();
    let err = generate(&out.rows, &GenerationConfig::default()).unwrap_err();
    assert!(matches!(err, CardsError::NoEligibleRows { total: 1 }));
}

#[test]
fn pdf_pages_follow_layout() {
    let out = import_str(&plyty_list(50), "plyty").unwrap();
    assert_eq!(out.summary.valid, 50);

    let log = Arc::new(PageLog::default());
    let config = GenerationConfig::builder()
        .card_height(40.0)
        .progress_callback(log.clone())
        .build()
        .unwrap();
    let doc = generate(&out.rows, &config).unwrap();

    // 40 mm cards: 6 rows × 3 columns per page.
    assert_eq!(doc.plan.cards_per_page, 18);
    assert_eq!(doc.stats.total_pages, 3);
    assert!(doc.bytes.starts_with(b"%PDF"));
    assert_eq!(
        *log.completed.lock().unwrap(),
        vec![(1, 3), (2, 3), (3, 3)]
    );
}

#[test]
fn docx_fixed_layout_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = import_str(&plyty_list(22), "plyty").unwrap();
    let config = GenerationConfig::builder()
        .format(OutputFormat::Docx)
        .policy(LayoutPolicy::fixed())
        .build()
        .unwrap();

    let path = dir.path().join("nested").join(config.format.default_file_name());
    let stats = generate_to_file(&out.rows, &path, &config).unwrap();

    assert_eq!(stats.total_pages, 2);
    assert_eq!(stats.total_cards, 22);
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..2], b"PK");
    assert_eq!(bytes.len(), stats.output_bytes);
    assert!(!path.with_extension("docx.tmp").exists());
}

#[test]
fn excluded_rows_never_rendered() {
    let mut out = import_str(&plyty_list(4), "plyty").unwrap();
    toggle_exclusion(&mut out.rows, 0).unwrap();
    toggle_exclusion(&mut out.rows, 2).unwrap();
    let doc = generate(&out.rows, &GenerationConfig::default()).unwrap();
    assert_eq!(doc.stats.total_cards, 2);
    assert_eq!(doc.stats.skipped_rows, 2);
}

#[test]
fn missing_font_falls_back_without_failing() {
    let out = import_str(&plyty_list(3), "plyty").unwrap();
    let config = GenerationConfig::builder()
        .font_path("/no/such/DejaVuSans.ttf")
        .build()
        .unwrap();
    let doc = generate(&out.rows, &config).unwrap();
    assert!(doc.bytes.starts_with(b"%PDF"));
}
