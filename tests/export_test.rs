//! PDF出力テスト

mod common;

use chrono::NaiveDate;
use common::png;
use store_report::cli::PdfQuality;
use store_report::export::{export_group, pdf, RenderOptions, ReportNamer};
use store_report::resolver::Placeholder;
use store_report_common::{ReportRow, ResolvedItem, StoreDateGroup, TextField};
use tempfile::tempdir;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn row(store: &str, item: &str) -> ReportRow {
    ReportRow {
        store_id: store.to_string(),
        date: date(),
        item_id: item.to_string(),
        image_name: format!("{}.png", item),
        fields: vec![TextField::new(
            "Remarks",
            "A fairly long remark that has to wrap across several lines in the info column",
        )],
        meta: vec![TextField::new("Name", "Alice"), TextField::new("Phone Number", "555-0100")],
        sheet_row: 2,
    }
}

fn group_with(store: &str, n: usize) -> (StoreDateGroup, Vec<ResolvedItem>) {
    let mut group = StoreDateGroup::new(store, date());
    let mut items = Vec::new();
    for i in 0..n {
        let r = row(store, &format!("Item {}", i + 1));
        group.rows.push(r.clone());
        items.push(ResolvedItem::present(r, png(120, 80, [30, 60, 90])));
    }
    (group, items)
}

#[test]
fn test_export_writes_pdf() {
    let dir = tempdir().unwrap();
    let (group, items) = group_with("S1", 2);

    let path = export_group(&group, &items, dir.path(), &mut ReportNamer::new(), &RenderOptions::default()).unwrap();

    assert_eq!(path, dir.path().join("S1_2024-01-01.pdf"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 500);
}

#[test]
fn test_export_creates_output_dir() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let (group, items) = group_with("S1", 1);

    let path = export_group(&group, &items, &nested, &mut ReportNamer::new(), &RenderOptions::default()).unwrap();
    assert!(path.exists());
}

#[test]
fn test_export_overwrites() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("S1_2024-01-01.pdf");
    std::fs::write(&target, b"old").unwrap();

    let (group, items) = group_with("S1", 1);
    export_group(&group, &items, dir.path(), &mut ReportNamer::new(), &RenderOptions::default()).unwrap();

    let bytes = std::fs::read(&target).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_items_paginate() {
    let options = RenderOptions {
        items_per_page: 3,
        quality: PdfQuality::Low,
        header_fields: vec!["Name".into()],
    };
    let (group, items) = group_with("S1", 4);
    let doc = pdf::build_document(&group, &items, &options).unwrap();
    assert_eq!(doc.pages.len(), 2);

    let bytes = pdf::render_pdf(&group, &items, &options).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_missing_item_renders_placeholder() {
    let dir = tempdir().unwrap();
    let (mut group, mut items) = group_with("S1", 1);
    let missing = row("S1", "Item 2");
    group.rows.push(missing.clone());
    items.push(ResolvedItem::missing(missing, Placeholder::bundled().bytes()));

    let path = export_group(&group, &items, dir.path(), &mut ReportNamer::new(), &RenderOptions::default()).unwrap();
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_unsafe_store_id_file_name() {
    let dir = tempdir().unwrap();
    let (group, items) = group_with("North/East #1", 1);

    let path = export_group(&group, &items, dir.path(), &mut ReportNamer::new(), &RenderOptions::default()).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().to_string();

    assert!(name.starts_with("North_East _1-"));
    assert!(name.ends_with("_2024-01-01.pdf"));
    assert_eq!(path.parent().unwrap(), dir.path());
}

#[test]
fn test_case_only_store_ids_do_not_overwrite() {
    let dir = tempdir().unwrap();
    let mut namer = ReportNamer::new();
    let options = RenderOptions::default();
    let (upper, upper_items) = group_with("S1", 1);
    let (lower, lower_items) = group_with("s1", 1);

    let a = export_group(&upper, &upper_items, dir.path(), &mut namer, &options).unwrap();
    let b = export_group(&lower, &lower_items, dir.path(), &mut namer, &options).unwrap();

    assert_eq!(a, dir.path().join("S1_2024-01-01.pdf"));
    let a_name = a.file_name().unwrap().to_string_lossy().to_lowercase();
    let b_name = b.file_name().unwrap().to_string_lossy().to_lowercase();
    assert_ne!(a_name, b_name);
    assert!(a.exists());
    assert!(b.exists());
}
