// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use quotebook::models::NewQuote;
use quotebook::report::{build_comparison, write_pdf};
use quotebook::store::{Filter, RecordStore};
use quotebook::{cli, commands::reports, config::Paths, workspace::Workspace};
use rust_decimal::Decimal;
use std::fs;
use tempfile::tempdir;

fn quote(supplier: &str, product: &str, price: i64) -> NewQuote {
    NewQuote {
        supplier: supplier.into(),
        product: product.into(),
        description: String::new(),
        unit_price: Decimal::from(price),
        quantity: 1,
        tax_rate: Decimal::ZERO,
        discount_rate: Decimal::ZERO,
    }
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

#[test]
fn comparison_groups_by_product_then_supplier() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::new(dir.path().join("quotes.csv"));
    store.add_dated(quote("Zeta", "Nuts", 3), day()).unwrap();
    store.add_dated(quote("Acme", "Bolts", 1), day()).unwrap();
    store.add_dated(quote("Acme", "Nuts", 2), day()).unwrap();
    store.add_dated(quote("Zeta", "Nuts", 4), day()).unwrap();

    let rows = store.filter(&Filter::default());
    let cmp = build_comparison(&rows);

    assert_eq!(cmp.suppliers, vec!["Acme", "Zeta"]);
    let products: Vec<&str> = cmp.products.iter().map(|p| p.product.as_str()).collect();
    assert_eq!(products, vec!["Nuts", "Bolts"]);

    let nuts = &cmp.products[0];
    assert_eq!(nuts.columns[0].len(), 1);
    assert_eq!(nuts.columns[1].len(), 2);
    assert_eq!(nuts.columns[1][1].unit_price, Some(Decimal::from(4)));

    // Zeta has no bolts quote: rendered as N/A
    let bolts = &cmp.products[1];
    assert_eq!(bolts.columns[0].len(), 1);
    assert!(bolts.columns[1].is_empty());
}

#[test]
fn empty_view_builds_empty_comparison() {
    let cmp = build_comparison(&[]);
    assert!(cmp.is_empty());
    assert!(cmp.suppliers.is_empty());
}

#[test]
fn pdf_is_written_across_pages() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::new(dir.path().join("quotes.csv"));
    for i in 0..40 {
        let supplier = if i % 2 == 0 { "Acme" } else { "Borg" };
        store
            .add_dated(quote(supplier, &format!("Part {}", i / 4), i + 1), day())
            .unwrap();
    }
    let rows = store.filter(&Filter::default());
    let cmp = build_comparison(&rows);
    let out = dir.path().join("report.pdf");
    write_pdf(&cmp, &out, "R$", day()).unwrap();

    let bytes = fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn report_pdf_command_writes_default_file_and_skips_empty_view() {
    let dir = tempdir().unwrap();
    let mut ws = Workspace::open(Paths::at(dir.path())).unwrap();

    let matches = cli::build_cli().get_matches_from(["quotebook", "report", "pdf"]);
    let pdf_m = matches
        .subcommand_matches("report")
        .and_then(|m| m.subcommand_matches("pdf"))
        .unwrap();
    assert!(reports::generate(&ws, pdf_m).unwrap().is_none());

    ws.store.add_dated(quote("Acme", "Bolts", 5), day()).unwrap();
    let path = reports::generate(&ws, pdf_m).unwrap().unwrap();
    assert_eq!(path.parent().unwrap(), ws.paths.reports_dir());
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("Quote_Comparison_") && name.ends_with(".pdf"));

    let filtered = cli::build_cli().get_matches_from([
        "quotebook",
        "report",
        "pdf",
        "--supplier",
        "nobody",
    ]);
    let filtered_m = filtered
        .subcommand_matches("report")
        .and_then(|m| m.subcommand_matches("pdf"))
        .unwrap();
    assert!(reports::generate(&ws, filtered_m).unwrap().is_none());
}
