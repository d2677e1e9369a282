// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use quotebook::models::{NewQuote, RecordId, RecordKey};
use quotebook::store::{Filter, Metric, RecordStore, SortKey, aggregate, sort};
use rust_decimal::Decimal;
use std::fs;
use std::str::FromStr;
use tempfile::tempdir;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn quote(supplier: &str, product: &str, description: &str, price: &str, qty: u64) -> NewQuote {
    NewQuote {
        supplier: supplier.into(),
        product: product.into(),
        description: description.into(),
        unit_price: d(price),
        quantity: qty,
        tax_rate: Decimal::ZERO,
        discount_rate: Decimal::ZERO,
    }
}

fn rated(mut q: NewQuote, tax: &str, discount: &str) -> NewQuote {
    q.tax_rate = d(tax);
    q.discount_rate = d(discount);
    q
}

#[test]
fn add_computes_total_and_writes_through() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quotes.csv");
    let mut store = RecordStore::new(&path);
    let id = store
        .add_dated(rated(quote("Acme", "Bolts", "M8", "100", 2), "10", "5"), day())
        .unwrap();

    assert_eq!(id, RecordId(1));
    assert_eq!(store.get(id).unwrap().total, Some(d("209")));
    let contents = fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next().unwrap(),
        "date,supplier,product,description,unit_price,quantity,tax_rate,discount_rate,total"
    );
    assert!(lines.next().unwrap().starts_with("2025-03-14,Acme,Bolts,M8,100,2,10,5,209"));
}

#[test]
fn persist_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quotes.csv");
    let mut store = RecordStore::new(&path);
    store
        .add_dated(rated(quote("Acme", "Bolts", "M8, zinc", "100", 2), "10", "5"), day())
        .unwrap();
    store
        .add_dated(rated(quote("Borg", "Nuts", "", "0.35", 1000), "12.5", "0"), day())
        .unwrap();

    let reopened = RecordStore::open(&path).unwrap();
    assert_eq!(reopened.records(), store.records());
}

#[test]
fn load_trusts_stored_total() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quotes.csv");
    fs::write(
        &path,
        "date,supplier,product,description,unit_price,quantity,tax_rate,discount_rate,total\n\
         2025-01-02,Acme,Bolts,M8,100,2,10,5,999.99\n",
    )
    .unwrap();

    let store = RecordStore::open(&path).unwrap();
    assert_eq!(store.records()[0].total, Some(d("999.99")));
}

#[test]
fn load_keeps_unparsable_numbers_unknown() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quotes.csv");
    fs::write(
        &path,
        "date,supplier,product,description,unit_price,quantity,tax_rate,discount_rate,total\n\
         2025-01-02,Acme,Bolts,,abc,2.0,,1e1,\n",
    )
    .unwrap();

    let store = RecordStore::open(&path).unwrap();
    let r = &store.records()[0];
    assert_eq!(r.unit_price, None);
    assert_eq!(r.quantity, Some(2));
    assert_eq!(r.tax_rate, None);
    assert_eq!(r.discount_rate, Some(d("10")));
    assert_eq!(r.total, None);
    assert_eq!(r.total_or_zero(), Decimal::ZERO);
}

#[test]
fn load_accepts_files_without_product_column() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quotes.csv");
    fs::write(
        &path,
        "date,supplier,description,unit_price,quantity,tax_rate,discount_rate,total\n\
         2025-01-02,Acme,M8,100,2,10,5,209\n",
    )
    .unwrap();

    let store = RecordStore::open(&path).unwrap();
    let r = &store.records()[0];
    assert_eq!(r.product, "");
    assert_eq!(r.description, "M8");
    assert_eq!(r.total, Some(d("209")));
}

#[test]
fn failed_load_leaves_store_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quotes.csv");
    let mut store = RecordStore::new(&path);
    store.add_dated(quote("Acme", "Bolts", "M8", "1", 1), day()).unwrap();

    let bad = dir.path().join("bad.csv");
    fs::write(
        &bad,
        "date,supplier,product,description,unit_price,quantity,tax_rate,discount_rate,total\n\
         yesterday,Acme,Bolts,M8,1,1,0,0,1\n",
    )
    .unwrap();
    assert!(store.load(&bad).is_err());
    assert!(store.load(&dir.path().join("missing.csv")).is_err());
    assert_eq!(store.len(), 1);
}

#[test]
fn failed_persist_keeps_the_record_and_marks_dirty() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::new(dir.path().join("no-such-dir").join("quotes.csv"));
    let result = store.add_dated(quote("Acme", "Bolts", "M8", "1", 1), day());
    assert!(result.is_err());
    assert_eq!(store.len(), 1);
    assert!(store.is_dirty());
}

#[test]
fn filter_is_case_insensitive_and_intersects() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::new(dir.path().join("quotes.csv"));
    store.add_dated(quote("ACME Tools", "Bolts", "steel M8", "1", 1), day()).unwrap();
    store.add_dated(quote("Acme Tools", "Nuts", "brass", "1", 1), day()).unwrap();
    store.add_dated(quote("Borg", "Bolts", "Steel M10", "1", 1), day()).unwrap();

    let by_supplier = Filter {
        supplier: Some("acme".into()),
        ..Filter::default()
    };
    let by_description = Filter {
        description: Some("STEEL".into()),
        ..Filter::default()
    };
    let both = Filter {
        supplier: Some("acme".into()),
        description: Some("STEEL".into()),
        ..Filter::default()
    };

    let a: Vec<RecordId> = store.filter(&by_supplier).iter().map(|r| r.id).collect();
    let b: Vec<RecordId> = store.filter(&by_description).iter().map(|r| r.id).collect();
    let ab: Vec<RecordId> = store.filter(&both).iter().map(|r| r.id).collect();
    let intersection: Vec<RecordId> = a.iter().copied().filter(|id| b.contains(id)).collect();

    assert_eq!(a, vec![RecordId(1), RecordId(2)]);
    assert_eq!(b, vec![RecordId(1), RecordId(3)]);
    assert_eq!(ab, intersection);
    assert_eq!(ab, vec![RecordId(1)]);
    assert_eq!(store.filter(&Filter::default()).len(), 3);
}

#[test]
fn sort_is_stable_and_puts_unknown_last() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quotes.csv");
    fs::write(
        &path,
        "date,supplier,product,description,unit_price,quantity,tax_rate,discount_rate,total\n\
         2025-01-02,Borg,P,first,1,1,5,0,30\n\
         2025-01-02,Acme,P,,1,1,,0,10\n\
         2025-01-02,Borg,P,second,1,1,5,0,20\n\
         2025-01-02,Acme,P,,1,1,1,0,\n",
    )
    .unwrap();
    let store = RecordStore::open(&path).unwrap();
    let ids = |view: Vec<&quotebook::models::Record>| view.iter().map(|r| r.id.0).collect::<Vec<_>>();

    let all = || store.filter(&Filter::default());
    assert_eq!(ids(sort(all(), SortKey::Supplier)), vec![2, 4, 1, 3]);
    assert_eq!(ids(sort(all(), SortKey::TaxAsc)), vec![4, 1, 3, 2]);
    assert_eq!(ids(sort(all(), SortKey::TaxDesc)), vec![1, 3, 4, 2]);
    assert_eq!(ids(sort(all(), SortKey::TotalAsc)), vec![2, 3, 1, 4]);
    assert_eq!(ids(sort(all(), SortKey::TotalDesc)), vec![1, 3, 2, 4]);
    assert_eq!(ids(sort(all(), SortKey::DiscountDesc)), vec![1, 2, 3, 4]);
}

#[test]
fn aggregate_orders_ascending_by_value() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::new(dir.path().join("quotes.csv"));
    store.add_dated(quote("A", "P", "", "20", 1), day()).unwrap();
    store.add_dated(quote("B", "P", "", "200", 1), day()).unwrap();
    store.add_dated(quote("C", "P", "", "10", 1), day()).unwrap();
    store.add_dated(quote("A", "P", "", "30", 1), day()).unwrap();

    let sums = store.aggregate(Metric::TotalValue);
    assert_eq!(
        sums,
        vec![
            ("C".to_string(), d("10")),
            ("A".to_string(), d("50")),
            ("B".to_string(), d("200")),
        ]
    );
    let qty = store.aggregate(Metric::TotalQuantity);
    assert_eq!(qty[2], ("A".to_string(), d("2")));
}

#[test]
fn aggregate_means_skip_unknown_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quotes.csv");
    fs::write(
        &path,
        "date,supplier,product,description,unit_price,quantity,tax_rate,discount_rate,total\n\
         2025-01-02,Acme,P,,1,1,10,2,1\n\
         2025-01-02,Acme,P,,1,1,,4,\n\
         2025-01-02,Acme,P,,1,1,20,x,5\n",
    )
    .unwrap();
    let store = RecordStore::open(&path).unwrap();

    assert_eq!(store.aggregate(Metric::AverageTax), vec![("Acme".to_string(), d("15"))]);
    assert_eq!(
        store.aggregate(Metric::AverageDiscount),
        vec![("Acme".to_string(), d("3"))]
    );
    assert_eq!(store.aggregate(Metric::TotalValue), vec![("Acme".to_string(), d("6"))]);
}

#[test]
fn empty_store_yields_empty_views() {
    let dir = tempdir().unwrap();
    let store = RecordStore::open(dir.path().join("quotes.csv")).unwrap();
    assert!(store.is_empty());
    assert!(store.filter(&Filter::default()).is_empty());
    for metric in Metric::ALL {
        assert!(store.aggregate(metric).is_empty());
        assert!(aggregate(store.records(), metric).is_empty());
    }
}

#[test]
fn remove_matching_drops_only_first_duplicate() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::new(dir.path().join("quotes.csv"));
    store.add_dated(quote("Acme", "Bolts", "M8", "10", 1), day()).unwrap();
    store.add_dated(quote("Acme", "Bolts", "M8", "12", 1), day()).unwrap();

    let key = RecordKey {
        supplier: "Acme".into(),
        product: "Bolts".into(),
        description: "M8".into(),
    };
    let removed = store.remove_matching(&[key.clone()]).unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].total, Some(d("10")));
    assert_eq!(store.len(), 1);
    assert_eq!(store.records()[0].total, Some(d("12")));

    let reopened = RecordStore::open(store.path()).unwrap();
    assert_eq!(reopened.len(), 1);
}

#[test]
fn remove_ids_removes_each_selected_duplicate() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::new(dir.path().join("quotes.csv"));
    let a = store.add_dated(quote("Acme", "Bolts", "M8", "10", 1), day()).unwrap();
    let b = store.add_dated(quote("Acme", "Bolts", "M8", "12", 1), day()).unwrap();
    let c = store.add_dated(quote("Borg", "Nuts", "", "1", 1), day()).unwrap();

    let removed = store.remove_ids(&[a, b]).unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(store.records().iter().map(|r| r.id).collect::<Vec<_>>(), vec![c]);

    assert!(store.remove_ids(&[RecordId(99)]).unwrap().is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn archive_copies_without_touching_live_store() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::new(dir.path().join("quotes.csv"));
    store.add_dated(quote("Acme", "Bolts", "M8", "10", 1), day()).unwrap();

    let archive_dir = dir.path().join("archives");
    let first = store.archive(&archive_dir).unwrap();
    let second = store.archive(&archive_dir).unwrap();
    assert_ne!(first, second);
    let name = first.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("quotes_backup_") && name.ends_with(".csv"));
    assert_eq!(store.len(), 1);
    assert_eq!(RecordStore::open(&first).unwrap().records(), store.records());
}

#[test]
fn new_empty_archives_then_clears() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quotes.csv");
    let mut store = RecordStore::new(&path);
    store.add_dated(quote("Acme", "Bolts", "M8", "10", 1), day()).unwrap();

    let archive_dir = dir.path().join("archives");
    let archived = store.new_empty(Some(&archive_dir)).unwrap().unwrap();
    assert!(store.is_empty());
    assert!(RecordStore::open(&path).unwrap().is_empty());
    assert_eq!(RecordStore::open(&archived).unwrap().len(), 1);

    // nothing left to keep
    assert!(store.new_empty(Some(&archive_dir)).unwrap().is_none());
}

#[test]
fn mirror_receives_every_persist() {
    let dir = tempdir().unwrap();
    let mirror = dir.path().join("opened.csv");
    let mut store = RecordStore::new(dir.path().join("quotes.csv")).with_mirror(Some(mirror.clone()));
    store.add_dated(quote("Acme", "Bolts", "M8", "10", 1), day()).unwrap();
    assert_eq!(RecordStore::open(&mirror).unwrap().len(), 1);
}

#[test]
fn aggregate_saturates_instead_of_overflowing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quotes.csv");
    fs::write(
        &path,
        "date,supplier,product,description,unit_price,quantity,tax_rate,discount_rate,total\n\
         2025-01-02,Acme,Bolts,,1,1,0,0,79228162514264337593543950000\n\
         2025-01-02,Acme,Nuts,,1,1,0,0,79228162514264337593543950000\n\
         2025-01-02,Borg,Nuts,,1,1,0,0,5\n",
    )
    .unwrap();

    let store = RecordStore::open(&path).unwrap();
    assert_eq!(
        store.aggregate(Metric::TotalValue),
        vec![("Borg".to_string(), d("5")), ("Acme".to_string(), Decimal::MAX)]
    );
}

#[test]
fn add_out_of_range_quote_saturates_total() {
    let dir = tempdir().unwrap();
    let mut store = RecordStore::new(dir.path().join("quotes.csv"));
    let mut q = quote("Acme", "Bolts", "", "1", 2);
    q.unit_price = Decimal::MAX;
    let id = store.add_dated(q, day()).unwrap();
    assert_eq!(store.get(id).unwrap().total, Some(Decimal::MAX));
}
