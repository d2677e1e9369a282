// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::StoreError;
use crate::models::{NewQuote, Record, RecordId, RecordKey};
use crate::pricing::compute_total;
use chrono::{Local, NaiveDate};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const HEADER: [&str; 9] = [
    "date",
    "supplier",
    "product",
    "description",
    "unit_price",
    "quantity",
    "tax_rate",
    "discount_rate",
    "total",
];

const DATE_FMT: &str = "%Y-%m-%d";

/// Case-insensitive substring constraints, ANDed. `None` or blank means no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub supplier: Option<String>,
    pub product: Option<String>,
    pub description: Option<String>,
}

impl Filter {
    pub fn matches(&self, record: &Record) -> bool {
        contains_ci(&record.supplier, self.supplier.as_deref())
            && contains_ci(&record.product, self.product.as_deref())
            && contains_ci(&record.description, self.description.as_deref())
    }
}

fn contains_ci(hay: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(n) if !n.is_empty() => hay.to_lowercase().contains(&n.to_lowercase()),
        _ => true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Supplier,
    DiscountDesc,
    TaxAsc,
    TaxDesc,
    TotalAsc,
    TotalDesc,
}

impl SortKey {
    pub const NAMES: [&'static str; 6] = [
        "supplier",
        "discount-desc",
        "tax-asc",
        "tax-desc",
        "total-asc",
        "total-desc",
    ];
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supplier" => Ok(SortKey::Supplier),
            "discount-desc" => Ok(SortKey::DiscountDesc),
            "tax-asc" => Ok(SortKey::TaxAsc),
            "tax-desc" => Ok(SortKey::TaxDesc),
            "total-asc" => Ok(SortKey::TotalAsc),
            "total-desc" => Ok(SortKey::TotalDesc),
            other => Err(format!(
                "Unknown sort key '{}' (use {})",
                other,
                SortKey::NAMES.join("|")
            )),
        }
    }
}

/// Stable sort of a view. Unknown values go last in either direction.
pub fn sort(mut view: Vec<&Record>, key: SortKey) -> Vec<&Record> {
    match key {
        SortKey::Supplier => view.sort_by(|a, b| a.supplier.cmp(&b.supplier)),
        SortKey::DiscountDesc => {
            view.sort_by(|a, b| known_first(a.discount_rate, b.discount_rate, true))
        }
        SortKey::TaxAsc => view.sort_by(|a, b| known_first(a.tax_rate, b.tax_rate, false)),
        SortKey::TaxDesc => view.sort_by(|a, b| known_first(a.tax_rate, b.tax_rate, true)),
        SortKey::TotalAsc => view.sort_by(|a, b| known_first(a.total, b.total, false)),
        SortKey::TotalDesc => view.sort_by(|a, b| known_first(a.total, b.total, true)),
    }
    view
}

fn known_first(a: Option<Decimal>, b: Option<Decimal>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    TotalValue,
    AverageTax,
    AverageDiscount,
    TotalQuantity,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::TotalValue,
        Metric::AverageTax,
        Metric::AverageDiscount,
        Metric::TotalQuantity,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Metric::TotalValue => "Total value by supplier",
            Metric::AverageTax => "Average tax by supplier",
            Metric::AverageDiscount => "Average discount by supplier",
            Metric::TotalQuantity => "Total quantity by supplier",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Metric::TotalValue => "total_value",
            Metric::AverageTax => "avg_tax",
            Metric::AverageDiscount => "avg_discount",
            Metric::TotalQuantity => "total_quantity",
        }
    }

    fn is_mean(&self) -> bool {
        matches!(self, Metric::AverageTax | Metric::AverageDiscount)
    }

    fn value(&self, record: &Record) -> Option<Decimal> {
        match self {
            Metric::TotalValue => record.total,
            Metric::AverageTax => record.tax_rate,
            Metric::AverageDiscount => record.discount_rate,
            Metric::TotalQuantity => record.quantity.map(Decimal::from),
        }
    }
}

/// Group by supplier and reduce `metric`, ordered ascending by value.
///
/// Sums count unknown values as zero; means skip them. A sum that leaves the
/// `Decimal` range saturates.
pub fn aggregate<'a, I>(records: I, metric: Metric) -> Vec<(String, Decimal)>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<&'a str, (Decimal, u64)> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry(record.supplier.as_str())
            .or_insert((Decimal::ZERO, 0));
        if let Some(v) = metric.value(record) {
            entry.0 = entry.0.checked_add(v).unwrap_or_else(|| {
                warn!(
                    supplier = %record.supplier,
                    metric = metric.slug(),
                    "sum overflowed; saturating"
                );
                if v < Decimal::ZERO { Decimal::MIN } else { Decimal::MAX }
            });
            entry.1 += 1;
        }
    }
    let mut out: Vec<(String, Decimal)> = groups
        .into_iter()
        .map(|(supplier, (sum, count))| {
            let value = if !metric.is_mean() {
                sum
            } else if count == 0 {
                Decimal::ZERO
            } else {
                sum / Decimal::from(count)
            };
            (supplier.to_string(), value)
        })
        .collect();
    out.sort_by(|a, b| a.1.cmp(&b.1));
    out
}

/// The live quote table, bound to the file it is written through to.
#[derive(Debug)]
pub struct RecordStore {
    records: Vec<Record>,
    next_id: u64,
    path: PathBuf,
    mirror: Option<PathBuf>,
    dirty: bool,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RecordStore {
            records: Vec::new(),
            next_id: 1,
            path: path.into(),
            mirror: None,
            dirty: false,
        }
    }

    /// Load `path` when it exists, otherwise start empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let mut store = RecordStore::new(path);
        if store.path.exists() {
            let path = store.path.clone();
            store.load(&path)?;
        }
        Ok(store)
    }

    /// Also write every persist to `mirror` (the archive currently open).
    pub fn with_mirror(mut self, mirror: Option<PathBuf>) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn set_mirror(&mut self, mirror: Option<PathBuf>) {
        self.mirror = mirror;
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mirror(&self) -> Option<&Path> {
        self.mirror.as_deref()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when the last persist failed and memory is ahead of disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn add(&mut self, quote: NewQuote) -> Result<RecordId, StoreError> {
        self.add_dated(quote, Local::now().date_naive())
    }

    /// Append a quote dated `date`. The record stays in memory even when the
    /// write-through persist fails.
    pub fn add_dated(&mut self, quote: NewQuote, date: NaiveDate) -> Result<RecordId, StoreError> {
        let total = compute_total(
            quote.unit_price,
            quote.quantity,
            quote.tax_rate,
            quote.discount_rate,
        );
        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.records.push(Record {
            id,
            date,
            supplier: quote.supplier,
            product: quote.product,
            description: quote.description,
            unit_price: Some(quote.unit_price),
            quantity: Some(quote.quantity),
            tax_rate: Some(quote.tax_rate),
            discount_rate: Some(quote.discount_rate),
            total: Some(total),
        });
        debug!(id = id.0, %total, "quote added");
        self.persist()?;
        Ok(id)
    }

    /// Remove the first record matching each key. Duplicate rows sharing a key
    /// need one key per row to all go away.
    pub fn remove_matching(&mut self, keys: &[RecordKey]) -> Result<Vec<Record>, StoreError> {
        let mut removed = Vec::new();
        for key in keys {
            if let Some(pos) = self.records.iter().position(|r| r.matches_key(key)) {
                removed.push(self.records.remove(pos));
            }
        }
        if !removed.is_empty() {
            info!(count = removed.len(), "quotes removed by key");
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn remove_ids(&mut self, ids: &[RecordId]) -> Result<Vec<Record>, StoreError> {
        let (removed, kept): (Vec<Record>, Vec<Record>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| ids.contains(&r.id));
        self.records = kept;
        if !removed.is_empty() {
            info!(count = removed.len(), "quotes removed by id");
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn filter(&self, filter: &Filter) -> Vec<&Record> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }

    pub fn aggregate(&self, metric: Metric) -> Vec<(String, Decimal)> {
        aggregate(&self.records, metric)
    }

    /// Replace the contents with the rows of `path`. Totals are taken as stored.
    /// Nothing changes when the file cannot be read.
    pub fn load(&mut self, path: &Path) -> Result<(), StoreError> {
        let records = read_records(path)?;
        info!(path = %path.display(), count = records.len(), "quotes loaded");
        self.next_id = records.len() as u64 + 1;
        self.records = records;
        Ok(())
    }

    pub fn persist(&mut self) -> Result<(), StoreError> {
        let result = self.write_through();
        self.dirty = result.is_err();
        if let Err(ref err) = result {
            warn!(error = %err, "persist failed; memory and disk diverge");
        }
        result
    }

    fn write_through(&self) -> Result<(), StoreError> {
        self.persist_to(&self.path)?;
        if let Some(mirror) = &self.mirror {
            self.persist_to(mirror)?;
        }
        Ok(())
    }

    pub fn persist_to(&self, path: &Path) -> Result<(), StoreError> {
        write_records(path, &self.records)?;
        debug!(path = %path.display(), count = self.records.len(), "quotes written");
        Ok(())
    }

    /// Copy the whole store to a new timestamped file in `dir`.
    pub fn archive(&self, dir: &Path) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut path = dir.join(format!("quotes_backup_{}.csv", stamp));
        let mut n = 2;
        while path.exists() {
            path = dir.join(format!("quotes_backup_{}_{}.csv", stamp, n));
            n += 1;
        }
        self.persist_to(&path)?;
        info!(path = %path.display(), "store archived");
        Ok(path)
    }

    /// Start over with zero records, archiving first when `archive_dir` is given
    /// and there is something to keep.
    pub fn new_empty(&mut self, archive_dir: Option<&Path>) -> Result<Option<PathBuf>, StoreError> {
        let archived = match archive_dir {
            Some(dir) if !self.is_empty() => Some(self.archive(dir)?),
            _ => None,
        };
        self.records.clear();
        self.next_id = 1;
        self.mirror = None;
        self.persist()?;
        Ok(archived)
    }
}

fn fmt_opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// One record as it is written to disk, in `HEADER` order.
pub(crate) fn record_row(r: &Record) -> [String; 9] {
    [
        r.date.format(DATE_FMT).to_string(),
        r.supplier.clone(),
        r.product.clone(),
        r.description.clone(),
        fmt_opt(r.unit_price),
        fmt_opt(r.quantity),
        fmt_opt(r.tax_rate),
        fmt_opt(r.discount_rate),
        fmt_opt(r.total),
    ]
}

fn write_records(path: &Path, records: &[Record]) -> Result<(), StoreError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| StoreError::csv(path, e))?;
    wtr.write_record(HEADER)
        .map_err(|e| StoreError::csv(path, e))?;
    for r in records {
        wtr.write_record(record_row(r))
            .map_err(|e| StoreError::csv(path, e))?;
    }
    wtr.flush().map_err(|e| StoreError::io(path, e))?;
    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<Record>, StoreError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;

    // Eight columns is the layout without a product column.
    let has_product = match rdr.headers().map_err(|e| StoreError::csv(path, e))?.len() {
        9 => true,
        8 => false,
        n => {
            return Err(StoreError::InvalidRow {
                path: path.to_path_buf(),
                line: 1,
                reason: format!("expected 8 or 9 columns, found {}", n),
            });
        }
    };
    let base = if has_product { 3 } else { 2 };

    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let rec = result.map_err(|e| StoreError::csv(path, e))?;
        let line = rec.position().map(|p| p.line()).unwrap_or(idx as u64 + 2);
        let field = |i: usize| rec.get(i).unwrap_or("").trim();

        let date_raw = field(0);
        let date = NaiveDate::parse_from_str(date_raw, DATE_FMT).map_err(|_| {
            StoreError::InvalidRow {
                path: path.to_path_buf(),
                line,
                reason: format!("invalid date '{}', expected YYYY-MM-DD", date_raw),
            }
        })?;

        records.push(Record {
            id: RecordId(idx as u64 + 1),
            date,
            supplier: field(1).to_string(),
            product: if has_product {
                field(2).to_string()
            } else {
                String::new()
            },
            description: field(base).to_string(),
            unit_price: cell_decimal(field(base + 1)),
            quantity: cell_quantity(field(base + 2)),
            tax_rate: cell_decimal(field(base + 3)),
            discount_rate: cell_decimal(field(base + 4)),
            total: cell_decimal(field(base + 5)),
        });
    }
    Ok(records)
}

fn cell_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    s.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(s).ok())
}

// Accepts integral decimals such as "2.0".
fn cell_quantity(s: &str) -> Option<u64> {
    s.parse::<u64>().ok().or_else(|| {
        cell_decimal(s)
            .filter(|d| d.fract().is_zero())
            .and_then(|d| d.to_u64())
    })
}
