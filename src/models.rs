// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session-local handle for a stored record. Not written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One supplier quote line.
///
/// Numeric fields are `None` only for rows loaded from a file whose cell did not
/// parse; records created through the store always carry numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub date: NaiveDate,
    pub supplier: String,
    pub product: String,
    pub description: String,
    pub unit_price: Option<Decimal>,
    pub quantity: Option<u64>,
    pub tax_rate: Option<Decimal>,
    pub discount_rate: Option<Decimal>,
    pub total: Option<Decimal>,
}

impl Record {
    pub fn matches_key(&self, key: &RecordKey) -> bool {
        self.supplier == key.supplier
            && self.product == key.product
            && self.description == key.description
    }

    pub fn total_or_zero(&self) -> Decimal {
        self.total.unwrap_or(Decimal::ZERO)
    }
}

/// The (supplier, product, description) tuple used for first-match removal.
/// Not unique across records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub supplier: String,
    pub product: String,
    pub description: String,
}

/// Raw entry fields as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct QuoteInput {
    pub supplier: String,
    pub product: String,
    pub description: String,
    pub unit_price: String,
    pub quantity: String,
    pub tax_rate: String,
    pub discount_rate: String,
}

/// A validated quote ready to be added to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuote {
    pub supplier: String,
    pub product: String,
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: u64,
    pub tax_rate: Decimal,
    pub discount_rate: Decimal,
}
