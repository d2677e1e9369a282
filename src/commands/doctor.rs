// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Record;
use crate::pricing::{Rules, checked_total};
use crate::utils::pretty_table;
use crate::workspace::Workspace;
use anyhow::Result;
use rust_decimal::Decimal;

// Loaded totals are trusted as stored, so only flag real disagreement.
fn tolerance() -> Decimal {
    Decimal::new(1, 2)
}

pub fn issues(records: &[Record], rules: &Rules) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for r in records {
        let at = format!("#{} {} / {}", r.id, r.supplier, r.product);

        // 1) Required text
        if r.supplier.trim().is_empty() {
            rows.push(vec!["missing_supplier".into(), at.clone()]);
        }
        if rules.require_product && r.product.trim().is_empty() {
            rows.push(vec!["missing_product".into(), at.clone()]);
        }

        // 2) Unknown numbers
        let unknown: Vec<&str> = [
            ("unit_price", r.unit_price.is_none()),
            ("quantity", r.quantity.is_none()),
            ("tax_rate", r.tax_rate.is_none()),
            ("discount_rate", r.discount_rate.is_none()),
            ("total", r.total.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect();
        if !unknown.is_empty() {
            rows.push(vec![
                "unknown_value".into(),
                format!("{}: {}", at, unknown.join(", ")),
            ]);
        }

        // 3) Stored total vs formula
        if let (Some(price), Some(qty), Some(tax), Some(disc), Some(total)) = (
            r.unit_price,
            r.quantity,
            r.tax_rate,
            r.discount_rate,
            r.total,
        ) {
            match checked_total(price, qty, tax, disc) {
                None => rows.push(vec!["total_overflow".into(), at.clone()]),
                Some(expected) => {
                    let off = expected
                        .checked_sub(total)
                        .is_none_or(|diff| diff.abs() > tolerance());
                    if off {
                        rows.push(vec![
                            "total_mismatch".into(),
                            format!("{}: stored {} expected {}", at, total, expected.round_dp(2)),
                        ]);
                    }
                }
            }
        }

        // 4) Rates that wipe out the price
        if r.discount_rate.is_some_and(|d| d > Decimal::ONE_HUNDRED) {
            rows.push(vec!["discount_over_100".into(), at.clone()]);
        }
    }
    rows
}

pub fn handle(ws: &Workspace) -> Result<()> {
    let rows = issues(ws.store.records(), &ws.settings.rules());
    if rows.is_empty() {
        println!("doctor: no issues found in {} quote(s)", ws.store.len());
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
