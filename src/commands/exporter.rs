// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{HEADER, record_row};
use crate::utils::{view, view_args};
use crate::workspace::Workspace;
use anyhow::{Context, Result, anyhow};
use serde_json::json;

pub fn handle(ws: &Workspace, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    let (filter, sort) = view_args(sub)?;
    let rows = view(ws.store.filter(&filter), sort);

    match fmt.as_str() {
        "csv" => {
            let mut wtr =
                csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record(HEADER)?;
            for r in &rows {
                wtr.write_record(record_row(r))?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|r| {
                    json!({
                        "date": r.date.to_string(),
                        "supplier": r.supplier,
                        "product": r.product,
                        "description": r.description,
                        "unit_price": r.unit_price,
                        "quantity": r.quantity,
                        "tax_rate": r.tax_rate,
                        "discount_rate": r.discount_rate,
                        "total": r.total,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Write {}", out))?;
        }
        _ => return Err(anyhow!("Unknown format: {} (use csv|json)", fmt)),
    }
    println!("Exported {} quote(s) to {}", rows.len(), out);
    Ok(())
}
