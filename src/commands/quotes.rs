// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{QuoteInput, Record, RecordId, RecordKey};
use crate::utils::{fmt_money, fmt_rate, maybe_print_json, pretty_table, view, view_args};
use crate::workspace::Workspace;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeSet;

pub fn handle(ws: &mut Workspace, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ws, sub)?,
        Some(("list", sub)) => list(ws, sub)?,
        Some(("rm", sub)) => remove(ws, sub)?,
        Some(("suggest", sub)) => suggest(ws, sub)?,
        _ => {}
    }
    Ok(())
}

fn arg(sub: &clap::ArgMatches, name: &str) -> String {
    sub.get_one::<String>(name).cloned().unwrap_or_default()
}

pub fn input_from(sub: &clap::ArgMatches) -> QuoteInput {
    QuoteInput {
        supplier: arg(sub, "supplier"),
        product: arg(sub, "product"),
        description: arg(sub, "description"),
        unit_price: arg(sub, "price"),
        quantity: arg(sub, "quantity"),
        tax_rate: arg(sub, "tax"),
        discount_rate: arg(sub, "discount"),
    }
}

fn add(ws: &mut Workspace, sub: &clap::ArgMatches) -> Result<()> {
    let quote = input_from(sub).validate(&ws.settings.rules())?;
    let id = ws
        .store
        .add(quote)
        .context("Quote kept in memory but the quotes file could not be written")?;
    if let Some(r) = ws.store.get(id) {
        println!(
            "Recorded quote #{} from '{}' for '{}': {} x {} = {}",
            id,
            r.supplier,
            r.product,
            r.quantity.unwrap_or(0),
            fmt_money(r.unit_price, &ws.settings.currency_symbol),
            fmt_money(r.total, &ws.settings.currency_symbol),
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct QuoteRow {
    pub id: u64,
    pub date: String,
    pub supplier: String,
    pub product: String,
    pub description: String,
    pub unit_price: String,
    pub quantity: String,
    pub tax_rate: String,
    pub discount_rate: String,
    pub total: String,
}

impl QuoteRow {
    fn from_record(r: &Record, symbol: &str) -> Self {
        QuoteRow {
            id: r.id.0,
            date: r.date.to_string(),
            supplier: r.supplier.clone(),
            product: r.product.clone(),
            description: r.description.clone(),
            unit_price: fmt_money(r.unit_price, symbol),
            quantity: r.quantity.unwrap_or(0).to_string(),
            tax_rate: fmt_rate(r.tax_rate),
            discount_rate: fmt_rate(r.discount_rate),
            total: fmt_money(r.total, symbol),
        }
    }
}

pub fn query_rows(ws: &Workspace, sub: &clap::ArgMatches) -> Result<Vec<QuoteRow>> {
    let (filter, sort) = view_args(sub)?;
    let symbol = &ws.settings.currency_symbol;
    Ok(view(ws.store.filter(&filter), sort)
        .into_iter()
        .map(|r| QuoteRow::from_record(r, symbol))
        .collect())
}

fn list(ws: &Workspace, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(ws, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    if data.is_empty() {
        println!("No quotes to show.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = data
        .into_iter()
        .map(|r| {
            vec![
                r.id.to_string(),
                r.supplier,
                r.product,
                r.description,
                r.unit_price,
                r.quantity,
                r.tax_rate,
                r.discount_rate,
                r.total,
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "ID",
                "Supplier",
                "Product",
                "Description",
                "Unit price",
                "Qty",
                "Tax",
                "Discount",
                "Total"
            ],
            rows,
        )
    );
    Ok(())
}

fn remove(ws: &mut Workspace, sub: &clap::ArgMatches) -> Result<()> {
    let ids: Vec<RecordId> = sub
        .get_many::<u64>("id")
        .map(|vals| vals.copied().map(RecordId).collect())
        .unwrap_or_default();

    let removed = if !ids.is_empty() {
        ws.store.remove_ids(&ids)?
    } else {
        let text = |name: &str| {
            sub.get_one::<String>(name)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        let key = RecordKey {
            supplier: text("supplier"),
            product: text("product"),
            description: text("description"),
        };
        ws.store.remove_matching(&[key])?
    };

    if removed.is_empty() {
        println!("No matching quotes to remove.");
        return Ok(());
    }
    println!("Removed {} quote(s):", removed.len());
    for r in removed.iter().take(3) {
        println!(
            "- {} | {} | {}",
            r.supplier,
            r.product,
            fmt_money(r.total, &ws.settings.currency_symbol)
        );
    }
    if removed.len() > 3 {
        println!("... and {} more", removed.len() - 3);
    }
    Ok(())
}

#[derive(Serialize, Default)]
pub struct Suggestions {
    pub suppliers: Vec<String>,
    pub products: Vec<String>,
    pub descriptions: Vec<String>,
}

pub fn suggestions(records: &[Record]) -> Suggestions {
    let distinct = |f: fn(&Record) -> &str| -> Vec<String> {
        records
            .iter()
            .map(f)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    };
    Suggestions {
        suppliers: distinct(|r| r.supplier.as_str()),
        products: distinct(|r| r.product.as_str()),
        descriptions: distinct(|r| r.description.as_str()),
    }
}

fn suggest(ws: &Workspace, sub: &clap::ArgMatches) -> Result<()> {
    let s = suggestions(ws.store.records());
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Suppliers".to_string(), s.suppliers.join(", ")],
        vec!["Products".to_string(), s.products.join(", ")],
        vec!["Descriptions".to_string(), s.descriptions.join(", ")],
    ];
    println!("{}", pretty_table(&["Field", "Known values"], rows));
    Ok(())
}
