// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Record;
use crate::store::{Filter, SortKey};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .replace(',', ".")
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// `1234.5` -> `1,234.50`
pub fn fmt_amount(d: Decimal) -> String {
    let s = format!("{:.2}", d.round_dp(2));
    let (sign, s) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int_part, dec_part) = s.split_once('.').unwrap_or((s, "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}.{}", sign, grouped, dec_part)
}

pub fn fmt_money(d: Option<Decimal>, symbol: &str) -> String {
    format!("{} {}", symbol, fmt_amount(d.unwrap_or(Decimal::ZERO)))
}

pub fn fmt_rate(d: Option<Decimal>) -> String {
    format!("{:.1}%", d.unwrap_or(Decimal::ZERO).round_dp(1))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// Filter and sort flags shared by `quote list`, `report pdf` and `export`.
pub fn view_args(sub: &clap::ArgMatches) -> Result<(Filter, Option<SortKey>)> {
    let text = |name: &str| {
        sub.get_one::<String>(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };
    let filter = Filter {
        supplier: text("supplier"),
        product: text("product"),
        description: text("description"),
    };
    let sort = match sub.get_one::<String>("sort") {
        Some(raw) => Some(raw.parse::<SortKey>().map_err(anyhow::Error::msg)?),
        None => None,
    };
    Ok((filter, sort))
}

pub fn view<'a>(records: Vec<&'a Record>, sort: Option<SortKey>) -> Vec<&'a Record> {
    match sort {
        Some(key) => crate::store::sort(records, key),
        None => records,
    }
}

pub fn timestamp_slug() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Files in `dir` with extension `ext`, newest first. A missing dir is empty.
pub fn list_files(dir: &Path, ext: &str) -> Result<Vec<(PathBuf, DateTime<Local>)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Read dir {}", dir.display()))? {
        let path = entry?.path();
        let matches = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case(ext))
            .unwrap_or(false);
        if !matches || !path.is_file() {
            continue;
        }
        let modified: DateTime<Local> = fs::metadata(&path)?.modified()?.into();
        out.push((path, modified));
    }
    out.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(out)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
