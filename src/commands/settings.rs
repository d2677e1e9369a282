// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::OUTPUT_ENV;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use crate::workspace::Workspace;
use anyhow::Result;
use std::path::PathBuf;

pub fn handle(ws: &mut Workspace, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(ws, sub)?,
        Some(("set", sub)) => set(ws, sub)?,
        _ => {}
    }
    Ok(())
}

fn show(ws: &Workspace, sub: &clap::ArgMatches) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &ws.settings)? {
        return Ok(());
    }
    let s = &ws.settings;
    let opt_path = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".into())
    };
    let rows = vec![
        vec!["quotes file".into(), ws.paths.quotes_file().display().to_string()],
        vec!["output dir".into(), output_dir(ws)],
        vec!["currency symbol".into(), s.currency_symbol.clone()],
        vec!["require product".into(), s.require_product.to_string()],
        vec![
            "max rate".into(),
            s.max_rate.map(|d| format!("{}%", d)).unwrap_or_else(|| "none".into()),
        ],
        vec!["active archive".into(), opt_path(&s.active_archive)],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));
    Ok(())
}

// QUOTEBOOK_OUTPUT wins over the setting, which wins over the platform default.
fn output_dir(ws: &Workspace) -> String {
    let source = if ws.paths.output_pinned {
        OUTPUT_ENV
    } else if ws.settings.output_dir.is_some() {
        "setting"
    } else {
        "default"
    };
    format!("{} ({})", ws.paths.output_dir.display(), source)
}

fn is_none(raw: &str) -> bool {
    raw.is_empty() || raw.eq_ignore_ascii_case("none")
}

fn set(ws: &mut Workspace, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(symbol) = sub.get_one::<String>("currency_symbol") {
        ws.settings.currency_symbol = symbol.trim().to_string();
    }
    if let Some(required) = sub.get_one::<bool>("require_product") {
        ws.settings.require_product = *required;
    }
    if let Some(raw) = sub.get_one::<String>("max_rate").map(|s| s.trim()) {
        ws.settings.max_rate = if is_none(raw) {
            None
        } else {
            Some(parse_decimal(raw)?)
        };
    }
    if let Some(raw) = sub.get_one::<String>("output_dir").map(|s| s.trim()) {
        ws.settings.output_dir = if is_none(raw) {
            None
        } else {
            Some(PathBuf::from(raw))
        };
    }
    ws.save_settings()?;
    println!("Settings saved to {}", ws.paths.settings_file().display());
    Ok(())
}
