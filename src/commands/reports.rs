// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::report::{build_comparison, write_pdf};
use crate::utils::{file_name, list_files, pretty_table, view, view_args};
use crate::workspace::Workspace;
use anyhow::{Context, Result, anyhow};
use chrono::Local;
use std::fs;
use std::path::PathBuf;

pub fn handle(ws: &Workspace, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("pdf", sub)) => pdf(ws, sub)?,
        Some(("list", _)) => list(ws)?,
        Some(("rm", sub)) => remove(ws, sub)?,
        _ => {}
    }
    Ok(())
}

/// Write the comparison PDF for the filtered view. Returns `None` when the view
/// is empty and nothing was written.
pub fn generate(ws: &Workspace, sub: &clap::ArgMatches) -> Result<Option<PathBuf>> {
    let (filter, sort) = view_args(sub)?;
    let rows = view(ws.store.filter(&filter), sort);
    let comparison = build_comparison(&rows);
    if comparison.is_empty() {
        return Ok(None);
    }
    let now = Local::now();
    let path = match sub.get_one::<String>("out") {
        Some(out) => PathBuf::from(out.trim()),
        None => {
            let dir = ws.paths.reports_dir();
            fs::create_dir_all(&dir).with_context(|| format!("Create {}", dir.display()))?;
            dir.join(format!(
                "Quote_Comparison_{}.pdf",
                now.format("%d-%m-%Y_%H-%M-%S")
            ))
        }
    };
    write_pdf(
        &comparison,
        &path,
        &ws.settings.currency_symbol,
        now.date_naive(),
    )?;
    Ok(Some(path))
}

fn pdf(ws: &Workspace, sub: &clap::ArgMatches) -> Result<()> {
    match generate(ws, sub)? {
        Some(path) => println!("Comparison report written to {}", path.display()),
        None => println!("No quotes to report."),
    }
    Ok(())
}

fn list(ws: &Workspace) -> Result<()> {
    let files = list_files(&ws.paths.reports_dir(), "pdf")?;
    if files.is_empty() {
        println!("No saved reports.");
        return Ok(());
    }
    let rows = files
        .into_iter()
        .map(|(path, modified)| {
            vec![
                file_name(&path),
                modified.format("%d/%m/%Y %H:%M").to_string(),
            ]
        })
        .collect();
    println!("{}", pretty_table(&["Report", "Created"], rows));
    Ok(())
}

fn remove(ws: &Workspace, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim();
    let dir = ws.paths.reports_dir();
    let path = dir.join(name);
    // only plain file names inside the reports dir
    if path.parent() != Some(dir.as_path()) || !name.to_lowercase().ends_with(".pdf") {
        return Err(anyhow!("'{}' is not a report in {}", name, dir.display()));
    }
    if !path.exists() {
        println!("No report named '{}'.", name);
        return Ok(());
    }
    fs::remove_file(&path).with_context(|| format!("Delete {}", path.display()))?;
    println!("Deleted report '{}'", name);
    Ok(())
}
