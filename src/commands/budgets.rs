// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{file_name, list_files, pretty_table};
use crate::workspace::Workspace;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn handle(ws: &mut Workspace, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("new", sub)) => new_budget(ws, sub)?,
        Some(("archives", _)) => archives(ws)?,
        Some(("open", sub)) => open(ws, sub)?,
        Some(("save", _)) => save(ws)?,
        _ => {}
    }
    Ok(())
}

fn new_budget(ws: &mut Workspace, sub: &clap::ArgMatches) -> Result<()> {
    let archive_dir = ws.paths.archive_dir();
    let archive = sub.get_flag("archive").then_some(archive_dir.as_path());
    let archived = ws.store.new_empty(archive)?;
    ws.settings.active_archive = None;
    ws.save_settings()?;
    if let Some(path) = archived {
        println!("Current quotes archived to {}", path.display());
    }
    println!("Started a new, empty quote set.");
    Ok(())
}

fn archives(ws: &Workspace) -> Result<()> {
    let files = list_files(&ws.paths.archive_dir(), "csv")?;
    if files.is_empty() {
        println!("No archived quote sets.");
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
    println!("{}", pretty_table(&["Archive", "Created"], rows));
    Ok(())
}

/// `file` is either a path or a name inside the archive dir.
fn resolve_archive(ws: &Workspace, file: &str) -> PathBuf {
    let direct = PathBuf::from(file);
    if direct.exists() {
        direct
    } else {
        ws.paths.archive_dir().join(file)
    }
}

fn open(ws: &mut Workspace, sub: &clap::ArgMatches) -> Result<()> {
    let file = sub.get_one::<String>("file").unwrap().trim();
    let path = resolve_archive(ws, file);
    if !path.exists() {
        println!("No archived quote set named '{}'.", file);
        return Ok(());
    }
    ws.store
        .load(&path)
        .with_context(|| format!("Load archive {}", path.display()))?;
    ws.store.set_mirror(Some(path.clone()));
    ws.settings.active_archive = Some(path.clone());
    ws.save_settings()?;
    ws.store.persist()?;
    println!(
        "Loaded {} quote(s) from {}; changes are saved to it as well.",
        ws.store.len(),
        path.display()
    );
    Ok(())
}

fn save(ws: &mut Workspace) -> Result<()> {
    ws.store.persist()?;
    match ws.store.mirror() {
        Some(mirror) => println!(
            "Saved {} quote(s) to {} and {}",
            ws.store.len(),
            ws.store.path().display(),
            mirror.display()
        ),
        None => println!(
            "Saved {} quote(s) to {}",
            ws.store.len(),
            ws.store.path().display()
        ),
    }
    Ok(())
}
