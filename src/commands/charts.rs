// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::chart::{build_charts, export_svgs, render_text};
use crate::utils::timestamp_slug;
use crate::workspace::Workspace;
use anyhow::Result;

const BAR_WIDTH: usize = 40;

pub fn handle(ws: &Workspace, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => show(ws)?,
        Some(("export", _)) => export(ws)?,
        _ => {}
    }
    Ok(())
}

fn show(ws: &Workspace) -> Result<()> {
    let charts = build_charts(ws.store.records());
    if charts.is_empty() {
        println!("No quotes to chart.");
        return Ok(());
    }
    for chart in &charts {
        println!(
            "{}",
            render_text(chart, &ws.settings.currency_symbol, BAR_WIDTH)
        );
    }
    Ok(())
}

fn export(ws: &Workspace) -> Result<()> {
    let charts = build_charts(ws.store.records());
    if charts.is_empty() {
        println!("No quotes to chart.");
        return Ok(());
    }
    let dir = ws.paths.charts_dir();
    let written = export_svgs(
        &charts,
        &dir,
        &timestamp_slug(),
        &ws.settings.currency_symbol,
    )?;
    println!("Exported {} charts to {}", written.len(), dir.display());
    Ok(())
}
