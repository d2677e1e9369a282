// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::env;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use quotebook::{cli, commands, config::Paths, workspace::Workspace};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let log_json = env::var("QUOTEBOOK_LOG_JSON")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let mut ws = Workspace::open(Paths::discover()?)?;

    let outcome = match matches.subcommand() {
        Some(("init", _)) => {
            println!("Quotes file at {}", ws.paths.quotes_file().display());
            println!("Reports, charts and archives under {}", ws.paths.output_dir.display());
            Ok(())
        }
        Some(("quote", sub)) => commands::quotes::handle(&mut ws, sub),
        Some(("chart", sub)) => commands::charts::handle(&ws, sub),
        Some(("report", sub)) => commands::reports::handle(&ws, sub),
        Some(("budget", sub)) => commands::budgets::handle(&mut ws, sub),
        Some(("export", sub)) => commands::exporter::handle(&ws, sub),
        Some(("config", sub)) => commands::settings::handle(&mut ws, sub),
        Some(("doctor", _)) => commands::doctor::handle(&ws),
        _ => {
            cli::build_cli().print_help()?;
            println!();
            Ok(())
        }
    };

    // Flush even when the command failed; an unsaved add is retried here.
    if let Err(err) = ws.close() {
        eprintln!("Error: {:#}", err);
    }
    outcome
}
