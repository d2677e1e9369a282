// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::SortKey;
use clap::{Arg, ArgAction, Command, builder::PossibleValuesParser, command};

fn view_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("supplier").long("supplier").help("Supplier contains (case-insensitive)"))
        .arg(Arg::new("product").long("product").help("Product contains (case-insensitive)"))
        .arg(
            Arg::new("description")
                .long("description")
                .help("Description contains (case-insensitive)"),
        )
        .arg(
            Arg::new("sort")
                .long("sort")
                .value_parser(PossibleValuesParser::new(SortKey::NAMES))
                .help("Sort order applied after filtering"),
        )
}

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl"),
    )
    .arg(Arg::new("jsonl").long("jsonl").action(ArgAction::SetTrue))
}

// Removal keys match exactly, so every field is given (possibly as "").
fn key_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .required_unless_present("id")
        .help("Exact value; pass \"\" for an empty field")
}

pub fn build_cli() -> Command {
    command!()
        .about("Record supplier quotes, compare them and chart the totals")
        .subcommand(Command::new("init").about("Create the data directory and show paths"))
        .subcommand(
            Command::new("quote")
                .about("Add, list and remove quotes")
                .subcommand(
                    Command::new("add")
                        .about("Record a quote; the total is computed")
                        .arg(Arg::new("supplier").long("supplier").required(true))
                        .arg(Arg::new("product").long("product").default_value(""))
                        .arg(Arg::new("description").long("description").default_value(""))
                        .arg(
                            Arg::new("price")
                                .long("price")
                                .required(true)
                                .allow_hyphen_values(true)
                                .help("Unit price"),
                        )
                        .arg(
                            Arg::new("quantity")
                                .long("quantity")
                                .required(true)
                                .allow_hyphen_values(true),
                        )
                        .arg(
                            Arg::new("tax")
                                .long("tax")
                                .default_value("0")
                                .allow_hyphen_values(true)
                                .help("Tax rate in percent"),
                        )
                        .arg(
                            Arg::new("discount")
                                .long("discount")
                                .default_value("0")
                                .allow_hyphen_values(true)
                                .help("Discount rate in percent"),
                        ),
                )
                .subcommand(json_args(view_args(
                    Command::new("list").about("Show quotes, optionally filtered and sorted"),
                )))
                .subcommand(
                    Command::new("rm")
                        .about("Remove quotes by id, or the first exact match of supplier, product and description")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .value_parser(clap::value_parser!(u64))
                                .action(ArgAction::Append)
                                .conflicts_with_all(["supplier", "product", "description"]),
                        )
                        .arg(key_arg("supplier"))
                        .arg(key_arg("product"))
                        .arg(key_arg("description")),
                )
                .subcommand(json_args(
                    Command::new("suggest").about("Known suppliers, products and descriptions"),
                )),
        )
        .subcommand(
            Command::new("chart")
                .about("Bar charts by supplier")
                .subcommand(Command::new("show").about("Draw the charts in the terminal"))
                .subcommand(
                    Command::new("export").about("Write one SVG per chart to the output dir"),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Comparison PDFs")
                .subcommand(view_args(
                    Command::new("pdf")
                        .about("Compare suppliers per product in a PDF")
                        .arg(Arg::new("out").long("out").help("Target file")),
                ))
                .subcommand(Command::new("list").about("List saved PDFs"))
                .subcommand(
                    Command::new("rm")
                        .about("Delete a saved PDF")
                        .arg(Arg::new("name").required(true)),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Start over, archive and reopen quote sets")
                .subcommand(
                    Command::new("new").about("Start an empty quote set").arg(
                        Arg::new("archive")
                            .long("archive")
                            .action(ArgAction::SetTrue)
                            .help("Archive the current quotes first"),
                    ),
                )
                .subcommand(Command::new("archives").about("List archived quote sets"))
                .subcommand(
                    Command::new("open")
                        .about("Replace the current quotes with an archived set")
                        .arg(Arg::new("file").required(true)),
                )
                .subcommand(Command::new("save").about("Write the quotes file now")),
        )
        .subcommand(view_args(
            Command::new("export")
                .about("Export quotes")
                .arg(Arg::new("format").long("format").default_value("csv"))
                .arg(Arg::new("out").long("out").required(true)),
        ))
        .subcommand(
            Command::new("config")
                .about("Show or change settings")
                .subcommand(json_args(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("currency_symbol").long("currency-symbol"))
                        .arg(
                            Arg::new("require_product")
                                .long("require-product")
                                .value_parser(clap::value_parser!(bool)),
                        )
                        .arg(
                            Arg::new("max_rate")
                                .long("max-rate")
                                .help("Ceiling for tax and discount rates, or 'none'"),
                        )
                        .arg(
                            Arg::new("output_dir")
                                .long("output-dir")
                                .help(
                                    "Directory for reports, charts and archives, or 'none'. \
                                     QUOTEBOOK_OUTPUT takes precedence",
                                ),
                        ),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored quotes for inconsistencies"))
}
