// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Command-line front-end for the accessibility store: turns row-major
//! input binaries into a Block Store, and runs filter queries against one.

use accessibility_store::config::StoreOptions;
use accessibility_store::preprocess::{self, RowMajorInputs};
use accessibility_store::query::{self, QueryRequest};
use accessibility_store::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "accessibility-store", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Worker threads for preprocessing/querying (0 = hardware concurrency).
    #[arg(long, global = true, default_value_t = 0)]
    worker_threads: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Build a Block Store from a directory of row-major input binaries.
    Preprocess {
        /// Directory containing `origin_<P>p.bin`, `destination_<P>p.bin`,
        /// and `accessibility_<P>p.bin`.
        #[arg(long)]
        input_dir: PathBuf,

        /// The `<P>` fraction encoded in the input file names, e.g. `0.01`
        /// for `origin_1p.bin`.
        #[arg(long)]
        percent: f64,

        /// Where the Block Store is written. Overwritten if it exists.
        #[arg(long)]
        output_dir: PathBuf,

        /// Number of origin attribute columns.
        #[arg(long, default_value_t = accessibility_store::config::DEFAULT_ORIGIN_ATTRS)]
        origin_attrs: u32,

        /// Number of destination attribute columns.
        #[arg(long, default_value_t = accessibility_store::config::DEFAULT_DEST_ATTRS)]
        dest_attrs: u32,
    },

    /// Run a filter query against a Block Store.
    Query {
        /// Root of the Block Store to query.
        #[arg(long)]
        store_dir: PathBuf,

        /// Required origin attributes, e.g. `attr1,attr42` or `1,42`.
        #[arg(long, value_delimiter = ',')]
        origin_attrs: Vec<String>,

        /// Required destination attributes, e.g. `attr1,attr42` or `1,42`.
        #[arg(long, value_delimiter = ',')]
        dest_attrs: Vec<String>,

        /// Where the flat `AccessibilityRecord` result is written.
        #[arg(long)]
        result_path: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(
        "ACCESSIBILITY_STORE_LOG",
        "info",
    ))
    .init();

    let args = Args::parse();
    let options = StoreOptions::new().worker_threads(args.worker_threads);

    match args.command {
        Command::Preprocess {
            input_dir,
            percent,
            output_dir,
            origin_attrs,
            dest_attrs,
        } => run_preprocess(&input_dir, percent, &output_dir, origin_attrs, dest_attrs, &options),
        Command::Query {
            store_dir,
            origin_attrs,
            dest_attrs,
            result_path,
        } => run_query(&store_dir, &origin_attrs, &dest_attrs, &result_path, &options),
    }
}

fn run_preprocess(
    input_dir: &std::path::Path,
    percent: f64,
    output_dir: &std::path::Path,
    origin_attrs: u32,
    dest_attrs: u32,
    options: &StoreOptions,
) -> Result<()> {
    if !(percent > 0.0 && percent <= 1.0) {
        return Err(Error::BadArgument(format!(
            "--percent must be in (0, 1], got {percent}"
        )));
    }

    let options = options.clone().origin_attrs(origin_attrs).dest_attrs(dest_attrs);
    let inputs = RowMajorInputs {
        origin_path: input_dir.join(input_file_name("origin", percent)),
        destination_path: input_dir.join(input_file_name("destination", percent)),
        accessibility_path: input_dir.join(input_file_name("accessibility", percent)),
    };

    preprocess::run(&inputs, output_dir, &options)
}

fn run_query(
    store_dir: &std::path::Path,
    origin_attrs: &[String],
    dest_attrs: &[String],
    result_path: &std::path::Path,
    options: &StoreOptions,
) -> Result<()> {
    let request = QueryRequest {
        store_dir: store_dir.to_path_buf(),
        origin_attrs: parse_attr_list(origin_attrs)?,
        dest_attrs: parse_attr_list(dest_attrs)?,
        result_path: result_path.to_path_buf(),
    };

    query::run(&request, options)
}

/// Parses a comma-separated attribute list into 0-based column indices.
/// Accepts either bare integers (`1,42`) or `attrN` tokens (`attr1,attr42`),
/// matching the two forms used in the scenario fixtures.
fn parse_attr_list(tokens: &[String]) -> Result<Vec<u32>> {
    tokens
        .iter()
        .map(|token| {
            let digits = token.strip_prefix("attr").unwrap_or(token);
            digits
                .parse::<u32>()
                .map_err(|_| Error::BadArgument(format!("not a valid attribute: {token:?}")))
        })
        .collect()
}

fn input_file_name(prefix: &str, percent: f64) -> String {
    let pct = (percent * 100.0).round() as i64;
    format!("{prefix}_{pct}p.bin")
}
