#![allow(clippy::print_stdout)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use shapeck_cli::args::{CliArgs, OutputFormat};
use shapeck_cli::reporter::Reporter;
use shapeck_cli::{config, driver, tracing_config};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DIAGNOSTICS: i32 = 1;

fn main() -> Result<()> {
    // Initialize tracing if SHAPECK_LOG or RUST_LOG is set.
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let file = config::load_declarations(&args.file)?;
    let policy = config::resolve_policy(&file.options, args.union_keys);
    let report = driver::run(&file, policy, &args.keys)?;

    let color = args.use_color(std::io::stdout().is_terminal());
    colored::control::set_override(color);
    let reporter = Reporter::new(color);
    match args.format {
        OutputFormat::Text => println!("{}", reporter.render(&report)),
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&reporter.render_json(&report))
                .context("failed to serialize report")?;
            println!("{rendered}");
        }
    }

    std::process::exit(if report.has_errors() {
        EXIT_DIAGNOSTICS
    } else {
        EXIT_SUCCESS
    });
}
