// SPDX-License-Identifier: CC0-1.0

//! callchain demo
//!
//! Runs a handful of small call patterns through a configured printer so
//! the output format can be inspected from a terminal.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;

use callchain::config::Config;
use callchain::{bind, debug_with, frame, Printer};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Command-line interface for the demo.
#[derive(Parser, Debug)]
#[command(name = "callchain-demo", about = "Print-style debugging with call chains", version)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Text placed between the location, chain entries and values
    #[arg(long)]
    separator: Option<String>,
    /// Render at most this many call-chain entries
    #[arg(long)]
    max_depth: Option<usize>,
    /// Write records to standard output instead of standard error
    #[arg(long)]
    stdout: bool,
    /// Log filter for the library's own diagnostics (e.g. "debug")
    #[arg(long)]
    log_level: Option<String>,
}

fn inner(printer: &Printer) {
    frame!();
    debug_with!(printer, "in inner");
}

fn outer(printer: &Printer) {
    frame!();
    inner(printer);
}

fn outer_lambda(printer: &Printer) {
    frame!();
    bind!(let inner_lambda = || {
        frame!();
        debug_with!(printer, "in inner_lambda");
    });
    inner_lambda();
}

fn outer_anonymous(printer: &Printer) {
    frame!();
    let anonymous = || {
        frame!();
        debug_with!(printer, "in an unbound closure");
    };
    anonymous();
}

#[track_caller]
fn debug_wrapper(printer: &Printer, label: &str) {
    frame!();
    debug_with!(printer.clone().caller_depth(2), "from wrapper", label);
}

fn inner_wrapper(printer: &Printer) {
    frame!();
    debug_wrapper(printer, "inner_wrapper");
}

fn report_for(printer: &Printer) {
    frame!();
    let Some(here) = callchain::frames::current() else { return };
    helper(printer, here);

    fn helper(printer: &Printer, frame: callchain::FrameRef) {
        frame!();
        debug_with!(printer.clone().frame(frame), "reported by helper");
    }
}

fn run(printer: &Printer) {
    debug_with!(printer, "hello", "from", "module scope");
    inner(printer);
    outer(printer);
    outer_lambda(printer);
    outer_anonymous(printer);
    inner_wrapper(printer);
    report_for(printer);

    // Past the outermost frame only the values remain
    debug_with!(printer.clone().caller_depth(3), "no location");

    let answer = debug_with!(printer, 20) + 22;
    debug_with!(printer, "answer", answer, ?Some("inline"));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(separator) = cli.separator {
        config.printer.separator = separator;
    }
    if let Some(depth) = cli.max_depth {
        config.printer.max_depth = Some(depth);
    }
    if cli.stdout {
        config.printer.stream = "stdout".to_string();
    }
    let level = cli.log_level.unwrap_or_else(|| config.logging.level.clone());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let printer = Printer::from_config(&config.printer)?;
    tracing::debug!(?printer, "running demo");
    run(&printer);
    Ok(())
}
