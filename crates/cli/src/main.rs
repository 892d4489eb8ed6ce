//! `oev` - offline edit log viewer.
//!
//! ```text
//! oev -i edits -o edits.json                # binary -> text
//! oev -i edits.json -o edits -p binary      # text -> binary
//! oev -i edits -o stats.txt -p stats        # per-opcode counts
//! ```
//!
//! Exits 0 on success and -1 on failure.

mod commands;
mod parse;

use std::ffi::OsString;
use std::io::{self, Write};
use std::process;

use editlog_executor::OfflineEditsViewer;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use parse::{matches_to_action, CliAction};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let code = run(std::env::args_os(), &mut io::stdout(), &mut io::stderr());
    process::exit(code);
}

/// Parse `args`, run the conversion and return the exit status.
fn run<I, T>(args: I, out: &mut impl Write, err: &mut impl Write) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut cli = build_cli();
    let action = cli
        .clone()
        .try_get_matches_from(args)
        .map_err(|e| e.to_string())
        .and_then(|matches| matches_to_action(&matches));

    let request = match action {
        Ok(CliAction::Help) => {
            let _ = write!(out, "{}", cli.render_help());
            return 0;
        }
        Ok(CliAction::Convert(request)) => request,
        Err(message) => {
            let _ = writeln!(err, "Error parsing command-line options: {}", message.trim_end());
            let _ = write!(err, "{}", cli.render_help());
            return -1;
        }
    };

    tracing::debug!(?request, "Parsed command line");
    if request.flags.print_to_screen {
        let _ = writeln!(out, "input  [{}]", request.input.display());
        let _ = writeln!(out, "output [{}]", request.output.display());
    }

    let outcome = OfflineEditsViewer::new().go(
        &request.input,
        &request.output,
        request.processor,
        &request.flags,
    );
    if let Some(e) = outcome.error() {
        let _ = writeln!(err, "Encountered exception. Exiting: {}", e);
    }
    outcome.code()
}
