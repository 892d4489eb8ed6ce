//! ArgMatches → CliAction conversion.
//!
//! Command-line flags override values from a config file; switches are
//! OR-ed with the file's settings.

use std::path::{Path, PathBuf};

use clap::ArgMatches;
use editlog_executor::{Flags, Processor, ViewerConfig};

/// What the command line asked for.
#[derive(Debug)]
pub enum CliAction {
    /// Print usage and exit successfully.
    Help,
    /// Run one conversion.
    Convert(ConvertRequest),
}

/// A fully resolved conversion.
#[derive(Debug)]
pub struct ConvertRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub processor: Processor,
    pub flags: Flags,
}

/// Convert parsed arguments into an action.
///
/// Errors are returned as messages for the usage report.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    if matches.get_flag("help") {
        return Ok(CliAction::Help);
    }

    let config = match matches.get_one::<String>("config") {
        Some(path) => ViewerConfig::from_file(Path::new(path)).map_err(|e| e.to_string())?,
        None => ViewerConfig::default(),
    };

    let input = matches
        .get_one::<String>("input")
        .ok_or("missing required option -i <input file>")?;
    let output = matches
        .get_one::<String>("output")
        .ok_or("missing required option -o <output file>")?;

    let processor = match matches.get_one::<String>("processor") {
        Some(name) => name.parse::<Processor>(),
        None => config.processor(),
    }
    .map_err(|e| e.to_string())?;

    let base = config.flags();
    let flags = Flags::default()
        .with_recovery(base.recovery || matches.get_flag("recover"))
        .with_fix_txids(base.fix_txids || matches.get_flag("fix-txids"))
        .with_print_to_screen(base.print_to_screen || matches.get_flag("verbose"));

    Ok(CliAction::Convert(ConvertRequest {
        input: PathBuf::from(input),
        output: PathBuf::from(output),
        processor,
        flags,
    }))
}
