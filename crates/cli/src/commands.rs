//! Clap command definition.
//!
//! Help is handled by hand so that `-h` can print usage and exit 0 while a
//! parse error prints the same usage after an error line.

use clap::{Arg, ArgAction, Command};

const PROCESSORS_HELP: &str = "\
Processors:
  xml     Binary edit log to structured text (default)
  binary  Structured text back to a binary edit log
  stats   Binary edit log to per-opcode counts

The input format is detected from the file content, never its name.";

/// Build the `oev` command.
pub fn build_cli() -> Command {
    Command::new("oev")
        .about("Offline edit log viewer: converts edit logs between binary and text")
        .disable_help_flag(true)
        .disable_version_flag(true)
        .after_help(PROCESSORS_HELP)
        .arg(
            Arg::new("input")
                .short('i')
                .long("inputFile")
                .value_name("FILE")
                .help("Edit log to process"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("outputFile")
                .value_name("FILE")
                .help("Name of the output file; replaced only if the run succeeds"),
        )
        .arg(
            Arg::new("processor")
                .short('p')
                .long("processor")
                .value_name("NAME")
                .help("xml, binary or stats (default: xml)"),
        )
        .arg(
            Arg::new("recover")
                .short('r')
                .long("recover")
                .help("Stop at the last good record instead of failing on a damaged tail")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("fix-txids")
                .short('f')
                .long("fix-txids")
                .help("Renumber transaction ids to remove gaps")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print file names and echo records to the screen")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Read defaults from a TOML config file (e.g. oev.toml)"),
        )
        .arg(
            Arg::new("help")
                .short('h')
                .long("help")
                .help("Display usage information and exit")
                .action(ArgAction::SetTrue),
        )
}
