use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dxil_rdat::RdatSettings;
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::fs;
use std::path::Path;
use std::process::exit;

mod dump;
mod encode;
mod roundtrip;

fn cli() -> Command {
    Command::new("rdat_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect, verify and build RDAT (runtime data) chunks of DXIL shaders")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Sets debug prints level for the application, -v for info, -vv for debug, -vvv for trace"),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Treat unknown parts and subobject types as errors instead of warnings."),
        )
        .subcommand(dump::command())
        .subcommand(roundtrip::command())
        .subcommand(encode::command())
}

fn init_logging(matches: &ArgMatches) {
    let level = match matches.get_count("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logging: {e}");
    }
}

pub(crate) fn settings_from_matches(matches: &ArgMatches) -> RdatSettings {
    RdatSettings::new().strict(matches.get_flag("strict"))
}

/// `--offset` argument shared by the subcommands that read an RDAT chunk.
pub(crate) fn offset_arg() -> Arg {
    Arg::new("offset")
        .long("offset")
        .value_name("BYTES")
        .value_parser(clap::value_parser!(u32))
        .default_value("0")
        .help("Offset of the RDAT chunk data inside INPUT (as reported by the container parser).")
}

pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read `{}`", path.display()))
}

fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("dump", sub)) => dump::run(sub),
        Some(("roundtrip", sub)) => roundtrip::run(sub),
        Some(("encode", sub)) => encode::run(sub),
        _ => bail!("a subcommand is required, see `rdat_dump --help`"),
    }
}

fn main() {
    let matches = cli().get_matches();

    if let Some((_, sub)) = matches.subcommand() {
        init_logging(sub);
    }

    if let Err(e) = run(&matches) {
        eprintln!("{e:?}");
        exit(1);
    }
}
