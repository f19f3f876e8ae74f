use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dxil_rdat::read_runtime_data_with_settings;
use indoc::indoc;
use std::path::PathBuf;

use crate::{offset_arg, read_input, settings_from_matches};

pub fn command() -> Command {
    Command::new("dump")
        .about("Decode an RDAT chunk and print it as JSON")
        .long_about(indoc!(r#"
            Decode an RDAT chunk and print it as JSON.

            INPUT is either a bare RDAT chunk, or a larger blob (such as a whole shader
            container) with `--offset` pointing at the RDAT chunk data inside it.
        "#))
        .arg(
            Arg::new("INPUT")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("File containing the RDAT chunk."),
        )
        .arg(offset_arg())
        .arg(
            Arg::new("jsonl")
                .long("jsonl")
                .action(ArgAction::SetTrue)
                .help("Print the decoded chunk on a single line instead of pretty-printing it."),
        )
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<PathBuf>("INPUT")
        .context("INPUT is a required argument")?;
    let offset = matches.get_one::<u32>("offset").copied().unwrap_or(0);

    let blob = read_input(input)?;
    let rdat = read_runtime_data_with_settings(&blob, Some(offset), settings_from_matches(matches))
        .with_context(|| format!("Failed to decode RDAT chunk of `{}`", input.display()))?
        .context("No RDAT chunk present")?;

    let json = if matches.get_flag("jsonl") {
        serde_json::to_string(&rdat)?
    } else {
        serde_json::to_string_pretty(&rdat)?
    };
    println!("{json}");
    Ok(())
}
