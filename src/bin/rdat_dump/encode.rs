use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dxil_rdat::{RdatData, encode_with_settings};
use indoc::indoc;
use log::info;
use std::fs;
use std::path::PathBuf;

use crate::{read_input, settings_from_matches};

pub fn command() -> Command {
    Command::new("encode")
        .about("Build an RDAT chunk from its JSON description")
        .long_about(indoc!(r#"
            Build an RDAT chunk from its JSON description.

            The JSON layout is the one printed by `rdat_dump dump`. The output is the bare
            chunk data, ready to be stored as the RDAT chunk of a shader container.
        "#))
        .arg(
            Arg::new("JSON")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("JSON description of the chunk."),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .required(true)
                .value_name("OUT")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Where to write the encoded chunk."),
        )
        .arg(
            Arg::new("no-dedup")
                .long("no-dedup")
                .action(ArgAction::SetTrue)
                .help("Do not deduplicate interned strings and index arrays (the output will not match the compiler's layout)."),
        )
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    let json_path = matches
        .get_one::<PathBuf>("JSON")
        .context("JSON is a required argument")?;
    let output = matches
        .get_one::<PathBuf>("output")
        .context("--output is a required argument")?;

    let json = read_input(json_path)?;
    let rdat: RdatData = serde_json::from_slice(&json)
        .with_context(|| format!("`{}` is not a valid RDAT description", json_path.display()))?;

    let settings = settings_from_matches(matches).deduplicate(!matches.get_flag("no-dedup"));
    let bytes = encode_with_settings(&rdat, settings).context("Failed to encode RDAT chunk")?;

    fs::write(output, &bytes)
        .with_context(|| format!("Failed to write `{}`", output.display()))?;
    info!("wrote {} bytes to `{}`", bytes.len(), output.display());
    Ok(())
}
