use anyhow::{Context, Result, bail};
use clap::{Arg, ArgMatches, Command};
use dxil_rdat::{decode_with_settings, encode};
use indoc::indoc;
use log::info;
use std::path::PathBuf;

use crate::{offset_arg, read_input, settings_from_matches};

pub fn command() -> Command {
    Command::new("roundtrip")
        .about("Check that decoding and re-encoding an RDAT chunk reproduces it byte for byte")
        .long_about(indoc!(r#"
            Check that decoding and re-encoding an RDAT chunk reproduces it byte for byte.

            The chunk is decoded and encoded again with the default (deduplicating) settings,
            which is how the compiler lays chunks out. Everything from `--offset` to the end of
            INPUT is compared, so INPUT should end where the chunk ends.
        "#))
        .arg(
            Arg::new("INPUT")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("File containing the RDAT chunk."),
        )
        .arg(offset_arg())
}

/// Offset of the first byte where `a` and `b` differ, counting a length mismatch as a
/// difference at the end of the shorter one.
fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}

pub fn run(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<PathBuf>("INPUT")
        .context("INPUT is a required argument")?;
    let offset = matches.get_one::<u32>("offset").copied().unwrap_or(0);

    let blob = read_input(input)?;
    let region = blob
        .get(offset as usize..)
        .with_context(|| format!("Offset {offset} is past the end of `{}`", input.display()))?;

    let rdat = decode_with_settings(region, settings_from_matches(matches))
        .with_context(|| format!("Failed to decode RDAT chunk of `{}`", input.display()))?;
    let encoded = encode(&rdat).context("Failed to re-encode RDAT chunk")?;
    info!("re-encoded {} bytes (input has {})", encoded.len(), region.len());

    match first_difference(region, &encoded) {
        None => {
            println!("identical ({} bytes)", encoded.len());
            Ok(())
        }
        Some(at) => {
            println!("differs at offset {at}");
            bail!(
                "re-encoded chunk ({} bytes) differs from the input ({} bytes) at offset {}",
                encoded.len(),
                region.len(),
                at
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_difference() {
        assert_eq!(first_difference(b"abc", b"abc"), None);
        assert_eq!(first_difference(b"abc", b"abd"), Some(2));
        assert_eq!(first_difference(b"abc", b"abcd"), Some(3));
        assert_eq!(first_difference(b"", b""), None);
    }
}
