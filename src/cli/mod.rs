//! Command line parsing
//!
//! The `--set-<name>` options depend on the placeholders found in the
//! configuration, so parsing happens in two passes: a lenient pass that only
//! looks for `--config`, then the full parse once the configuration is loaded.

pub mod orchestration;

use std::ffi::OsString;

use clap::{Arg, ArgMatches, CommandFactory, FromArgMatches, Parser};

use crate::domain::OptionSet;

/// Prefix of the options that fill command placeholders
pub const OPTION_PREFIX: &str = "set-";

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "git-deploy",
    version,
    about = "Tag a release, push it and run the deploy commands on a remote"
)]
pub struct Args {
    /// Remote to deploy to; the configured default when omitted
    pub remote: Option<String>,

    /// Release to cut on production: major, minor, patch, rcmajor, rcminor or rc
    pub release: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    pub config: Option<String>,

    #[arg(long, help = "Preview what would happen without making changes")]
    pub dry_run: bool,

    #[arg(long, help = "Show configured remotes and exit")]
    pub list: bool,
}

/// Find the `--config` value without knowing the placeholder options yet
///
/// `--set-*` options are stripped first since clap stops at the first argument
/// it does not know.
pub fn config_path_hint<I, T>(argv: I) -> Option<String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::command()
        .ignore_errors(true)
        .try_get_matches_from(without_placeholder_options(argv))
        .ok()
        .and_then(|matches| matches.get_one::<String>("config").cloned())
}

fn without_placeholder_options<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut kept = Vec::new();
    let mut skip_value = false;
    for arg in argv {
        let arg: OsString = arg.into();
        if skip_value {
            skip_value = false;
            continue;
        }
        let option = arg
            .to_str()
            .and_then(|s| s.strip_prefix("--"))
            .and_then(|s| s.strip_prefix(OPTION_PREFIX));
        match option {
            // `--set-name value` carries its value in the next argument
            Some(rest) => skip_value = !rest.contains('='),
            None => kept.push(arg),
        }
    }
    kept
}

/// The full command with one `--set-<name>` option per placeholder name
pub fn command_with_options(names: &[String]) -> clap::Command {
    names.iter().fold(Args::command(), |cmd, name| {
        let id = format!("{}{}", OPTION_PREFIX, name);
        cmd.arg(
            Arg::new(id.clone())
                .long(id)
                .value_name("VALUE")
                .allow_hyphen_values(true)
                .help(format!("Value for the {{{}}} placeholder", name)),
        )
    })
}

/// Parse the arguments along with the placeholder options
///
/// # Returns
/// * `Ok((Args, OptionSet))` - Fixed arguments and the placeholder values given
/// * `Err(clap::Error)` - Invalid arguments, or `--help`/`--version` was asked
pub fn parse_with_options<I, T>(argv: I, names: &[String]) -> Result<(Args, OptionSet), clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command_with_options(names).try_get_matches_from(argv)?;
    let args = Args::from_arg_matches(&matches)?;
    Ok((args, collect_options(&matches, names)))
}

fn collect_options(matches: &ArgMatches, names: &[String]) -> OptionSet {
    names
        .iter()
        .filter_map(|name| {
            matches
                .get_one::<String>(&format!("{}{}", OPTION_PREFIX, name))
                .map(|value| (name.clone(), value.clone()))
        })
        .collect()
}
