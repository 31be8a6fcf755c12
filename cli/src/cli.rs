use std::path::PathBuf;
use std::time::Duration;

use clap::{value_parser, Arg, ArgAction, Command};

/// A single "load this file" step, already reduced from the raw
/// `-l`/positional interleaving on the command line. `reset_cursor` is
/// `Some` when a `-l` appeared between this file and the previous one;
/// otherwise the loader keeps threading the cursor left over from
/// whatever was loaded before it.
pub struct LoadStep {
    pub path: PathBuf,
    pub reset_cursor: Option<u32>,
}

pub struct Args {
    pub load_plan: Vec<LoadStep>,
    pub debug: bool,
    pub delay: Duration,
}

fn command() -> Command {
    Command::new("nonel")
        .about("Run a noneleatic program image")
        .arg(
            Arg::new("location")
                .short('l')
                .value_name("LOCATION")
                .action(ArgAction::Append)
                .value_parser(value_parser!(u32))
                .help("set the memory cursor before loading the next file; may repeat"),
        )
        .arg(
            Arg::new("delay")
                .short('d')
                .value_name("SECONDS")
                .value_parser(value_parser!(f64))
                .help("per-step sleep in seconds (fractional values allowed)"),
        )
        .arg(
            Arg::new("debug")
                .short('g')
                .action(ArgAction::SetTrue)
                .help("render a hex dump of memory alongside the screen"),
        )
        .arg(
            Arg::new("files")
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .help("input files, concatenated into memory in the order given"),
        )
}

pub fn usage() -> String {
    command().render_usage().to_string()
}

fn interleave_load_plan(matches: &clap::ArgMatches) -> Vec<LoadStep> {
    let mut locations: Vec<(usize, u32)> = matches
        .indices_of("location")
        .into_iter()
        .flatten()
        .zip(matches.get_many::<u32>("location").into_iter().flatten().copied())
        .collect();
    locations.sort_by_key(|&(idx, _)| idx);

    let files: Vec<(usize, PathBuf)> = matches
        .indices_of("files")
        .into_iter()
        .flatten()
        .zip(matches.get_many::<PathBuf>("files").into_iter().flatten().cloned())
        .collect();

    // Every `-l` between the previous file and this one collapses to the
    // last one seen (an earlier `-l` immediately overridden by a later one
    // before any file consumes it never takes effect) and resets the
    // cursor the loader was otherwise threading through from file to file.
    let mut loc_iter = locations.into_iter().peekable();
    let mut load_plan = Vec::with_capacity(files.len());
    for (idx, path) in files {
        let mut reset_cursor = None;
        while let Some(&(loc_idx, loc_val)) = loc_iter.peek() {
            if loc_idx < idx {
                reset_cursor = Some(loc_val);
                loc_iter.next();
            } else {
                break;
            }
        }
        load_plan.push(LoadStep { path, reset_cursor });
    }
    load_plan
}

fn resolve_delay(matches: &clap::ArgMatches, debug: bool) -> Duration {
    match matches.get_one::<f64>("delay") {
        Some(&secs) => Duration::from_secs_f64(secs.max(0.0)),
        None if debug => nonel::definitions::debug::DEFAULT_WAIT,
        None => Duration::ZERO,
    }
}

impl Args {
    /// Parses `std::env::args_os()`. `-l` and positional files are
    /// interleaved by their original position on the command line: each
    /// `-l` resets the running cursor for every file that follows it,
    /// until the next `-l`. Files before the first `-l` start at cursor 0.
    pub fn parse() -> Result<Args, clap::Error> {
        let matches = command().try_get_matches()?;
        let load_plan = interleave_load_plan(&matches);
        let debug = matches.get_flag("debug");
        let delay = resolve_delay(&matches, debug);
        Ok(Args {
            load_plan,
            debug,
            delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let matches = command().try_get_matches_from(args).unwrap();
        let load_plan = interleave_load_plan(&matches);
        let debug = matches.get_flag("debug");
        let delay = resolve_delay(&matches, debug);
        Args { load_plan, debug, delay }
    }

    #[test]
    fn files_before_any_location_flag_carry_no_reset() {
        let args = parse(&["nonel", "a.img", "b.img"]);
        assert_eq!(args.load_plan[0].reset_cursor, None);
        assert_eq!(args.load_plan[1].reset_cursor, None);
    }

    #[test]
    fn a_location_flag_resets_the_cursor_only_for_the_file_right_after_it() {
        let args = parse(&["nonel", "a.img", "-l", "4096", "b.img", "c.img"]);
        assert_eq!(args.load_plan[0].reset_cursor, None);
        assert_eq!(args.load_plan[1].reset_cursor, Some(4096));
        assert_eq!(args.load_plan[2].reset_cursor, None);
    }

    #[test]
    fn repeated_location_flags_each_apply_to_the_following_file() {
        let args = parse(&["nonel", "-l", "10", "a.img", "-l", "20", "b.img"]);
        assert_eq!(args.load_plan[0].reset_cursor, Some(10));
        assert_eq!(args.load_plan[1].reset_cursor, Some(20));
    }

    #[test]
    fn debug_without_explicit_delay_defaults_to_two_seconds() {
        let args = parse(&["nonel", "-g", "a.img"]);
        assert_eq!(args.delay, nonel::definitions::debug::DEFAULT_WAIT);
    }

    #[test]
    fn headless_without_explicit_delay_runs_flat_out() {
        let args = parse(&["nonel", "a.img"]);
        assert_eq!(args.delay, Duration::ZERO);
    }

    #[test]
    fn explicit_delay_overrides_the_debug_default() {
        let args = parse(&["nonel", "-g", "-d", "0.5", "a.img"]);
        assert_eq!(args.delay, Duration::from_secs_f64(0.5));
    }
}
