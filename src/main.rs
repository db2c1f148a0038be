//! Implements the command line front end of the patcher.

use std::{num::NonZeroUsize, process::ExitCode};

use clap::Parser;
use ctxpatch::{Input, Output, PatchReport, Patcher, Profile, Result, Rule, Survey};
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

/// The exit code for a run that finished without changing a single byte.
const NO_CHANGES_EXIT_CODE: u8 = 3;

/// Rewrites platform-detection strings inside a packaged binary.
///
/// Every occurrence of the context marker opens a search window, and within
/// each window the first hit of every rule pattern is overwritten with a
/// same-length replacement. Without `--marker` or `--rule` the built-in WSL
/// detection profile is applied.
#[derive(Debug, Parser)]
#[command(version, after_help = EXIT_CODE_HELP)]
struct Args {
    /// The file to patch, or `-` to read from standard input.
    input: String,

    /// The file to write, or `-` to write to standard output.
    ///
    /// An existing file is overwritten. The output is written even when no
    /// replacement was made.
    output: String,

    /// The context marker that opens a search window.
    #[arg(long)]
    marker: Option<String>,

    /// The size of the search window opened at each marker occurrence.
    #[arg(long, value_name = "BYTES")]
    window_size: Option<NonZeroUsize>,

    /// A replacement rule, with pattern and replacement of equal length.
    ///
    /// May be given multiple times; within a window the rules apply in the
    /// order they were given.
    #[arg(long = "rule", value_name = "PATTERN=REPLACEMENT", value_parser = Rule::from_spec)]
    rules: Vec<Rule>,
}

const EXIT_CODE_HELP: &str = "Exit codes:
  0  at least one replacement was made
  1  the run failed
  2  the command line could not be parsed
  3  the run finished without making any replacement";

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(&args) {
        Ok(report) if report.is_unchanged() => {
            warn!("no replacement was made, the output is identical to the input");
            ExitCode::from(NO_CHANGES_EXIT_CODE)
        }
        Ok(report) => {
            let summary = format!(
                "patched {} occurrence(s) across {} marker window(s)",
                report.change_count(),
                report.windows_scanned()
            );
            // Keep standard output clean when it carries the patched bytes.
            if Output::from_arg(&args.output).is_stdout() {
                debug!("{summary}");
            } else {
                println!("{summary}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Assembles the patcher from the arguments and runs it over the input.
fn run(args: &Args) -> Result<PatchReport> {
    let profile = Profile::wsl_detection();

    let marker = match &args.marker {
        Some(marker) => marker.clone().into_bytes(),
        None => profile.marker().to_vec(),
    };
    let window_size = args.window_size.unwrap_or_else(|| profile.window_size());
    let rules = if args.rules.is_empty() {
        debug!("no rules given, using the built-in {} profile", profile.name());
        profile.rules()?
    } else {
        args.rules.clone()
    };

    let patcher = Patcher::new(marker, window_size, rules)?;
    let input = Input::from_arg(&args.input);
    let output = Output::from_arg(&args.output);

    let report = patcher.patch_file(&input, &output)?;
    if let Some(survey) = report.survey() {
        explain_no_changes(&patcher, survey);
    }

    Ok(report)
}

/// Reports why a finished run changed nothing.
fn explain_no_changes(patcher: &Patcher, survey: &Survey) {
    if survey.marker_count() == 0 {
        warn!(
            "context marker `{}` does not occur in the input",
            patcher.marker().escape_ascii()
        );
    } else {
        warn!(
            "context marker `{}` occurs {} time(s), but no rule pattern matched within {} bytes of any occurrence",
            patcher.marker().escape_ascii(),
            survey.marker_count(),
            patcher.window_size()
        );
    }

    for (rule, count) in patcher.rules().zip(survey.rule_pattern_counts()) {
        if *count == 0 {
            warn!(
                "rule pattern `{}` does not occur anywhere in the input",
                rule.pattern().escape_ascii()
            );
        } else {
            warn!(
                "rule pattern `{}` occurs {} time(s), none within reach of a marker",
                rule.pattern().escape_ascii(),
                count
            );
        }
    }
}
