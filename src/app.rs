//! Application flow behind the `dupescan` binary.
//!
//! Loads the layered configuration, applies command-line overrides, runs
//! the scan, renders the result and, with `--delete`, asks once per group
//! before handing the group to [`delete_group`].

use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bytesize::ByteSize;

use crate::actions::{delete_group, DeleteConfig};
use crate::cli::{Cli, Commands, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig, ScanResult};
use crate::error::ExitCode;
use crate::logging;
use crate::output::{CsvOutput, JsonOutput, TextOutput};
use crate::progress::Progress;
use crate::scanner::FileSystem;
use crate::signal::{self, ShutdownHandler};

/// Run the CLI against the process's stdin and stdout.
///
/// # Errors
///
/// Returns an error for invalid configuration, an invalid root directory,
/// an interrupted scan, or a failure writing output. Use
/// [`ExitCode::from_error`] to map it to a process exit code.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let color = !cli.no_color && io::stdout().is_terminal();
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_app_with_io(cli, color, &mut stdin.lock(), &mut stdout.lock())
}

/// Run the CLI with explicit input and output streams.
///
/// Confirmation answers are read from `input`; results and prompts go to
/// `output`.
///
/// # Errors
///
/// Same as [`run_app`].
pub fn run_app_with_io<R: BufRead, W: Write>(
    cli: Cli,
    color: bool,
    input: &mut R,
    output: &mut W,
) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Config => {
            output.write_all(config.to_toml()?.as_bytes())?;
            Ok(ExitCode::Success)
        }
        Commands::Scan(args) => {
            let config = apply_overrides(config, &args);
            run_scan(&args, &config, cli.quiet, color, input, output)
        }
    }
}

/// Command-line flags take precedence over file and environment settings.
#[must_use]
pub fn apply_overrides(mut config: Config, args: &ScanArgs) -> Config {
    if let Some(recursive) = args.recursive_override() {
        config.recursive = recursive;
    }
    if let Some(min_size) = args.min_size {
        config.min_size = min_size;
    }
    if args.hidden {
        config.skip_hidden = false;
    }
    if let Some(threads) = args.io_threads {
        config.io_threads = usize::from(threads);
    }
    if args.trash {
        config.trash = true;
    }
    config
}

fn run_scan<R: BufRead, W: Write>(
    args: &ScanArgs,
    config: &Config,
    quiet: bool,
    color: bool,
    input: &mut R,
    output: &mut W,
) -> Result<ExitCode> {
    // Prompts would corrupt machine-readable output
    if args.delete && !args.yes && args.output != OutputFormat::Text {
        bail!("--delete with --output {} requires --yes", args.output);
    }

    let shutdown = signal::install_handler()?;

    let mut finder_config = FinderConfig::default()
        .with_io_threads(config.io_threads)
        .with_walker_config(config.walker_config())
        .with_shutdown_flag(shutdown.get_flag());
    if !quiet && args.output == OutputFormat::Text && io::stderr().is_terminal() {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }

    log::debug!("Effective configuration: {:?}", config);
    let finder = DuplicateFinder::new(finder_config);
    let result = finder.find_duplicates(&args.path)?;

    render(&result, args.output, color, output)?;

    if !args.delete || !result.has_duplicates() {
        return Ok(ExitCode::Success);
    }

    let session = DeleteSession {
        fs: finder.filesystem().as_ref(),
        config: config.delete_config(),
        assume_yes: args.yes,
        report_to_output: args.output == OutputFormat::Text,
        shutdown: &shutdown,
    };
    session.run(&result, input, output)
}

fn render<W: Write>(
    result: &ScanResult,
    format: OutputFormat,
    color: bool,
    output: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Text => TextOutput::new(result).with_color(color).write_to(output)?,
        OutputFormat::Json => JsonOutput::new(result, ExitCode::Success).write_to(output, true)?,
        OutputFormat::Csv => CsvOutput::new(&result.groups).write_to(&mut *output)?,
    }
    output.flush()?;
    Ok(())
}

struct DeleteSession<'a> {
    fs: &'a dyn FileSystem,
    config: DeleteConfig,
    assume_yes: bool,
    report_to_output: bool,
    shutdown: &'a ShutdownHandler,
}

impl DeleteSession<'_> {
    fn run<R: BufRead, W: Write>(
        &self,
        result: &ScanResult,
        input: &mut R,
        output: &mut W,
    ) -> Result<ExitCode> {
        let mut deleted = 0usize;
        let mut failed = 0usize;
        let mut freed = 0u64;

        for (idx, group) in result.groups.iter().enumerate() {
            if self.shutdown.is_shutdown_requested() {
                log::info!("Deletion interrupted after {} group(s)", idx);
                return Ok(ExitCode::Interrupted);
            }

            let number = idx + 1;
            let confirmed = self.assume_yes
                || confirm_group(input, output, group.duplicate_count(), number)
                    .context("Failed to read confirmation")?;
            if !confirmed {
                log::info!("Group {number} left untouched");
                continue;
            }

            let report = delete_group(self.fs, group, &self.config);
            deleted += report.success_count();
            failed += report.failure_count();
            freed += report.bytes_freed;

            if self.report_to_output {
                writeln!(output, "Group {number}: {}", report.summary())?;
                for failure in &report.failures {
                    writeln!(output, "  {failure}")?;
                }
            }
        }

        let totals = format!(
            "Deleted {deleted} file(s), {failed} failure(s), freed {}",
            ByteSize::b(freed)
        );
        if self.report_to_output {
            writeln!(output, "{totals}")?;
        } else {
            log::info!("{totals}");
        }

        Ok(ExitCode::Success)
    }
}

/// Ask whether to delete the duplicates of one group.
///
/// Writes `Delete N duplicate(s) from group K? [y/N] ` and reads one line.
/// Only `y` or `yes` (any case) confirm; end of input declines.
///
/// # Errors
///
/// Returns any I/O error from reading or writing.
pub fn confirm_group<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    duplicates: usize,
    group_number: usize,
) -> io::Result<bool> {
    write!(
        output,
        "Delete {duplicates} duplicate(s) from group {group_number}? [y/N] "
    )?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(output)?;
        return Ok(false);
    }

    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
