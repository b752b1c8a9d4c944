//! Binary entry point: dispatch on the parsed command line.
//!
//! - `pilight`: run the daemon until SIGINT/SIGTERM/SIGHUP
//! - `pilight sun`: print today's daylight window
//! - `pilight --help` / `--version`

use pilight::args::{self, CliAction, ParsedArgs};
use pilight::constants::*;
use pilight::logger::Log;
use pilight::{Pilight, config, daemon, log_error_exit, time_source};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let result = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
            log_file,
            start_at,
        } => run_daemon(debug_enabled, config_dir, log_file, start_at),
        CliAction::Sun {
            config_dir,
            start_at,
        } => config::set_config_dir(config_dir)
            .and_then(|()| parse_start(start_at))
            .and_then(daemon::print_daylight),
    };

    if let Err(e) = result {
        log_error_exit!("{e:#}");
        std::process::exit(EXIT_FAILURE);
    }
}

fn run_daemon(
    debug_enabled: bool,
    config_dir: Option<String>,
    log_file: Option<String>,
    start_at: Option<String>,
) -> anyhow::Result<()> {
    Log::set_debug(debug_enabled);
    config::set_config_dir(config_dir)?;

    // Flushes the log file on the way out
    let _log_guard = match log_file {
        Some(path) => Some(Log::start_file_logging(path)?),
        None => None,
    };

    let mut pilight = Pilight::new(debug_enabled);
    if let Some(start) = parse_start(start_at)? {
        pilight = pilight.starting_at(start);
    }
    pilight.run()
}

fn parse_start(
    start_at: Option<String>,
) -> anyhow::Result<Option<chrono::DateTime<chrono::Local>>> {
    start_at
        .map(|s| time_source::parse_datetime(&s).map_err(|e| anyhow::anyhow!(e)))
        .transpose()
}
