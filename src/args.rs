//! Command-line argument parsing.
//!
//! ```text
//! pilight [--debug] [--config <dir>] [--log <file>] [--at "YYYY-MM-DD HH:MM:SS"]
//! pilight sun [--config <dir>] [--at ...]
//! pilight --help | --version
//! ```

/// What the user asked for.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        log_file: Option<String>,
        /// Pretend the wall clock started at this local time
        start_at: Option<String>,
    },
    /// Print today's daylight window and exit
    Sun {
        config_dir: Option<String>,
        start_at: Option<String>,
    },
    ShowHelp,
    ShowVersion,
    /// Unknown or incomplete arguments
    ShowHelpDueToError,
}

pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut config_dir: Option<String> = None;
        let mut log_file: Option<String> = None;
        let mut start_at: Option<String> = None;
        let mut command: Option<String> = None;
        let mut error = false;

        let mut args = args.into_iter().skip(1).map(|s| s.as_ref().to_string());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" | "-d" => debug_enabled = true,
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--config" | "-c" => match args.next() {
                    Some(dir) => config_dir = Some(dir),
                    None => error = true,
                },
                "--log" | "-l" => match args.next() {
                    Some(path) => log_file = Some(path),
                    None => error = true,
                },
                "--at" => match args.next() {
                    Some(at) => start_at = Some(at),
                    None => error = true,
                },
                _ if arg.starts_with('-') => {
                    log_warning!("Unknown argument: {arg}");
                    error = true;
                }
                _ if command.is_none() => command = Some(arg),
                _ => {
                    log_warning!("Unexpected argument: {arg}");
                    error = true;
                }
            }
        }

        let action = if display_help {
            CliAction::ShowHelp
        } else if display_version {
            CliAction::ShowVersion
        } else if error {
            CliAction::ShowHelpDueToError
        } else {
            match command.as_deref() {
                None => CliAction::Run {
                    debug_enabled,
                    config_dir,
                    log_file,
                    start_at,
                },
                Some("sun") => CliAction::Sun {
                    config_dir,
                    start_at,
                },
                Some(other) => {
                    log_warning!("Unknown command: {other}");
                    CliAction::ShowHelpDueToError
                }
            }
        };

        ParsedArgs { action }
    }

    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

pub fn display_version_info() {
    log_version!();
    log_pipe!();
    crate::logger::write_output(&format!("┗ {}\n", env!("CARGO_PKG_DESCRIPTION")));
}

pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("pilight [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-l, --log <file>       Write output to a file instead of stdout");
    log_indented!("    --at <datetime>    Start the clock at \"YYYY-MM-DD HH:MM:SS\"");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("sun                    Show today's sunrise and sunset, then exit");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_args() {
        let parsed = ParsedArgs::parse(vec!["pilight"]);
        assert_eq!(
            parsed.action,
            CliAction::Run {
                debug_enabled: false,
                config_dir: None,
                log_file: None,
                start_at: None,
            }
        );
    }

    #[test]
    fn test_parse_run_options() {
        let parsed = ParsedArgs::parse(vec![
            "pilight",
            "-d",
            "--config",
            "/etc/pilight",
            "--log",
            "/var/log/pilight.log",
            "--at",
            "2026-10-15 17:30:00",
        ]);
        assert_eq!(
            parsed.action,
            CliAction::Run {
                debug_enabled: true,
                config_dir: Some("/etc/pilight".to_string()),
                log_file: Some("/var/log/pilight.log".to_string()),
                start_at: Some("2026-10-15 17:30:00".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_sun_command() {
        let parsed = ParsedArgs::parse(vec!["pilight", "sun", "-c", "/tmp/cfg"]);
        assert_eq!(
            parsed.action,
            CliAction::Sun {
                config_dir: Some("/tmp/cfg".to_string()),
                start_at: None,
            }
        );
    }

    #[test]
    fn test_help_and_version_take_precedence() {
        assert_eq!(
            ParsedArgs::parse(vec!["pilight", "--bogus", "--help"]).action,
            CliAction::ShowHelp
        );
        assert_eq!(
            ParsedArgs::parse(vec!["pilight", "sun", "-V"]).action,
            CliAction::ShowVersion
        );
    }

    #[test]
    fn test_errors() {
        crate::logger::Log::set_enabled(false);
        assert_eq!(
            ParsedArgs::parse(vec!["pilight", "--bogus"]).action,
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            ParsedArgs::parse(vec!["pilight", "--config"]).action,
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            ParsedArgs::parse(vec!["pilight", "moon"]).action,
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            ParsedArgs::parse(vec!["pilight", "sun", "extra"]).action,
            CliAction::ShowHelpDueToError
        );
    }
}
