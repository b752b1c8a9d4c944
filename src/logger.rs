//! Structured logging with box-drawing output.
//!
//! Every line pilight prints goes through this module so that the daemon's
//! output keeps one visual shape whether it is attached to a terminal,
//! running under systemd, or redirected to a file with `--log`.
//!
//! ## Conventions
//!
//! - **`log_block_start!`** opens a conceptual block (startup phases, a new
//!   trigger, a gating decision). It prints a spacer pipe `┃` and then
//!   `┣ message`.
//! - **`log_decorated!`** continues a block with `┣ message`.
//! - **`log_indented!`** prints nested details as `┃   message`.
//! - **`log_pipe!`** inserts a lone `┃` before a semantic message that starts
//!   its own block.
//! - **`log_version!`** / **`log_end!`** frame the whole session.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_critical!`** carry a
//!   coloured `[LEVEL]` tag. **`log_debug!`** is silent unless debug output was
//!   switched on with [`Log::set_debug`].
//!
//! Timestamps are prepended when [`Log::set_timestamps`] is on, which the
//! daemon does as soon as it starts serving.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);
static TIMESTAMPS_ENABLED: AtomicBool = AtomicBool::new(false);

// Routes output to the file writer thread when --log is active
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Line shapes understood by [`emit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Decorated,
    Indented,
    BlockStart,
    Pipe,
    Version,
    End,
    Info,
    Warning,
    Error,
    ErrorExit,
    Critical,
    Debug,
}

/// Global switches for the logging system.
pub struct Log;

impl Log {
    /// Enable or disable all output. Tests use this to stay quiet.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Show `log_debug!` lines.
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Prefix each line with the local wall-clock time.
    pub fn set_timestamps(enabled: bool) {
        TIMESTAMPS_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Start mirroring all output into `file_path` instead of stdout.
    ///
    /// The returned guard must be kept alive for the lifetime of the process;
    /// dropping it flushes and closes the file.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => file.write_all(text.as_bytes())?,
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    fn timestamp_prefix() -> String {
        if TIMESTAMPS_ENABLED.load(Ordering::SeqCst) {
            format!("[{}] ", chrono::Local::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Flushes the log file when dropped.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Render a single message in the given style.
pub fn format_line(style: Style, prefix: &str, message: &str) -> String {
    match style {
        Style::Decorated => format!("{prefix}┣ {message}\n"),
        Style::Indented => format!("{prefix}┃   {message}\n"),
        Style::BlockStart => format!("{prefix}┃\n{prefix}┣ {message}\n"),
        Style::Pipe => format!("{prefix}┃\n"),
        Style::Version => format!("{prefix}┏ {message} ━━╸\n"),
        Style::End => format!("{prefix}╹\n"),
        Style::Info => format!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n"),
        Style::Warning => format!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n"),
        Style::Error => format!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n"),
        Style::ErrorExit => format!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n"),
        Style::Critical => format!("{prefix}┣[\x1b[31mCRITICAL\x1b[0m] {message}\n"),
        Style::Debug => format!("{prefix}┣[\x1b[36mDEBUG\x1b[0m] {message}\n"),
    }
}

/// Entry point for every logging macro.
pub fn emit(style: Style, message: &str) {
    if !Log::is_enabled() {
        return;
    }
    if style == Style::Debug && !Log::is_debug() {
        return;
    }
    let prefix = Log::timestamp_prefix();
    write_output(&format_line(style, &prefix, message));
}

pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

/// Continue the current block: `┣ message`.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Decorated, &format!($($arg)*))
    };
}

/// Nested detail line: `┃   message`.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Indented, &format!($($arg)*))
    };
}

/// Spacer line: `┃`.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit($crate::logger::Style::Pipe, "")
    };
}

/// Start a new block: `┃` then `┣ message`.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::BlockStart, &format!($($arg)*))
    };
}

/// Session header: `┏ pilight vX.Y.Z ━━╸`.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit(
            $crate::logger::Style::Version,
            &format!("pilight v{}", env!("CARGO_PKG_VERSION")),
        )
    };
}

/// Session terminator: `╹`.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit($crate::logger::Style::End, "")
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Warning, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Error, &format!($($arg)*))
    };
}

/// Error that ends the session: `┃` then `┗[ERROR] message`.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::ErrorExit, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Critical, &format!($($arg)*))
    };
}

/// Operational detail, only printed in debug mode.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logger::emit($crate::logger::Style::Debug, &format!($($arg)*))
    };
}
