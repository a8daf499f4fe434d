//! Terminal output.
//!
//! - `log!("tag"; ...)` prints one line with a colored `[tag]` prefix
//! - `debug!` does the same, only with `--verbose`
//! - `status_*` prints the session status block (restart, build errors)
//!
//! The editor usually starts relive with a pipe for stdout. Cursor movement
//! and line clearing are only emitted when stdout is a terminal.
//!
//! ```ignore
//! log!("restart"; "Restarting because: {}", reason);
//! debug!("ignore"; "Ignoring {} on {}", kind.label(), path.display());
//! logger::status_error("Build failed", &output);
//! ```

use crossterm::{
    cursor, queue,
    terminal::{Clear, ClearType},
};
use owo_colors::{AnsiColors, OwoColorize};
use parking_lot::Mutex;
use std::{
    io::{IsTerminal, Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
    time::SystemTime,
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set by `--verbose`.
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

static IS_TERMINAL: LazyLock<bool> = LazyLock::new(|| stdout().is_terminal());

// ============================================================================
// macros
// ============================================================================

/// Print a line under a module tag.
///
/// ```ignore
/// log!("live"; "connected to {}", addr);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, but only with `--verbose`.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// lines
// ============================================================================

/// Tag colors. Tags not listed are yellow.
const TAG_COLORS: &[(&str, AnsiColors)] = &[
    ("live", AnsiColors::BrightBlue),
    ("select", AnsiColors::BrightBlue),
    ("watch", AnsiColors::BrightGreen),
    ("ignore", AnsiColors::BrightGreen),
    ("restart", AnsiColors::BrightMagenta),
    ("editor", AnsiColors::BrightCyan),
    ("profile", AnsiColors::BrightCyan),
];

pub fn log(module: &str, message: &str) {
    let prefix = tag(module);
    let mut stdout = stdout().lock();
    if *IS_TERMINAL {
        queue!(stdout, Clear(ClearType::UntilNewLine)).ok();
    }
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

fn tag(module: &str) -> String {
    let color = TAG_COLORS
        .iter()
        .find(|(name, _)| module.eq_ignore_ascii_case(name))
        .map_or(AnsiColors::BrightYellow, |(_, color)| *color);
    format!("[{module}]").color(color).bold().to_string()
}

// ============================================================================
// status block
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Warning,
}

impl Level {
    fn symbol(self) -> String {
        match self {
            Self::Success => "✓".green().to_string(),
            Self::Error => "✗".red().to_string(),
            Self::Warning => "⚠".yellow().to_string(),
        }
    }
}

/// The latest restart/build outcome, timestamped.
///
/// On a terminal each block replaces the previous one, so a long build
/// error disappears once the next restart succeeds. Piped output keeps
/// every block.
pub struct WatchStatus {
    overwrite: bool,
    /// Lines printed by the previous block
    last_lines: usize,
}

static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
    LazyLock::new(|| Mutex::new(WatchStatus::new(*IS_TERMINAL)));

impl WatchStatus {
    pub const fn new(overwrite: bool) -> Self {
        Self {
            overwrite,
            last_lines: 0,
        }
    }

    pub fn show(&mut self, level: Level, summary: &str, detail: &str) {
        let message = block_text(summary, detail);
        let mut stdout = stdout().lock();

        if self.overwrite && self.last_lines > 0 {
            let lines = u16::try_from(self.last_lines).unwrap_or(u16::MAX);
            queue!(
                stdout,
                cursor::MoveUp(lines),
                Clear(ClearType::FromCursorDown)
            )
            .ok();
        }

        let timestamp = format!("[{}]", clock()).dimmed().to_string();
        writeln!(stdout, "{timestamp} {} {message}", level.symbol()).ok();
        stdout.flush().ok();

        self.last_lines = message.lines().count().max(1);
    }
}

fn block_text(summary: &str, detail: &str) -> String {
    let detail = detail.trim_end();
    if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n{detail}")
    }
}

/// Wall clock as HH:MM:SS (UTC).
fn clock() -> String {
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    format!(
        "{:02}:{:02}:{:02}",
        (secs / 3600) % 24,
        (secs / 60) % 60,
        secs % 60
    )
}

pub fn status_success(message: &str) {
    WATCH_STATUS.lock().show(Level::Success, message, "");
}

pub fn status_error(summary: &str, detail: &str) {
    WATCH_STATUS.lock().show(Level::Error, summary, detail);
}

pub fn status_warning(detail: &str) {
    WATCH_STATUS.lock().show(Level::Warning, detail, "");
}
