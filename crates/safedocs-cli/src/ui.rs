use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{GlobalFlags, OutputFormat};

#[derive(Clone, Copy, Debug)]
pub struct UiPrefs {
    pub table_color: bool,
    pub progress: bool,
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let is_tty = std::io::stdout().is_terminal();
    let table_color = is_tty
        && flags.format == OutputFormat::Table
        && !flags.quiet
        && std::env::var_os("NO_COLOR").is_none();

    // Spinners draw on stderr, so they only need an interactive stderr.
    let progress =
        std::io::stderr().is_terminal() && !flags.quiet && flags.format != OutputFormat::Json;

    let _ = UI_PREFS.set(UiPrefs {
        table_color,
        progress,
    });
}

#[must_use]
pub fn prefs() -> UiPrefs {
    *UI_PREFS.get().unwrap_or(&UiPrefs {
        table_color: false,
        progress: false,
    })
}
