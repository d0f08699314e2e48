use std::io::{stderr, stdout, Write};

use colored::{ColoredString, Colorize};

/// Prints a message with a colored `[module]` prefix.
///
/// ```ignore
/// log!("build"; "wrote {} pages", count);
/// ```
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::log::log($module, &format!($($arg)*))
    }};
}

/// Failures go to stderr, progress to stdout. Continuation lines of a
/// multi-line message are indented under the prefix.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let indent = " ".repeat(module.len() + 3);
    let message = message.trim_end().replace('\n', &format!("\n{indent}"));
    let _ = match module {
        "error" | "skip" => writeln!(stderr().lock(), "{prefix} {message}"),
        _ => writeln!(stdout().lock(), "{prefix} {message}"),
    };
}

fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module {
        "error" => prefix.bright_red().bold(),
        "skip" => prefix.bright_magenta().bold(),
        "check" => prefix.bright_green().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}
