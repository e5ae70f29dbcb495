use std::fmt;
use std::io::{self, Write};

use super::state;

/// Write `text` to the output channel
pub fn write_str(text: &str) {
    let captured = state::with_active(|active| active.output.push_str(text)).is_some();
    if captured {
        return;
    }

    print!("{}", text);
    if let Err(e) = io::stdout().flush() {
        tracing::debug!("Failed to flush stdout: {}", e);
    }
}

#[doc(hidden)]
pub fn write_fmt(args: fmt::Arguments<'_>) {
    match args.as_str() {
        Some(text) => write_str(text),
        None => write_str(&args.to_string()),
    }
}

/// Like `print!`, but through the output channel.
#[macro_export]
macro_rules! out {
    ($($arg:tt)*) => {
        $crate::capture::output::write_fmt(format_args!($($arg)*))
    };
}

/// Like `println!`, but through the output channel.
#[macro_export]
macro_rules! outln {
    () => {
        $crate::capture::output::write_str("\n")
    };
    ($($arg:tt)*) => {{
        $crate::capture::output::write_fmt(format_args!($($arg)*));
        $crate::capture::output::write_str("\n");
    }};
}
