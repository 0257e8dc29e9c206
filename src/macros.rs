use std::fmt::Arguments;

use chrono::{DateTime, Local};

/// Prints a timestamped progress line to stdout.
/// Pass a starting `DateTime<Local>` first to also print the time elapsed since then.
/// ```
/// use whalesounds::info_time;
///
/// info_time!("Found {} species categories.", 3);
/// let start = chrono::Local::now();
/// info_time!(start, "Processed {}", "Blue Whale");
/// ```
#[macro_export]
macro_rules! info_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {{
        println!("{}", $crate::macros::stamp(format_args!($strfm, $($arg),*)));
    }};
    ($time:expr, $strfm:literal $(,)? $($arg:expr),*) => {{
        println!(
            "{}\nRUNTIME: {} sec",
            $crate::macros::stamp(format_args!($strfm, $($arg),*)),
            $crate::macros::secs_since($time)
        );
    }};
}

/// [`info_time!`] for failures: same line, written to stderr.
/// ```
/// use whalesounds::warn_time;
///
/// warn_time!("Error fetching {}: {}", "http://localhost/", "timed out");
/// ```
#[macro_export]
macro_rules! warn_time {
    ($strfm:literal $(,)? $($arg:expr),*) => {{
        eprintln!("{}", $crate::macros::stamp(format_args!($strfm, $($arg),*)));
    }};
}

#[doc(hidden)]
pub fn stamp(message: Arguments<'_>) -> String {
    format!("{:<30} : {}", Local::now(), message)
}

#[doc(hidden)]
pub fn secs_since(start: DateTime<Local>) -> f64 {
    (Local::now() - start)
        .num_microseconds()
        .map(|n| n as f64 / 1_000_000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_pads_timestamp_before_message() {
        let line = stamp(format_args!("Found {} sound files", 4));
        let (time, message) = line.split_once(" : ").unwrap();
        assert!(time.len() >= 30);
        assert_eq!(message, "Found 4 sound files");
    }

    #[test]
    fn elapsed_time_is_never_negative() {
        assert!(secs_since(Local::now()) >= 0.0);
    }
}
