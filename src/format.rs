//! Display strings for sizes and dates.

use std::time::SystemTime;

use chrono::{DateTime, Local};

const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

/// Formats a byte count the way file sizes are usually shown: decimal units,
/// whole kilobytes, one decimal for megabytes and two above.
///
/// ```
/// # use storage_browser::format::format_byte_count;
/// assert_eq!(format_byte_count(0), "Zero KB");
/// assert_eq!(format_byte_count(10), "10 bytes");
/// assert_eq!(format_byte_count(1_500_000), "1.5 MB");
/// ```
#[must_use]
pub fn format_byte_count(bytes: u64) -> String {
    match bytes {
        0 => "Zero KB".to_string(),
        1 => "1 byte".to_string(),
        2..=999 => format!("{bytes} bytes"),
        _ => {
            let mut value = bytes as f64 / 1000.0;
            let mut unit = 0;
            while value >= 999.5 && unit < UNITS.len() - 1 {
                value /= 1000.0;
                unit += 1;
            }

            match unit {
                0 => format!("{value:.0} {}", UNITS[unit]),
                1 => format!("{value:.1} {}", UNITS[unit]),
                _ => format!("{value:.2} {}", UNITS[unit]),
            }
        }
    }
}

/// Formats a timestamp in local time as `yyyy/M/d HH:mm:ss`.
#[must_use]
pub fn format_date(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y/%-m/%-d %H:%M:%S")
        .to_string()
}
