//! File header/footer framing
//!
//! Every rotated log file opens with a box-drawn header and, once closed
//! for rotation or shutdown, gets a matching footer appended recording its
//! final line count and size. Line/box widths follow the 80-column layout
//! the original writer used.

use crate::format::format_timestamp;
use chrono::{DateTime, Utc};

const CONTENT_WIDTH: usize = 80;
const DATE_PATTERN: &str = "%d:%m:%Y %H:%M:%S %z";

fn boxed_line(content_width: usize, text: &str) -> String {
    let pad = content_width.saturating_sub(text.chars().count() + 2);
    format!("│ {text}{} │", " ".repeat(pad))
}

/// Renders the header written at the top of a freshly-opened log file.
/// `timezone` (an IANA name such as `"UTC"` or `"Europe/Berlin"`) controls
/// what zone the start date is rendered in.
pub fn header(file_name: &str, project: &str, opened_at: DateTime<Utc>, timezone: &str) -> String {
    let start_str = format_timestamp(opened_at, timezone, DATE_PATTERN);
    let lines = [
        boxed_line(CONTENT_WIDTH, "LOG FILE START"),
        boxed_line(CONTENT_WIDTH, &format!("File: {file_name}")),
        boxed_line(CONTENT_WIDTH, &format!("Project: {project}")),
        boxed_line(CONTENT_WIDTH, &format!("Start Date: {start_str}")),
    ];
    format!(
        "┌{border}┐\n{body}\n└{border}┘\n",
        border = "─".repeat(CONTENT_WIDTH),
        body = lines.join("\n"),
    )
}

/// Renders the footer appended when a log file is closed. `timezone` controls
/// what zone the end date is rendered in, same as [`header`].
pub fn footer(total_lines: u64, file_size_bytes: u64, closed_at: DateTime<Utc>, timezone: &str) -> String {
    let end_str = format_timestamp(closed_at, timezone, DATE_PATTERN);
    let size_str = format_size(file_size_bytes);
    let width = CONTENT_WIDTH - 1;
    let lines = [
        boxed_line(width, "LOG FILE END"),
        boxed_line(width, &format!("End Date: {end_str}")),
        boxed_line(width, &format!("Total Lines: {total_lines}")),
        boxed_line(width, &format!("File Size: {size_str}")),
    ];
    format!(
        "\n┌{border}┐\n{body}\n└{border}┘\n",
        border = "─".repeat(width),
        body = lines.join("\n"),
    )
}

/// Formats a byte count as a human-readable size, base-1024, one decimal:
/// `1536` -> `"1.5 KB"`, `0` -> `"0.0 B"`.
pub fn format_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn header_contains_project_and_file_name() {
        let opened = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let text = header("log_foo_2024.log", "foo", opened, "UTC");
        assert!(text.contains("LOG FILE START"));
        assert!(text.contains("Project: foo"));
        assert!(text.contains("log_foo_2024.log"));
        assert!(text.starts_with('┌'));
    }

    #[test]
    fn footer_contains_line_count_and_size() {
        let closed = Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        let text = footer(42, 2048, closed, "UTC");
        assert!(text.contains("LOG FILE END"));
        assert!(text.contains("Total Lines: 42"));
        assert!(text.contains("2.0 KB"));
    }

    #[test]
    fn header_renders_start_date_in_the_configured_zone() {
        let opened = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let text = header("log_foo_2024.log", "foo", opened, "America/New_York");
        // 12:00 UTC on 2024-01-01 is 07:00 EST (UTC-5).
        assert!(text.contains("01:01:2024 07:00:00 -0500"));
    }

    #[test]
    fn format_size_bytes() {
        assert_eq!(format_size(512), "512.0 B");
    }

    #[test]
    fn format_size_kilobytes() {
        assert_eq!(format_size(1536), "1.5 KB");
    }

    #[test]
    fn format_size_megabytes() {
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn format_size_zero() {
        assert_eq!(format_size(0), "0.0 B");
    }
}
