//! Placeholder-template rendering
//!
//! Both the console and file sinks format a [`LogRecord`] through a
//! user-configured template like `"[{timestamp}] {level} {module}.{function} - {message}"`.
//! This module owns the one rendering function they share.

use crate::record::LogRecord;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Formats `timestamp` in the named IANA zone (e.g. `"UTC"`, `"America/New_York"`)
/// using `pattern`. Falls back to formatting in UTC if `timezone` doesn't parse.
pub fn format_timestamp(timestamp: DateTime<Utc>, timezone: &str, pattern: &str) -> String {
    match timezone.parse::<Tz>() {
        Ok(tz) => timestamp.with_timezone(&tz).format(pattern).to_string(),
        Err(_) => timestamp.format(pattern).to_string(),
    }
}

/// Renders `template`, replacing every `{name}` placeholder with the
/// matching field of `record`. `timestamp_text` is substituted for the
/// `{timestamp}` placeholder so callers control its format and time zone;
/// every other placeholder is passed through like the rest of `LogRecord`'s
/// fields. An unknown placeholder is passed through literally, braces and all.
pub fn render(template: &str, record: &LogRecord, timestamp_text: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = template[i + 1..].find('}') {
                let name = &template[i + 1..i + 1 + end];
                let rendered = if name == "timestamp" {
                    Some(timestamp_text.to_string())
                } else {
                    record.placeholder_value(name)
                };
                match rendered {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                i = i + 1 + end + 1;
                continue;
            }
        }
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use chrono::{TimeZone, Utc};

    fn sample() -> LogRecord {
        LogRecord {
            project: "home_logger".to_string(),
            timestamp: Utc.with_ymd_and_hms(2023, 10, 15, 12, 34, 56).unwrap(),
            level: Level::Info,
            module: "auth".to_string(),
            function: "login".to_string(),
            message: "hello".to_string(),
            code: 7,
        }
    }

    #[test]
    fn renders_every_known_placeholder() {
        let rendered = render(
            "{level} {module}.{function} #{code}: {message}",
            &sample(),
            "2023-10-15 12:34:56",
        );
        assert_eq!(rendered, "info auth.login #7: hello");
    }

    #[test]
    fn passes_through_unknown_placeholder_literally() {
        let rendered = render("{project} [{nope}]", &sample(), "2023-10-15 12:34:56");
        assert_eq!(rendered, "home_logger [{nope}]");
    }

    #[test]
    fn timestamp_placeholder_uses_the_supplied_text() {
        let rendered = render("{timestamp}", &sample(), "15/10/2023");
        assert_eq!(rendered, "15/10/2023");
    }

    #[test]
    fn unterminated_brace_is_left_verbatim() {
        let rendered = render("{level} trailing {", &sample(), "2023-10-15 12:34:56");
        assert_eq!(rendered, "info trailing {");
    }

    #[test]
    fn template_with_no_placeholders_is_unchanged() {
        assert_eq!(
            render("plain text", &sample(), "2023-10-15 12:34:56"),
            "plain text"
        );
    }

    #[test]
    fn format_timestamp_falls_back_to_utc_on_unknown_zone() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            format_timestamp(ts, "Not/AZone", "%Y-%m-%d"),
            format_timestamp(ts, "UTC", "%Y-%m-%d")
        );
    }
}
