//! Console sink
//!
//! Renders each record through the configured format template with ANSI
//! styles per field (project, timestamp, level, module, function, message,
//! code), then writes it to stdout on a dedicated background thread so a
//! slow terminal never blocks the consumer.

use crate::config::ConsoleConfig;
use crate::format::format_timestamp;
use crate::record::LogRecord;
use crate::style;
use crossbeam_channel::{Sender, bounded};
use std::io::Write as _;

/// Renders one record as a styled console line, without performing any I/O.
/// Kept separate from [`ConsoleSink`] so the rendering logic is unit
/// testable without spinning up the background writer thread.
pub fn render(config: &ConsoleConfig, record: &LogRecord) -> String {
    let level_style = config.level_styles.style_for(record.level);

    render_template(config, record, level_style)
}

fn render_template(config: &ConsoleConfig, record: &LogRecord, level_style: &str) -> String {
    let project = style::apply(&config.project_style, &record.project);
    let timestamp_text = format_timestamp(record.timestamp, &config.time_zone, &config.time_format);
    let timestamp = style::apply(&config.timestamp_style, &timestamp_text);
    let level = style::apply(level_style, &record.level.as_str().to_uppercase());
    let module = style::apply(&config.module_style, &record.module);
    let function = style::apply(&config.function_style, &record.function);
    let message = style::apply(&config.message_style, &record.message);
    let code = style::apply(&config.code_style, &record.code.to_string());

    let mut out = String::with_capacity(config.format.len());
    let bytes = config.format.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{'
            && let Some(end) = config.format[i + 1..].find('}')
        {
            let name = &config.format[i + 1..i + 1 + end];
            let rendered = match name {
                "project" => Some(project.as_str()),
                "timestamp" => Some(timestamp.as_str()),
                "level" => Some(level.as_str()),
                "module" => Some(module.as_str()),
                "function" => Some(function.as_str()),
                "message" => Some(message.as_str()),
                "code" => Some(code.as_str()),
                _ => None,
            };
            match rendered {
                Some(value) => out.push_str(value),
                None => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
            i = i + 1 + end + 1;
            continue;
        }
        let ch = config.format[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// Background-threaded console writer. Enqueues records on a bounded
/// channel; a dedicated thread renders and writes them to stdout so a slow
/// terminal backs up the channel rather than the caller.
pub struct ConsoleSink {
    sender: Sender<LogRecord>,
}

impl ConsoleSink {
    pub fn new(config: ConsoleConfig) -> Self {
        let (sender, receiver) = bounded::<LogRecord>(1024);

        std::thread::Builder::new()
            .name("console-sink".to_string())
            .spawn(move || {
                let stdout = std::io::stdout();
                for record in receiver {
                    let line = render(&config, &record);
                    let mut handle = stdout.lock();
                    let _ = writeln!(handle, "{line}");
                }
            })
            .expect("failed to spawn console sink thread");

        Self { sender }
    }

    /// Enqueues `record` for rendering. Never blocks on I/O; at most blocks
    /// briefly if the bounded channel is full.
    pub fn write(&self, record: LogRecord) {
        let _ = self.sender.send(record);
    }
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
            level: Level::Fatal,
            module: "auth".to_string(),
            function: "login".to_string(),
            message: "boom".to_string(),
            code: 500,
        }
    }

    #[test]
    fn renders_every_field_into_the_template() {
        let config = ConsoleConfig::default();
        let line = render(&config, &sample());
        assert!(line.contains("home_logger"));
        assert!(line.contains("auth.login"));
        assert!(line.contains("boom"));
        assert!(line.contains("500"));
    }

    #[test]
    fn level_text_is_uppercased() {
        let config = ConsoleConfig::default();
        let line = render(&config, &sample());
        assert!(line.contains("FATAL"));
    }

    #[test]
    fn unknown_level_falls_back_to_unknown_style_without_panic() {
        let mut config = ConsoleConfig::default();
        config.format = "{level}".to_string();
        let mut record = sample();
        record.level = Level::Unknown;
        let line = render(&config, &record);
        assert!(line.contains("UNKNOWN"));
    }

    #[test]
    fn timestamp_is_converted_to_the_configured_zone() {
        let mut config = ConsoleConfig::default();
        config.format = "{timestamp}".to_string();
        config.time_format = "%H:%M".to_string();
        config.timestamp_style = String::new();
        config.time_zone = "America/New_York".to_string();
        let line = render(&config, &sample());
        // 12:34 UTC on 2023-10-15 is 08:34 in America/New_York (EDT, UTC-4).
        assert_eq!(line, "08:34");
    }
}
