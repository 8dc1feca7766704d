//! ANSI style rendering
//!
//! Console level styles are configured as Rich-style strings such as
//! `"bold magenta"` or `"dim cyan on red"`. This module parses that syntax
//! into ANSI SGR codes so the console sink can stay a plain `io::Write`
//! without a Rich-equivalent dependency.

const RESET: &str = "\x1b[0m";

fn fg_code(name: &str) -> Option<&'static str> {
    Some(match name {
        "black" => "30",
        "red" => "31",
        "green" => "32",
        "yellow" => "33",
        "blue" => "34",
        "magenta" => "35",
        "cyan" => "36",
        "white" => "37",
        "bright_black" | "grey" | "gray" => "90",
        "bright_red" => "91",
        "bright_green" => "92",
        "bright_yellow" => "93",
        "bright_blue" => "94",
        "bright_magenta" => "95",
        "bright_cyan" => "96",
        "bright_white" => "97",
        _ => return None,
    })
}

fn bg_code(name: &str) -> Option<String> {
    let n: u8 = fg_code(name)?.parse().unwrap();
    Some((n + 10).to_string())
}

/// Parses a Rich-style string (e.g. `"bold white on red"`) into the ANSI
/// escape sequence that applies it. Unknown tokens are ignored rather than
/// rejected — a typo in config should degrade gracefully, not crash the sink.
pub fn parse(style: &str) -> String {
    let mut codes: Vec<String> = Vec::new();
    let mut on_background = false;

    for token in style.split_whitespace() {
        if token.eq_ignore_ascii_case("on") {
            on_background = true;
            continue;
        }
        let lower = token.to_lowercase();
        match lower.as_str() {
            "bold" => codes.push("1".to_string()),
            "dim" => codes.push("2".to_string()),
            "italic" => codes.push("3".to_string()),
            "underline" => codes.push("4".to_string()),
            "blink" => codes.push("5".to_string()),
            "reverse" => codes.push("7".to_string()),
            "strike" => codes.push("9".to_string()),
            _ if on_background => {
                if let Some(code) = bg_code(&lower) {
                    codes.push(code);
                }
                on_background = false;
            }
            _ => {
                if let Some(code) = fg_code(&lower) {
                    codes.push(code.to_string());
                }
            }
        }
    }

    if codes.is_empty() {
        return String::new();
    }
    format!("\x1b[{}m", codes.join(";"))
}

/// Wraps `text` in the escape sequence for `style`, resetting afterward.
/// Returns `text` unchanged if `style` parses to no recognized tokens.
pub fn apply(style: &str, text: &str) -> String {
    let prefix = parse(style);
    if prefix.is_empty() {
        text.to_string()
    } else {
        format!("{prefix}{text}{RESET}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_color_produces_one_code() {
        assert_eq!(parse("red"), "\x1b[31m");
    }

    #[test]
    fn bold_and_color_combine() {
        assert_eq!(parse("bold magenta"), "\x1b[1;35m");
    }

    #[test]
    fn background_color_via_on() {
        let out = parse("white on red");
        assert!(out.contains("37"));
        assert!(out.contains("41"));
    }

    #[test]
    fn unknown_token_is_ignored() {
        assert_eq!(parse("sparkly"), "");
    }

    #[test]
    fn apply_wraps_and_resets() {
        let out = apply("bold", "hello");
        assert!(out.starts_with("\x1b[1m"));
        assert!(out.ends_with(RESET));
        assert!(out.contains("hello"));
    }

    #[test]
    fn apply_with_no_style_returns_plain_text() {
        assert_eq!(apply("", "hello"), "hello");
    }
}
